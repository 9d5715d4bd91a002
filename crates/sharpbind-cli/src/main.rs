use clap::{Parser, Subcommand};
use miette::Result;
use sharpbind_decl::{DeclGraph, DeclKind};
use sharpbind_export::{ExportModel, Generation, Generator};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sharpbind")]
#[command(author, version, about = "Generate C# P/Invoke bindings from C++ declarations")]
struct Cli {
    /// Log more; repeat for trace output. `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the declarations named by interface files
    Generate {
        /// Declaration dump written by the header parser
        #[arg(long)]
        dump: PathBuf,

        /// Interface files; the ones others import run first
        #[arg(required = true)]
        interfaces: Vec<PathBuf>,

        /// Module for interfaces that do not name one
        #[arg(long)]
        module: Option<String>,

        /// Write the export models to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Fail when any declaration had to be skipped
        #[arg(long)]
        deny_warnings: bool,
    },

    /// List the declarations of a dump
    Decls {
        /// Declaration dump written by the header parser
        dump: PathBuf,

        /// Only list names containing this text
        #[arg(long)]
        filter: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(dump: &Path, interfaces: &[PathBuf], module: Option<&str>) -> Result<Generation> {
    let graph = DeclGraph::from_json_file(dump)?;
    tracing::debug!(declarations = graph.len(), "loaded declaration dump");

    let mut generator = Generator::new(graph);
    if let Some(module) = module {
        generator = generator.with_default_module(module);
    }
    for path in interfaces {
        generator.load_interface(path)?;
    }
    Ok(generator.run()?)
}

fn render(models: &[ExportModel], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(models)
    } else {
        serde_json::to_string(models)
    };
    json.map_err(|e| miette::miette!("Failed to serialize export models: {}", e))
}

fn kind_name(kind: &DeclKind) -> &'static str {
    match kind {
        DeclKind::Class(class) if class.is_struct => "struct",
        DeclKind::Class(_) => "class",
        DeclKind::Function(f) if f.operator.is_some() => "operator",
        DeclKind::Function(_) => "function",
        DeclKind::Method(_) => "method",
        DeclKind::Variable(_) => "variable",
        DeclKind::Enumeration(_) => "enum",
        DeclKind::Typedef(_) => "typedef",
    }
}

fn list_decls(graph: &DeclGraph, filter: Option<&str>) -> Vec<String> {
    graph
        .iter()
        .map(|(_, decl)| (kind_name(&decl.kind), decl.full_name(), &decl.location))
        .filter(|(_, name, _)| filter.map_or(true, |f| name.contains(f)))
        .map(|(kind, name, location)| format!("{kind:<9} {name}  ({location})"))
        .collect()
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            dump,
            interfaces,
            module,
            out,
            pretty,
            deny_warnings,
        } => {
            let generation = generate(&dump, &interfaces, module.as_deref())?;
            for diagnostic in &generation.diagnostics {
                eprintln!("{:?}", miette::Report::new(diagnostic.clone()));
            }

            let json = render(&generation.models, pretty)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e))?;
                    eprintln!(
                        "Exported {} models to {}",
                        generation.models.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }

            if deny_warnings && !generation.diagnostics.is_empty() {
                return Err(miette::miette!(
                    "{} declarations were skipped",
                    generation.diagnostics.len()
                ));
            }
        }

        Commands::Decls { dump, filter } => {
            let graph = DeclGraph::from_json_file(&dump)?;
            for line in list_decls(&graph, filter.as_deref()) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
