//! Runs every exporter of every interface in a deterministic order.

use crate::class::{order_key, ClassExporter};
use crate::code::CodeExporter;
use crate::enums::EnumExporter;
use crate::error::Result;
use crate::free::FreeTypesExporter;
use crate::header::HeaderExporter;
use crate::model::ExportModel;
use crate::names::ExportedNames;
use crate::policy::{
    ClassEntry, CodeEntry, FreeTypesEntry, HeaderEntry, Interface, InterfaceFile, NamedEntry,
};
use crate::var::VarExporter;
use sharpbind_common::Diagnostic;
use sharpbind_decl::DeclGraph;
use sharpbind_visit::Classifier;
use std::path::Path;

/// One exporter invocation.
enum Job<'i> {
    Class(ClassEntry),
    FreeTypes(&'i FreeTypesEntry),
    Enum(&'i NamedEntry),
    Var(&'i NamedEntry),
    Header(&'i HeaderEntry),
    Code(&'i CodeEntry),
}

impl Job<'_> {
    fn name(&self) -> &str {
        match self {
            Job::Class(entry) => &entry.name,
            Job::FreeTypes(entry) => &entry.holder_class,
            Job::Enum(entry) | Job::Var(entry) => &entry.name,
            Job::Header(entry) => &entry.include,
            Job::Code(_) => "",
        }
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct Generation {
    pub models: Vec<ExportModel>,
    pub exported: ExportedNames,
    pub diagnostics: Vec<Diagnostic>,
}

/// Binding generator over one declaration graph.
pub struct Generator {
    graph: DeclGraph,
    interfaces: Vec<Interface>,
    default_module: Option<String>,
}

impl Generator {
    pub fn new(graph: DeclGraph) -> Self {
        Self {
            graph,
            interfaces: Vec::new(),
            default_module: None,
        }
    }

    /// Module used by interfaces that do not name one.
    pub fn with_default_module(mut self, module: impl Into<String>) -> Self {
        self.default_module = Some(module.into());
        self
    }

    pub fn add_interface(&mut self, interface: Interface) {
        self.interfaces.push(interface);
    }

    /// Load and add an interface file.
    pub fn load_interface(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let interface = Interface::load(path.as_ref())?;
        self.add_interface(interface);
        Ok(())
    }

    pub fn graph(&self) -> &DeclGraph {
        &self.graph
    }

    /// Interfaces imported by the most others come first; ties keep the
    /// order they were added in.
    pub fn ordered_interfaces(&self) -> Vec<&Interface> {
        let imported = |interface: &Interface| {
            let name = interface.file_name();
            self.interfaces
                .iter()
                .filter(|other| other.file.import.iter().any(|i| *i == name))
                .count()
        };
        let mut ordered: Vec<&Interface> = self.interfaces.iter().collect();
        ordered.sort_by_key(|interface| std::cmp::Reverse(imported(interface)));
        ordered
    }

    fn module_of(&self, interface: &Interface) -> String {
        interface
            .file
            .module
            .clone()
            .or_else(|| self.default_module.clone())
            .unwrap_or_else(|| {
                interface
                    .path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }

    fn jobs<'i>(&self, file: &'i InterfaceFile) -> Vec<Job<'i>> {
        let mut jobs: Vec<(usize, Job<'i>)> = Vec::new();
        for mut entry in file.all_classes() {
            if entry.include.is_none() {
                entry.include = file.include.clone();
            }
            jobs.push((order_key(&self.graph, &entry).0, Job::Class(entry)));
        }
        jobs.extend(file.free_types.iter().map(|e| (0, Job::FreeTypes(e))));
        jobs.extend(file.enums.iter().map(|e| (0, Job::Enum(e))));
        jobs.extend(file.vars.iter().map(|e| (0, Job::Var(e))));
        jobs.extend(file.headers.iter().map(|e| (0, Job::Header(e))));
        jobs.extend(file.code.iter().map(|e| (0, Job::Code(e))));

        jobs.sort_by(|(a, ja), (b, jb)| a.cmp(b).then_with(|| ja.name().cmp(jb.name())));
        jobs.into_iter().map(|(_, job)| job).collect()
    }

    /// Names every interface promises to export. Exporters consult this to
    /// tell exported bases from ones they have to flatten, so it is known
    /// before anything runs.
    fn seed(&self, classifier: &Classifier<'_>) -> ExportedNames {
        let mut names = ExportedNames::new();
        for interface in &self.interfaces {
            let file = &interface.file;
            for entry in file.all_classes() {
                if !entry.info.exclude {
                    names.insert(entry.name);
                }
            }
            for entry in file.enums.iter().chain(&file.vars) {
                if !entry.info.exclude {
                    names.insert(entry.name.as_str());
                }
            }
            for entry in &file.free_types {
                let listed = entry
                    .functions
                    .iter()
                    .chain(&entry.enums)
                    .chain(&entry.constants);
                names.extend(
                    listed
                        .filter(|name| !entry.member(name).is_some_and(|info| info.exclude))
                        .cloned(),
                );
            }
            for entry in &file.headers {
                let (classes, free) = HeaderExporter::new(classifier, entry, "").entries();
                names.extend(classes.into_iter().map(|class| class.name));
                names.extend(free.functions.into_iter().chain(free.enums).chain(free.constants));
            }
        }
        names.expand_typedefs(&self.graph);
        names
    }

    /// Run every exporter. A declaration an interface names but the graph
    /// lacks aborts the run.
    #[tracing::instrument(skip_all, fields(interfaces = self.interfaces.len()))]
    pub fn run(&self) -> Result<Generation> {
        let classifier = Classifier::new(&self.graph);
        let mut names = self.seed(&classifier);
        let mut models = Vec::new();

        for interface in self.ordered_interfaces() {
            let module = self.module_of(interface);
            let span = tracing::debug_span!("interface", path = %interface.path.display());
            let _enter = span.enter();

            for job in self.jobs(&interface.file) {
                tracing::trace!(name = job.name(), "exporting");
                match &job {
                    Job::Class(entry) => {
                        let exporter = ClassExporter::new(&classifier, entry, &module);
                        models.extend(exporter.export(&mut names)?.map(ExportModel::Class));
                    }
                    Job::FreeTypes(entry) => {
                        let exporter = FreeTypesExporter::new(&classifier, entry, &module);
                        models.push(ExportModel::FreeTypes(exporter.export(&mut names)?));
                    }
                    Job::Enum(entry) => {
                        let exporter = EnumExporter::new(&classifier, entry, &module);
                        models.extend(exporter.export(&mut names)?.map(ExportModel::Enum));
                    }
                    Job::Var(entry) => {
                        let exporter = VarExporter::new(&classifier, entry, &module);
                        models.extend(exporter.export(&mut names)?.map(ExportModel::Variable));
                    }
                    Job::Header(entry) => {
                        let exporter = HeaderExporter::new(&classifier, entry, &module);
                        models.extend(exporter.export(&mut names)?);
                    }
                    Job::Code(entry) => {
                        models.push(ExportModel::Code(CodeExporter::new(entry).export()));
                    }
                }
                let added = names.expand_typedefs(&self.graph);
                if added > 0 {
                    tracing::trace!(added, "expanded typedefs");
                }
            }
        }

        let diagnostics: Vec<Diagnostic> = models
            .iter()
            .flat_map(ExportModel::diagnostics)
            .cloned()
            .collect();
        tracing::debug!(
            models = models.len(),
            exported = names.len(),
            diagnostics = diagnostics.len(),
            "generation finished"
        );
        Ok(Generation {
            models,
            exported: names,
            diagnostics,
        })
    }
}
