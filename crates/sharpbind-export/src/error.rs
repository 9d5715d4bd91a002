//! Error types for sharpbind-export.

use miette::Diagnostic;
use sharpbind_decl::LookupError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for exporters.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Fatal export errors. Anything tied to a single member (an unsupported
/// type, an operator with no managed form) is a
/// [`Diagnostic`](sharpbind_common::Diagnostic) on the model instead.
#[derive(Error, Debug, Diagnostic)]
pub enum ExportError {
    #[error("no {name} declaration found!")]
    #[diagnostic(
        code(sharpbind::export::declaration_not_found),
        help("check the spelling and the namespace of `{name}` in the interface file")
    )]
    DeclarationNotFound { name: String },

    #[error("`{0}` is not a class")]
    #[diagnostic(code(sharpbind::export::not_a_class))]
    NotAClass(String),

    #[error("`{0}` is not an enumeration")]
    #[diagnostic(code(sharpbind::export::not_an_enum))]
    NotAnEnum(String),

    #[error("`{0}` is not a variable")]
    #[diagnostic(code(sharpbind::export::not_a_variable))]
    NotAVariable(String),

    #[error("`{0}` is not a function")]
    #[diagnostic(code(sharpbind::export::not_a_function))]
    NotAFunction(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl From<LookupError> for ExportError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(name) => Self::DeclarationNotFound { name },
        }
    }
}

/// Problems reading interface files.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    #[diagnostic(code(sharpbind::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid interface file: {0}")]
    #[diagnostic(
        code(sharpbind::config::toml),
        help("interface files are TOML; see `[[reference_type]]`, `[[free_types]]` and friends")
    )]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    #[diagnostic(code(sharpbind::config::json))]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(sharpbind::config::invalid))]
    Invalid(String),
}
