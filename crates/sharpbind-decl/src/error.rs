//! Error types for sharpbind-decl.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for graph construction and dump import.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Problems found while building a declaration graph. These are fatal: a
/// graph that fails to build is never handed to the exporters.
#[derive(Error, Debug, Diagnostic)]
pub enum GraphError {
    #[error("unknown operator `{0}`")]
    #[diagnostic(code(sharpbind::decl::unknown_operator))]
    UnknownOperator(String),

    #[error("`{class}` derives from unknown class `{base}`")]
    #[diagnostic(
        code(sharpbind::decl::unknown_base),
        help("make sure the header declaring `{base}` is part of the dump")
    )]
    UnknownBase { class: String, base: String },

    #[error("`{class}` derives from `{base}`, which is not a class")]
    #[diagnostic(code(sharpbind::decl::base_not_a_class))]
    BaseNotAClass { class: String, base: String },

    #[error("inheritance cycle through `{0}`")]
    #[diagnostic(code(sharpbind::decl::cyclic_inheritance))]
    CyclicInheritance(String),

    #[error("`{0}` is not a class and cannot own members")]
    #[diagnostic(code(sharpbind::decl::not_a_class))]
    NotAClass(String),

    #[error("invalid declaration dump: {0}")]
    #[diagnostic(code(sharpbind::decl::invalid_dump))]
    InvalidDump(String),

    #[error("failed to parse declaration dump: {0}")]
    #[diagnostic(code(sharpbind::decl::json))]
    Json(#[from] serde_json::Error),

    #[error("failed to read declaration dump: {0}")]
    #[diagnostic(code(sharpbind::decl::io))]
    Io(#[from] std::io::Error),
}

/// A by-name lookup into the graph found nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum LookupError {
    #[error("no {0} declaration found!")]
    #[diagnostic(
        code(sharpbind::decl::not_found),
        help("check the spelling and the namespace of the name in the interface file")
    )]
    NotFound(String),
}
