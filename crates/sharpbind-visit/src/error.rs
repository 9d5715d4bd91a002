//! Error types for sharpbind-visit.

use miette::Diagnostic;
use sharpbind_decl::OperatorSymbol;
use thiserror::Error;

/// A type or operator that cannot cross the native/managed boundary.
///
/// These never abort an export: the exporter turns them into a warning on
/// the declaration that used the type and skips that declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ClassifyError {
    #[error("unsupported fundamental type `{0}`")]
    #[diagnostic(
        code(sharpbind::visit::unsupported_fundamental),
        help("exclude the declaration or wrap it with a function using a supported type")
    )]
    UnsupportedFundamental(String),

    #[error("operator `{0}` has no managed counterpart")]
    #[diagnostic(
        code(sharpbind::visit::unsupported_operator),
        help("rename the operator or give it a wrapper to export it as a method")
    )]
    UnsupportedOperator(OperatorSymbol),

    #[error("`{0}` cannot be passed across the boundary")]
    #[diagnostic(code(sharpbind::visit::unsupported_type))]
    UnsupportedType(String),
}
