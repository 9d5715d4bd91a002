mod diagnostic;
mod ident;
mod location;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use ident::{clean_segment, join_scope, make_id, split_scope, split_template_args};
pub use location::{normalize_path, SourceLocation};
