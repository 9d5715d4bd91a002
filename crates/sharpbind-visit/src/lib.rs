//! Type classification and marshaling visitors.
//!
//! A [`Classifier`] sorts every spelled type into a [`TypeCategory`]. Two
//! visitors then decide how a value of that type crosses the boundary, one
//! per generated syntax:
//!
//! - [`CxxVisitor`] for the `extern "C"` bridge compiled against the headers
//! - [`CSharpVisitor`] for the P/Invoke declarations and managed wrappers
//!
//! Each visitor has one entry point per position (names, parameter, return)
//! and never mutates the declaration graph.

mod classify;
mod csharp;
mod cxx;
mod error;
mod plan;

pub use classify::{Classifier, Fundamental, TypeCategory};
pub use csharp::{dotted, CSharpVisitor};
pub use cxx::CxxVisitor;
pub use error::ClassifyError;
pub use plan::{MarshalStep, ParamPlan, ReturnConversion, ReturnPlan, TypeNames};
