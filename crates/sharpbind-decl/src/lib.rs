//! Declaration model for sharpbind.
//!
//! A [`DeclGraph`] holds every declaration of a parsed header set: classes
//! with their members and hierarchy, free functions and operators, enums,
//! variables and typedefs. It is produced once, either through a
//! [`GraphBuilder`] or from a JSON declaration dump, and is read-only
//! afterwards.
//!
//! Naming lives on [`Decl`] and [`Type`]: full C++ names, identifier-safe
//! names, overload-safe ids and pointer-to-function expressions.

mod builder;
mod decl;
mod dump;
mod error;
mod graph;
mod naming;
mod operator;
mod types;

pub use builder::GraphBuilder;
pub use decl::{
    Base, Class, Decl, DeclId, DeclKind, Enumeration, Field, Function, Method, MethodKind, Param,
    Typedef, Variable, Visibility,
};
pub use dump::DeclDump;
pub use error::{GraphError, LookupError, Result};
pub use graph::DeclGraph;
pub use naming::Signature;
pub use operator::OperatorSymbol;
pub use types::{Type, TypeKind};
