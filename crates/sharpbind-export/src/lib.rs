//! Export stage of sharpbind.
//!
//! Interface files ([`InterfaceFile`]) name the declarations to expose and
//! the options that shape them. The [`Generator`] runs one exporter per entry
//! over a shared [`DeclGraph`](sharpbind_decl::DeclGraph), in an order that
//! puts imported interfaces and base classes first, and collects the
//! resulting [`ExportModel`]s for emission.

pub mod class;
pub mod code;
pub mod enums;
pub mod error;
pub mod free;
mod function;
pub mod generator;
pub mod header;
pub mod model;
pub mod names;
pub mod policy;
pub mod var;

pub use class::ClassExporter;
pub use code::CodeExporter;
pub use enums::EnumExporter;
pub use error::{ConfigError, ExportError, Result};
pub use free::FreeTypesExporter;
pub use generator::{Generation, Generator};
pub use header::HeaderExporter;
pub use model::{ClassModel, ExportModel, FunctionModel};
pub use names::ExportedNames;
pub use policy::{ClassEntry, DeclInfo, Interface, InterfaceFile, Policy, ReturnValuePolicy};
pub use var::VarExporter;
