//! The set of names exported so far in a run.

use indexmap::IndexSet;
use sharpbind_decl::{DeclGraph, DeclKind, TypeKind};

/// Fully qualified names of every exported declaration, in insertion order.
///
/// Exporters consult it to decide whether a base class has its own managed
/// wrapper (and can be referred to) or must be flattened into the derived
/// class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedNames {
    names: IndexSet<String>,
}

impl ExportedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let name = name.trim_start_matches("::");
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.trim_start_matches("::"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Add the underlying name of every typedef whose own name is exported,
    /// so that `typedef Foo<int> IntFoo;` exported as `IntFoo` also makes
    /// `Foo<int>` known. Returns how many names were added.
    pub fn expand_typedefs(&mut self, graph: &DeclGraph) -> usize {
        let mut added = 0;
        for (_, decl) in graph.iter() {
            let DeclKind::Typedef(typedef) = &decl.kind else {
                continue;
            };
            if typedef.ty.kind != TypeKind::Named || !self.contains(&decl.full_name()) {
                continue;
            }
            if self.insert(typedef.ty.qualified_name()) {
                tracing::trace!(typedef = %decl.full_name(), "expanded typedef");
                added += 1;
            }
        }
        added
    }
}

impl<S: Into<String>> Extend<S> for ExportedNames {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpbind_decl::{Decl, GraphBuilder, Type};

    #[test]
    fn test_leading_scope_is_ignored() {
        let mut names = ExportedNames::new();
        assert!(names.insert("::ns::Foo"));
        assert!(names.contains("ns::Foo"));
        assert!(!names.insert("ns::Foo"));
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_typedef_expansion() {
        let mut b = GraphBuilder::new();
        b.add_root(Decl::class("ns", "Box<int>"));
        b.add_root(Decl::typedef("ns", "IntBox", Type::named("ns::Box<int>")));
        b.add_root(Decl::typedef("ns", "Count", Type::fundamental("int")));
        let graph = b.finish().unwrap();

        let mut names = ExportedNames::new();
        names.extend(["ns::IntBox", "ns::Count"]);
        assert_eq!(names.expand_typedefs(&graph), 1);
        assert!(names.contains("ns::Box<int>"));
        assert!(!names.contains("int"));
        assert_eq!(names.expand_typedefs(&graph), 0);
    }
}
