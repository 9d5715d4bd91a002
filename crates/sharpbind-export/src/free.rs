//! Free functions, enums and constants gathered into one managed class.

use crate::enums::enum_model;
use crate::error::{ExportError, Result};
use crate::function::{skipped, FunctionOptions, Visitors};
use crate::model::{FreeTypesModel, OutputFiles};
use crate::names::ExportedNames;
use crate::policy::FreeTypesEntry;
use crate::var::variable_model;
use sharpbind_decl::DeclGraph;
use sharpbind_visit::Classifier;

pub struct FreeTypesExporter<'a, 'g> {
    graph: &'g DeclGraph,
    classifier: &'a Classifier<'g>,
    entry: &'a FreeTypesEntry,
    module: &'a str,
}

impl<'a, 'g> FreeTypesExporter<'a, 'g> {
    pub fn new(
        classifier: &'a Classifier<'g>,
        entry: &'a FreeTypesEntry,
        module: &'a str,
    ) -> Self {
        Self {
            graph: classifier.graph(),
            classifier,
            entry,
            module,
        }
    }

    #[tracing::instrument(skip_all, fields(holder = %self.entry.holder_class))]
    pub fn export(&self, names: &mut ExportedNames) -> Result<FreeTypesModel> {
        let visitors = Visitors::new(self.classifier);
        let mut model = FreeTypesModel {
            holder_class: self.entry.holder_class.clone(),
            module: self.module.to_string(),
            include: self.entry.include.clone(),
            files: OutputFiles::for_path(&[self.entry.holder_class.as_str()]),
            functions: Vec::new(),
            enums: Vec::new(),
            constants: Vec::new(),
            diagnostics: Vec::new(),
        };
        let excluded = |name: &str| self.entry.member(name).is_some_and(|info| info.exclude);

        for name in &self.entry.functions {
            // Every overload is exported, so the lookup must succeed even
            // when the name itself is excluded.
            let ids = self.graph.lookup_all(name)?;
            if excluded(name) {
                continue;
            }
            for &id in ids {
                let decl = self.graph.get(id);
                if decl.as_function().is_none() || decl.as_method().is_some() {
                    return Err(ExportError::NotAFunction(name.clone()));
                }
                let options = FunctionOptions {
                    info: self.entry.member(name),
                    force_static: true,
                    ..FunctionOptions::default()
                };
                match visitors.function(decl, options) {
                    Ok(function) => model.functions.push(function),
                    Err(err) => model.diagnostics.push(skipped(decl, &err)),
                }
            }
            names.insert(name.as_str());
        }

        for name in &self.entry.enums {
            let id = self.graph.resolve_typedef(self.graph.lookup(name)?);
            let decl = self.graph.get(id);
            if decl.as_enumeration().is_none() {
                return Err(ExportError::NotAnEnum(name.clone()));
            }
            if excluded(name) {
                continue;
            }
            let rename = self.entry.member(name).and_then(|info| info.rename.clone());
            model.enums.push(enum_model(&visitors, decl, rename, self.module));
            names.insert(name.as_str());
        }

        for name in &self.entry.constants {
            let decl = self.graph.get(self.graph.lookup(name)?);
            if decl.as_variable().is_none() {
                return Err(ExportError::NotAVariable(name.clone()));
            }
            if excluded(name) {
                continue;
            }
            let rename = self.entry.member(name).and_then(|info| info.rename.clone());
            let constant = variable_model(&visitors, decl, rename, self.module);
            model.diagnostics.extend(constant.diagnostics.iter().cloned());
            model.constants.push(constant);
            names.insert(name.as_str());
        }

        tracing::debug!(
            functions = model.functions.len(),
            enums = model.enums.len(),
            constants = model.constants.len(),
            "exported free types"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DeclInfo;
    use pretty_assertions::assert_eq;
    use sharpbind_decl::{Decl, GraphBuilder, Type};

    /// ```cpp
    /// namespace geo {
    /// int Add(int, int);
    /// int Add(int, int, int);
    /// long double precise();
    /// void internal();
    /// enum Color { Red };
    /// const double pi;
    /// }
    /// ```
    fn graph() -> DeclGraph {
        let int = || Type::fundamental("int");
        let mut b = GraphBuilder::new();
        b.add_root(Decl::function("geo", "Add", int(), vec![int(), int()]));
        b.add_root(Decl::function("geo", "Add", int(), vec![int(), int(), int()]));
        b.add_root(Decl::function("geo", "precise", Type::fundamental("long double"), vec![]));
        b.add_root(Decl::function("geo", "internal", Type::fundamental("void"), vec![]));
        b.add_root(Decl::enumeration("geo", "Color", [("Red", 0)]));
        b.add_root(Decl::variable("geo", "pi", Type::fundamental("double").with_const()));
        b.finish().unwrap()
    }

    fn entry() -> FreeTypesEntry {
        FreeTypesEntry {
            holder_class: "Geo".into(),
            functions: vec!["geo::Add".into(), "geo::precise".into(), "geo::internal".into()],
            enums: vec!["geo::Color".into()],
            constants: vec!["geo::pi".into()],
            ..FreeTypesEntry::default()
        }
    }

    #[test]
    fn test_holder_collects_everything() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let mut entry = entry();
        entry.members.insert("geo::internal".into(), DeclInfo::excluded());
        let mut names = ExportedNames::new();
        let model = FreeTypesExporter::new(&classifier, &entry, "geo")
            .export(&mut names)
            .unwrap();

        let ids: Vec<&str> = model.functions.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["geo_Add__int_int", "geo_Add__int_int_int"]);
        assert!(model.functions.iter().all(|f| f.is_static && !f.is_unique));
        assert_eq!(model.enums[0].values[0].full_name, "geo::Red");
        assert_eq!(model.constants[0].getter.csharp.usage, "double");
        assert_eq!(model.files.csharp, "Geo.cs");

        // `long double` has no managed counterpart.
        assert_eq!(model.diagnostics.len(), 1);
        assert_eq!(model.diagnostics[0].subject, "geo::precise");

        assert!(names.contains("geo::Add"));
        assert!(names.contains("geo::Color"));
        assert!(!names.contains("geo::internal"));
    }

    #[test]
    fn test_unknown_function_is_fatal() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let entry = FreeTypesEntry {
            holder_class: "Geo".into(),
            functions: vec!["geo::Sub".into()],
            ..FreeTypesEntry::default()
        };
        let err = FreeTypesExporter::new(&classifier, &entry, "geo")
            .export(&mut ExportedNames::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "no geo::Sub declaration found!");
    }
}
