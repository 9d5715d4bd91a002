//! Export everything a header declares.

use crate::class::{order_key, ClassExporter};
use crate::error::Result;
use crate::free::FreeTypesExporter;
use crate::model::ExportModel;
use crate::names::ExportedNames;
use crate::policy::{ClassEntry, FreeTypesEntry, HeaderEntry};
use sharpbind_common::make_id;
use sharpbind_decl::{Decl, DeclGraph, DeclKind};
use sharpbind_visit::Classifier;
use std::path::Path;

pub struct HeaderExporter<'a, 'g> {
    graph: &'g DeclGraph,
    classifier: &'a Classifier<'g>,
    entry: &'a HeaderEntry,
    module: &'a str,
}

impl<'a, 'g> HeaderExporter<'a, 'g> {
    pub fn new(classifier: &'a Classifier<'g>, entry: &'a HeaderEntry, module: &'a str) -> Self {
        Self {
            graph: classifier.graph(),
            classifier,
            entry,
            module,
        }
    }

    /// Name of the class holding the header's free declarations: the
    /// identifier form of the file stem.
    pub fn holder_class(&self) -> String {
        let stem = Path::new(&self.entry.include)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        make_id(&stem)
    }

    fn wanted(&self, decl: &Decl) -> bool {
        !decl.incomplete
            && !decl.name.starts_with('_')
            && !self
                .entry
                .members
                .get(&decl.full_name())
                .is_some_and(|info| info.exclude)
    }

    /// The entries this header expands to: one class entry per class and a
    /// single holder for the free enums, variables and functions.
    pub fn entries(&self) -> (Vec<ClassEntry>, FreeTypesEntry) {
        let mut classes = Vec::new();
        let mut free = FreeTypesEntry {
            holder_class: self.holder_class(),
            include: Some(self.entry.include.clone()),
            ..FreeTypesEntry::default()
        };

        for id in self.graph.roots_in(&self.entry.include) {
            let decl = self.graph.get(id);
            if !self.wanted(decl) {
                continue;
            }
            let name = decl.full_name();
            let info = self.entry.members.get(&name).cloned().unwrap_or_default();
            match &decl.kind {
                DeclKind::Class(_) => {
                    let mut class = ClassEntry::new(name).with_info(info);
                    class.include = Some(self.entry.include.clone());
                    classes.push(class);
                }
                DeclKind::Enumeration(_) => free.enums.push(name),
                DeclKind::Variable(_) => free.constants.push(name),
                // Free operators belong to the class they take.
                DeclKind::Function(_) if !decl.is_free_operator() => {
                    // Overloads share a name and are exported together.
                    if !free.functions.contains(&name) {
                        free.functions.push(name);
                    }
                }
                _ => continue,
            }
        }
        for name in free.functions.iter().chain(&free.enums).chain(&free.constants) {
            if let Some(info) = self.entry.members.get(name) {
                free.members.insert(name.clone(), info.clone());
            }
        }

        classes.sort_by_cached_key(|entry| order_key(self.graph, entry));
        (classes, free)
    }

    #[tracing::instrument(skip_all, fields(header = %self.entry.include))]
    pub fn export(&self, names: &mut ExportedNames) -> Result<Vec<ExportModel>> {
        let (classes, free) = self.entries();
        tracing::debug!(
            classes = classes.len(),
            functions = free.functions.len(),
            "expanded header"
        );

        let mut models = Vec::new();
        for entry in &classes {
            let exporter = ClassExporter::new(self.classifier, entry, self.module);
            if let Some(model) = exporter.export(names)? {
                models.push(ExportModel::Class(model));
            }
        }
        if !(free.functions.is_empty() && free.enums.is_empty() && free.constants.is_empty()) {
            let model = FreeTypesExporter::new(self.classifier, &free, self.module).export(names)?;
            models.push(ExportModel::FreeTypes(model));
        }
        Ok(models)
    }
}
