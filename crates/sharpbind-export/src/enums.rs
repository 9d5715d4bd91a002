//! Enumeration exporter.

use crate::error::{ExportError, Result};
use crate::function::Visitors;
use crate::model::{EnumModel, EnumValueModel};
use crate::names::ExportedNames;
use crate::policy::NamedEntry;
use sharpbind_decl::{Decl, DeclGraph};
use sharpbind_visit::Classifier;

/// Exports one enumeration, at namespace scope or nested in a class.
pub struct EnumExporter<'a, 'g> {
    graph: &'g DeclGraph,
    classifier: &'a Classifier<'g>,
    entry: &'a NamedEntry,
    module: &'a str,
}

impl<'a, 'g> EnumExporter<'a, 'g> {
    pub fn new(
        classifier: &'a Classifier<'g>,
        entry: &'a NamedEntry,
        module: &'a str,
    ) -> Self {
        Self {
            graph: classifier.graph(),
            classifier,
            entry,
            module,
        }
    }

    /// `None` when the enumeration is excluded.
    pub fn export(&self, names: &mut ExportedNames) -> Result<Option<EnumModel>> {
        if self.entry.info.exclude {
            tracing::debug!(name = %self.entry.name, "enum excluded");
            return Ok(None);
        }
        let id = self.graph.resolve_typedef(self.graph.lookup(&self.entry.name)?);
        let decl = self.graph.get(id);
        if decl.as_enumeration().is_none() {
            return Err(ExportError::NotAnEnum(self.entry.name.clone()));
        }

        let visitors = Visitors::new(self.classifier);
        let model = enum_model(&visitors, decl, self.entry.info.rename.clone(), self.module);
        names.insert(self.entry.name.as_str());
        names.insert(decl.full_name());
        Ok(Some(model))
    }
}

pub(crate) fn enum_model(
    visitors: &Visitors<'_, '_>,
    decl: &Decl,
    rename: Option<String>,
    module: &str,
) -> EnumModel {
    let values = decl
        .as_enumeration()
        .map(|e| {
            e.values
                .iter()
                .map(|(name, value)| EnumValueModel {
                    name: name.to_string(),
                    full_name: decl.value_full_name(name),
                    value: *value,
                })
                .collect()
        })
        .unwrap_or_default();
    EnumModel {
        name: decl.full_name(),
        rename,
        module: module.to_string(),
        naming: visitors.decl_naming(decl),
        is_nested: decl.visibility().is_some(),
        values,
    }
}
