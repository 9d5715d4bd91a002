//! Global variable exporter.

use crate::error::{ExportError, Result};
use crate::function::{skipped, Visitors};
use crate::model::VariableModel;
use crate::names::ExportedNames;
use crate::policy::NamedEntry;
use sharpbind_decl::{Decl, DeclGraph};
use sharpbind_visit::Classifier;

pub struct VarExporter<'a, 'g> {
    graph: &'g DeclGraph,
    classifier: &'a Classifier<'g>,
    entry: &'a NamedEntry,
    module: &'a str,
}

impl<'a, 'g> VarExporter<'a, 'g> {
    pub fn new(classifier: &'a Classifier<'g>, entry: &'a NamedEntry, module: &'a str) -> Self {
        Self {
            graph: classifier.graph(),
            classifier,
            entry,
            module,
        }
    }

    pub fn export(&self, names: &mut ExportedNames) -> Result<Option<VariableModel>> {
        if self.entry.info.exclude {
            return Ok(None);
        }
        let decl = self.graph.get(self.graph.lookup(&self.entry.name)?);
        if decl.as_variable().is_none() {
            return Err(ExportError::NotAVariable(self.entry.name.clone()));
        }
        let visitors = Visitors::new(self.classifier);
        let model = variable_model(&visitors, decl, self.entry.info.rename.clone(), self.module);
        names.insert(decl.full_name());
        Ok(Some(model))
    }
}

/// Model of a variable; an unsupported type leaves an empty getter and a
/// diagnostic.
pub(crate) fn variable_model(
    visitors: &Visitors<'_, '_>,
    decl: &Decl,
    rename: Option<String>,
    module: &str,
) -> VariableModel {
    let mut model = VariableModel {
        name: decl.full_name(),
        rename,
        module: module.to_string(),
        is_const: false,
        naming: Default::default(),
        getter: visitors.empty_result(),
        diagnostics: Vec::new(),
    };
    let Some(var) = decl.as_variable() else {
        return model;
    };
    model.is_const = var.ty.is_const;
    let built = visitors
        .type_naming(&var.ty)
        .and_then(|naming| Ok((naming, visitors.result(Some(&var.ty), None)?)));
    match built {
        Ok((naming, getter)) => {
            model.naming = naming;
            model.getter = getter;
        }
        Err(err) => model.diagnostics.push(skipped(decl, &err)),
    }
    model
}
