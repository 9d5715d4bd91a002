//! Verbatim user code.

use crate::model::CodeModel;
use crate::policy::CodeEntry;

pub struct CodeExporter<'a> {
    entry: &'a CodeEntry,
}

impl<'a> CodeExporter<'a> {
    pub fn new(entry: &'a CodeEntry) -> Self {
        Self { entry }
    }

    pub fn export(&self) -> CodeModel {
        tracing::trace!(section = ?self.entry.section, "injecting code");
        CodeModel {
            section: self.entry.section,
            code: self.entry.code.clone(),
        }
    }
}
