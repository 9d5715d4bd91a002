//! Per-declaration diagnostics collected while exporting.
//!
//! Fatal problems are reported through the error enums of each crate. A
//! `Diagnostic` records a non-fatal problem tied to one declaration (an
//! unsupported fundamental type, an operator the managed side cannot express)
//! so that the rest of the export can go on.

use crate::location::SourceLocation;
use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic, Serialize)]
#[error("{subject}: {message}")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Fully qualified name of the declaration the diagnostic is about.
    pub subject: String,
    pub message: String,
    pub location: Option<SourceLocation>,
    #[help]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            subject: subject.into(),
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            subject: subject.into(),
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn with_location(mut self, location: &SourceLocation) -> Self {
        if location.is_known() {
            self.location = Some(location.clone());
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_subject() {
        let diag = Diagnostic::warning("ns::Foo::bar", "unsupported type `long double`")
            .with_location(&SourceLocation::new("foo.h", 4))
            .with_help("exclude the member");
        assert_eq!(diag.to_string(), "ns::Foo::bar: unsupported type `long double`");
        assert_eq!(diag.level, DiagnosticLevel::Warning);
        assert_eq!(diag.location.unwrap().line, 4);
        assert_eq!(diag.help.as_deref(), Some("exclude the member"));
    }

    #[test]
    fn test_unknown_location_is_dropped() {
        let diag = Diagnostic::error("x", "y").with_location(&SourceLocation::default());
        assert!(diag.location.is_none());
    }
}
