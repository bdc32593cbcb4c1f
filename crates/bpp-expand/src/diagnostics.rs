/*
 * diagnostics.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Diagnostics collected during an expansion run.
//!
//! Every directive that degrades to a placeholder records one diagnostic
//! here and also logs it through `tracing`, so embedders can inspect what
//! went wrong without installing a subscriber.

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Warning,
    Error,
}

/// One message produced while expanding a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the source whose frame produced the message.
    pub source: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Error => "error",
        };
        write!(f, "{}: {}: {}", label, self.source, self.message)
    }
}

/// Collector for diagnostic messages during expansion.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty diagnostic collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic message.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a warning attributed to `source`.
    pub fn warn(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.add(Diagnostic {
            kind: DiagnosticKind::Warning,
            source: source.into(),
            message: message.into(),
        });
    }

    /// Add an error attributed to `source`.
    pub fn error(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.add(Diagnostic {
            kind: DiagnosticKind::Error,
            source: source.into(),
            message: message.into(),
        });
    }

    /// Check if any errors were collected (warnings don't count).
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Error)
    }

    /// Get a reference to the collected diagnostics, in the order recorded.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the collector and return the diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_collector_new() {
        let collector = DiagnosticCollector::new();
        assert!(collector.is_empty());
        assert!(!collector.has_errors());
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut collector = DiagnosticCollector::new();
        collector.warn("main.bpp", "Unknown directive 'foo'");

        assert!(!collector.is_empty());
        assert!(!collector.has_errors());
        assert_eq!(collector.diagnostics().len(), 1);
    }

    #[test]
    fn test_error_and_order() {
        let mut collector = DiagnosticCollector::new();
        collector.warn("a.bpp", "first");
        collector.error("b.bpp", "second");

        assert!(collector.has_errors());
        let diagnostics = collector.into_diagnostics();
        assert_eq!(diagnostics[0].message, "first");
        assert_eq!(diagnostics[1].kind, DiagnosticKind::Error);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::Warning,
            source: "main.bpp".to_string(),
            message: "File x not found".to_string(),
        };
        assert_eq!(diagnostic.to_string(), "warning: main.bpp: File x not found");
    }
}
