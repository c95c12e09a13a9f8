//! The error returned by loading and resolving.

use std::fmt;

use crate::error::{Diagnostic, ErrorKind};

/// One or more diagnostics produced by a failed phase.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Category of the first error.
    pub fn kind(&self) -> ErrorKind {
        self.diagnostics
            .iter()
            .find(|diag| diag.severity().is_error())
            .map_or(ErrorKind::Definition, Diagnostic::kind)
    }

    /// Returns `true` if any diagnostic belongs to `kind`.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.diagnostics.iter().any(|diag| diag.kind() == kind)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self
            .diagnostics
            .iter()
            .find(|diag| diag.severity().is_error())
            .or_else(|| self.diagnostics.first());
        if let Some(first) = first {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_from_diagnostic() {
        let err: ParseError = Diagnostic::error("unknown type `Area`")
            .with_code(ErrorCode::E300)
            .into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.kind(), ErrorKind::UnknownTypeReference);
    }

    #[test]
    fn test_kind_skips_warnings() {
        let err: ParseError = vec![
            Diagnostic::warning("description is empty"),
            Diagnostic::error("flag `Panels::Rooftop` needs a value").with_code(ErrorCode::E203),
        ]
        .into();

        assert_eq!(err.kind(), ErrorKind::InvalidFlagValue);
        assert!(err.has_kind(ErrorKind::InvalidFlagValue));
        assert!(!err.has_kind(ErrorKind::Cycle));
    }

    #[test]
    fn test_display_counts_remaining() {
        let single: ParseError = Diagnostic::error("unknown type `Area`").into();
        assert_eq!(single.to_string(), "error: unknown type `Area`");

        let many: ParseError = vec![
            Diagnostic::error("first"),
            Diagnostic::error("second"),
            Diagnostic::error("third"),
        ]
        .into();
        assert_eq!(many.to_string(), "error: first (+2 more)");
    }

    #[test]
    fn test_display_leads_with_error() {
        let err: ParseError = vec![
            Diagnostic::warning("description of `Site` is empty"),
            Diagnostic::error("unknown type `Area`"),
        ]
        .into();
        assert_eq!(err.to_string(), "error: unknown type `Area` (+1 more)");
    }
}
