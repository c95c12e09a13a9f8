//! Accumulates diagnostics over one phase.
//!
//! Loading and resolving report every problem they find instead of stopping
//! at the first one. Each phase owns a [`DiagnosticCollector`] and turns it
//! into a `Result` when the phase ends.

use log::warn;

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` once an error-severity diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Ends the phase.
    ///
    /// Fails with every collected diagnostic if at least one of them is an
    /// error. Warnings alone are logged and the phase succeeds.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            return Err(ParseError::new(self.diagnostics));
        }
        for diagnostic in &self.diagnostics {
            warn!("{diagnostic}");
        }
        Ok(())
    }
}
