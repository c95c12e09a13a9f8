//! Error types for semio operations.
//!
//! This module provides the main error type [`SemioError`] which wraps
//! the error conditions of loading, resolving, emitting and publishing.

use std::io;

use thiserror::Error;

use semio_parser::error::{ErrorKind, ParseError};

use crate::emit::EmitError;

/// The main error type for semio operations.
///
/// # Diagnostic Variants
///
/// The `Schema` variant carries the diagnostics of a rejected schema
/// together with its source text, so callers can render labeled spans.
#[derive(Debug, Error)]
pub enum SemioError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Schema { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The emitter found the resolved model inconsistent, or the compile run
    /// was driven out of order.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EmitError> for SemioError {
    fn from(error: EmitError) -> Self {
        Self::Internal(error.to_string())
    }
}

impl SemioError {
    /// Create a new `Schema` error with the associated source code.
    pub fn new_schema_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Schema {
            err,
            src: src.into(),
        }
    }

    /// Category of a schema error; `None` for every other variant.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Schema { err, .. } => Some(err.kind()),
            _ => None,
        }
    }
}
