//! Error and diagnostic system for schema loading and resolution.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - An [`ErrorKind`] taxonomy every code belongs to
//! - Multiple labeled spans for rich error context
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! for returning from the loading and resolving phases.
//!
//! # Example
//!
//! ```
//! # use semio_parser::error::{Diagnostic, ErrorCode, ErrorKind};
//! # use semio_parser::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::error("type `Masterplan::Use` is declared multiple times")
//!     .with_code(ErrorCode::E201)
//!     .with_label(span, "duplicate declaration")
//!     .with_secondary_label(original_span, "first declared here")
//!     .with_help("remove the duplicate or use a different name");
//!
//! assert_eq!(diag.kind(), ErrorKind::NameCollision);
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod error_kind;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use error_kind::ErrorKind;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
