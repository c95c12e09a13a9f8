//! The core diagnostic type.
//!
//! A [`Diagnostic`] is one error or warning with an optional error code,
//! labeled source spans and help text.

use std::fmt;

use crate::{
    error::{ErrorCode, ErrorKind, Label, Severity},
    span::Span,
};

/// A diagnostic message with source locations.
///
/// Messages name entities by their fully qualified name
/// (`Apartmentplan::Penthouse::Boundary`); labels point at the declarations
/// involved.
///
/// ```text
/// error[E301]: property `Apartmentplan::Penthouse::Boundary` redeclares an inherited property
///   --> plan.semio:21:21
///    |
/// 21 |         ClosedCurve Boundary
///    |                     ^^^^^^^^ redeclared here
///    |
/// 16 |         ClosedCurve Boundary
///    |                     -------- inherited from `Apartmentplan::Apartment`
///    |
///    = help: specialization adds properties; rename or remove this one
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// ```
    /// # use semio_parser::error::{Diagnostic, ErrorCode};
    /// # use semio_parser::Span;
    /// let diag = Diagnostic::error("unknown type `Polygon`")
    ///     .with_code(ErrorCode::E300)
    ///     .with_label(Span::new(40..47), "not visible from `Masterplan`")
    ///     .with_help("declare it or add it to `extra_primitives`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The error category, [`ErrorKind::Definition`] for uncoded diagnostics.
    pub fn kind(&self) -> ErrorKind {
        self.code.map_or(ErrorKind::Definition, |code| code.kind())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "error[E301]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
