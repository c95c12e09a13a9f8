//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the schema text.
///
/// - **Primary labels** mark where the problem is, e.g. the second
///   declaration of a duplicated type.
/// - **Secondary labels** point at related declarations, e.g. "first
///   declared here" or the other members of an inheritance cycle.
///
/// ```text
/// error[E201]: type `Masterplan::Use` is declared multiple times
///   --> masterplan.semio:14:15
///    |
/// 14 |     Parameter Use
///    |               ^^^ duplicate declaration
///    |
///  3 |     Parameter Use
///    |               --- first declared here
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
