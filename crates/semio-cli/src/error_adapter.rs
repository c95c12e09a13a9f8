//! Error adapter for converting SemioError to miette diagnostics.
//!
//! A rejected schema usually carries several diagnostics; each one is
//! rendered as its own report with the schema source attached. Diagnostic
//! codes are shown together with their category, e.g.
//! `NameCollisionError[E301]`.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use semio::SemioError;
use semio_parser::error::{Diagnostic, Severity};

/// Adapter for a single schema diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Schema source for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|code| Box::new(format!("{}[{code}]", code.kind())) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`SemioError`] variants without source locations.
pub struct ErrorAdapter<'a>(pub &'a SemioError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            SemioError::Io(_) => "semio::io",
            SemioError::Schema { .. } => return None,
            SemioError::Config(_) => "semio::config",
            SemioError::Internal(_) => "semio::internal",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            SemioError::Internal(_) => Some(Box::new(
                "the schema resolved but could not be emitted; please report this",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A schema diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: semio_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`SemioError`] into a list of reportable errors.
///
/// A [`SemioError::Schema`] yields one [`Reportable`] per diagnostic; every
/// other variant yields exactly one.
pub fn to_reportables(err: &SemioError) -> Vec<Reportable<'_>> {
    match err {
        SemioError::Schema {
            err: parse_err,
            src,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use semio_parser::{
        Span,
        error::{ErrorCode, ParseError},
    };

    use super::*;

    #[test]
    fn test_code_includes_category() {
        let diag = Diagnostic::error("type `Plot` is declared twice")
            .with_code(ErrorCode::E301)
            .with_label(Span::new(0..4), "redeclared here");

        let adapter = DiagnosticAdapter::new(&diag, "Plot Plot");

        let code = adapter.code().unwrap().to_string();
        assert_eq!(code, "NameCollisionError[E301]");
    }

    #[test]
    fn test_one_reportable_per_diagnostic() {
        let diags = vec![
            Diagnostic::error("unknown type `Acreage`")
                .with_code(ErrorCode::E300)
                .with_label(Span::new(0..7), "not visible"),
            Diagnostic::error("level cycle `A` → `B` → `A`")
                .with_code(ErrorCode::E302)
                .with_label(Span::new(10..15), "here")
                .with_help("remove one `extends` clause"),
        ];
        let err = SemioError::new_schema_error(ParseError::from(diags), "source code here...");

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "unknown type `Acreage`");
        assert_eq!(
            reportables[1].help().map(|h| h.to_string()).as_deref(),
            Some("remove one `extends` clause")
        );
    }

    #[test]
    fn test_non_schema_error() {
        let err = SemioError::Config("bad derive".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        assert_eq!(reportables[0].to_string(), "Configuration error: bad derive");
        assert_eq!(reportables[0].code().unwrap().to_string(), "semio::config");
    }

    #[test]
    fn test_warning_severity() {
        let diag = Diagnostic::warning("description of `Site` is empty")
            .with_label(Span::new(0..2), "empty description");

        let adapter = DiagnosticAdapter::new(&diag, "\"\"");

        assert_eq!(adapter.severity(), Some(MietteSeverity::Warning));
        assert!(adapter.code().is_none());
    }

    #[test]
    fn test_primary_and_secondary_labels() {
        let diag = Diagnostic::error("duplicate object type `Plot`")
            .with_label(Span::new(10..14), "redeclared here")
            .with_secondary_label(Span::new(0..4), "first declared here");

        let adapter = DiagnosticAdapter::new(&diag, "Plot .... Plot");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[1].label(), Some("first declared here"));
        assert!(!labels[1].primary());
    }
}
