//! Tokens produced by the [`lexer`](super::lexer).

use std::fmt;

use crate::span::Span;

/// Columns one indentation level occupies. A tab counts as one level.
pub const INDENT_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    // Keywords
    AbstractionLevel,
    Parameter,
    Object,
    Extends,
    Multiple,

    // Literals
    StringLiteral(String),
    IntegerLiteral(u64),
    Identifier(&'src str),

    // Punctuation
    Equals,
    LeftBracket,
    RightBracket,

    /// Leading whitespace of a line, measured in columns.
    Indent(usize),
    Whitespace,
    Newline,
    LineComment(&'src str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::AbstractionLevel => write!(f, "AbstractionLevel"),
            Token::Parameter => write!(f, "Parameter"),
            Token::Object => write!(f, "Object"),
            Token::Extends => write!(f, "extends"),
            Token::Multiple => write!(f, "Multiple"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::IntegerLiteral(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Equals => write!(f, "="),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Indent(width) => write!(f, "indentation of {width} columns"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::Newline => write!(f, "newline"),
            Token::LineComment(_) => write!(f, "comment"),
        }
    }
}

/// A token with its location in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }

    /// Returns `true` for tokens that carry no syntax of their own.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.token,
            Token::Whitespace | Token::Newline | Token::Indent(_) | Token::LineComment(_)
        )
    }
}
