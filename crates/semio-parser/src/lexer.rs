//! Lexical analyzer for schema text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Schemas are line oriented: the leading whitespace of every line becomes a
//! single [`Token::Indent`] carrying its width in columns, so the parser can
//! check nesting without looking at raw text.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, not, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{INDENT_WIDTH, PositionedToken, Token},
};

/// Diagnostic information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn cut_with(input: &Input<'_>, diagnostic: LexerDiagnostic) -> ErrMode<ContextError<LexerDiagnostic>> {
    ErrMode::Cut(ContextError::new().add_context(input, &input.checkpoint(), diagnostic))
}

/// Parse the character after a backslash inside a string literal.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let escape_start = input.current_token_start();
    '\\'.parse_next(input)?;

    match one_of::<_, _, ContextError<LexerDiagnostic>>(['n', 't', '\\', '"']).parse_next(input) {
        Ok('n') => Ok('\n'),
        Ok('t') => Ok('\t'),
        Ok(c) => Ok(c),
        Err(_) => Err(cut_with(
            input,
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "invalid escape sequence",
                help: Some("valid escapes: `\\n`, `\\t`, `\\\\`, `\\\"`"),
                start: escape_start,
            },
        )),
    }
}

/// Parse a description string. Strings never span lines.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    '"'.parse_next(input)?;

    let content = repeat(0.., alt((string_escape, none_of(['"', '\\', '\n', '\r']))))
        .fold(String::new, |mut acc, c| {
            acc.push(c);
            acc
        });

    cut_err(terminated(content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add a closing `\"` before the end of the line"),
            start,
        })
        .map(Token::StringLiteral)
        .parse_next(input)
}

/// Parse an unsigned integer literal.
fn integer_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let digits = terminated(digit1, peek(not(one_of(is_identifier_char)))).parse_next(input)?;

    match digits.parse::<u64>() {
        Ok(value) => Ok(Token::IntegerLiteral(value)),
        Err(_) => Err(cut_with(
            input,
            LexerDiagnostic {
                code: ErrorCode::E004,
                message: "integer literal out of range",
                help: Some("member values must fit in 32 bits"),
                start,
            },
        )),
    }
}

fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(|text: &str| Token::LineComment(text.trim_end_matches('\r')))
        .parse_next(input)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse keywords with word boundary checking.
fn keyword<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        alt((
            literal("AbstractionLevel").value(Token::AbstractionLevel),
            literal("Parameter").value(Token::Parameter),
            literal("Object").value(Token::Object),
            literal("extends").value(Token::Extends),
            literal("Multiple").value(Token::Multiple),
        )),
        peek(not(one_of(is_identifier_char))),
    )
    .parse_next(input)
}

fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_identifier_char),
    )
        .take()
        .map(Token::Identifier)
        .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '='.value(Token::Equals),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
    ))
    .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt(("\r\n", "\n")).value(Token::Newline).parse_next(input)
}

/// Whitespace inside a line.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Leading spaces and tabs of a line, as a column count.
fn indentation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., [' ', '\t'])
        .map(|indent: &str| {
            let width = indent
                .chars()
                .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
                .sum();
            Token::Indent(width)
        })
        .parse_next(input)
}

fn positioned<'a>(
    input: &mut Input<'a>,
    parser: fn(&mut Input<'a>) -> IResult<Token<'a>>,
) -> IResult<PositionedToken<'a>> {
    let start = input.current_token_start();
    let token = parser(input)?;
    let end = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start..end)))
}

/// Parse a single token that is not line indentation.
fn token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        line_comment,
        string_literal,
        keyword,         // Must come before identifier
        integer_literal, // Must come before identifier
        identifier,
        punctuation,
        newline, // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        let mut at_line_start = true;

        while !input.is_empty() {
            if at_line_start {
                at_line_start = false;
                let checkpoint = input.checkpoint();
                match positioned(&mut input, indentation) {
                    Ok(indent) => {
                        self.tokens.push(indent);
                        continue;
                    }
                    Err(_) => input.reset(&checkpoint),
                }
            }

            match positioned(&mut input, token) {
                Ok(token) => {
                    at_line_start = token.token == Token::Newline;
                    self.tokens.push(token);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    // Skip one character and carry on with the rest of the line.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) if no `LexerDiagnostic`
    /// context is attached.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(*start..error_pos.max(*start + 1)), code.description());
            if let Some(help) = help {
                diag = diag.with_help(*help);
            }
            return diag;
        }

        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(
                Span::new(error_pos..error_pos.saturating_add(1)),
                ErrorCode::E002.description(),
            )
            .with_help("identifiers use ASCII letters, digits and `_`")
    }
}

/// Tokenize schema text, collecting every lexical error.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
