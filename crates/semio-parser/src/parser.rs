//! Parser for schema tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the syntax tree defined in [`parser_types`](super::parser_types). The public
//! entry point is [`build_schema`].
//!
//! Nesting is expressed by indentation. Level items sit one level deep,
//! parameter members and object properties two levels deep:
//!
//! ```text
//! "description"
//! AbstractionLevel Name [extends Parent]
//!     Parameter Name [Multiple]
//!         Member [= value]
//!     Object Name [extends Base]
//!         TypeName PropertyName
//! ```

use winnow::{
    Parser as _,
    combinator::{alt, eof, not, opt, preceded, repeat},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{INDENT_WIDTH, PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) where the failing construct
    /// started
    StartOffset(usize),
}

type Input<'src> = SchemaTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
type SchemaTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Run `f`, turning any failure into a cut error that remembers where the
/// construct started.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

fn whitespace<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Whitespace))
        .void()
        .parse_next(input)
}

fn newline<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Newline))
        .void()
        .parse_next(input)
}

fn line_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::LineComment(_)))
        .void()
        .parse_next(input)
}

fn any_indent<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Indent(_)))
        .void()
        .parse_next(input)
}

/// Trailing whitespace and comment, then the newline or end of input.
fn line_end<'src>(input: &mut Input<'src>) -> IResult<()> {
    (
        opt(whitespace),
        opt(line_comment),
        alt((newline, eof.void())),
    )
        .void()
        .context(Context::Label("end of line"))
        .parse_next(input)
}

/// A line holding nothing but whitespace or a comment.
fn blank_line<'src>(input: &mut Input<'src>) -> IResult<()> {
    (opt(any_indent), opt(whitespace), opt(line_comment), newline)
        .void()
        .parse_next(input)
}

fn blank_lines<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., blank_line).parse_next(input)
}

/// Line indentation of exactly `depth` levels.
fn indent<'src>(input: &mut Input<'src>, depth: usize) -> IResult<()> {
    if depth == 0 {
        return not(any_indent).parse_next(input);
    }

    any.verify(|token: &PositionedToken<'_>| {
        matches!(token.token, Token::Indent(width) if width == depth * INDENT_WIDTH)
    })
    .void()
    .context(Context::Label("indentation"))
    .parse_next(input)
}

fn keyword<'src>(input: &mut Input<'src>, expected: Token<'static>, label: &'static str) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| (token.token == expected).then_some(token.span))
        .context(Context::Label(label))
        .parse_next(input)
}

fn left_bracket<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::LeftBracket))
        .void()
        .parse_next(input)
}

fn right_bracket<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::RightBracket))
        .void()
        .context(Context::Label("`]`"))
        .parse_next(input)
}

fn equals<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Equals))
        .void()
        .parse_next(input)
}

/// Parse a name. Keywords are accepted where a name is expected.
fn raw_identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'_>| {
        let name = match &token.token {
            Token::Identifier(name) => *name,
            Token::AbstractionLevel => "AbstractionLevel",
            Token::Parameter => "Parameter",
            Token::Object => "Object",
            Token::Extends => "extends",
            Token::Multiple => "Multiple",
            _ => return None,
        };
        Some(Spanned::new(name, token.span))
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("string literal"))
    .parse_next(input)
}

fn integer_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<u64>> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::IntegerLiteral(value) => Some(Spanned::new(value, token.span)),
        _ => None,
    })
    .context(Context::Label("integer"))
    .parse_next(input)
}

/// A description line at `depth`, plus any blank lines before the
/// declaration it documents.
fn description<'src>(input: &mut Input<'src>, depth: usize) -> IResult<Spanned<String>> {
    indent(input, depth)?;
    let text = string_literal.parse_next(input)?;
    line_end.parse_next(input)?;
    blank_lines.parse_next(input)?;
    Ok(text)
}

/// ` extends Name`
fn extends_clause<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    whitespace.parse_next(input)?;
    keyword(input, Token::Extends, "`extends`")?;

    cut_err(input, |input| {
        whitespace
            .context(Context::Label("whitespace after `extends`"))
            .parse_next(input)?;
        raw_identifier
            .context(Context::Label("name after `extends`"))
            .parse_next(input)
    })
}

/// ` [Multiple]`
fn multiple_marker<'src>(input: &mut Input<'src>) -> IResult<()> {
    opt(whitespace).parse_next(input)?;
    left_bracket.parse_next(input)?;

    cut_err(input, |input| {
        opt(whitespace).parse_next(input)?;
        keyword(input, Token::Multiple, "`Multiple`")?;
        opt(whitespace).parse_next(input)?;
        right_bracket.parse_next(input)
    })
}

/// ` = value`
fn member_value<'src>(input: &mut Input<'src>) -> IResult<Spanned<u64>> {
    opt(whitespace).parse_next(input)?;
    equals.parse_next(input)?;

    cut_err(input, |input| {
        opt(whitespace).parse_next(input)?;
        integer_literal
            .context(Context::Label("member value"))
            .parse_next(input)
    })
}

fn member<'src>(input: &mut Input<'src>) -> IResult<types::MemberDecl<'src>> {
    let description = opt(|input: &mut Input<'src>| description(input, 2)).parse_next(input)?;
    indent(input, 2)?;

    cut_err(input, |input| {
        let name = raw_identifier
            .context(Context::Label("member name"))
            .parse_next(input)?;
        let value = opt(member_value).parse_next(input)?;
        line_end.parse_next(input)?;

        Ok(types::MemberDecl {
            description,
            name,
            value,
        })
    })
}

fn parameter_decl<'src>(input: &mut Input<'src>) -> IResult<types::ParameterDecl<'src>> {
    let description = opt(|input: &mut Input<'src>| description(input, 1)).parse_next(input)?;
    indent(input, 1)?;
    let keyword_span = keyword(input, Token::Parameter, "`Parameter` keyword")?;

    cut_err(input, |input| {
        whitespace
            .context(Context::Label("whitespace after `Parameter`"))
            .parse_next(input)?;
        let name = raw_identifier
            .context(Context::Label("parameter type name"))
            .parse_next(input)?;
        let multiple = opt(multiple_marker).parse_next(input)?.is_some();
        line_end.parse_next(input)?;

        let members: Vec<types::MemberDecl<'src>> =
            repeat(0.., preceded(blank_lines, member)).parse_next(input)?;

        let span = members
            .iter()
            .fold(keyword_span.union(name.span()), |span, member| {
                span.union(member.name.span())
            });

        Ok(types::ParameterDecl {
            description,
            name,
            multiple,
            members,
            span,
        })
    })
}

fn property<'src>(input: &mut Input<'src>) -> IResult<types::PropertyDecl<'src>> {
    let description = opt(|input: &mut Input<'src>| description(input, 2)).parse_next(input)?;
    indent(input, 2)?;

    cut_err(input, |input| {
        let type_name = raw_identifier
            .context(Context::Label("property type"))
            .parse_next(input)?;
        whitespace
            .context(Context::Label("whitespace between property type and name"))
            .parse_next(input)?;
        let name = raw_identifier
            .context(Context::Label("property name"))
            .parse_next(input)?;
        line_end.parse_next(input)?;

        Ok(types::PropertyDecl {
            description,
            type_name,
            name,
        })
    })
}

fn object_decl<'src>(input: &mut Input<'src>) -> IResult<types::ObjectDecl<'src>> {
    let description = opt(|input: &mut Input<'src>| description(input, 1)).parse_next(input)?;
    indent(input, 1)?;
    let keyword_span = keyword(input, Token::Object, "`Object` keyword")?;

    cut_err(input, |input| {
        whitespace
            .context(Context::Label("whitespace after `Object`"))
            .parse_next(input)?;
        let name = raw_identifier
            .context(Context::Label("object type name"))
            .parse_next(input)?;
        let parent = opt(extends_clause).parse_next(input)?;
        line_end.parse_next(input)?;

        let properties: Vec<types::PropertyDecl<'src>> =
            repeat(0.., preceded(blank_lines, property)).parse_next(input)?;

        let span = properties
            .iter()
            .fold(keyword_span.union(name.span()), |span, property| {
                span.union(property.name.span())
            });

        Ok(types::ObjectDecl {
            description,
            name,
            parent,
            properties,
            span,
        })
    })
}

fn level_item<'src>(input: &mut Input<'src>) -> IResult<types::LevelItem<'src>> {
    alt((
        parameter_decl.map(types::LevelItem::Parameter),
        object_decl.map(types::LevelItem::Object),
    ))
    .parse_next(input)
}

fn level<'src>(input: &mut Input<'src>) -> IResult<types::LevelDecl<'src>> {
    let description = opt(|input: &mut Input<'src>| description(input, 0)).parse_next(input)?;
    indent(input, 0)?;
    let keyword_span = keyword(input, Token::AbstractionLevel, "`AbstractionLevel` keyword")?;

    cut_err(input, |input| {
        whitespace
            .context(Context::Label("whitespace after `AbstractionLevel`"))
            .parse_next(input)?;
        let name = raw_identifier
            .context(Context::Label("abstraction level name"))
            .parse_next(input)?;
        let parent = opt(extends_clause).parse_next(input)?;
        line_end.parse_next(input)?;

        let items: Vec<types::LevelItem<'src>> =
            repeat(0.., preceded(blank_lines, level_item)).parse_next(input)?;

        let span = items
            .iter()
            .fold(keyword_span.union(name.span()), |span, item| {
                span.union(item.span())
            });

        Ok(types::LevelDecl {
            description,
            name,
            parent,
            items,
            span,
        })
    })
}

fn schema_file<'src>(input: &mut Input<'src>) -> IResult<types::SchemaFile<'src>> {
    let levels: Vec<types::LevelDecl<'src>> =
        repeat(0.., preceded(blank_lines, level)).parse_next(input)?;

    blank_lines.parse_next(input)?;
    // A last line without newline
    opt((opt(any_indent), opt(whitespace), opt(line_comment), eof)).parse_next(input)?;
    eof.void()
        .context(Context::Label("`AbstractionLevel` declaration"))
        .parse_next(input)?;

    Ok(types::SchemaFile { levels })
}

/// Convert a winnow error into a diagnostic.
///
/// The span covers the tokens consumed by the failing construct (from its
/// `StartOffset`) up to and including the offending token.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let end_offset = tokens.len() - current_remaining;
    let last_span = tokens.last().map(|t| t.span).unwrap_or_default();

    let e = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => {
            // Not reachable with complete token slices.
            return Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(last_span, "incomplete")
                .with_help("ensure input is complete");
        }
    };

    let start_offset = e
        .context()
        .find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(tokens.len() - n),
            Context::Label(_) => None,
        })
        .unwrap_or(end_offset)
        .min(end_offset);

    let offending = tokens.get(end_offset);

    if let Some(PositionedToken {
        token: Token::Indent(width),
        span,
    }) = offending
    {
        return Diagnostic::error(format!("unexpected indentation of {width} columns"))
            .with_code(ErrorCode::E100)
            .with_label(*span, "unexpected indentation")
            .with_help(format!(
                "indent by {INDENT_WIDTH} spaces or a tab per level: \
                 declarations one level deep, members and properties two levels deep"
            ));
    }

    let expected: Vec<String> = e
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(format!("expected {label}")),
            Context::StartOffset(_) => None,
        })
        .collect();

    let found = offending.map_or_else(|| "end of input".to_string(), |t| t.token.to_string());
    let message = if expected.is_empty() {
        format!("unexpected token: found {found}")
    } else {
        format!("unexpected token: {}", expected.join(" → "))
    };

    let examined = &tokens[start_offset..(end_offset + 1).min(tokens.len())];
    let span = examined
        .iter()
        .filter(|t| !t.is_trivia())
        .map(|t| t.span)
        .reduce(|a, b| a.union(b))
        .or_else(|| offending.map(|t| t.span))
        .unwrap_or(last_span);

    Diagnostic::error(message)
        .with_code(ErrorCode::E100)
        .with_label(span, format!("found {found}"))
        .with_help("check the declaration syntax and its indentation")
}

/// Build a schema syntax tree from tokens.
pub fn build_schema<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::SchemaFile<'src>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    match schema_file.parse_next(&mut token_slice) {
        Ok(schema) => Ok(schema),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_tokens(input: &str) -> Vec<PositionedToken<'_>> {
        tokenize(input).expect("Failed to tokenize input")
    }

    #[test]
    fn test_raw_identifier_accepts_keywords() {
        let tokens = parse_tokens("Multiple");
        let mut slice = TokenSlice::new(&tokens);
        let name = raw_identifier.parse_next(&mut slice).unwrap();
        assert_eq!(*name.inner(), "Multiple");
    }

    #[test]
    fn test_member_with_value() {
        let tokens = parse_tokens("        Urban = 2\n");
        let mut slice = TokenSlice::new(&tokens);
        let member = member.parse_next(&mut slice).unwrap();
        assert_eq!(*member.name, "Urban");
        assert_eq!(member.value.map(|v| v.get()), Some(2));
    }

    #[test]
    fn test_member_wrong_depth_backtracks() {
        let tokens = parse_tokens("    Urban\n");
        let mut slice = TokenSlice::new(&tokens);
        assert!(matches!(
            member.parse_next(&mut slice),
            Err(ErrMode::Backtrack(_))
        ));
    }

    #[test]
    fn test_property() {
        let tokens = parse_tokens("        ClosedCurve Parcel // boundary\n");
        let mut slice = TokenSlice::new(&tokens);
        let property = property.parse_next(&mut slice).unwrap();
        assert_eq!(*property.type_name, "ClosedCurve");
        assert_eq!(*property.name, "Parcel");
    }

    #[test]
    fn test_flag_set_header() {
        let tokens = parse_tokens("    Parameter Panels [ Multiple ]\n        Rooftop = 1\n");
        let mut slice = TokenSlice::new(&tokens);
        let param = parameter_decl.parse_next(&mut slice).unwrap();
        assert!(param.multiple);
        assert_eq!(param.members.len(), 1);
    }

    #[test]
    fn test_level_spans_cover_items() {
        let source = "AbstractionLevel Masterplan\n    Object Site\n        ClosedCurve Parcel\n";
        let tokens = parse_tokens(source);
        let schema = build_schema(&tokens).unwrap();
        let level = &schema.levels[0];
        assert_eq!(level.span.start(), 0);
        assert_eq!(level.span.end(), source.trim_end().len());
    }

    #[test]
    fn test_unexpected_indentation_message() {
        let tokens = parse_tokens("AbstractionLevel Masterplan\n      Object Site\n");
        let err = build_schema(&tokens).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E100));
        assert!(err.message().contains("indentation of 6 columns"));
        assert_eq!(err.primary_span(), Some(Span::new(28..34)));
    }

    #[test]
    fn test_missing_level_name() {
        let tokens = parse_tokens("AbstractionLevel \n");
        let err = build_schema(&tokens).unwrap_err();
        assert!(err.message().contains("abstraction level name"), "{err}");
    }
}
