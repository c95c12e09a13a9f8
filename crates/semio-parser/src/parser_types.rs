//! Syntax tree produced by the [`parser`](super::parser).
//!
//! Names are borrowed from the source text; the loader validates them and
//! turns the tree into a [`semio_core::schema::Schema`].

use crate::span::{Span, Spanned};

#[derive(Debug, Default)]
pub struct SchemaFile<'src> {
    pub levels: Vec<LevelDecl<'src>>,
}

/// `AbstractionLevel Name [extends Parent]` and its indented body.
#[derive(Debug)]
pub struct LevelDecl<'src> {
    pub description: Option<Spanned<String>>,
    pub name: Spanned<&'src str>,
    pub parent: Option<Spanned<&'src str>>,
    pub items: Vec<LevelItem<'src>>,
    pub span: Span,
}

#[derive(Debug)]
pub enum LevelItem<'src> {
    Parameter(ParameterDecl<'src>),
    Object(ObjectDecl<'src>),
}

impl LevelItem<'_> {
    pub fn span(&self) -> Span {
        match self {
            LevelItem::Parameter(param) => param.span,
            LevelItem::Object(object) => object.span,
        }
    }
}

/// `Parameter Name [Multiple]` and its members.
#[derive(Debug)]
pub struct ParameterDecl<'src> {
    pub description: Option<Spanned<String>>,
    pub name: Spanned<&'src str>,
    /// Set by the `[Multiple]` marker.
    pub multiple: bool,
    pub members: Vec<MemberDecl<'src>>,
    pub span: Span,
}

/// `Name` or `Name = value`.
#[derive(Debug)]
pub struct MemberDecl<'src> {
    pub description: Option<Spanned<String>>,
    pub name: Spanned<&'src str>,
    pub value: Option<Spanned<u64>>,
}

/// `Object Name [extends Base]` and its properties.
#[derive(Debug)]
pub struct ObjectDecl<'src> {
    pub description: Option<Spanned<String>>,
    pub name: Spanned<&'src str>,
    pub parent: Option<Spanned<&'src str>>,
    pub properties: Vec<PropertyDecl<'src>>,
    pub span: Span,
}

/// `TypeName PropertyName`.
#[derive(Debug)]
pub struct PropertyDecl<'src> {
    pub description: Option<Spanned<String>>,
    pub type_name: Spanned<&'src str>,
    pub name: Spanned<&'src str>,
}
