//! The unresolved schema model.
//!
//! A [`Schema`] is what the loader produces: levels, parameter types and
//! object types exactly as declared, with `extends` links and property types
//! still referenced by name. Inheritance is applied later by the resolver,
//! which produces a [`crate::resolved::ResolvedSchema`].

use std::fmt;

use crate::{
    identifier::Id,
    span::{Span, Spanned},
};

/// A loaded schema: abstraction levels in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub levels: Vec<AbstractionLevel>,
}

impl Schema {
    pub fn new(levels: Vec<AbstractionLevel>) -> Self {
        Self { levels }
    }

    /// Looks up a level by name.
    pub fn level(&self, name: Id) -> Option<&AbstractionLevel> {
        self.levels.iter().find(|level| *level.name == name)
    }
}

/// A named tier of the design hierarchy, e.g. `Masterplan`.
#[derive(Debug, Clone)]
pub struct AbstractionLevel {
    pub name: Spanned<Id>,
    pub description: Option<String>,
    /// The level this one extends.
    pub parent: Option<Spanned<Id>>,
    pub parameter_types: Vec<ParameterType>,
    pub object_types: Vec<ObjectType>,
    /// Span of the whole declaration, header and body.
    pub span: Span,
}

impl AbstractionLevel {
    pub fn object_type(&self, name: Id) -> Option<&ObjectType> {
        self.object_types.iter().find(|object| *object.name == name)
    }

    pub fn parameter_type(&self, name: Id) -> Option<&ParameterType> {
        self.parameter_types.iter().find(|param| *param.name == name)
    }
}

/// How the members of a parameter type combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Exactly one member applies.
    Enumeration,
    /// Any combination of members applies; members are bit positions.
    FlagSet,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Enumeration => write!(f, "enumeration"),
            ParameterKind::FlagSet => write!(f, "flag set"),
        }
    }
}

/// A closed set of named values, e.g. `Use` or `Panels`.
#[derive(Debug, Clone)]
pub struct ParameterType {
    pub name: Spanned<Id>,
    pub kind: ParameterKind,
    pub description: Option<String>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: Spanned<Id>,
    /// Numeric value; flag set members hold a single bit.
    pub value: u32,
    pub description: Option<String>,
}

/// A named entity kind, e.g. `BuildingVolume`.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: Spanned<Id>,
    pub description: Option<String>,
    /// The object type this one specializes.
    pub parent: Option<Spanned<Id>>,
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: Spanned<Id>,
    pub ty: Spanned<TypeRef>,
    pub description: Option<String>,
}

/// Fully qualified address of a type declared in a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePath {
    level: Id,
    name: Id,
}

impl TypePath {
    pub fn new(level: Id, name: Id) -> Self {
        Self { level, name }
    }

    pub fn level(&self) -> Id {
        self.level
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// The `Level::Name` identifier.
    pub fn qualified(&self) -> Id {
        self.level.nested(self.name)
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.level, self.name)
    }
}

/// The declared type of a property.
///
/// Loading leaves every reference [`TypeRef::Unresolved`]; resolution
/// replaces it with one of the other variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Unresolved(Id),
    Primitive(Id),
    Parameter(TypePath),
    Object(TypePath),
}

impl TypeRef {
    /// The type name as written in the schema.
    pub fn name(&self) -> Id {
        match self {
            TypeRef::Unresolved(name) | TypeRef::Primitive(name) => *name,
            TypeRef::Parameter(path) | TypeRef::Object(path) => path.name(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, TypeRef::Unresolved(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Unresolved(name) | TypeRef::Primitive(name) => write!(f, "{name}"),
            TypeRef::Parameter(path) | TypeRef::Object(path) => write!(f, "{path}"),
        }
    }
}
