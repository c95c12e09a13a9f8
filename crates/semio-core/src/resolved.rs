//! The resolved schema model.
//!
//! Produced by inheritance resolution and read by the code emitter. Every
//! ancestor chain is flattened: a [`ResolvedObjectType`] lists all of its
//! effective properties and a [`ResolvedLevel`] all of its effective
//! collections, ancestor-first. Property types are resolved [`TypeRef`]s.
//!
//! The model is immutable once built.

use crate::{
    identifier::Id,
    schema::{ParameterType, TypePath, TypeRef},
    span::Span,
};

/// Resolved schema with levels in topological order.
///
/// Every level appears after all of its ancestors; unrelated levels keep their
/// declaration order.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    levels: Vec<ResolvedLevel>,
}

impl ResolvedSchema {
    pub fn new(levels: Vec<ResolvedLevel>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[ResolvedLevel] {
        &self.levels
    }

    pub fn level(&self, name: Id) -> Option<&ResolvedLevel> {
        self.levels.iter().find(|level| level.name == name)
    }

    pub fn object_type(&self, path: TypePath) -> Option<&ResolvedObjectType> {
        self.level(path.level())?
            .object_types()
            .iter()
            .find(|object| object.path() == path)
    }

    pub fn parameter_type(&self, path: TypePath) -> Option<&ParameterType> {
        self.level(path.level())?
            .parameter_types()
            .iter()
            .find(|param| *param.name == path.name())
    }
}

/// An abstraction level with its inheritance chain applied.
#[derive(Debug, Clone)]
pub struct ResolvedLevel {
    name: Id,
    description: Option<String>,
    span: Span,
    parent: Option<Id>,
    ancestors: Vec<Id>,
    parameter_types: Vec<ParameterType>,
    object_types: Vec<ResolvedObjectType>,
    collections: Vec<Collection>,
}

impl ResolvedLevel {
    /// Creates a resolved level.
    ///
    /// `ancestors` is root-first and excludes the level itself; the last
    /// entry, if any, is the parent. `collections` is the effective set,
    /// ancestor collections first.
    pub fn new(
        name: Id,
        description: Option<String>,
        span: Span,
        ancestors: Vec<Id>,
        parameter_types: Vec<ParameterType>,
        object_types: Vec<ResolvedObjectType>,
        collections: Vec<Collection>,
    ) -> Self {
        Self {
            name,
            description,
            span,
            parent: ancestors.last().copied(),
            ancestors,
            parameter_types,
            object_types,
            collections,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Ancestor levels, root first.
    pub fn ancestors(&self) -> &[Id] {
        &self.ancestors
    }

    /// Parameter types declared by this level.
    pub fn parameter_types(&self) -> &[ParameterType] {
        &self.parameter_types
    }

    /// Object types declared by this level.
    pub fn object_types(&self) -> &[ResolvedObjectType] {
        &self.object_types
    }

    /// All collections of the level's aggregate, ancestor-first.
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Collections declared by this level itself.
    pub fn own_collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections
            .iter()
            .filter(move |collection| collection.declared_in() == self.name)
    }
}

/// A named sequence of objects on a level aggregate, e.g. `ApartmentCollection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    name: Id,
    object: TypePath,
}

impl Collection {
    /// The collection holding instances of `object`.
    pub fn for_object(object: TypePath) -> Self {
        Self {
            name: Id::new(&format!("{}Collection", object.name())),
            object,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// Element type of the collection.
    pub fn object(&self) -> TypePath {
        self.object
    }

    /// The level whose aggregate owns the backing storage.
    pub fn declared_in(&self) -> Id {
        self.object.level()
    }
}

/// An object type with its specialization chain flattened.
#[derive(Debug, Clone)]
pub struct ResolvedObjectType {
    path: TypePath,
    description: Option<String>,
    span: Span,
    ancestors: Vec<TypePath>,
    properties: Vec<ResolvedProperty>,
}

impl ResolvedObjectType {
    /// `ancestors` is root-first; `properties` is the effective set,
    /// ancestor properties first.
    pub fn new(
        path: TypePath,
        description: Option<String>,
        span: Span,
        ancestors: Vec<TypePath>,
        properties: Vec<ResolvedProperty>,
    ) -> Self {
        Self {
            path,
            description,
            span,
            ancestors,
            properties,
        }
    }

    pub fn path(&self) -> TypePath {
        self.path
    }

    pub fn name(&self) -> Id {
        self.path.name()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn parent(&self) -> Option<TypePath> {
        self.ancestors.last().copied()
    }

    pub fn ancestors(&self) -> &[TypePath] {
        &self.ancestors
    }

    pub fn properties(&self) -> &[ResolvedProperty] {
        &self.properties
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedProperty {
    name: Id,
    ty: TypeRef,
    description: Option<String>,
    declared_in: TypePath,
    span: Span,
}

impl ResolvedProperty {
    pub fn new(
        name: Id,
        ty: TypeRef,
        description: Option<String>,
        declared_in: TypePath,
        span: Span,
    ) -> Self {
        Self {
            name,
            ty,
            description,
            declared_in,
            span,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The object type that declares the property.
    pub fn declared_in(&self) -> TypePath {
        self.declared_in
    }

    pub fn span(&self) -> Span {
        self.span
    }
}
