//! Inheritance resolution.
//!
//! Resolution runs two independent walks over a loaded [`Schema`]:
//!
//! 1. Abstraction levels: every level gets its root-first ancestor chain and
//!    its effective collections (inherited first, then its own).
//! 2. Object types: every object gets its ancestor chain and the flattened
//!    list of effective properties, with each property type bound to a
//!    primitive, a parameter type or an object type visible from the
//!    declaring level.
//!
//! Levels come out ordered ancestor before descendant and otherwise in
//! declaration order.

use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use indexmap::IndexMap;
use log::{debug, info, trace};

use semio_core::{
    identifier::Id,
    naming,
    primitive::PrimitiveSet,
    resolved::{Collection, ResolvedLevel, ResolvedObjectType, ResolvedProperty, ResolvedSchema},
    schema::{AbstractionLevel, ObjectType, Property, Schema, TypePath, TypeRef},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// Configuration for the resolution phase.
#[derive(Debug, Clone, Default)]
pub struct ResolveConfig {
    /// Names property types may refer to without a declaration.
    pub primitives: PrimitiveSet,
}

impl ResolveConfig {
    pub fn new(primitives: PrimitiveSet) -> Self {
        Self { primitives }
    }
}

/// Resolve both inheritance hierarchies of `schema`.
pub fn resolve(schema: &Schema, config: &ResolveConfig) -> Result<ResolvedSchema, ParseError> {
    Resolver::new(schema, config).resolve()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Parameter,
    Object,
}

/// A type reachable by its short name from some level.
#[derive(Debug, Clone, Copy)]
struct Visible {
    path: TypePath,
    kind: TypeKind,
    span: Span,
}

type Namespace = IndexMap<Id, Visible>;

/// An object type with its parent bound and its own property types resolved.
struct BoundObject<'a> {
    decl: &'a ObjectType,
    parent: Option<TypePath>,
    properties: Vec<ResolvedProperty>,
}

#[derive(Debug, Clone, Default)]
struct Flattened {
    ancestors: Vec<TypePath>,
    properties: Vec<ResolvedProperty>,
}

struct Resolver<'a> {
    schema: &'a Schema,
    config: &'a ResolveConfig,
    levels: HashMap<Id, &'a AbstractionLevel>,
    collector: DiagnosticCollector,
}

impl<'a> Resolver<'a> {
    fn new(schema: &'a Schema, config: &'a ResolveConfig) -> Self {
        let levels = schema
            .levels
            .iter()
            .map(|level| (level.name.get(), level))
            .collect();

        Self {
            schema,
            config,
            levels,
            collector: DiagnosticCollector::new(),
        }
    }

    fn resolve(mut self) -> Result<ResolvedSchema, ParseError> {
        info!(levels = self.schema.levels.len(); "Resolving schema");

        self.check_level_parents();
        self.check_level_cycles();
        // Without acyclic chains nothing below is well defined.
        self.checkpoint()?;

        let order = self.level_order();
        trace!(order:? = order.iter().map(|level| level.name.get()).collect::<Vec<_>>(); "Level order");

        let mut namespaces: HashMap<Id, Namespace> = HashMap::new();
        let mut redeclared: HashSet<TypePath> = HashSet::new();
        for &level in &order {
            let namespace = self.build_namespace(level, &namespaces, &mut redeclared);
            namespaces.insert(level.name.get(), namespace);
        }

        let mut objects: IndexMap<TypePath, BoundObject<'a>> = IndexMap::new();
        for &level in &order {
            let Some(namespace) = namespaces.get(&level.name.get()) else {
                continue;
            };
            for object in &level.object_types {
                let path = TypePath::new(level.name.get(), object.name.get());
                let bound = self.bind_object(path, object, namespace);
                objects.insert(path, bound);
            }
        }

        let cyclic = self.check_object_cycles(&objects);

        let mut memo: HashMap<TypePath, Option<Flattened>> = HashMap::new();
        let paths: Vec<TypePath> = objects.keys().copied().collect();
        for path in paths {
            self.flatten(path, &objects, &cyclic, &mut memo);
        }

        let mut collections: HashMap<Id, Vec<Collection>> = HashMap::new();
        let mut resolved_levels = Vec::with_capacity(order.len());
        for &level in &order {
            let name = level.name.get();
            let ancestors = self.ancestors(level);

            let mut effective = level
                .parent
                .and_then(|parent| collections.get(&parent.get()))
                .cloned()
                .unwrap_or_default();
            self.add_own_collections(level, &mut effective, &redeclared);
            collections.insert(name, effective.clone());

            let object_types = level
                .object_types
                .iter()
                .filter_map(|object| {
                    let path = TypePath::new(name, object.name.get());
                    let flattened = memo.get(&path).cloned().flatten()?;
                    Some(ResolvedObjectType::new(
                        path,
                        object.description.clone(),
                        object.span,
                        flattened.ancestors,
                        flattened.properties,
                    ))
                })
                .collect();

            debug!(
                level:% = name,
                ancestors = ancestors.len(),
                collections = effective.len();
                "Resolved abstraction level",
            );
            resolved_levels.push(ResolvedLevel::new(
                name,
                level.description.clone(),
                level.span,
                ancestors,
                level.parameter_types.clone(),
                object_types,
                effective,
            ));
        }

        self.collector.finish()?;

        info!(levels = resolved_levels.len(); "Schema resolved");
        Ok(ResolvedSchema::new(resolved_levels))
    }

    /// Fail with everything collected so far, if anything failed.
    fn checkpoint(&mut self) -> Result<(), ParseError> {
        if self.collector.has_errors() {
            std::mem::take(&mut self.collector).finish()
        } else {
            Ok(())
        }
    }

    fn check_level_parents(&mut self) {
        for level in &self.schema.levels {
            let Some(parent) = level.parent else {
                continue;
            };
            if !self.levels.contains_key(&parent.get()) {
                self.collector.emit(
                    Diagnostic::error(format!(
                        "abstraction level `{}` extends undeclared level `{parent}`",
                        level.name
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(parent.span(), "no abstraction level with this name"),
                );
            }
        }
    }

    fn check_level_cycles(&mut self) {
        let levels = &self.levels;
        let cycles = find_cycles(self.schema.levels.iter().map(|level| level.name.get()), |name| {
            levels
                .get(&name)
                .and_then(|level| level.parent)
                .map(|parent| parent.get())
        });

        for cycle in cycles {
            let chain = cycle_chain(&cycle);
            let mut diagnostic = Diagnostic::error(format!(
                "abstraction level inheritance cycle: {chain}"
            ))
            .with_code(ErrorCode::E302)
            .with_help("an abstraction level cannot be its own ancestor; remove one `extends`");

            for (i, name) in cycle.iter().enumerate() {
                let Some(parent) = self.levels.get(name).and_then(|level| level.parent) else {
                    continue;
                };
                let message = format!("`{name}` extends `{parent}`");
                diagnostic = if i == 0 {
                    diagnostic.with_label(parent.span(), message)
                } else {
                    diagnostic.with_secondary_label(parent.span(), message)
                };
            }

            self.collector.emit(diagnostic);
        }
    }

    /// Root-first ancestor chain. Only valid once cycles are ruled out.
    fn ancestors(&self, level: &AbstractionLevel) -> Vec<Id> {
        let mut chain = Vec::new();
        let mut current = level.parent.map(|parent| parent.get());
        while let Some(name) = current {
            chain.push(name);
            current = self
                .levels
                .get(&name)
                .and_then(|level| level.parent)
                .map(|parent| parent.get());
        }
        chain.reverse();
        chain
    }

    /// Levels with every ancestor placed before its descendants.
    fn level_order(&self) -> Vec<&'a AbstractionLevel> {
        let mut placed: HashSet<Id> = HashSet::new();
        let mut order = Vec::with_capacity(self.schema.levels.len());

        for level in &self.schema.levels {
            for name in self.ancestors(level).into_iter().chain([level.name.get()]) {
                if placed.insert(name) {
                    if let Some(level) = self.levels.get(&name) {
                        order.push(*level);
                    }
                }
            }
        }

        order
    }

    /// Types visible from `level`: its own declarations plus everything its
    /// ancestors can see.
    fn build_namespace(
        &mut self,
        level: &AbstractionLevel,
        namespaces: &HashMap<Id, Namespace>,
        redeclared: &mut HashSet<TypePath>,
    ) -> Namespace {
        let name = level.name.get();
        if self.config.primitives.contains(name) {
            self.collector.emit(
                Diagnostic::error(format!(
                    "abstraction level `{name}` has the same name as the primitive `{name}`"
                ))
                .with_code(ErrorCode::E301)
                .with_label(level.name.span(), "shadows a primitive")
                .with_help(format!(
                    "`{name}` is the generated aggregate of the level and would hide the primitive; rename the level"
                )),
            );
        }

        let mut namespace = level
            .parent
            .and_then(|parent| namespaces.get(&parent.get()))
            .cloned()
            .unwrap_or_default();

        let own = level
            .parameter_types
            .iter()
            .map(|param| (param.name, TypeKind::Parameter))
            .chain(level.object_types.iter().map(|object| (object.name, TypeKind::Object)));

        for (type_name, kind) in own {
            let path = TypePath::new(name, type_name.get());

            if self.config.primitives.contains(type_name.get()) {
                self.collector.emit(
                    Diagnostic::error(format!(
                        "type `{path}` has the same name as the primitive `{type_name}`"
                    ))
                    .with_code(ErrorCode::E301)
                    .with_label(type_name.span(), "shadows a primitive")
                    .with_help("rename the type; primitives are visible from every level"),
                );
                redeclared.insert(path);
            }

            if let Some(inherited) = namespace.get(&type_name.get()) {
                self.collector.emit(
                    Diagnostic::error(format!(
                        "type `{path}` redeclares `{}`, which is inherited from level `{}`",
                        inherited.path,
                        inherited.path.level()
                    ))
                    .with_code(ErrorCode::E301)
                    .with_label(type_name.span(), "redeclared here")
                    .with_secondary_label(inherited.span, "inherited declaration")
                    .with_help("types of ancestor levels are visible here; rename this one"),
                );
                redeclared.insert(path);
            }

            namespace.insert(
                type_name.get(),
                Visible {
                    path,
                    kind,
                    span: type_name.span(),
                },
            );
        }

        if let Some(visible) = namespace.get(&name) {
            let diagnostic = Diagnostic::error(format!(
                "type `{}` has the same name as abstraction level `{name}`",
                visible.path
            ))
            .with_code(ErrorCode::E301)
            .with_help(format!(
                "`{name}` is the generated aggregate of the level; rename the type"
            ));
            let diagnostic = if visible.path.level() == name {
                diagnostic.with_label(visible.span, "collides with the level aggregate")
            } else {
                diagnostic
                    .with_label(level.name.span(), "level declared here")
                    .with_secondary_label(visible.span, "inherited type")
            };
            self.collector.emit(diagnostic);
        }

        namespace
    }

    fn bind_object(&mut self, path: TypePath, object: &'a ObjectType, namespace: &Namespace) -> BoundObject<'a> {
        trace!(object:% = path; "Binding object type");

        let parent = object.parent.and_then(|parent| match namespace.get(&parent.get()) {
            Some(visible) if visible.kind == TypeKind::Object => Some(visible.path),
            Some(visible) => {
                self.collector.emit(
                    Diagnostic::error(format!(
                        "object type `{path}` extends `{}`, which is a parameter type",
                        visible.path
                    ))
                    .with_code(ErrorCode::E303)
                    .with_label(parent.span(), "not an object type")
                    .with_secondary_label(visible.span, "declared as a parameter type here")
                    .with_help("an object type can only specialize another object type"),
                );
                None
            }
            None => {
                let help = self.declared_elsewhere_help(parent.get(), path.level());
                self.collector.emit(
                    Diagnostic::error(format!(
                        "object type `{path}` extends `{parent}`, which is not visible from level `{}`",
                        path.level()
                    ))
                    .with_code(ErrorCode::E300)
                    .with_label(parent.span(), "unknown object type")
                    .with_help(help),
                );
                None
            }
        });

        let properties = object
            .properties
            .iter()
            .filter_map(|property| {
                let ty = self.resolve_type(path, property, namespace)?;
                Some(ResolvedProperty::new(
                    property.name.get(),
                    ty,
                    property.description.clone(),
                    path,
                    property.name.span(),
                ))
            })
            .collect();

        BoundObject {
            decl: object,
            parent,
            properties,
        }
    }

    fn resolve_type(&mut self, object: TypePath, property: &Property, namespace: &Namespace) -> Option<TypeRef> {
        let type_name = property.ty.name();

        if let Some(visible) = namespace.get(&type_name) {
            return Some(match visible.kind {
                TypeKind::Parameter => TypeRef::Parameter(visible.path),
                TypeKind::Object => TypeRef::Object(visible.path),
            });
        }
        if self.config.primitives.contains(type_name) {
            return Some(TypeRef::Primitive(type_name));
        }

        let help = self.declared_elsewhere_help(type_name, object.level());
        self.collector.emit(
            Diagnostic::error(format!(
                "unknown type `{type_name}` for property `{}`",
                object.qualified().nested(property.name.get())
            ))
            .with_code(ErrorCode::E300)
            .with_label(property.ty.span(), format!("not visible from `{}`", object.level()))
            .with_help(help),
        );
        None
    }

    fn declared_elsewhere_help(&self, type_name: Id, level: Id) -> String {
        let elsewhere = self.schema.levels.iter().find(|candidate| {
            candidate.object_type(type_name).is_some() || candidate.parameter_type(type_name).is_some()
        });

        match elsewhere {
            Some(candidate) => format!(
                "`{}::{type_name}` is declared in level `{}`, which `{level}` does not extend",
                candidate.name, candidate.name
            ),
            None => format!(
                "declare `{type_name}` in `{level}` or an ancestor level, or configure it as an extra primitive"
            ),
        }
    }

    /// Report object inheritance cycles; returns every object on a cycle.
    fn check_object_cycles(&mut self, objects: &IndexMap<TypePath, BoundObject<'a>>) -> HashSet<TypePath> {
        let cycles = find_cycles(objects.keys().copied(), |path| {
            objects.get(&path).and_then(|object| object.parent)
        });

        let mut cyclic = HashSet::new();
        for cycle in cycles {
            let chain = cycle_chain(&cycle);
            let mut diagnostic = Diagnostic::error(format!("object type inheritance cycle: {chain}"))
                .with_code(ErrorCode::E302)
                .with_help("an object type cannot specialize itself; remove one `extends`");

            for (i, path) in cycle.iter().enumerate() {
                let Some(parent) = objects.get(path).and_then(|object| object.decl.parent) else {
                    continue;
                };
                let message = format!("`{path}` extends `{parent}`");
                diagnostic = if i == 0 {
                    diagnostic.with_label(parent.span(), message)
                } else {
                    diagnostic.with_secondary_label(parent.span(), message)
                };
            }

            self.collector.emit(diagnostic);
            cyclic.extend(cycle);
        }

        cyclic
    }

    /// Effective properties of `path`, ancestor-first. `None` for objects on
    /// or below a cycle.
    fn flatten(
        &mut self,
        path: TypePath,
        objects: &IndexMap<TypePath, BoundObject<'a>>,
        cyclic: &HashSet<TypePath>,
        memo: &mut HashMap<TypePath, Option<Flattened>>,
    ) -> Option<Flattened> {
        if let Some(done) = memo.get(&path) {
            return done.clone();
        }
        if cyclic.contains(&path) {
            memo.insert(path, None);
            return None;
        }
        let object = objects.get(&path)?;

        let mut flattened = match object.parent {
            Some(parent) => {
                let Some(mut inherited) = self.flatten(parent, objects, cyclic, memo) else {
                    memo.insert(path, None);
                    return None;
                };
                inherited.ancestors.push(parent);
                inherited
            }
            None => Flattened::default(),
        };

        let inherited_count = flattened.properties.len();
        for property in &object.properties {
            let snake = naming::to_snake_case(&property.name().to_string());
            let clash = flattened.properties[..inherited_count]
                .iter()
                .find(|inherited| naming::to_snake_case(&inherited.name().to_string()) == snake);

            if let Some(inherited) = clash {
                let inherited_name = inherited.declared_in().qualified().nested(inherited.name());
                let own_name = path.qualified().nested(property.name());
                let diagnostic = if inherited.name() == property.name() {
                    Diagnostic::error(format!(
                        "property `{own_name}` redeclares the inherited property `{inherited_name}`"
                    ))
                    .with_help("specialization adds properties; rename or remove this one")
                } else {
                    Diagnostic::error(format!(
                        "property `{own_name}` clashes with the inherited property `{inherited_name}`"
                    ))
                    .with_help(format!("both names produce the generated field `{snake}`"))
                };
                self.collector.emit(
                    diagnostic
                        .with_code(ErrorCode::E301)
                        .with_label(property.span(), "redeclared here")
                        .with_secondary_label(
                            inherited.span(),
                            format!("inherited from `{}`", inherited.declared_in()),
                        ),
                );
                continue;
            }

            let setter_clash = flattened.properties.iter().find(|other| {
                let other_snake = naming::to_snake_case(&other.name().to_string());
                snake == format!("set_{other_snake}") || other_snake == format!("set_{snake}")
            });
            if let Some(other) = setter_clash {
                let other_name = other.declared_in().qualified().nested(other.name());
                let own_name = path.qualified().nested(property.name());
                let secondary = if other.declared_in() == path {
                    "declared here".to_string()
                } else {
                    format!("inherited from `{}`", other.declared_in())
                };
                self.collector.emit(
                    Diagnostic::error(format!(
                        "property `{own_name}` clashes with the accessors of property `{other_name}`"
                    ))
                    .with_code(ErrorCode::E301)
                    .with_label(property.span(), "accessor generated twice")
                    .with_secondary_label(other.span(), secondary)
                    .with_help("a getter of one property would have the name of the other's setter; rename one of them"),
                );
                continue;
            }

            flattened.properties.push(property.clone());
        }

        trace!(
            object:% = path,
            ancestors = flattened.ancestors.len(),
            properties = flattened.properties.len();
            "Flattened object type",
        );
        memo.insert(path, Some(flattened.clone()));
        Some(flattened)
    }

    /// Append the collections `level` declares, skipping names already
    /// reported as redeclared types.
    fn add_own_collections(
        &mut self,
        level: &AbstractionLevel,
        collections: &mut Vec<Collection>,
        redeclared: &HashSet<TypePath>,
    ) {
        for object in &level.object_types {
            let path = TypePath::new(level.name.get(), object.name.get());
            let collection = Collection::for_object(path);
            let accessor = naming::to_snake_case(&collection.name().to_string());

            let existing = collections
                .iter()
                .find(|existing| naming::to_snake_case(&existing.name().to_string()) == accessor);

            if let Some(existing) = existing {
                if !redeclared.contains(&path) {
                    self.collector.emit(
                        Diagnostic::error(format!(
                            "collection `{}` of `{}` clashes with `{}` of `{}`",
                            collection.name(),
                            level.name,
                            existing.name(),
                            existing.declared_in()
                        ))
                        .with_code(ErrorCode::E301)
                        .with_label(object.name.span(), "declared here")
                        .with_help(format!("both produce the accessor `{accessor}`")),
                    );
                }
                continue;
            }

            collections.push(collection);
        }
    }
}

/// Every cycle of a single-parent graph, each reported once, in walk order.
fn find_cycles<K>(nodes: impl IntoIterator<Item = K>, parent: impl Fn(K) -> Option<K>) -> Vec<Vec<K>>
where
    K: Copy + Eq + Hash,
{
    let mut done: HashSet<K> = HashSet::new();
    let mut cycles = Vec::new();

    for start in nodes {
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut current = Some(start);

        while let Some(node) = current {
            if done.contains(&node) {
                break;
            }
            if !on_path.insert(node) {
                let first = path.iter().position(|n| *n == node).unwrap_or_default();
                cycles.push(path[first..].to_vec());
                break;
            }
            path.push(node);
            current = parent(node);
        }

        done.extend(path);
    }

    cycles
}

/// `A` → `B` → `A`
fn cycle_chain<K: std::fmt::Display>(cycle: &[K]) -> String {
    cycle
        .iter()
        .chain(cycle.first())
        .map(|node| format!("`{node}`"))
        .collect::<Vec<_>>()
        .join(" → ")
}
