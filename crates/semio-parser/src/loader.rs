//! Turns the syntax tree into an unresolved [`Schema`].
//!
//! Loading performs every check that needs no type resolution: reserved and
//! duplicate names, empty declarations, member values, and whether each
//! `extends` target is declared somewhere in the schema. All problems are
//! collected before the phase fails.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use semio_core::{
    identifier::Id,
    naming,
    schema::{AbstractionLevel, Member, ObjectType, ParameterKind, ParameterType, Property, Schema, TypeRef},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types as types,
    span::{Span, Spanned},
};

/// Type names that would shadow prelude items in the generated code.
const RESERVED_TYPE_NAMES: &[&str] = &["Option", "Vec", "Box", "Some", "None"];

#[derive(Debug, Clone, Copy)]
enum NameRole {
    Level,
    Type,
    Member(ParameterKind),
    Property,
}

impl NameRole {
    fn describe(self) -> &'static str {
        match self {
            NameRole::Level => "abstraction level",
            NameRole::Type => "type",
            NameRole::Member(_) => "member",
            NameRole::Property => "property",
        }
    }
}

/// Load a parsed schema file.
pub fn load(file: &types::SchemaFile<'_>) -> Result<Schema, ParseError> {
    Loader::new(file).load()
}

struct Loader<'a, 'src> {
    file: &'a types::SchemaFile<'src>,
    level_names: HashSet<&'src str>,
    type_names: HashSet<&'src str>,
    collector: DiagnosticCollector,
}

impl<'a, 'src> Loader<'a, 'src> {
    fn new(file: &'a types::SchemaFile<'src>) -> Self {
        let level_names = file.levels.iter().map(|level| *level.name.inner()).collect();
        let type_names = file
            .levels
            .iter()
            .flat_map(|level| level.items.iter())
            .map(|item| match item {
                types::LevelItem::Parameter(param) => *param.name.inner(),
                types::LevelItem::Object(object) => *object.name.inner(),
            })
            .collect();

        Self {
            file,
            level_names,
            type_names,
            collector: DiagnosticCollector::new(),
        }
    }

    fn load(mut self) -> Result<Schema, ParseError> {
        let file = self.file;
        debug!(levels = file.levels.len(); "Loading schema");

        if file.levels.is_empty() {
            self.collector.emit(
                Diagnostic::error("schema declares no abstraction level")
                    .with_code(ErrorCode::E204)
                    .with_label(Span::default(), "expected an `AbstractionLevel` declaration")
                    .with_help("start the schema with `AbstractionLevel <Name>`"),
            );
        }

        let mut seen = HashMap::new();
        let levels: Vec<AbstractionLevel> = file
            .levels
            .iter()
            .map(|level| {
                let name = *level.name.inner();
                self.check_reserved(level.name, NameRole::Level, name);
                self.check_unique(
                    &mut seen,
                    naming::to_snake_case(name),
                    level.name,
                    NameRole::Level,
                    name,
                );
                self.load_level(level)
            })
            .collect();

        self.collector.finish()?;

        debug!(levels = levels.len(); "Schema loaded");
        Ok(Schema::new(levels))
    }

    fn load_level(&mut self, decl: &types::LevelDecl<'src>) -> AbstractionLevel {
        let level = *decl.name.inner();
        trace!(level = level, items = decl.items.len(); "Loading abstraction level");

        if let Some(parent) = decl.parent {
            if !self.level_names.contains(parent.inner()) {
                self.collector.emit(
                    Diagnostic::error(format!(
                        "abstraction level `{level}` extends undeclared level `{parent}`"
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(parent.span(), "no abstraction level with this name")
                    .with_help(format!("declare `AbstractionLevel {parent}` in the same schema")),
                );
            }
        }

        let mut seen = HashMap::new();
        let mut parameter_types = Vec::new();
        let mut object_types = Vec::new();

        for item in &decl.items {
            let name = match item {
                types::LevelItem::Parameter(param) => param.name,
                types::LevelItem::Object(object) => object.name,
            };
            let qualified = format!("{level}::{name}");
            self.check_reserved(name, NameRole::Type, &qualified);
            self.check_unique(&mut seen, name.to_string(), name, NameRole::Type, &qualified);

            match item {
                types::LevelItem::Parameter(param) => {
                    parameter_types.push(self.load_parameter(&qualified, param));
                }
                types::LevelItem::Object(object) => {
                    object_types.push(self.load_object(&qualified, object));
                }
            }
        }

        if object_types.is_empty() {
            self.collector.emit(
                Diagnostic::error(format!("abstraction level `{level}` declares no object type"))
                    .with_code(ErrorCode::E204)
                    .with_label(decl.name.span(), "declared here")
                    .with_help("every abstraction level needs at least one `Object` declaration"),
            );
        }

        AbstractionLevel {
            name: decl.name.map(Id::new),
            description: self.description(decl.description.as_ref(), level),
            parent: decl.parent.map(|parent| parent.map(Id::new)),
            parameter_types,
            object_types,
            span: decl.span,
        }
    }

    fn load_parameter(&mut self, qualified: &str, decl: &types::ParameterDecl<'src>) -> ParameterType {
        let kind = if decl.multiple {
            ParameterKind::FlagSet
        } else {
            ParameterKind::Enumeration
        };
        trace!(parameter = qualified, kind:%; "Loading parameter type");

        if decl.members.is_empty() {
            self.collector.emit(
                Diagnostic::error(format!("parameter type `{qualified}` declares no member"))
                    .with_code(ErrorCode::E204)
                    .with_label(decl.name.span(), "declared here")
                    .with_help("list at least one member, indented below the declaration"),
            );
        }

        let mut seen_names = HashMap::new();
        let mut seen_values: HashMap<u64, Spanned<&'src str>> = HashMap::new();
        let mut next: u64 = 0;
        let mut members = Vec::with_capacity(decl.members.len());

        for member in &decl.members {
            let member_name = format!("{qualified}::{}", member.name);
            self.check_reserved(member.name, NameRole::Member(kind), &member_name);
            let key = match kind {
                ParameterKind::Enumeration => member.name.to_string(),
                ParameterKind::FlagSet => naming::to_screaming_snake_case(&member.name),
            };
            self.check_unique(&mut seen_names, key, member.name, NameRole::Member(kind), &member_name);

            let Some(value) = self.member_value(kind, &member_name, member, next) else {
                continue;
            };
            next = value.saturating_add(1);

            if let Some(first) = seen_values.get(&value) {
                let code = match kind {
                    ParameterKind::Enumeration => ErrorCode::E205,
                    ParameterKind::FlagSet => ErrorCode::E203,
                };
                self.collector.emit(
                    Diagnostic::error(format!(
                        "`{member_name}` reuses value {value} of `{qualified}::{first}`"
                    ))
                    .with_code(code)
                    .with_label(value_span(member), "duplicate value")
                    .with_secondary_label(first.span(), "first used here")
                    .with_help("members of a parameter type need distinct values"),
                );
                continue;
            }
            seen_values.insert(value, member.name);

            // `member_value` rejects values beyond `u32`
            let Ok(value) = u32::try_from(value) else {
                continue;
            };
            members.push(Member {
                name: member.name.map(Id::new),
                value,
                description: self.description(member.description.as_ref(), &member_name),
            });
        }

        ParameterType {
            name: decl.name.map(Id::new),
            kind,
            description: self.description(decl.description.as_ref(), qualified),
            members,
            span: decl.span,
        }
    }

    /// Value of a member, or `None` after reporting why it has none.
    ///
    /// Enumeration members count up from the previous value; flag members
    /// must spell out a power of two.
    fn member_value(
        &mut self,
        kind: ParameterKind,
        member_name: &str,
        member: &types::MemberDecl<'src>,
        next: u64,
    ) -> Option<u64> {
        let value = match (kind, member.value) {
            (ParameterKind::Enumeration, explicit) => explicit.map_or(next, |value| value.get()),
            (ParameterKind::FlagSet, None) => {
                self.collector.emit(
                    Diagnostic::error(format!("flag `{member_name}` has no value"))
                        .with_code(ErrorCode::E203)
                        .with_label(member.name.span(), "value missing")
                        .with_help(format!(
                            "flag members need an explicit power of two, e.g. `{} = 1`",
                            member.name
                        )),
                );
                return None;
            }
            (ParameterKind::FlagSet, Some(value)) => {
                let value = value.get();
                if !value.is_power_of_two() {
                    self.collector.emit(
                        Diagnostic::error(format!(
                            "flag `{member_name}` has value {value}, which is not a power of two"
                        ))
                        .with_code(ErrorCode::E203)
                        .with_label(value_span(member), "not a single bit")
                        .with_help("use 1, 2, 4, 8, ... so that flags can be combined"),
                    );
                    return None;
                }
                value
            }
        };

        if value > u64::from(u32::MAX) {
            let code = match kind {
                ParameterKind::Enumeration => ErrorCode::E205,
                ParameterKind::FlagSet => ErrorCode::E203,
            };
            self.collector.emit(
                Diagnostic::error(format!("value {value} of `{member_name}` does not fit in 32 bits"))
                    .with_code(code)
                    .with_label(value_span(member), "out of range")
                    .with_help(format!("member values must not exceed {}", u32::MAX)),
            );
            return None;
        }

        Some(value)
    }

    fn load_object(&mut self, qualified: &str, decl: &types::ObjectDecl<'src>) -> ObjectType {
        trace!(object = qualified, properties = decl.properties.len(); "Loading object type");

        if let Some(parent) = decl.parent {
            if !self.type_names.contains(parent.inner()) {
                self.collector.emit(
                    Diagnostic::error(format!(
                        "object type `{qualified}` extends undeclared type `{parent}`"
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(parent.span(), "no type with this name in the schema")
                    .with_help(format!("declare `Object {parent}` in this or an ancestor level")),
                );
            }
        }

        let mut seen = HashMap::new();
        let properties = decl
            .properties
            .iter()
            .map(|property| {
                let property_name = format!("{qualified}::{}", property.name);
                self.check_reserved(property.name, NameRole::Property, &property_name);
                self.check_unique(
                    &mut seen,
                    naming::to_snake_case(&property.name),
                    property.name,
                    NameRole::Property,
                    &property_name,
                );

                Property {
                    name: property.name.map(Id::new),
                    ty: Spanned::new(
                        TypeRef::Unresolved(Id::new(&property.type_name)),
                        property.type_name.span(),
                    ),
                    description: self.description(property.description.as_ref(), &property_name),
                }
            })
            .collect();

        ObjectType {
            name: decl.name.map(Id::new),
            description: self.description(decl.description.as_ref(), qualified),
            parent: decl.parent.map(|parent| parent.map(Id::new)),
            properties,
            span: decl.span,
        }
    }

    /// Text of a description. Blank descriptions are dropped with a warning.
    fn description(&mut self, text: Option<&Spanned<String>>, owner: &str) -> Option<String> {
        let text = text?;
        if text.inner().trim().is_empty() {
            self.collector.emit(
                Diagnostic::warning(format!("description of `{owner}` is empty"))
                    .with_label(text.span(), "empty description")
                    .with_help("write a description or remove the line"),
            );
            return None;
        }
        Some(text.inner().clone())
    }

    /// Report names that cannot become generated identifiers.
    fn check_reserved(&mut self, name: Spanned<&'src str>, role: NameRole, qualified: &str) {
        let raw = *name.inner();
        let snake = naming::to_snake_case(raw);

        let reason = if naming::is_unescapable(raw) || naming::is_unescapable(&snake) {
            Some(format!("`{raw}` cannot be used as an identifier in generated code"))
        } else {
            match role {
                NameRole::Level | NameRole::Type if RESERVED_TYPE_NAMES.contains(&raw) => {
                    Some(format!("`{raw}` would shadow a standard library name"))
                }
                NameRole::Property if snake == "new" => {
                    Some("generated objects already have a `new` constructor".to_string())
                }
                NameRole::Member(ParameterKind::Enumeration) if raw == "ALL" => {
                    Some("generated enumerations already have an `ALL` constant".to_string())
                }
                _ => None,
            }
        };

        if let Some(reason) = reason {
            self.collector.emit(
                Diagnostic::error(format!("reserved name for {} `{qualified}`", role.describe()))
                    .with_code(ErrorCode::E200)
                    .with_label(name.span(), "reserved")
                    .with_help(reason),
            );
        }
    }

    /// Report `name` if another declaration already produced `key`.
    fn check_unique(
        &mut self,
        seen: &mut HashMap<String, Spanned<&'src str>>,
        key: String,
        name: Spanned<&'src str>,
        role: NameRole,
        qualified: &str,
    ) {
        let Some(first) = seen.get(&key) else {
            seen.insert(key, name);
            return;
        };

        let what = role.describe();
        let diagnostic = if first.inner() == name.inner() {
            Diagnostic::error(format!("duplicate {what} `{qualified}`"))
                .with_help(format!("rename one of the {what} declarations"))
        } else {
            Diagnostic::error(format!("{what} `{qualified}` clashes with `{first}`"))
                .with_help(format!("both names produce the generated name `{key}`"))
        };

        self.collector.emit(
            diagnostic
                .with_code(ErrorCode::E201)
                .with_label(name.span(), "declared again here")
                .with_secondary_label(first.span(), "first declared here"),
        );
    }
}

fn value_span(member: &types::MemberDecl<'_>) -> Span {
    member
        .value
        .map_or(member.name.span(), |value| value.span())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, lexer, parser};

    fn load_source(source: &str) -> Result<Schema, ParseError> {
        let tokens = lexer::tokenize(source)?;
        let file = parser::build_schema(&tokens)?;
        load(&file)
    }

    fn load_err(source: &str) -> ParseError {
        load_source(source).expect_err("Expected loading to fail")
    }

    fn codes(err: &ParseError) -> Vec<ErrorCode> {
        err.diagnostics().iter().filter_map(|d| d.code()).collect()
    }

    #[test]
    fn test_enumeration_values_are_sequential() {
        let schema = load_source(
            "AbstractionLevel Site\n    Parameter Use\n        A\n        B\n        C = 7\n        D\n    Object Plot\n",
        )
        .unwrap();

        let level = &schema.levels[0];
        let param = level.parameter_type(Id::new("Use")).unwrap();
        assert_eq!(param.kind, ParameterKind::Enumeration);
        let values: Vec<u32> = param.members.iter().map(|m| m.value).collect();
        assert_eq!(values, [0, 1, 7, 8]);
    }

    #[test]
    fn test_flag_set_values() {
        let schema = load_source(
            "AbstractionLevel Site\n    Parameter Panels [Multiple]\n        A = 1\n        B = 2\n        C = 4\n    Object Plot\n",
        )
        .unwrap();

        let param = &schema.levels[0].parameter_types[0];
        assert_eq!(param.kind, ParameterKind::FlagSet);
        let values: Vec<u32> = param.members.iter().map(|m| m.value).collect();
        assert_eq!(values, [1, 2, 4]);
    }

    #[test]
    fn test_duplicate_flag_value() {
        let err = load_err(
            "AbstractionLevel Site\n    Parameter Panels [Multiple]\n        A = 1\n        B = 1\n    Object Plot\n",
        );
        assert_eq!(err.kind(), ErrorKind::InvalidFlagValue);
        assert!(err.diagnostics()[0].message().contains("`Site::Panels::B`"));
    }

    #[test]
    fn test_flag_value_not_power_of_two() {
        let err = load_err(
            "AbstractionLevel Site\n    Parameter Panels [Multiple]\n        A = 3\n        B = 0\n    Object Plot\n",
        );
        assert_eq!(codes(&err), [ErrorCode::E203, ErrorCode::E203]);
    }

    #[test]
    fn test_flag_value_missing() {
        let err = load_err(
            "AbstractionLevel Site\n    Parameter Panels [Multiple]\n        A\n    Object Plot\n",
        );
        assert_eq!(err.kind(), ErrorKind::InvalidFlagValue);
    }

    #[test]
    fn test_duplicate_enumeration_value() {
        let err = load_err(
            "AbstractionLevel Site\n    Parameter Use\n        A = 1\n        B = 0\n        C\n    Object Plot\n",
        );
        assert_eq!(codes(&err), [ErrorCode::E205]);
        assert_eq!(err.kind(), ErrorKind::Definition);
    }

    #[test]
    fn test_value_out_of_range() {
        let err = load_err(
            "AbstractionLevel Site\n    Parameter Use\n        A = 4294967296\n    Object Plot\n",
        );
        assert_eq!(codes(&err), [ErrorCode::E205]);
    }

    #[test]
    fn test_empty_schema() {
        let err = load_err("// nothing\n");
        assert_eq!(codes(&err), [ErrorCode::E204]);
    }

    #[test]
    fn test_level_without_objects() {
        let err = load_err("AbstractionLevel Site\n    Parameter Use\n        A\n");
        assert_eq!(codes(&err), [ErrorCode::E204]);
    }

    #[test]
    fn test_duplicate_levels_by_module_name() {
        let err = load_err(
            "AbstractionLevel SitePlan\n    Object Plot\nAbstractionLevel Site_Plan\n    Object Plot\n",
        );
        assert_eq!(err.kind(), ErrorKind::NameCollision);
        let diag = &err.diagnostics()[0];
        assert!(diag.message().contains("clashes with `SitePlan`"));
        assert_eq!(diag.labels().len(), 2);
    }

    #[test]
    fn test_duplicate_type_in_level() {
        let err = load_err(
            "AbstractionLevel Site\n    Parameter Plot\n        A\n    Object Plot\n",
        );
        assert_eq!(err.kind(), ErrorKind::NameCollision);
        assert!(err.diagnostics()[0].message().contains("duplicate type `Site::Plot`"));
    }

    #[test]
    fn test_duplicate_property_by_field_name() {
        let err = load_err(
            "AbstractionLevel Site\n    Object Plot\n        Number CountPeople\n        Integer Count_People\n",
        );
        assert_eq!(codes(&err), [ErrorCode::E201]);
    }

    #[test]
    fn test_reserved_names() {
        let err = load_err(
            "AbstractionLevel Site\n    Object Option\n        Number New\n        Text Self\n",
        );
        assert_eq!(codes(&err), [ErrorCode::E200, ErrorCode::E200, ErrorCode::E200]);
    }

    #[test]
    fn test_undeclared_extends_targets() {
        let err = load_err(
            "AbstractionLevel Flat extends Missing\n    Object Room extends Space\n",
        );
        assert_eq!(codes(&err), [ErrorCode::E202, ErrorCode::E202]);
        assert!(err.has_kind(ErrorKind::UnknownTypeReference));
    }

    #[test]
    fn test_extends_target_in_other_level() {
        let schema = load_source(
            "AbstractionLevel Site\n    Object Volume\nAbstractionLevel Flat extends Site\n    Object Unit extends Volume\n",
        )
        .unwrap();
        let unit = schema.levels[1].object_type(Id::new("Unit")).unwrap();
        assert_eq!(unit.parent.map(|p| p.get()), Some(Id::new("Volume")));
    }

    #[test]
    fn test_properties_stay_unresolved() {
        let schema = load_source("AbstractionLevel Site\n    Object Plot\n        Number Area\n").unwrap();
        let property = &schema.levels[0].object_types[0].properties[0];
        assert_eq!(*property.ty, TypeRef::Unresolved(Id::new("Number")));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let err = load_err(
            "AbstractionLevel Site\n    Parameter Empty\n    Object Plot\n        Number A\n        Number A\n",
        );
        assert_eq!(codes(&err), [ErrorCode::E204, ErrorCode::E201]);
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let schema = load_source(
            "\"  \"\nAbstractionLevel Site\n    Object Plot\n        \"Land area\"\n        Number Area\n",
        )
        .unwrap();

        let level = &schema.levels[0];
        assert_eq!(level.description, None);
        assert_eq!(level.object_types[0].properties[0].description.as_deref(), Some("Land area"));
    }

    #[test]
    fn test_blank_description_warning_is_reported_with_errors() {
        let err = load_err(
            "AbstractionLevel Site\n    Object Plot\n        \"\"\n        Number Area\n        Number Area\n",
        );

        assert_eq!(err.kind(), ErrorKind::NameCollision);
        let warnings: Vec<&Diagnostic> = err
            .diagnostics()
            .iter()
            .filter(|diag| diag.severity().is_warning())
            .collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message(), "description of `Site::Plot::Area` is empty");
        assert_eq!(warnings[0].code(), None);
    }
}
