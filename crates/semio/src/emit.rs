//! Rust source emission for a resolved schema.
//!
//! Every abstraction level becomes a module named after the snake-cased
//! level name. Within a module the parameter types come first, then the
//! object types, then the level aggregate; a level's module always follows
//! the modules of its ancestors. Types of ancestor levels are imported with
//! `use super::<module>::{...}`, primitives from the configured path.
//!
//! Emission only reads the resolved model. The same model and
//! configuration always produce byte-identical output.

mod aggregate;
mod object;
mod parameter;
mod writer;

use std::{collections::BTreeSet, fmt};

use indexmap::IndexSet;
use log::{debug, info};
use thiserror::Error;

use semio_core::{
    identifier::Id,
    naming,
    resolved::{ResolvedLevel, ResolvedSchema},
    schema::{TypePath, TypeRef},
};

use crate::config::{EmitConfig, OutputLayout};

use writer::CodeWriter;

const HEADER: &str = "// @generated by semio. Do not edit by hand.";

/// File name of the unit produced by [`OutputLayout::Single`].
pub const SINGLE_FILE_NAME: &str = "model.rs";

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Format error: {0}")]
    Fmt(#[from] fmt::Error),

    /// The resolved model broke an invariant resolution guarantees.
    #[error("Inconsistent resolved model: {0}")]
    Internal(String),
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    file_name: String,
    contents: String,
}

impl GeneratedUnit {
    pub fn new(file_name: impl Into<String>, contents: String) -> Self {
        Self {
            file_name: file_name.into(),
            contents,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Everything one compile run produced, staged in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    layout: OutputLayout,
    units: Vec<GeneratedUnit>,
}

impl Artifact {
    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    pub fn units(&self) -> &[GeneratedUnit] {
        &self.units
    }

    pub fn unit(&self, file_name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|unit| unit.file_name == file_name)
    }
}

/// Render `schema` under `config`.
///
/// # Errors
///
/// Returns [`EmitError::Internal`] when the model is not fully resolved or
/// a flag set is not made of disjoint bits.
pub fn emit(schema: &ResolvedSchema, config: &EmitConfig) -> Result<Artifact, EmitError> {
    info!(levels = schema.levels().len(), layout:? = config.layout(); "Emitting schema");

    let derives: IndexSet<&str> = config.derives().iter().map(String::as_str).collect();
    let derives = derives.into_iter().collect::<Vec<_>>().join(", ");

    let units = match config.layout() {
        OutputLayout::Single => {
            let mut w = CodeWriter::new();
            if config.header() {
                w.line(HEADER)?;
            }
            for level in schema.levels() {
                w.blank()?;
                w.doc(level.description())?;
                w.open(format_args!("pub mod {}", module_name(level.name())))?;
                emit_level(&mut w, schema, level, config, &derives)?;
                w.close()?;
            }
            vec![GeneratedUnit::new(SINGLE_FILE_NAME, w.finish())]
        }
        OutputLayout::PerLevel => {
            let mut root = CodeWriter::new();
            if config.header() {
                root.line(HEADER)?;
                root.blank()?;
            }

            let mut units = Vec::with_capacity(schema.levels().len() + 1);
            for level in schema.levels() {
                let module = module_name(level.name());
                root.doc(level.description())?;
                root.line(format_args!("pub mod {module};"))?;

                let mut w = CodeWriter::new();
                if config.header() {
                    w.line(HEADER)?;
                    w.blank()?;
                }
                emit_level(&mut w, schema, level, config, &derives)?;
                let file_name = format!("{}.rs", module.trim_start_matches("r#"));
                units.push(GeneratedUnit::new(file_name, w.finish()));
            }

            units.insert(0, GeneratedUnit::new("mod.rs", root.finish()));
            units
        }
    };

    debug!(units = units.len(); "Schema emitted");
    Ok(Artifact {
        layout: config.layout(),
        units,
    })
}

/// Module name of a level.
pub(crate) fn module_name(level: Id) -> String {
    naming::rust_ident(&naming::to_snake_case(&level.to_string()))
}

/// Body of one level module.
fn emit_level(
    w: &mut CodeWriter,
    schema: &ResolvedSchema,
    level: &ResolvedLevel,
    config: &EmitConfig,
    derives: &str,
) -> Result<(), EmitError> {
    debug!(level:% = level.name(); "Emitting level");

    if let Some(parent) = level.parent() {
        if schema.level(parent).is_none() {
            return Err(EmitError::Internal(format!(
                "level `{}` extends `{parent}`, which was not resolved",
                level.name()
            )));
        }
    }

    let imports = Imports::collect(level)?;
    let mut first = true;
    let mut separate = |w: &mut CodeWriter| -> Result<(), EmitError> {
        if !std::mem::take(&mut first) {
            w.blank()?;
        }
        Ok(())
    };

    if !imports.is_empty() {
        separate(w)?;
        imports.write(w, config.primitives_path())?;
    }

    for param in level.parameter_types() {
        separate(w)?;
        parameter::emit_parameter(w, TypePath::new(level.name(), param.name.get()), param)?;
    }
    for object in level.object_types() {
        separate(w)?;
        object::emit_object(w, object, derives)?;
    }
    separate(w)?;
    aggregate::emit_aggregate(w, level, derives)?;

    Ok(())
}

/// Names a level module refers to but does not declare.
#[derive(Debug, Default)]
struct Imports {
    /// Ancestor module name to type names.
    ancestors: BTreeSet<(String, String)>,
    primitives: BTreeSet<String>,
}

impl Imports {
    fn collect(level: &ResolvedLevel) -> Result<Self, EmitError> {
        let mut imports = Self::default();
        let add_type = |imports: &mut Self, path: TypePath| {
            if path.level() != level.name() {
                imports.ancestors.insert((
                    module_name(path.level()),
                    naming::rust_ident(&path.name().to_string()),
                ));
            }
        };

        for object in level.object_types() {
            for property in object.properties() {
                match property.ty() {
                    TypeRef::Primitive(name) => {
                        imports.primitives.insert(naming::rust_ident(&name.to_string()));
                    }
                    TypeRef::Parameter(path) | TypeRef::Object(path) => add_type(&mut imports, path),
                    TypeRef::Unresolved(name) => {
                        return Err(EmitError::Internal(format!(
                            "property `{}::{}` has unresolved type `{name}`",
                            object.path(),
                            property.name()
                        )));
                    }
                }
            }
        }
        for collection in level.collections() {
            add_type(&mut imports, collection.object());
        }

        Ok(imports)
    }

    fn is_empty(&self) -> bool {
        self.ancestors.is_empty() && self.primitives.is_empty()
    }

    fn write(&self, w: &mut CodeWriter, primitives_path: &str) -> fmt::Result {
        let mut modules: Vec<(&str, Vec<&str>)> = Vec::new();
        for (module, name) in &self.ancestors {
            match modules.last_mut() {
                Some((last, names)) if *last == module.as_str() => names.push(name),
                _ => modules.push((module, vec![name])),
            }
        }

        for (module, names) in modules {
            w.line(format_args!("use super::{module}::{};", use_list(&names)))?;
        }
        if !self.primitives.is_empty() {
            let names: Vec<&str> = self.primitives.iter().map(String::as_str).collect();
            w.line(format_args!("use {primitives_path}::{};", use_list(&names)))?;
        }
        Ok(())
    }
}

fn use_list(names: &[&str]) -> String {
    match names {
        [name] => (*name).to_string(),
        _ => format!("{{{}}}", names.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use semio_core::{
        resolved::{ResolvedObjectType, ResolvedProperty},
        span::Span,
    };
    use semio_parser::ResolveConfig;

    use super::*;

    const SOURCE: &str = r#""Plots and their use"
AbstractionLevel Site
    Parameter Use
        Housing
        Office
    Parameter Access [Multiple]
        Street = 1
        Water = 2
    Object Plot
        "Net area"
        Number Area
        Use Use
    Object Parcel extends Plot
        Plot Neighbour

AbstractionLevel District extends Site
    Object Block
        Plot Anchor
        Access Access
"#;

    fn render(config: &EmitConfig) -> Artifact {
        let schema = semio_parser::parse(SOURCE, &ResolveConfig::default()).unwrap();
        emit(&schema, config).unwrap()
    }

    fn single() -> String {
        render(&EmitConfig::default()).units()[0].contents().to_string()
    }

    #[test]
    fn test_single_layout_wraps_levels_in_modules() {
        let out = single();

        assert!(out.starts_with("// @generated by semio. Do not edit by hand.\n\n/// Plots and their use\npub mod site {\n"));
        let site = out.find("pub mod site {").unwrap();
        let district = out.find("pub mod district {").unwrap();
        assert!(site < district);
    }

    #[test]
    fn test_level_item_order() {
        let out = single();
        let positions: Vec<usize> = ["pub enum Use", "pub struct Access", "pub struct Plot", "pub struct Parcel", "pub struct Site"]
            .iter()
            .map(|needle| out.find(needle).unwrap())
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_object_fields_and_accessors() {
        let out = single();

        assert!(out.contains(
            "    pub struct Plot {\n        area: Option<Number>,\n        r#use: Option<Use>,\n    }"
        ));
        assert!(out.contains("        /// Net area\n        pub fn area(&self) -> Option<&Number> {"));
        assert!(out.contains("        pub fn r#use(&self) -> Option<Use> {\n            self.r#use\n        }"));
        assert!(out.contains("        pub fn set_use(&mut self, value: Option<Use>) {"));
    }

    #[test]
    fn test_specialization_is_flattened() {
        let out = single();

        assert!(out.contains("    /// Specializes `Site::Plot`.\n    #[derive(Debug, Clone, Default)]\n    pub struct Parcel {\n        area: Option<Number>,\n        r#use: Option<Use>,\n        neighbour: Option<Box<Plot>>,\n    }"));
        assert!(out.contains("self.neighbour = value.map(Box::new);"));
        assert!(out.contains("self.neighbour.as_deref()"));
    }

    #[test]
    fn test_derived_level_imports_and_base() {
        let out = single();
        let district = &out[out.find("pub mod district {").unwrap()..];

        assert!(district.contains("    use super::site::{Access, Parcel, Plot};\n"));
        assert!(!district.contains("use crate::primitives"));
        assert!(district.contains("        base: super::site::Site,\n        block_collection: Vec<Block>,\n"));
        assert!(district.contains(
            "        pub fn parcel_collection(&self) -> &[Parcel] {\n            self.base.parcel_collection()\n        }"
        ));
        assert!(district.contains(
            "        pub fn block_collection_mut(&mut self) -> &mut Vec<Block> {\n            &mut self.block_collection\n        }"
        ));
    }

    #[test]
    fn test_primitives_import_path() {
        let out = render(&EmitConfig::default().with_primitives_path("geo::types"));

        assert!(out.units()[0].contents().contains("    use geo::types::Number;\n"));
    }

    #[test]
    fn test_root_level_has_no_base() {
        let out = single();
        let site = &out[..out.find("pub mod district {").unwrap()];

        assert!(!site.contains("base"));
        assert!(site.contains("        plot_collection: Vec<Plot>,\n        parcel_collection: Vec<Parcel>,\n"));
    }

    #[test]
    fn test_per_level_layout() {
        let artifact = render(&EmitConfig::default().with_layout(OutputLayout::PerLevel));
        let names: Vec<&str> = artifact.units().iter().map(GeneratedUnit::file_name).collect();

        assert_eq!(names, ["mod.rs", "site.rs", "district.rs"]);
        assert_eq!(
            artifact.unit("mod.rs").unwrap().contents(),
            "// @generated by semio. Do not edit by hand.\n\n/// Plots and their use\npub mod site;\npub mod district;\n"
        );
        assert!(artifact.unit("district.rs").unwrap().contents().contains("\nuse super::site::{Access, Parcel, Plot};\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(render(&EmitConfig::default()), render(&EmitConfig::default()));
    }

    #[test]
    fn test_unresolved_property_is_internal_error() {
        let site = Id::new("Site");
        let plot = TypePath::new(site, Id::new("Plot"));
        let property = ResolvedProperty::new(
            Id::new("Area"),
            TypeRef::Unresolved(Id::new("Acreage")),
            None,
            plot,
            Span::default(),
        );
        let object = ResolvedObjectType::new(plot, None, Span::default(), Vec::new(), vec![property]);
        let level = ResolvedLevel::new(site, None, Span::default(), Vec::new(), Vec::new(), vec![object], Vec::new());

        let err = emit(&ResolvedSchema::new(vec![level]), &EmitConfig::default()).unwrap_err();
        assert!(matches!(err, EmitError::Internal(_)));
        assert!(err.to_string().contains("Acreage"));
    }
}
