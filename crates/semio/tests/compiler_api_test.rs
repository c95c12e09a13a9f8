//! Integration tests for the SchemaCompiler API
//!
//! These tests compile whole schemas and inspect the generated source.

use proptest::prelude::*;

use semio::{
    CompileState, ErrorKind, SchemaCompiler, SemioError,
    config::{AppConfig, EmitConfig, OutputLayout, SchemaConfig},
    publish,
};

const MASTERPLAN: &str = include_str!("../../../demos/masterplan.semio");

fn compile(source: &str) -> Result<String, SemioError> {
    let mut compiler = SchemaCompiler::new(AppConfig::default())?;
    let artifact = compiler.compile(source)?;
    Ok(artifact.units()[0].contents().to_string())
}

fn error_kind(source: &str) -> Option<ErrorKind> {
    compile(source).expect_err("Schema should be rejected").kind()
}

/// Section of the single-file output that belongs to `module`.
fn module<'a>(out: &'a str, module: &str) -> &'a str {
    let start = out
        .find(&format!("pub mod {module} {{"))
        .unwrap_or_else(|| panic!("module `{module}` should be emitted"));
    let rest = &out[start..];
    let end = rest[1..].find("\npub mod ").map_or(rest.len(), |end| end + 1);
    &rest[..end]
}

#[test]
fn test_masterplan_end_to_end() {
    let out = compile(MASTERPLAN).expect("Masterplan should compile");

    let masterplan = module(&out, "masterplan");
    assert!(masterplan.contains(
        "    pub enum Use {\n        #[default]\n        Industrial = 0,\n        /// Housing mixed with shops and offices\n        Residential = 1,\n        Urban = 2,\n        Rural = 3,\n    }"
    ));
    assert!(masterplan.contains("pub const ALL: [Self; 4] = [Self::Industrial, Self::Residential, Self::Urban, Self::Rural];"));
    assert!(masterplan.contains("pub const fn all() -> Self {\n            Self(15)\n        }"));
    assert!(masterplan.contains("    use crate::primitives::{ClosedCurve, Integer, Number};\n"));

    let apartmentplan = module(&out, "apartmentplan");
    assert!(apartmentplan.contains("    use super::masterplan::{BuildingVolume, Tower};\n"));
    assert!(apartmentplan.contains("        base: super::masterplan::Masterplan,\n"));
    assert!(apartmentplan.contains("pub fn building_volume_collection(&self) -> &[BuildingVolume] {"));
    assert!(apartmentplan.contains("self.base.building_volume_collection()"));
    assert!(apartmentplan.contains("pub fn apartment_collection(&self) -> &[Apartment] {"));
    assert!(apartmentplan.contains("pub fn penthouse_collection_mut(&mut self) -> &mut Vec<Penthouse> {"));
    assert!(!apartmentplan.contains("set_apartment_collection"));
}

#[test]
fn test_chain_exposes_every_collection_once() {
    let source = "\
AbstractionLevel Region
    Object Landscape

AbstractionLevel City extends Region
    Object Street

AbstractionLevel Quarter extends City
    Object Block
";
    let out = compile(source).unwrap();
    let quarter = module(&out, "quarter");

    let accessors: Vec<&str> = quarter
        .lines()
        .filter_map(|line| line.trim().strip_prefix("pub fn "))
        .filter_map(|rest| rest.split_once("(&self)").map(|(name, _)| name))
        .collect();
    assert_eq!(
        accessors,
        ["base", "landscape_collection", "street_collection", "block_collection"]
    );
    assert!(quarter.contains("base: super::city::City,"));
}

#[test]
fn test_object_chain_flattens_properties() {
    let out = compile(MASTERPLAN).unwrap();
    let masterplan = module(&out, "masterplan");

    let tower = &masterplan[masterplan.find("pub struct Tower {").unwrap()..];
    let tower = &tower[..tower.find('}').unwrap()];
    let fields: Vec<&str> = tower
        .lines()
        .skip(1)
        .filter_map(|line| line.trim().split_once(':').map(|(field, _)| field))
        .collect();
    assert_eq!(fields, ["parcel", "r#use", "height", "panels", "floors"]);
}

#[test]
fn test_error_kinds() {
    let cycle = "\
AbstractionLevel A extends B
    Object Alpha

AbstractionLevel B extends A
    Object Beta
";
    assert_eq!(error_kind(cycle), Some(ErrorKind::Cycle));

    let flags = "\
AbstractionLevel Site
    Parameter Access [Multiple]
        Street = 1
        Water = 1
    Object Plot
";
    assert_eq!(error_kind(flags), Some(ErrorKind::InvalidFlagValue));

    let redeclared = "\
AbstractionLevel Site
    Object Plot
        Number Area
    Object Parcel extends Plot
        Number Area
";
    assert_eq!(error_kind(redeclared), Some(ErrorKind::NameCollision));

    let unknown = "\
AbstractionLevel Site
    Object Plot
        Acreage Area
";
    assert_eq!(error_kind(unknown), Some(ErrorKind::UnknownTypeReference));
}

#[test]
fn test_disjoint_flags_compile() {
    let source = "\
AbstractionLevel Site
    Parameter Access [Multiple]
        A = 1
        B = 2
        C = 4
    Object Plot
        Access Access
";
    let out = compile(source).unwrap();
    assert!(out.contains("pub const C: Self = Self(4);"));
}

#[test]
fn test_schema_error_keeps_source() {
    let source = "AbstractionLevel Site\n    Object Plot\n        Acreage Area\n";
    let mut compiler = SchemaCompiler::new(AppConfig::default()).unwrap();

    let Err(SemioError::Schema { err, src }) = compiler.compile(source) else {
        panic!("expected a schema error");
    };
    assert_eq!(src, source);
    assert!(err.diagnostics()[0].message().contains("Acreage"));
    assert_eq!(compiler.state(), CompileState::Failed);
}

#[test]
fn test_check_stops_after_resolving() {
    let mut compiler = SchemaCompiler::new(AppConfig::default()).unwrap();
    let resolved = compiler.check(MASTERPLAN).unwrap();

    assert_eq!(resolved.levels().len(), 2);
    assert_eq!(compiler.state(), CompileState::Resolved);

    compiler.compile(MASTERPLAN).unwrap();
    assert_eq!(compiler.state(), CompileState::Done);
}

#[test]
fn test_extra_primitives() {
    let source = "AbstractionLevel Site\n    Object Plot\n        Polygon Footprint\n";
    let config = AppConfig::new(
        EmitConfig::default(),
        SchemaConfig::new(vec!["Polygon".to_string()]),
    );

    let artifact = SchemaCompiler::new(config).unwrap().compile(source).unwrap();
    assert!(artifact.units()[0].contents().contains("use crate::primitives::Polygon;"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = AppConfig::new(
        EmitConfig::default().with_primitives_path("not a path"),
        SchemaConfig::default(),
    );

    let err = SchemaCompiler::new(config).unwrap_err();
    assert!(matches!(err, SemioError::Config(_)));
}

#[test]
fn test_publish_per_level() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(
        EmitConfig::default().with_layout(OutputLayout::PerLevel),
        SchemaConfig::default(),
    );

    let artifact = SchemaCompiler::new(config).unwrap().compile(MASTERPLAN).unwrap();
    publish(&artifact, dir.path()).unwrap();

    let root = std::fs::read_to_string(dir.path().join("mod.rs")).unwrap();
    assert!(root.contains("pub mod masterplan;\n"));
    assert!(root.contains("pub mod apartmentplan;\n"));
    let apartmentplan = std::fs::read_to_string(dir.path().join("apartmentplan.rs")).unwrap();
    assert!(apartmentplan.contains("pub struct Apartmentplan {"));
}

proptest! {
    #[test]
    fn compiling_twice_is_byte_identical(
        names in prop::collection::btree_set("[A-Z][a-z]{2,8}", 1..6),
    ) {
        let mut source = String::from("AbstractionLevel Site\n");
        for name in &names {
            source.push_str(&format!("    Object {name}\n        Number Size\n"));
        }

        let first = compile(&source);
        let second = compile(&source);
        match (first, second) {
            (Ok(first), Ok(second)) => prop_assert_eq!(first, second),
            (Err(first), Err(second)) => prop_assert_eq!(first.to_string(), second.to_string()),
            _ => prop_assert!(false, "compiling the same schema gave different outcomes"),
        }
    }
}
