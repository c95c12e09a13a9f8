//! Loading and resolving complete schemas through the public API.

use proptest::prelude::*;

use semio_core::{
    identifier::Id,
    schema::{ParameterKind, TypePath},
};
use semio_parser::{ResolveConfig, error::ErrorKind, load, parse};

const MASTERPLAN: &str = r#"
"Urban scale planning"
AbstractionLevel Masterplan
    Parameter Use
        Industrial
        Residential
        Urban
        Rural
    Object BuildingVolume
        ClosedCurve Parcel
        Use Use
        Number Height

AbstractionLevel Apartmentplan extends Masterplan
    Object Apartment
        ClosedCurve Boundary
        Integer CountPeople
"#;

fn collection_names(source: &str, level: &str) -> Vec<String> {
    let schema = parse(source, &ResolveConfig::default()).expect("Schema should resolve");
    schema
        .level(Id::new(level))
        .expect("Level should exist")
        .collections()
        .iter()
        .map(|collection| collection.name().to_string())
        .collect()
}

#[test]
fn test_masterplan_example() {
    let schema = parse(MASTERPLAN, &ResolveConfig::default()).unwrap();

    let masterplan = schema.level(Id::new("Masterplan")).unwrap();
    let use_param = schema
        .parameter_type(TypePath::new(Id::new("Masterplan"), Id::new("Use")))
        .unwrap();
    assert_eq!(use_param.kind, ParameterKind::Enumeration);
    let values: Vec<u32> = use_param.members.iter().map(|m| m.value).collect();
    assert_eq!(values, [0, 1, 2, 3]);
    assert_eq!(masterplan.description(), Some("Urban scale planning"));

    let apartmentplan = schema.level(Id::new("Apartmentplan")).unwrap();
    assert_eq!(apartmentplan.parent(), Some(Id::new("Masterplan")));
    let collections: Vec<String> = apartmentplan
        .collections()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(collections, ["BuildingVolumeCollection", "ApartmentCollection"]);

    let own: Vec<String> = apartmentplan
        .own_collections()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(own, ["ApartmentCollection"]);
}

#[test]
fn test_three_level_chain() {
    let source = "\
AbstractionLevel A
    Object First
AbstractionLevel B extends A
    Object Second
AbstractionLevel C extends B
    Object Third
";
    assert_eq!(
        collection_names(source, "C"),
        ["FirstCollection", "SecondCollection", "ThirdCollection"]
    );
    assert_eq!(collection_names(source, "B"), ["FirstCollection", "SecondCollection"]);
}

#[test]
fn test_sibling_levels_do_not_share_collections() {
    let source = "\
AbstractionLevel Base
    Object Shared
AbstractionLevel Left extends Base
    Object OnlyLeft
AbstractionLevel Right extends Base
    Object OnlyRight
";
    assert_eq!(
        collection_names(source, "Right"),
        ["SharedCollection", "OnlyRightCollection"]
    );
}

#[test]
fn test_flag_sets() {
    let valid = "\
AbstractionLevel Site
    Parameter Panels [Multiple]
        A = 1
        B = 2
        C = 4
    Object Plot
";
    assert!(parse(valid, &ResolveConfig::default()).is_ok());

    let duplicate = valid.replace("B = 2", "B = 1");
    let err = parse(&duplicate, &ResolveConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFlagValue);
}

#[test]
fn test_level_cycle_fails_before_anything_else() {
    let err = parse(
        "AbstractionLevel A extends B\n    Object X\n        Missing Field\nAbstractionLevel B extends A\n    Object Y\n",
        &ResolveConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cycle);
    assert!(!err.has_kind(ErrorKind::UnknownTypeReference));
}

#[test]
fn test_errors_carry_locations() {
    let source = "AbstractionLevel Site\n    Object Plot\n        Polygon Outline\n";
    let err = parse(source, &ResolveConfig::default()).unwrap_err();
    let span = err.diagnostics()[0].primary_span().unwrap();
    assert_eq!(&source[span.start()..span.end()], "Polygon");
}

#[test]
fn test_syntax_errors_are_definition_errors() {
    let err = load("AbstractionLevel Site\n    Object\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Definition);
}

fn member_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(
        "[A-Z][a-z]{2,8}".prop_filter("reserved", |name| {
            !matches!(name.as_str(), "Self" | "Super" | "Crate")
        }),
        1..12,
    )
    .prop_map(|names| names.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_enumeration_values_default_to_positions(names in member_names()) {
        let members: String = names.iter().map(|name| format!("        {name}\n")).collect();
        let source = format!("AbstractionLevel Site\n    Parameter Kind\n{members}    Object Plot\n");

        let schema = parse(&source, &ResolveConfig::default()).unwrap();
        let kind = schema
            .parameter_type(TypePath::new(Id::new("Site"), Id::new("Kind")))
            .unwrap();

        let values: Vec<u32> = kind.members.iter().map(|m| m.value).collect();
        let expected: Vec<u32> = (0..names.len() as u32).collect();
        prop_assert_eq!(values, expected);
    }

    #[test]
    fn prop_distinct_single_bits_form_a_flag_set(bits in prop::collection::hash_set(0u32..32, 1..10)) {
        let members: String = bits
            .iter()
            .enumerate()
            .map(|(i, bit)| format!("        Flag{i} = {}\n", 1u64 << bit))
            .collect();
        let source = format!("AbstractionLevel Site\n    Parameter Panels [Multiple]\n{members}    Object Plot\n");

        let schema = parse(&source, &ResolveConfig::default()).unwrap();
        let panels = schema
            .parameter_type(TypePath::new(Id::new("Site"), Id::new("Panels")))
            .unwrap();
        let mut union = 0u32;
        for member in &panels.members {
            prop_assert_eq!(union & member.value, 0);
            union |= member.value;
        }
        prop_assert_eq!(union.count_ones() as usize, bits.len());
    }
}
