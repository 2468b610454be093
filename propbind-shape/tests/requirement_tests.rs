use pretty_assertions::assert_eq;
use propbind_shape::{
    constraint, ConstraintMap, ConstraintOptions, DataConstraints, JsonSchemaType, PropShape,
    ShapeRequirement, ShapeRequirementTranslator, ShapeRequirements, FILE_REFERENCE,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn options(pairs: &[(&str, Value)]) -> ConstraintOptions {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn check(
    requirement: &ShapeRequirement,
    constraints: ConstraintMap,
    capabilities: &[&str],
    required: bool,
) -> bool {
    let capabilities: BTreeSet<String> = capabilities.iter().map(|c| c.to_string()).collect();
    requirement.is_satisfied_by(&DataConstraints {
        constraints: &constraints,
        capabilities: &capabilities,
        required,
    })
}

fn uri_data(allow_relative: bool) -> ConstraintMap {
    let mut map = ConstraintMap::new();
    map.insert(
        constraint::URI.into(),
        options(&[("allowRelative", json!(allow_relative))]),
    );
    map
}

// ── Translation ──────────────────────────────────────────────────

#[test]
fn plain_string_needs_nothing() {
    let shape = PropShape::scalar(JsonSchemaType::String);
    assert_eq!(
        ShapeRequirementTranslator::translate(&shape, false),
        ShapeRequirements::None
    );
}

#[test]
fn uri_format_translates_to_absolute_uri() {
    let shape = PropShape::string_with_format("uri");
    assert_eq!(
        ShapeRequirementTranslator::translate(&shape, false),
        ShapeRequirements::Single(ShapeRequirement::uri(false))
    );
}

#[test]
fn uri_reference_format_allows_relative() {
    let shape = PropShape::string_with_format("uri-reference");
    assert_eq!(
        ShapeRequirementTranslator::translate(&shape, false),
        ShapeRequirements::Single(ShapeRequirement::uri(true))
    );
}

#[test]
fn required_adds_not_null() {
    let shape = PropShape::string_with_format("uri");
    let requirements = ShapeRequirementTranslator::translate(&shape, true);
    let ids: Vec<_> = requirements.iter().map(|r| r.constraint.as_str()).collect();
    assert_eq!(ids, vec![constraint::URI, constraint::NOT_NULL]);
}

#[test]
fn wildcard_media_type_requires_file_reference() {
    let shape = PropShape::string_with_format("uri-reference")
        .with_constraint("contentMediaType", json!("image/*"));
    let requirements = ShapeRequirementTranslator::translate(&shape, false);
    let requirements: Vec<_> = requirements.iter().cloned().collect();
    assert_eq!(
        requirements,
        vec![
            ShapeRequirement::uri(true),
            ShapeRequirement::primitive_type(FILE_REFERENCE),
            ShapeRequirement::media_type("image/*"),
        ]
    );
}

#[test]
fn enum_translates_to_choice() {
    let shape = PropShape::scalar(JsonSchemaType::Integer).with_constraint("enum", json!([1, 2]));
    assert_eq!(
        ShapeRequirementTranslator::translate(&shape, false),
        ShapeRequirements::Single(ShapeRequirement::choice(vec![json!(1), json!(2)]))
    );
}

#[test]
fn unknown_format_is_unsupported_not_an_error() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let shape = PropShape::string_with_format("hostname");
    let requirements = ShapeRequirementTranslator::translate(&shape, false);
    assert!(requirements.is_unsupported());
}

#[test]
fn unknown_keyword_is_unsupported() {
    let shape = PropShape::scalar(JsonSchemaType::String).with_constraint("maxLength", json!(20));
    assert!(ShapeRequirementTranslator::translate(&shape, false).is_unsupported());
}

#[test]
fn object_shape_is_unsupported_for_scalar_translation() {
    let shape = PropShape::object(Vec::<(String, PropShape)>::new(), Vec::<String>::new());
    assert!(ShapeRequirementTranslator::translate(&shape, false).is_unsupported());
}

// ── Satisfaction ─────────────────────────────────────────────────

#[test]
fn absolute_uri_data_satisfies_relative_request() {
    assert!(check(&ShapeRequirement::uri(true), uri_data(false), &[], false));
}

#[test]
fn relative_uri_data_does_not_satisfy_absolute_request() {
    assert!(!check(&ShapeRequirement::uri(false), uri_data(true), &[], false));
}

#[test]
fn missing_constraint_fails() {
    assert!(!check(&ShapeRequirement::uri(true), ConstraintMap::new(), &[], false));
}

#[test]
fn capability_must_be_declared() {
    let requirement = ShapeRequirement::primitive_type(FILE_REFERENCE);
    assert!(check(&requirement, ConstraintMap::new(), &[FILE_REFERENCE], false));
    assert!(!check(&requirement, ConstraintMap::new(), &[], false));
}

#[test]
fn wildcard_media_type_accepts_concrete_subtype() {
    let mut map = ConstraintMap::new();
    map.insert(constraint::MEDIA_TYPE.into(), options(&[("mime", json!("image/png"))]));
    assert!(check(&ShapeRequirement::media_type("image/*"), map.clone(), &[], false));
    assert!(!check(&ShapeRequirement::media_type("video/*"), map, &[], false));
}

#[test]
fn data_choices_must_be_subset() {
    let mut map = ConstraintMap::new();
    map.insert(constraint::CHOICE.into(), options(&[("choices", json!(["a", "b"]))]));
    let abc = ShapeRequirement::choice(vec![json!("a"), json!("b"), json!("c")]);
    assert!(check(&abc, map.clone(), &[], false));
    assert!(!check(&ShapeRequirement::choice(vec![json!("a")]), map, &[], false));
}

#[test]
fn data_range_must_lie_within_request() {
    let mut map = ConstraintMap::new();
    map.insert(constraint::RANGE.into(), options(&[("min", json!(1)), ("max", json!(6))]));
    let wide = ShapeRequirement::range(Some(json!(0)), Some(json!(10)));
    assert!(check(&wide, map.clone(), &[], false));
    assert!(!check(&ShapeRequirement::range(Some(json!(2)), None), map, &[], false));
}

#[test]
fn not_null_follows_property_requiredness() {
    let requirement = ShapeRequirement::new(constraint::NOT_NULL);
    assert!(check(&requirement, ConstraintMap::new(), &[], true));
    assert!(!check(&requirement, ConstraintMap::new(), &[], false));
}

#[test]
fn unsupported_never_matches() {
    let requirement = ShapeRequirement::unsupported("anything");
    assert!(!check(&requirement, uri_data(false), &[FILE_REFERENCE], true));
}

#[test]
fn conjunctive_set_needs_every_requirement() {
    let set = ShapeRequirements::from_vec(vec![
        ShapeRequirement::uri(true),
        ShapeRequirement::primitive_type(FILE_REFERENCE),
    ]);
    let constraints = uri_data(false);
    let none = BTreeSet::new();
    let file: BTreeSet<String> = [FILE_REFERENCE.to_string()].into();
    assert!(!set.are_satisfied_by(&DataConstraints {
        constraints: &constraints,
        capabilities: &none,
        required: false,
    }));
    assert!(set.are_satisfied_by(&DataConstraints {
        constraints: &constraints,
        capabilities: &file,
        required: false,
    }));
}
