use pretty_assertions::assert_eq;
use propbind_types::{DirectField, FieldExpression, MappedField, ObjectField, SuggestionId};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn image_alt() -> DirectField {
    DirectField::new("node", Some("article"), "field_image", "alt")
}

fn image_object() -> FieldExpression {
    let mut property_mapping = BTreeMap::new();
    property_mapping.insert(
        "src".to_string(),
        MappedField::Direct(DirectField::new(
            "node",
            Some("article"),
            "field_image",
            "uri",
        )),
    );
    property_mapping.insert("alt".to_string(), MappedField::Direct(image_alt()));
    FieldExpression::Object(ObjectField {
        entity_type: "node".into(),
        bundle: Some("article".into()),
        field_name: "field_image".into(),
        delta: None,
        property_mapping,
    })
}

// ── Display ──────────────────────────────────────────────────────

#[test]
fn direct_field_canonical_form() {
    let expr = FieldExpression::Direct(image_alt());
    assert_eq!(expr.to_string(), "node:article.field_image.alt");
}

#[test]
fn base_field_omits_bundle() {
    let expr = FieldExpression::Direct(DirectField::new("node", None, "title", "value"));
    assert_eq!(expr.to_string(), "node.title.value");
}

#[test]
fn delta_is_printed_after_field() {
    let expr = FieldExpression::Direct(
        DirectField::new("node", Some("article"), "field_tags", "target_id").with_delta(2),
    );
    assert_eq!(expr.to_string(), "node:article.field_tags[2].target_id");
}

#[test]
fn reference_chain_canonical_form() {
    let expr = FieldExpression::reference(
        DirectField::new("node", Some("article"), "field_media", "entity"),
        FieldExpression::Direct(DirectField::new("media", Some("image"), "name", "value")),
    );
    assert_eq!(
        expr.to_string(),
        "node:article.field_media.entity=>media:image.name.value"
    );
}

#[test]
fn object_mapping_is_sorted_by_property_name() {
    assert_eq!(
        image_object().to_string(),
        "node:article.field_image{alt=node:article.field_image.alt,src=node:article.field_image.uri}"
    );
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_direct() {
    let parsed: FieldExpression = "node:article.field_image.alt".parse().unwrap();
    assert_eq!(parsed, FieldExpression::Direct(image_alt()));
}

#[test]
fn parse_object_with_reference_mapping() {
    let input = "node.field_image{src=node.field_image.entity=>file.uri.value}";
    let parsed: FieldExpression = input.parse().unwrap();
    match &parsed {
        FieldExpression::Object(o) => {
            assert_eq!(o.field_name, "field_image");
            assert!(o.property_mapping["src"].is_reference());
        }
        other => panic!("expected object, got {other:?}"),
    }
    assert_eq!(parsed.to_string(), input);
}

#[test]
fn parse_rejects_missing_property() {
    assert!("node:article.field_image".parse::<FieldExpression>().is_err());
}

#[test]
fn parse_rejects_trailing_input() {
    assert!("node.title.value extra".parse::<FieldExpression>().is_err());
}

#[test]
fn parse_rejects_object_inside_object() {
    let input = "node.f{a=node.f{b=node.f.v}}";
    assert!(input.parse::<FieldExpression>().is_err());
}

#[test]
fn parse_rejects_bad_delta() {
    assert!("node.f[x].v".parse::<FieldExpression>().is_err());
}

// ── Accessors ────────────────────────────────────────────────────

#[test]
fn root_accessors_follow_referencer() {
    let expr: FieldExpression = "node:page.field_author.entity=>user.name.value"
        .parse()
        .unwrap();
    assert_eq!(expr.root_entity_type(), "node");
    assert_eq!(expr.root_bundle(), Some("page"));
    assert_eq!(expr.root_field_name(), "field_author");
    assert_eq!(expr.leaf_property_name(), Some("value"));
    assert_eq!(expr.reference_depth(), 1);
    assert!(expr.is_reference());
}

#[test]
fn object_has_no_leaf_property() {
    assert_eq!(image_object().leaf_property_name(), None);
    assert!(image_object().into_mapped().is_none());
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serializes_as_canonical_string() {
    let json = serde_json::to_string(&FieldExpression::Direct(image_alt())).unwrap();
    assert_eq!(json, r#""node:article.field_image.alt""#);
    let back: FieldExpression = serde_json::from_str(&json).unwrap();
    assert_eq!(back, FieldExpression::Direct(image_alt()));
}

#[test]
fn deserialize_invalid_string_fails() {
    assert!(serde_json::from_str::<FieldExpression>(r#""not an expression""#).is_err());
}

// ── Suggestion ids ───────────────────────────────────────────────

#[test]
fn suggestion_id_is_stable_sha256() {
    let a = SuggestionId::for_expression(&image_object());
    let b = SuggestionId::for_expression(&image_object());
    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
    assert_ne!(a, SuggestionId::for_expression(&FieldExpression::Direct(image_alt())));
}

// ── Properties ───────────────────────────────────────────────────

fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,8}").unwrap()
}

fn direct_strategy() -> impl Strategy<Value = DirectField> {
    (
        name_strategy(),
        prop::option::of(name_strategy()),
        name_strategy(),
        prop::option::of(0u32..10),
        name_strategy(),
    )
        .prop_map(|(entity_type, bundle, field_name, delta, property_name)| DirectField {
            entity_type,
            bundle,
            field_name,
            delta,
            property_name,
        })
}

fn expression_strategy() -> impl Strategy<Value = FieldExpression> {
    let leaf = direct_strategy().prop_map(FieldExpression::Direct);
    leaf.prop_recursive(3, 8, 2, |inner| {
        (direct_strategy(), inner).prop_map(|(referencer, target)| {
            FieldExpression::reference(referencer, target)
        })
    })
}

proptest! {
    #[test]
    fn canonical_form_parses_back(expr in expression_strategy()) {
        let printed = expr.to_string();
        let parsed: FieldExpression = printed.parse().unwrap();
        prop_assert_eq!(parsed, expr);
    }
}
