use pretty_assertions::assert_eq;
use propbind_source::{
    PropSource, PropSourceCollapser, PropSourceError, StaticExpression, StaticPropSource,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn heading_default() -> StaticPropSource {
    let mut source = StaticPropSource::new(
        "string",
        StaticExpression::Property("value".into()),
        json!("Hello, world!"),
    );
    source.storage_settings = Map::from_iter([("max_length".to_string(), json!(255))]);
    source
}

fn collapser() -> PropSourceCollapser {
    PropSourceCollapser::default().with_default("heading", heading_default())
}

fn heading(value: Value) -> PropSource {
    PropSource::Static(StaticPropSource {
        value,
        ..heading_default()
    })
}

// ── Collapse ─────────────────────────────────────────────────────

#[test]
fn default_metadata_collapses_to_bare_value() {
    let stored = collapser().collapse(&heading(json!("Welcome")), "heading").unwrap();
    assert_eq!(stored, json!("Welcome"));
}

#[test]
fn different_metadata_is_stored_in_full() {
    let mut source = heading_default();
    source.storage_settings.insert("max_length".into(), json!(64));
    let stored = collapser()
        .collapse(&PropSource::Static(source.clone()), "heading")
        .unwrap();
    assert_eq!(stored["sourceType"], json!("static"));
    assert_eq!(stored["storageSettings"]["max_length"], json!(64));
}

#[test]
fn non_static_sources_are_stored_in_full() {
    let dynamic = PropSource::dynamic("node.title.value").unwrap();
    let stored = collapser().collapse(&dynamic, "heading").unwrap();
    assert_eq!(stored, json!({"sourceType": "dynamic", "expression": "node.title.value"}));
    assert_eq!(collapser().uncollapse(&stored, "heading").unwrap(), dynamic);
}

#[test]
fn prop_without_default_is_stored_in_full() {
    let stored = collapser().collapse(&heading(json!("x")), "subtitle").unwrap();
    assert_eq!(stored["sourceType"], json!("static"));
}

// ── Uncollapse ───────────────────────────────────────────────────

#[test]
fn bare_value_restores_default_metadata() {
    let restored = collapser().uncollapse(&json!("Welcome"), "heading").unwrap();
    assert_eq!(restored, heading(json!("Welcome")));
}

#[test]
fn empty_value_is_allowed_while_editing() {
    let restored = collapser().uncollapse(&Value::Null, "heading").unwrap();
    assert_eq!(restored, heading(Value::Null));
}

#[test]
fn bare_value_for_unknown_prop_fails() {
    let err = collapser().uncollapse(&json!("x"), "subtitle").unwrap_err();
    assert!(matches!(err, PropSourceError::UnknownProp(p) if p == "subtitle"));
}

// ── Round trip ───────────────────────────────────────────────────

fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,24}".prop_map(Value::from),
        prop::collection::vec("[a-z]{0,8}", 0..4).prop_map(|v| json!(v)),
    ]
}

proptest! {
    #[test]
    fn collapse_then_uncollapse_restores_source(value in any_value()) {
        let collapser = collapser();
        let source = heading(value);
        let stored = collapser.collapse(&source, "heading").unwrap();
        prop_assert_eq!(collapser.uncollapse(&stored, "heading").unwrap(), source);
    }
}
