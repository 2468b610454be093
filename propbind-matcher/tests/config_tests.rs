use pretty_assertions::assert_eq;
use propbind_matcher::{MatcherConfig, MatcherError};
use propbind_shape::{JsonSchemaType, PropShape, ShapeNormalizer};
use serde_json::json;

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn empty_toml_yields_defaults() {
    let config = MatcherConfig::from_toml_str("").unwrap();
    assert_eq!(config, MatcherConfig::default());
    assert_eq!(config.default_depth, 1);
    assert_eq!(config.object_depth, 2);
    assert_eq!(config.uri_depth, 2);
    assert!(config.denied_field_types.contains(&"password".to_string()));
}

#[test]
fn full_toml_is_parsed() {
    let config = MatcherConfig::from_toml_str(
        r#"
        default_depth = 0
        object_depth = 3
        uri_depth = 1
        denied_field_types = ["password"]
        denied_property_names = ["format"]

        [[field_type_exceptions]]
        field_type = "password"
        shape = { type = "string", pattern = "^\\*+$" }
        "#,
    )
    .unwrap();

    assert_eq!(config.default_depth, 0);
    assert_eq!(config.object_depth, 3);
    assert_eq!(config.uri_depth, 1);
    assert_eq!(config.denied_field_types, vec!["password"]);
    assert_eq!(config.denied_property_names, vec!["format"]);
    assert_eq!(config.field_type_exceptions.len(), 1);
    assert_eq!(
        config.field_type_exceptions[0].shape,
        json!({"type": "string", "pattern": "^\\*+$"})
    );
}

#[test]
fn invalid_toml_is_a_config_error() {
    let err = MatcherConfig::from_toml_str("default_depth = \"deep\"").unwrap_err();
    assert!(matches!(err, MatcherError::Config(_)));
}

// ── Loading from disk ────────────────────────────────────────────

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = MatcherConfig::load_from(dir.path().join("matcher.toml"));
    assert_eq!(config, MatcherConfig::default());
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matcher.toml");
    std::fs::write(&path, "object_depth = [").unwrap();
    assert_eq!(MatcherConfig::load_from(&path), MatcherConfig::default());
}

#[test]
fn valid_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matcher.toml");
    std::fs::write(&path, "object_depth = 4\n").unwrap();
    let config = MatcherConfig::load_from(&path);
    assert_eq!(config.object_depth, 4);
    assert_eq!(config.default_depth, 1);
}

// ── Derived settings ─────────────────────────────────────────────

#[test]
fn depth_depends_on_shape() {
    let config = MatcherConfig {
        default_depth: 1,
        object_depth: 5,
        uri_depth: 3,
        ..MatcherConfig::default()
    };
    let text = PropShape::scalar(JsonSchemaType::String);
    let uri = PropShape::string_with_format("uri");
    let object = PropShape::object([("alt".to_string(), text.clone())], []);

    assert_eq!(config.depth_for(&text), 1);
    assert_eq!(config.depth_for(&uri), 3);
    assert_eq!(config.depth_for(&object), 5);
    assert_eq!(config.depth_for(&PropShape::array_of(uri, None)), 3);
}

#[test]
fn walk_policy_normalizes_exception_shapes() {
    let policy = MatcherConfig::default()
        .walk_policy(&ShapeNormalizer::new())
        .unwrap();
    assert_eq!(policy.exceptions.len(), 1);
    assert_eq!(policy.exceptions[0].shape, PropShape::scalar(JsonSchemaType::Number));
    assert_eq!(policy.exceptions[0].field_type, "list_integer");
}

#[test]
fn walk_policy_rejects_unknown_exception_reference() {
    let mut config = MatcherConfig::default();
    config.field_type_exceptions[0].shape = json!({"$ref": "nonexistent"});
    let err = config.walk_policy(&ShapeNormalizer::new()).unwrap_err();
    assert!(matches!(err, MatcherError::Shape(_)));
}
