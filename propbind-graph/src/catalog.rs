//! Field types most hosts ship with, described for matching.

use crate::definition::{FieldTypeDefinition, PrimitiveKind, PropertyDefinition};
use propbind_shape::{constraint, ConstraintOptions, FILE_REFERENCE, FORMATTED_TEXT};
use serde_json::{json, Value};

fn options(pairs: &[(&str, Value)]) -> ConstraintOptions {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn value(primitive: PrimitiveKind) -> PropertyDefinition {
    PropertyDefinition::value("value", "Value", primitive).required()
}

/// Standard field types: text, numbers, links, references, files, images.
pub fn standard_field_types() -> Vec<FieldTypeDefinition> {
    use PrimitiveKind::{Boolean, Float, Integer, String};

    vec![
        FieldTypeDefinition::new("string", "Text (plain)", Some("value"))
            .with_property(value(String)),
        FieldTypeDefinition::new("string_long", "Text (plain, long)", Some("value"))
            .with_property(value(String)),
        FieldTypeDefinition::new("text_long", "Text (formatted, long)", Some("value"))
            .with_property(value(String))
            .with_property(PropertyDefinition::internal("format", "Text format", String))
            .with_property(
                PropertyDefinition::value("processed", "Processed text", String)
                    .required()
                    .with_capability(FORMATTED_TEXT),
            ),
        FieldTypeDefinition::new("boolean", "Boolean", Some("value")).with_property(value(Boolean)),
        FieldTypeDefinition::new("integer", "Number (integer)", Some("value"))
            .with_property(value(Integer)),
        FieldTypeDefinition::new("float", "Number (float)", Some("value"))
            .with_property(value(Float)),
        FieldTypeDefinition::new("list_integer", "List (integer)", Some("value"))
            .with_property(value(Integer)),
        FieldTypeDefinition::new("list_string", "List (text)", Some("value"))
            .with_property(value(String)),
        FieldTypeDefinition::new("email", "Email", Some("value")).with_property(
            value(String).with_constraint(constraint::EMAIL, ConstraintOptions::new()),
        ),
        FieldTypeDefinition::new("uri", "URI", Some("value")).with_property(
            value(String)
                .with_constraint(constraint::URI, options(&[("allowRelative", json!(false))])),
        ),
        FieldTypeDefinition::new("link", "Link", Some("uri"))
            .with_property(
                PropertyDefinition::value("uri", "URI", String)
                    .required()
                    .with_constraint(constraint::URI, options(&[("allowRelative", json!(true))])),
            )
            .with_property(PropertyDefinition::value("title", "Link text", String))
            .with_property(PropertyDefinition::internal("options", "Options", String)),
        FieldTypeDefinition::new("datetime", "Date", Some("value")).with_property(
            value(String).with_constraint(
                constraint::DATE_TIME,
                options(&[("format", json!("date-time"))]),
            ),
        ),
        FieldTypeDefinition::new("entity_reference", "Entity reference", Some("target_id"))
            .with_property(
                PropertyDefinition::reference_shadow("target_id", "Target ID").required(),
            )
            .with_property(PropertyDefinition::reference("entity", "Entity")),
        FieldTypeDefinition::new("file", "File", Some("target_id"))
            .with_property(PropertyDefinition::reference_shadow("target_id", "File ID").required())
            .with_property(PropertyDefinition::reference("entity", "File"))
            .with_property(PropertyDefinition::value("description", "Description", String))
            .with_property(PropertyDefinition::internal("display", "Display", Boolean)),
        FieldTypeDefinition::new("image", "Image", Some("target_id"))
            .with_property(PropertyDefinition::reference_shadow("target_id", "File ID").required())
            .with_property(PropertyDefinition::reference("entity", "File"))
            .with_property(PropertyDefinition::value("alt", "Alternative text", String).required())
            .with_property(PropertyDefinition::value("title", "Title", String))
            .with_property(PropertyDefinition::value("width", "Width", Integer))
            .with_property(PropertyDefinition::value("height", "Height", Integer))
            .with_property(
                PropertyDefinition::value("uri", "Image URL", String)
                    .required()
                    .with_capability(FILE_REFERENCE)
                    .with_constraint(constraint::URI, options(&[("allowRelative", json!(false))]))
                    .with_constraint(constraint::MEDIA_TYPE, options(&[("mime", json!("image/*"))]))
                    .with_constraint(
                        constraint::URI_SCHEME,
                        options(&[("schemes", json!(["http", "https"]))]),
                    ),
            ),
        FieldTypeDefinition::new("password", "Password", Some("value"))
            .with_property(value(String)),
        FieldTypeDefinition::new("language", "Language", Some("value"))
            .with_property(value(String)),
        FieldTypeDefinition::new("uuid", "UUID", Some("value")).with_property(value(String)),
        FieldTypeDefinition::new("map", "Map", Some("value"))
            .with_property(PropertyDefinition::internal("value", "Value", String)),
    ]
}
