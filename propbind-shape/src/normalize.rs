//! Schema fragment → [`PropShape`].

use crate::shape::{JsonSchemaType, PropShape};
use crate::{Result, ShapeError};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// URI prefix for references to well-known shape definitions.
pub const DEFINITIONS_PREFIX: &str = "json-schema-definitions://propbind/";

/// Keywords that describe a prop to humans but never constrain its values.
const ANNOTATIONS: &[&str] = &[
    "title",
    "description",
    "examples",
    "default",
    "$comment",
    "meta:enum",
    "x-translation-context",
];

/// Guards against definitions that reference each other in a loop.
const MAX_REF_HOPS: usize = 8;

/// Deepest `properties`/`items` nesting accepted. Bounds self-referencing
/// definitions that recurse through a sub-schema.
const MAX_NESTING: usize = 32;

/// Resolves `$ref` shorthands and coerces fragments into [`PropShape`]s.
#[derive(Debug, Clone)]
pub struct ShapeNormalizer {
    definitions: BTreeMap<String, Value>,
}

impl Default for ShapeNormalizer {
    fn default() -> Self {
        let mut definitions = BTreeMap::new();
        definitions.insert(
            "image-uri".to_string(),
            json!({
                "type": "string",
                "format": "uri-reference",
                "contentMediaType": "image/*",
                "x-allowed-schemes": ["http", "https"],
            }),
        );
        definitions.insert(
            "image".to_string(),
            json!({
                "type": "object",
                "required": ["src"],
                "properties": {
                    "src": { "$ref": "json-schema-definitions://propbind/image-uri" },
                    "alt": { "type": "string" },
                    "width": { "type": "integer" },
                    "height": { "type": "integer" },
                },
            }),
        );
        definitions.insert(
            "video".to_string(),
            json!({
                "type": "object",
                "required": ["src"],
                "properties": {
                    "src": {
                        "type": "string",
                        "format": "uri-reference",
                        "contentMediaType": "video/*",
                        "x-allowed-schemes": ["http", "https"],
                    },
                    "poster": { "$ref": "json-schema-definitions://propbind/image-uri" },
                },
            }),
        );
        Self { definitions }
    }
}

impl ShapeNormalizer {
    /// Creates a normalizer with only the well-known definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a named definition.
    #[must_use]
    pub fn with_definition(mut self, name: impl Into<String>, body: Value) -> Self {
        self.definitions.insert(name.into(), body);
        self
    }

    /// Names of all known definitions.
    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Normalizes a raw schema fragment.
    ///
    /// Fails with [`ShapeError::UnknownShapeReference`] when a `$ref` (at
    /// any depth) names an unknown definition.
    pub fn normalize(&self, raw: &Value) -> Result<PropShape> {
        self.normalize_nested(raw, 0)
    }

    fn normalize_nested(&self, raw: &Value, depth: usize) -> Result<PropShape> {
        if depth > MAX_NESTING {
            return Err(ShapeError::Malformed(format!(
                "sub-schemas nested deeper than {MAX_NESTING} levels"
            )));
        }
        let map = raw
            .as_object()
            .ok_or_else(|| ShapeError::Malformed(format!("expected an object, got {raw}")))?;
        let mut map = self.resolve_ref(map)?;
        for annotation in ANNOTATIONS {
            map.remove(*annotation);
        }

        let schema_type = match map.remove("type") {
            None => return Err(ShapeError::MissingType),
            Some(Value::String(s)) => {
                JsonSchemaType::parse(&s).ok_or(ShapeError::UnsupportedType(s))?
            }
            Some(other) => return Err(ShapeError::UnsupportedType(other.to_string())),
        };

        let mut shape = PropShape::scalar(schema_type);
        match schema_type {
            JsonSchemaType::Object => {
                if let Some(properties) = map.remove("properties") {
                    let properties = properties.as_object().ok_or_else(|| {
                        ShapeError::Malformed("`properties` must be an object".into())
                    })?;
                    for (name, sub) in properties {
                        shape
                            .properties
                            .insert(name.clone(), self.normalize_nested(sub, depth + 1)?);
                    }
                }
                if let Some(required) = map.remove("required") {
                    shape.required = required_names(&required)?;
                }
            }
            JsonSchemaType::Array => {
                if let Some(items) = map.remove("items") {
                    shape.items = Some(Box::new(self.normalize_nested(&items, depth + 1)?));
                }
            }
            _ => {}
        }
        shape.constraints = map.into_iter().collect();
        Ok(shape)
    }

    fn resolve_ref(&self, map: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut current = map.clone();
        for _ in 0..MAX_REF_HOPS {
            let Some(reference) = current.remove("$ref") else {
                return Ok(current);
            };
            let reference = reference
                .as_str()
                .ok_or_else(|| ShapeError::Malformed("`$ref` must be a string".into()))?
                .to_string();
            let body = self
                .lookup(&reference)
                .ok_or_else(|| ShapeError::UnknownShapeReference(reference.clone()))?;
            let mut merged = body.clone();
            // Sibling keywords override the referenced body.
            for (key, value) in current {
                merged.insert(key, value);
            }
            current = merged;
        }
        Err(ShapeError::Malformed(format!(
            "`$ref` chain longer than {MAX_REF_HOPS} hops"
        )))
    }

    fn lookup(&self, reference: &str) -> Option<&Map<String, Value>> {
        let name = reference
            .strip_prefix(DEFINITIONS_PREFIX)
            .or_else(|| {
                reference
                    .starts_with("json-schema-definitions://")
                    .then(|| reference.rsplit('/').next())
                    .flatten()
            })
            .unwrap_or(reference);
        self.definitions.get(name).and_then(Value::as_object)
    }
}

fn required_names(value: &Value) -> Result<BTreeSet<String>> {
    let list = value
        .as_array()
        .ok_or_else(|| ShapeError::Malformed("`required` must be an array".into()))?;
    list.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| ShapeError::Malformed("`required` entries must be strings".into()))
        })
        .collect()
}
