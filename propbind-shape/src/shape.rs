use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// The JSON type a prop shape declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonSchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl JsonSchemaType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Object => ShapeKind::Object,
            Self::Array => ShapeKind::Array,
            _ => ShapeKind::Scalar,
        }
    }
}

/// Structural category of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Scalar,
    Object,
    Array,
}

/// A normalized, immutable prop shape.
///
/// Annotations (`title`, `description`, `examples`, …) are gone and every
/// `$ref` is resolved, so two shapes are equal exactly when they constrain
/// values the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropShape {
    pub schema_type: JsonSchemaType,
    /// Remaining keywords (`format`, `enum`, `maxItems`, …).
    pub constraints: BTreeMap<String, Value>,
    /// Item shape, arrays only.
    pub items: Option<Box<PropShape>>,
    /// Named sub-shapes, objects only.
    pub properties: BTreeMap<String, PropShape>,
    /// Required sub-property names, objects only.
    pub required: BTreeSet<String>,
}

impl PropShape {
    /// A scalar shape without constraints.
    pub fn scalar(schema_type: JsonSchemaType) -> Self {
        Self {
            schema_type,
            constraints: BTreeMap::new(),
            items: None,
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
        }
    }

    /// Shorthand for `{type: string, format: <format>}`.
    pub fn string_with_format(format: &str) -> Self {
        Self::scalar(JsonSchemaType::String).with_constraint("format", Value::from(format))
    }

    /// An array of `items`, with `maxItems` when given.
    pub fn array_of(items: PropShape, max_items: Option<u32>) -> Self {
        let mut shape = Self::scalar(JsonSchemaType::Array);
        shape.items = Some(Box::new(items));
        if let Some(max) = max_items {
            shape.constraints.insert("maxItems".into(), Value::from(max));
        }
        shape
    }

    /// An object with the given sub-shapes and required names.
    pub fn object<I, R>(properties: I, required: R) -> Self
    where
        I: IntoIterator<Item = (String, PropShape)>,
        R: IntoIterator<Item = String>,
    {
        let mut shape = Self::scalar(JsonSchemaType::Object);
        shape.properties = properties.into_iter().collect();
        shape.required = required.into_iter().collect();
        shape
    }

    #[must_use]
    pub fn with_constraint(mut self, keyword: &str, value: Value) -> Self {
        self.constraints.insert(keyword.to_string(), value);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.schema_type.kind()
    }

    pub fn constraint(&self, keyword: &str) -> Option<&Value> {
        self.constraints.get(keyword)
    }

    /// The `format` keyword, if it is a string.
    pub fn format(&self) -> Option<&str> {
        self.constraint("format").and_then(Value::as_str)
    }

    /// True for string shapes whose format is a URI or IRI variant.
    pub fn is_uri_like(&self) -> bool {
        self.schema_type == JsonSchemaType::String
            && matches!(
                self.format(),
                Some("uri" | "uri-reference" | "iri" | "iri-reference")
            )
    }

    /// Renders the canonical schema fragment for this shape.
    ///
    /// Normalizing the result yields an equal shape.
    pub fn to_schema(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::from(self.schema_type.as_str()));
        for (keyword, value) in &self.constraints {
            map.insert(keyword.clone(), value.clone());
        }
        if let Some(items) = &self.items {
            map.insert("items".into(), items.to_schema());
        }
        if !self.properties.is_empty() {
            let properties = self
                .properties
                .iter()
                .map(|(name, shape)| (name.clone(), shape.to_schema()))
                .collect();
            map.insert("properties".into(), Value::Object(properties));
        }
        if !self.required.is_empty() {
            let required = self.required.iter().cloned().map(Value::from).collect();
            map.insert("required".into(), Value::Array(required));
        }
        Value::Object(map)
    }

    /// SHA-256 of the canonical schema, hex encoded.
    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(self.to_schema().to_string().as_bytes()))
    }
}
