//! The prop source sum type.

use crate::error::{PropSourceError, Result};
use propbind_graph::{PrimitiveKind, PropertyDefinition, TypedDataProvider};
use propbind_types::{AdapterId, ComponentId, FieldExpression};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key carrying the variant of a serialized prop source.
pub const SOURCE_TYPE_KEY: &str = "sourceType";

/// Which field type properties a static value is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaticExpression {
    /// One property holds the whole value (`"value"`, `"uri"`).
    Property(String),
    /// Object property name → field type property.
    Object(BTreeMap<String, String>),
}

/// A literal value, described as if it were stored in a field of
/// `field_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticPropSource {
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub storage_settings: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub instance_settings: Map<String, Value>,
    pub expression: StaticExpression,
    /// An array holds one entry per item.
    pub value: Value,
}

impl StaticPropSource {
    pub fn new(field_type: &str, expression: StaticExpression, value: Value) -> Self {
        Self {
            field_type: field_type.into(),
            storage_settings: Map::new(),
            instance_settings: Map::new(),
            expression,
            value,
        }
    }

    /// True if everything but the value equals `other`.
    pub fn same_metadata(&self, other: &StaticPropSource) -> bool {
        self.field_type == other.field_type
            && self.storage_settings == other.storage_settings
            && self.instance_settings == other.instance_settings
            && self.expression == other.expression
    }

    /// Checks the value against the item properties of its field type.
    pub fn validate<P: TypedDataProvider + ?Sized>(&self, provider: &P) -> Result<()> {
        let definition = provider
            .field_type(&self.field_type)
            .ok_or_else(|| self.invalid(format!("unknown field type '{}'", self.field_type)))?;
        let property = |name: &str| {
            definition
                .property(name)
                .ok_or_else(|| self.invalid(format!("field type has no property '{name}'")))
        };

        let items: Vec<&Value> = match &self.value {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };
        for item in items {
            match &self.expression {
                StaticExpression::Property(name) => self.check(property(name)?, item)?,
                StaticExpression::Object(mapping) => {
                    let fields = item
                        .as_object()
                        .ok_or_else(|| self.invalid(format!("expected an object, got {item}")))?;
                    for (key, name) in mapping {
                        self.check(property(name)?, fields.get(key).unwrap_or(&Value::Null))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check(&self, property: &PropertyDefinition, value: &Value) -> Result<()> {
        if value.is_null() {
            if property.required {
                return Err(self.invalid(format!("'{}' is required", property.name)));
            }
            return Ok(());
        }
        let primitive = property.primitive.unwrap_or(PrimitiveKind::String);
        if !primitive.accepts(value) {
            return Err(self.invalid(format!(
                "'{}' expects {primitive:?}, got {value}",
                property.name
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> PropSourceError {
        PropSourceError::InvalidStaticValue {
            field_type: self.field_type.clone(),
            reason,
        }
    }
}

/// A value read from the host entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicPropSource {
    pub expression: FieldExpression,
}

/// A component's own example value whose URLs are relative to the
/// component's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRelativeUrlPropSource {
    pub value: Value,
    pub json_schema: Value,
    pub component_id: ComponentId,
}

/// The output of an adapter fed by other prop sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptedPropSource {
    pub adapter_id: AdapterId,
    #[serde(default)]
    pub inputs: BTreeMap<String, PropSource>,
}

/// Where a prop's value comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sourceType")]
pub enum PropSource {
    #[serde(rename = "static")]
    Static(StaticPropSource),
    #[serde(rename = "dynamic")]
    Dynamic(DynamicPropSource),
    #[serde(rename = "default-relative-url")]
    DefaultRelativeUrl(DefaultRelativeUrlPropSource),
    #[serde(rename = "adapter")]
    Adapted(AdaptedPropSource),
}

impl PropSource {
    /// A dynamic source from an expression's canonical form.
    pub fn dynamic(expression: &str) -> Result<Self> {
        Ok(Self::Dynamic(DynamicPropSource {
            expression: expression.parse()?,
        }))
    }

    pub fn source_type(&self) -> &'static str {
        match self {
            Self::Static(_) => "static",
            Self::Dynamic(_) => "dynamic",
            Self::DefaultRelativeUrl(_) => "default-relative-url",
            Self::Adapted(_) => "adapter",
        }
    }

    /// Validates static values, including those feeding adapters. Other
    /// sources are checked at evaluation time.
    pub fn validate_static<P: TypedDataProvider + ?Sized>(&self, provider: &P) -> Result<()> {
        match self {
            Self::Static(source) => source.validate(provider),
            Self::Adapted(source) => source
                .inputs
                .values()
                .try_for_each(|input| input.validate_static(provider)),
            Self::Dynamic(_) | Self::DefaultRelativeUrl(_) => Ok(()),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
