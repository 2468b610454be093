use propbind_shape::{ConstraintMap, ConstraintOptions, JsonSchemaType};
use propbind_types::Cardinality;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Primitive value type of a field item property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl PrimitiveKind {
    /// Whether values of this kind can feed a scalar shape of `schema_type`.
    ///
    /// Integers are numbers, so `number` accepts both numeric kinds.
    pub fn is_compatible_with(&self, schema_type: JsonSchemaType) -> bool {
        matches!(
            (schema_type, self),
            (JsonSchemaType::String, Self::String)
                | (JsonSchemaType::Integer, Self::Integer)
                | (JsonSchemaType::Number, Self::Integer | Self::Float)
                | (JsonSchemaType::Boolean, Self::Boolean)
        )
    }

    /// Whether a JSON value is representable by this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// What a property is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyRole {
    /// A regular value.
    Value,
    /// Resolves to another entity.
    Reference,
    /// Stores the id behind a `Reference` property (`target_id`).
    ReferenceShadow,
    /// Internal bookkeeping or a computed-source-only value.
    Internal,
}

/// One item-level property of a field type (`value`, `uri`, `alt`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub label: String,
    pub role: PropertyRole,
    /// Value type; `None` for references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<PrimitiveKind>,
    /// Always has a value when its item exists.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub constraints: ConstraintMap,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl PropertyDefinition {
    fn with_role(
        name: &str,
        label: &str,
        role: PropertyRole,
        primitive: Option<PrimitiveKind>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            role,
            primitive,
            required: false,
            constraints: ConstraintMap::new(),
            capabilities: BTreeSet::new(),
        }
    }

    /// Shorthand for a regular value property.
    pub fn value(name: &str, label: &str, primitive: PrimitiveKind) -> Self {
        Self::with_role(name, label, PropertyRole::Value, Some(primitive))
    }

    /// Shorthand for an entity reference property.
    pub fn reference(name: &str, label: &str) -> Self {
        Self::with_role(name, label, PropertyRole::Reference, None)
    }

    /// Shorthand for the id property shadowing a reference.
    pub fn reference_shadow(name: &str, label: &str) -> Self {
        Self::with_role(name, label, PropertyRole::ReferenceShadow, Some(PrimitiveKind::Integer))
    }

    /// Shorthand for an internal property.
    pub fn internal(name: &str, label: &str, primitive: PrimitiveKind) -> Self {
        Self::with_role(name, label, PropertyRole::Internal, Some(primitive))
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: &str, options: ConstraintOptions) -> Self {
        self.constraints.insert(constraint.into(), options);
        self
    }

    #[must_use]
    pub fn with_capability(mut self, capability: &str) -> Self {
        self.capabilities.insert(capability.into());
        self
    }
}

/// A field type: its item properties and which one is the main property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTypeDefinition {
    pub id: String,
    pub label: String,
    pub properties: Vec<PropertyDefinition>,
    /// The property a bare value maps to (`value`, `uri`, `target_id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_property: Option<String>,
}

impl FieldTypeDefinition {
    pub fn new(id: &str, label: &str, main_property: Option<&str>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            properties: Vec::new(),
            main_property: main_property.map(str::to_string),
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// An entity type, optionally narrowed to some of its bundles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTypeRef {
    pub entity_type: String,
    /// Empty means "no bundle restriction".
    #[serde(default)]
    pub bundles: Vec<String>,
}

impl EntityTypeRef {
    pub fn new(entity_type: &str, bundles: &[&str]) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundles: bundles.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// A field on an entity type (or on one of its bundles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Present on every bundle of the entity type.
    #[serde(default)]
    pub is_base: bool,
    /// Field-type-level constraints; item property constraints override them.
    #[serde(default)]
    pub constraints: ConstraintMap,
    /// Configured reference target, for reference field types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityTypeRef>,
}

impl FieldDefinition {
    pub fn new(name: &str, label: &str, field_type: &str) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type: field_type.into(),
            required: false,
            cardinality: Cardinality::SINGLE,
            is_base: false,
            constraints: ConstraintMap::new(),
            target: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: &str, options: ConstraintOptions) -> Self {
        self.constraints.insert(constraint.into(), options);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: EntityTypeRef) -> Self {
        self.target = Some(target);
        self
    }
}
