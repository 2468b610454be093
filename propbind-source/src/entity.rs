//! Host entity data that dynamic sources read from.

use propbind_types::Cardinality;
use serde_json::Value;
use std::collections::BTreeMap;

/// Read access to one content entity's field values.
pub trait EntityData {
    fn entity_type(&self) -> &str;

    fn bundle(&self) -> Option<&str>;

    /// True while the entity is being created and has never been saved.
    fn is_new(&self) -> bool;

    fn cardinality(&self, field: &str) -> Cardinality;

    /// Number of items in `field`; `None` if the entity has no such field.
    fn item_count(&self, field: &str) -> Option<usize>;

    fn property(&self, field: &str, delta: usize, property: &str) -> Option<Value>;

    /// The entity a reference property of one item points at.
    fn referenced(&self, field: &str, delta: usize, property: &str) -> Option<&dyn EntityData>;
}

/// One field item: property values and resolved references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldItem {
    values: BTreeMap<String, Value>,
    references: BTreeMap<String, InMemoryEntity>,
}

impl FieldItem {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, property: &str, value: Value) -> Self {
        self.values.insert(property.into(), value);
        self
    }

    #[must_use]
    pub fn with_reference(mut self, property: &str, entity: InMemoryEntity) -> Self {
        self.references.insert(property.into(), entity);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FieldValues {
    cardinality: Cardinality,
    items: Vec<FieldItem>,
}

/// An entity held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryEntity {
    entity_type: String,
    bundle: Option<String>,
    is_new: bool,
    fields: BTreeMap<String, FieldValues>,
}

impl InMemoryEntity {
    /// A saved entity.
    pub fn new(entity_type: &str, bundle: Option<&str>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.map(str::to_string),
            is_new: false,
            fields: BTreeMap::new(),
        }
    }

    /// Marks the entity as not yet saved.
    #[must_use]
    pub fn unsaved(mut self) -> Self {
        self.is_new = true;
        self
    }

    /// Declares a field (possibly empty).
    #[must_use]
    pub fn with_field(mut self, field: &str, cardinality: Cardinality) -> Self {
        self.fields
            .entry(field.into())
            .or_insert_with(|| FieldValues {
                cardinality,
                items: Vec::new(),
            })
            .cardinality = cardinality;
        self
    }

    /// Appends an item, declaring a single-valued field if needed.
    #[must_use]
    pub fn with_item(mut self, field: &str, item: FieldItem) -> Self {
        self.fields
            .entry(field.into())
            .or_insert_with(|| FieldValues {
                cardinality: Cardinality::SINGLE,
                items: Vec::new(),
            })
            .items
            .push(item);
        self
    }

    fn item(&self, field: &str, delta: usize) -> Option<&FieldItem> {
        self.fields.get(field)?.items.get(delta)
    }
}

impl EntityData for InMemoryEntity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn bundle(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    fn is_new(&self) -> bool {
        self.is_new
    }

    fn cardinality(&self, field: &str) -> Cardinality {
        self.fields
            .get(field)
            .map_or(Cardinality::SINGLE, |f| f.cardinality)
    }

    fn item_count(&self, field: &str) -> Option<usize> {
        self.fields.get(field).map(|f| f.items.len())
    }

    fn property(&self, field: &str, delta: usize, property: &str) -> Option<Value> {
        self.item(field, delta)?
            .values
            .get(property)
            .filter(|v| !v.is_null())
            .cloned()
    }

    fn referenced(&self, field: &str, delta: usize, property: &str) -> Option<&dyn EntityData> {
        self.item(field, delta)?
            .references
            .get(property)
            .map(|entity| entity as &dyn EntityData)
    }
}
