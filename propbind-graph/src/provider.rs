use crate::catalog::standard_field_types;
use crate::definition::{EntityTypeRef, FieldDefinition, FieldTypeDefinition, PropertyDefinition};
use std::collections::BTreeMap;

/// Read-only metadata about the host's entity types and fields.
///
/// Implemented by the host CMS. Every query is side-effect free; callers
/// may invoke them repeatedly within one request.
pub trait TypedDataProvider {
    /// All entity types, each with its bundles (empty if unbundled).
    fn entity_types(&self) -> Vec<EntityTypeRef>;

    /// Fields of `entity_type`.
    ///
    /// With a bundle: every field of that bundle, base fields included.
    /// Without: only the base fields common to all bundles.
    fn list_fields(&self, entity_type: &str, bundle: Option<&str>) -> Vec<FieldDefinition>;

    fn field_type(&self, field_type: &str) -> Option<FieldTypeDefinition>;

    /// Item-level properties of a field type; empty for unknown types.
    fn field_properties(&self, field_type: &str) -> Vec<PropertyDefinition> {
        self.field_type(field_type)
            .map(|definition| definition.properties)
            .unwrap_or_default()
    }

    /// Entity type (and allowed bundles) a reference field points at.
    ///
    /// `None` when the target cannot be resolved; the walker skips such
    /// references instead of failing.
    fn resolve_reference_target(
        &self,
        entity_type: &str,
        field: &FieldDefinition,
    ) -> Option<EntityTypeRef>;

    fn entity_type_label(&self, entity_type: &str) -> Option<String> {
        let _ = entity_type;
        None
    }

    fn bundle_label(&self, entity_type: &str, bundle: &str) -> Option<String> {
        let _ = (entity_type, bundle);
        None
    }

    /// Looks up one field by name.
    fn field(
        &self,
        entity_type: &str,
        bundle: Option<&str>,
        name: &str,
    ) -> Option<FieldDefinition> {
        self.list_fields(entity_type, bundle)
            .into_iter()
            .find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Default)]
struct EntityTypeEntry {
    label: String,
    bundles: Vec<(String, String)>,
    base_fields: Vec<FieldDefinition>,
    bundle_fields: BTreeMap<String, Vec<FieldDefinition>>,
}

/// A [`TypedDataProvider`] holding all metadata in memory.
///
/// Fields are returned in insertion order: base fields first, then the
/// bundle's own fields.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypedData {
    entity_types: BTreeMap<String, EntityTypeEntry>,
    field_types: BTreeMap<String, FieldTypeDefinition>,
}

impl InMemoryTypedData {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider preloaded with [`standard_field_types`].
    pub fn with_standard_field_types() -> Self {
        standard_field_types()
            .into_iter()
            .fold(Self::new(), Self::with_field_type)
    }

    #[must_use]
    pub fn with_field_type(mut self, definition: FieldTypeDefinition) -> Self {
        self.field_types.insert(definition.id.clone(), definition);
        self
    }

    #[must_use]
    pub fn with_entity_type(mut self, entity_type: &str, label: &str) -> Self {
        self.entity_types.entry(entity_type.into()).or_default().label = label.into();
        self
    }

    #[must_use]
    pub fn with_bundle(mut self, entity_type: &str, bundle: &str, label: &str) -> Self {
        let entry = self.entity_types.entry(entity_type.into()).or_default();
        entry.bundles.retain(|(id, _)| id != bundle);
        entry.bundles.push((bundle.into(), label.into()));
        self
    }

    /// Adds a field present on every bundle of `entity_type`.
    #[must_use]
    pub fn with_base_field(mut self, entity_type: &str, mut field: FieldDefinition) -> Self {
        field.is_base = true;
        self.entity_types
            .entry(entity_type.into())
            .or_default()
            .base_fields
            .push(field);
        self
    }

    /// Adds a field to one bundle of `entity_type`.
    #[must_use]
    pub fn with_bundle_field(
        mut self,
        entity_type: &str,
        bundle: &str,
        mut field: FieldDefinition,
    ) -> Self {
        field.is_base = false;
        let entry = self.entity_types.entry(entity_type.into()).or_default();
        if !entry.bundles.iter().any(|(id, _)| id == bundle) {
            entry.bundles.push((bundle.into(), bundle.into()));
        }
        entry
            .bundle_fields
            .entry(bundle.into())
            .or_default()
            .push(field);
        self
    }
}

impl TypedDataProvider for InMemoryTypedData {
    fn entity_types(&self) -> Vec<EntityTypeRef> {
        self.entity_types
            .iter()
            .map(|(id, entry)| EntityTypeRef {
                entity_type: id.clone(),
                bundles: entry.bundles.iter().map(|(b, _)| b.clone()).collect(),
            })
            .collect()
    }

    fn list_fields(&self, entity_type: &str, bundle: Option<&str>) -> Vec<FieldDefinition> {
        let Some(entry) = self.entity_types.get(entity_type) else {
            return Vec::new();
        };
        let mut fields = entry.base_fields.clone();
        if let Some(bundle) = bundle {
            if let Some(own) = entry.bundle_fields.get(bundle) {
                fields.extend(own.iter().cloned());
            }
        }
        fields
    }

    fn field_type(&self, field_type: &str) -> Option<FieldTypeDefinition> {
        self.field_types.get(field_type).cloned()
    }

    fn resolve_reference_target(
        &self,
        _entity_type: &str,
        field: &FieldDefinition,
    ) -> Option<EntityTypeRef> {
        let target = field.target.as_ref()?;
        let entry = self.entity_types.get(&target.entity_type)?;
        // Drop bundles that no longer exist on the target type.
        let bundles: Vec<String> = target
            .bundles
            .iter()
            .filter(|b| entry.bundles.iter().any(|(id, _)| id == *b))
            .cloned()
            .collect();
        if bundles.is_empty() && !target.bundles.is_empty() {
            return None;
        }
        Some(EntityTypeRef {
            entity_type: target.entity_type.clone(),
            bundles,
        })
    }

    fn entity_type_label(&self, entity_type: &str) -> Option<String> {
        self.entity_types.get(entity_type).map(|e| e.label.clone())
    }

    fn bundle_label(&self, entity_type: &str, bundle: &str) -> Option<String> {
        self.entity_types
            .get(entity_type)?
            .bundles
            .iter()
            .find(|(id, _)| id == bundle)
            .map(|(_, label)| label.clone())
    }
}
