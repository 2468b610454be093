//! Form display order of an entity type's fields.

use std::collections::BTreeMap;

/// Field order of the host's entity form, used to sort suggestions.
pub trait FormDisplayOrder {
    /// Field names in display order; fields not listed sort last.
    fn order(&self, entity_type: &str, bundle: Option<&str>) -> Vec<String>;
}

/// Display orders held in memory. Unknown types have no order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormDisplayOrder {
    orders: BTreeMap<(String, Option<String>), Vec<String>>,
}

impl InMemoryFormDisplayOrder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_order(mut self, entity_type: &str, bundle: Option<&str>, fields: &[&str]) -> Self {
        self.orders.insert(
            (entity_type.to_string(), bundle.map(str::to_string)),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }
}

impl FormDisplayOrder for InMemoryFormDisplayOrder {
    fn order(&self, entity_type: &str, bundle: Option<&str>) -> Vec<String> {
        self.orders
            .get(&(entity_type.to_string(), bundle.map(str::to_string)))
            .cloned()
            .unwrap_or_default()
    }
}
