//! Adapters: computed transforms whose output can feed a prop.

use propbind_shape::PropShape;
use propbind_types::AdapterId;
use std::collections::BTreeMap;

/// An adapter as registered by its provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterDescriptor {
    pub id: AdapterId,
    pub label: String,
    /// Normalized shape of the value the adapter produces.
    pub output_shape: PropShape,
    /// Input name → normalized input shape.
    pub inputs: BTreeMap<String, PropShape>,
}

impl AdapterDescriptor {
    pub fn new(id: &str, label: &str, output_shape: PropShape) -> Self {
        Self {
            id: AdapterId::new(id),
            label: label.into(),
            output_shape,
            inputs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_input(mut self, name: &str, shape: PropShape) -> Self {
        self.inputs.insert(name.into(), shape);
        self
    }
}

/// Lookup of adapters by what they produce.
pub trait AdapterRegistry {
    fn find_by_output_shape(&self, shape: &PropShape) -> Vec<AdapterDescriptor>;

    fn get(&self, id: &AdapterId) -> Option<AdapterDescriptor>;
}

/// Adapters held in memory, in registration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdapterRegistry {
    adapters: Vec<AdapterDescriptor>,
}

impl InMemoryAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter`, replacing any adapter with the same id.
    #[must_use]
    pub fn with_adapter(mut self, adapter: AdapterDescriptor) -> Self {
        self.adapters.retain(|a| a.id != adapter.id);
        self.adapters.push(adapter);
        self
    }
}

impl AdapterRegistry for InMemoryAdapterRegistry {
    fn find_by_output_shape(&self, shape: &PropShape) -> Vec<AdapterDescriptor> {
        self.adapters
            .iter()
            .filter(|a| &a.output_shape == shape)
            .cloned()
            .collect()
    }

    fn get(&self, id: &AdapterId) -> Option<AdapterDescriptor> {
        self.adapters.iter().find(|a| &a.id == id).cloned()
    }
}

/// Finds adapters able to feed a prop shape.
pub struct AdapterMatcher<'a, R: AdapterRegistry + ?Sized> {
    registry: &'a R,
}

impl<'a, R: AdapterRegistry + ?Sized> AdapterMatcher<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Adapters producing exactly `shape`, sorted by id.
    pub fn match_shape(&self, shape: &PropShape) -> Vec<AdapterDescriptor> {
        let mut found = self.registry.find_by_output_shape(shape);
        found.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        found.dedup_by(|a, b| a.id == b.id);
        found
    }
}
