//! Per-prop suggestions for a whole component.

use crate::adapter::{AdapterMatcher, AdapterRegistry};
use crate::cache::MatchCache;
use crate::display::FormDisplayOrder;
use crate::error::Result;
use crate::hierarchy::{build_hierarchy, HierarchicalSuggestion};
use crate::labeler::Labeler;
use crate::matcher::{FieldInstanceMatcher, MatchScope};
use propbind_graph::TypedDataProvider;
use propbind_shape::{PropShape, ShapeCache};
use propbind_types::{AdapterId, Cardinality, ComponentId, FieldExpression, SuggestionId};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One prop of a component, with its normalized shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PropDeclaration {
    pub name: String,
    pub shape: PropShape,
    pub required: bool,
}

impl PropDeclaration {
    pub fn new(name: &str, shape: PropShape, required: bool) -> Self {
        Self {
            name: name.into(),
            shape,
            required,
        }
    }

    /// Declares a prop from its raw schema fragment.
    pub fn from_schema(
        name: &str,
        raw: &Value,
        required: bool,
        shapes: &ShapeCache,
    ) -> Result<Self> {
        let shape = shapes.normalize(raw)?;
        Ok(Self::new(name, PropShape::clone(&shape), required))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedInstance {
    pub id: SuggestionId,
    pub label: String,
    pub expression: FieldExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedAdapter {
    pub id: SuggestionId,
    pub label: String,
    pub adapter_id: AdapterId,
}

/// Candidate bindings for one prop, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub prop_name: String,
    pub required: bool,
    /// Unique by label and by expression.
    pub instances: Vec<SuggestedInstance>,
    pub adapters: Vec<SuggestedAdapter>,
}

/// [`Suggestion`] reshaped into a label tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchicalSuggestions {
    pub prop_name: String,
    pub required: bool,
    pub items: Vec<HierarchicalSuggestion>,
}

/// Runs field and adapter matching for every prop of a component and
/// orders, labels and identifies the results.
pub struct SuggestionAggregator<'a, P: TypedDataProvider + ?Sized> {
    matcher: &'a FieldInstanceMatcher<'a, P>,
    adapters: &'a dyn AdapterRegistry,
    labeler: &'a dyn Labeler,
    display: &'a dyn FormDisplayOrder,
    cache: Option<&'a MatchCache>,
}

impl<'a, P: TypedDataProvider + ?Sized> SuggestionAggregator<'a, P> {
    pub fn new(
        matcher: &'a FieldInstanceMatcher<'a, P>,
        adapters: &'a dyn AdapterRegistry,
        labeler: &'a dyn Labeler,
        display: &'a dyn FormDisplayOrder,
    ) -> Self {
        Self {
            matcher,
            adapters,
            labeler,
            display,
            cache: None,
        }
    }

    /// Memoizes match results in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a MatchCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Suggestions for each prop, in declaration order.
    ///
    /// With a `host`, only expressions rooted on the host entity type are
    /// kept and labels omit the entity type.
    pub fn suggest(
        &self,
        component: &ComponentId,
        props: &[PropDeclaration],
        host: Option<&MatchScope>,
    ) -> Vec<Suggestion> {
        props
            .iter()
            .map(|prop| {
                let suggestion = self.suggest_prop(prop, host);
                debug!(
                    component = %component,
                    prop = %prop.name,
                    instances = suggestion.instances.len(),
                    adapters = suggestion.adapters.len(),
                    "Computed prop suggestions"
                );
                suggestion
            })
            .collect()
    }

    /// Like [`suggest`](Self::suggest), with each prop's suggestions nested
    /// by label segment.
    pub fn suggest_hierarchical(
        &self,
        component: &ComponentId,
        props: &[PropDeclaration],
        host: Option<&MatchScope>,
    ) -> Vec<HierarchicalSuggestions> {
        self.suggest(component, props, host)
            .into_iter()
            .map(|suggestion| HierarchicalSuggestions {
                items: build_hierarchy(&suggestion),
                prop_name: suggestion.prop_name,
                required: suggestion.required,
            })
            .collect()
    }

    fn suggest_prop(&self, prop: &PropDeclaration, host: Option<&MatchScope>) -> Suggestion {
        let host_type = host.map(|h| h.entity_type.as_str());
        let matched = self
            .matched(prop, host)
            .into_iter()
            .filter(|e| host_type.is_none_or(|t| e.root_entity_type() == t));

        let mut labels = HashSet::new();
        let instances = self
            .in_display_order(matched)
            .into_iter()
            .filter_map(|expression| {
                let label = self.labeler.label(&expression, host_type);
                labels.insert(label.clone()).then(|| SuggestedInstance {
                    id: SuggestionId::for_expression(&expression),
                    label,
                    expression,
                })
            })
            .collect();

        let adapters = AdapterMatcher::new(self.adapters)
            .match_shape(&prop.shape)
            .into_iter()
            .map(|adapter| SuggestedAdapter {
                id: SuggestionId::for_adapter(&adapter.id),
                label: adapter.label,
                adapter_id: adapter.id,
            })
            .collect();

        Suggestion {
            prop_name: prop.name.clone(),
            required: prop.required,
            instances,
            adapters,
        }
    }

    fn matched(&self, prop: &PropDeclaration, host: Option<&MatchScope>) -> Vec<FieldExpression> {
        let run = || {
            self.matcher
                .match_shape(&prop.shape, prop.required, Cardinality::SINGLE, host)
        };
        match self.cache {
            Some(cache) => {
                let key = MatchCache::key(
                    self.matcher.config(),
                    &prop.shape,
                    prop.required,
                    Cardinality::SINGLE,
                    host,
                );
                cache.get_or_insert_with(key, run).as_ref().clone()
            }
            None => run(),
        }
    }

    /// Buckets expressions by root entity type and field, then orders the
    /// buckets by the form display. Unlisted fields keep their relative
    /// order after the listed ones.
    fn in_display_order(
        &self,
        expressions: impl Iterator<Item = FieldExpression>,
    ) -> Vec<FieldExpression> {
        let mut seen = HashSet::new();
        let mut buckets: Vec<((String, Option<String>, String), Vec<FieldExpression>)> = Vec::new();
        for expression in expressions {
            if !seen.insert(expression.to_string()) {
                continue;
            }
            let key = (
                expression.root_entity_type().to_string(),
                expression.root_bundle().map(str::to_string),
                expression.root_field_name().to_string(),
            );
            match buckets
                .iter_mut()
                .find(|((t, _, f), _)| *t == key.0 && *f == key.2)
            {
                Some((_, bucket)) => bucket.push(expression),
                None => buckets.push((key, vec![expression])),
            }
        }

        let mut orders: HashMap<(String, Option<String>), Vec<String>> = HashMap::new();
        let mut positioned: Vec<(usize, Vec<FieldExpression>)> = buckets
            .into_iter()
            .map(|((entity_type, bundle, field), bucket)| {
                let order = orders
                    .entry((entity_type.clone(), bundle.clone()))
                    .or_insert_with(|| self.display.order(&entity_type, bundle.as_deref()));
                let position = order.iter().position(|f| *f == field).unwrap_or(usize::MAX);
                (position, bucket)
            })
            .collect();
        positioned.sort_by_key(|(position, _)| *position);
        positioned.into_iter().flat_map(|(_, bucket)| bucket).collect()
    }
}
