//! Evaluating prop sources to concrete values.

use crate::entity::EntityData;
use crate::error::{PropSourceError, Result};
use crate::source::{
    AdaptedPropSource, DefaultRelativeUrlPropSource, DynamicPropSource, PropSource,
};
use propbind_shape::{PropShape, ShapeKind, ShapeNormalizer};
use propbind_types::{
    AdapterId, ComponentId, DirectField, FieldExpression, MappedField, ObjectField, ReferenceField,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Runs adapters on already evaluated inputs.
pub trait AdapterExecutor {
    fn execute(
        &self,
        adapter: &AdapterId,
        inputs: &BTreeMap<String, Value>,
    ) -> std::result::Result<Value, String>;
}

/// Everything a source may need at evaluation time. All parts are optional;
/// a source that needs a missing part fails with a discriminable error.
#[derive(Default)]
pub struct EvaluationContext<'a> {
    host: Option<&'a dyn EntityData>,
    adapters: Option<&'a dyn AdapterExecutor>,
    base_paths: BTreeMap<ComponentId, String>,
    normalizer: ShapeNormalizer,
}

impl<'a> EvaluationContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_host(mut self, host: &'a dyn EntityData) -> Self {
        self.host = Some(host);
        self
    }

    #[must_use]
    pub fn with_adapters(mut self, adapters: &'a dyn AdapterExecutor) -> Self {
        self.adapters = Some(adapters);
        self
    }

    /// URL path of a component's directory, for default relative URLs.
    #[must_use]
    pub fn with_component_base(mut self, component: ComponentId, base: &str) -> Self {
        self.base_paths.insert(component, base.to_string());
        self
    }

    pub fn host(&self) -> Option<&'a dyn EntityData> {
        self.host
    }
}

impl PropSource {
    /// Evaluates the source.
    ///
    /// `Ok(None)` means "no value": an empty static value, or a dynamic
    /// value that is optional or whose host is still being created. A
    /// required value missing from a saved host is an error.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, required: bool) -> Result<Option<Value>> {
        match self {
            Self::Static(source) => Ok(Some(source.value.clone()).filter(|v| !v.is_null())),
            Self::Dynamic(source) => evaluate_dynamic(source, ctx, required),
            Self::DefaultRelativeUrl(source) => {
                evaluate_default_relative_url(source, ctx).map(Some)
            }
            Self::Adapted(source) => evaluate_adapted(source, ctx),
        }
    }
}

fn evaluate_dynamic(
    source: &DynamicPropSource,
    ctx: &EvaluationContext<'_>,
    required: bool,
) -> Result<Option<Value>> {
    let expression = &source.expression;
    let host = ctx
        .host
        .ok_or_else(|| PropSourceError::HostContextRequired(expression.clone()))?;
    if host.entity_type() != expression.root_entity_type() {
        return Err(PropSourceError::HostMismatch {
            expression: expression.clone(),
            expected: expression.root_entity_type().to_string(),
            actual: host.entity_type().to_string(),
        });
    }

    match resolve(expression, host) {
        Some(value) => Ok(Some(value)),
        None if required && !host.is_new() => {
            Err(PropSourceError::RequiredValueMissing(expression.clone()))
        }
        None => {
            debug!(
                expression = %expression,
                is_new = host.is_new(),
                "Dynamic prop source has no value"
            );
            Ok(None)
        }
    }
}

fn evaluate_adapted(
    source: &AdaptedPropSource,
    ctx: &EvaluationContext<'_>,
) -> Result<Option<Value>> {
    let executor = ctx.adapters.ok_or_else(|| PropSourceError::AdapterFailed {
        adapter: source.adapter_id.clone(),
        reason: "no adapter executor available".into(),
    })?;

    let mut inputs = BTreeMap::new();
    for (name, input) in &source.inputs {
        match input.evaluate(ctx, true)? {
            Some(value) => {
                inputs.insert(name.clone(), value);
            }
            // An input of an unsaved host is not there yet.
            None => return Ok(None),
        }
    }

    executor
        .execute(&source.adapter_id, &inputs)
        .map(Some)
        .map_err(|reason| PropSourceError::AdapterFailed {
            adapter: source.adapter_id.clone(),
            reason,
        })
}

fn evaluate_default_relative_url(
    source: &DefaultRelativeUrlPropSource,
    ctx: &EvaluationContext<'_>,
) -> Result<Value> {
    let base = ctx
        .base_paths
        .get(&source.component_id)
        .ok_or_else(|| PropSourceError::UnknownComponent(source.component_id.clone()))?;
    let shape = ctx.normalizer.normalize(&source.json_schema)?;
    Ok(resolve_urls(&source.value, &shape, base))
}

/// Resolves every URI-like string in `value` against `base`, guided by
/// `shape`.
fn resolve_urls(value: &Value, shape: &PropShape, base: &str) -> Value {
    match (value, shape.kind()) {
        (Value::String(url), ShapeKind::Scalar) if shape.is_uri_like() => {
            Value::String(resolve_url(base, url))
        }
        (Value::Object(fields), ShapeKind::Object) => Value::Object(
            fields
                .iter()
                .map(|(key, v)| {
                    let resolved = match shape.properties.get(key) {
                        Some(sub) => resolve_urls(v, sub, base),
                        None => v.clone(),
                    };
                    (key.clone(), resolved)
                })
                .collect(),
        ),
        (Value::Array(items), ShapeKind::Array) => match shape.items.as_deref() {
            Some(item_shape) => {
                Value::Array(items.iter().map(|v| resolve_urls(v, item_shape, base)).collect())
            }
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Absolute URLs and root-relative paths are kept as they are.
pub fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with('/') || url.contains("://") || url.starts_with("data:") {
        return url.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches("./"))
}

/// Reads the value an expression addresses on `entity`.
///
/// Without a delta a multi-valued field yields an array of its items'
/// values. Missing values are `None`, never an error.
pub fn resolve(expression: &FieldExpression, entity: &dyn EntityData) -> Option<Value> {
    match expression {
        FieldExpression::Direct(d) => resolve_direct(d, entity),
        FieldExpression::Reference(r) => resolve_reference(r, entity),
        FieldExpression::Object(o) => resolve_object(o, entity),
    }
}

/// Item deltas to read, and whether the result is a list.
fn item_deltas(entity: &dyn EntityData, field: &str, delta: Option<u32>) -> (Vec<usize>, bool) {
    match delta {
        Some(delta) => (vec![delta as usize], false),
        None if entity.cardinality(field).is_multiple() => {
            ((0..entity.item_count(field).unwrap_or(0)).collect(), true)
        }
        None => (vec![0], false),
    }
}

fn collect(values: Vec<Value>, as_list: bool) -> Option<Value> {
    if as_list {
        (!values.is_empty()).then_some(Value::Array(values))
    } else {
        values.into_iter().next()
    }
}

fn resolve_direct(d: &DirectField, entity: &dyn EntityData) -> Option<Value> {
    let (deltas, as_list) = item_deltas(entity, &d.field_name, d.delta);
    let values = deltas
        .into_iter()
        .filter_map(|i| entity.property(&d.field_name, i, &d.property_name))
        .collect();
    collect(values, as_list)
}

fn resolve_reference(r: &ReferenceField, entity: &dyn EntityData) -> Option<Value> {
    let referencer = &r.referencer;
    let (deltas, as_list) = item_deltas(entity, &referencer.field_name, referencer.delta);
    let values = deltas
        .into_iter()
        .filter_map(|i| {
            entity
                .referenced(&referencer.field_name, i, &referencer.property_name)
                .and_then(|target| resolve(&r.target, target))
        })
        .collect();
    collect(values, as_list)
}

fn resolve_object(o: &ObjectField, entity: &dyn EntityData) -> Option<Value> {
    let (deltas, as_list) = item_deltas(entity, &o.field_name, o.delta);
    let values = deltas
        .into_iter()
        .filter_map(|i| {
            let object: Map<String, Value> = o
                .property_mapping
                .iter()
                .filter_map(|(name, mapped)| {
                    resolve_mapped_at(mapped, entity, i).map(|v| (name.clone(), v))
                })
                .collect();
            (!object.is_empty()).then_some(Value::Object(object))
        })
        .collect();
    collect(values, as_list)
}

/// Reads one object property from item `delta` of its field.
fn resolve_mapped_at(mapped: &MappedField, entity: &dyn EntityData, delta: usize) -> Option<Value> {
    match mapped {
        MappedField::Direct(d) => entity.property(&d.field_name, delta, &d.property_name),
        MappedField::Reference(r) => entity
            .referenced(&r.referencer.field_name, delta, &r.referencer.property_name)
            .and_then(|target| resolve(&r.target, target)),
    }
}
