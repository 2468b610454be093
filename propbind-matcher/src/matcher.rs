//! Structural matching of prop shapes against the typed data graph.

use crate::config::MatcherConfig;
use crate::error::Result;
use propbind_graph::{
    DataLeaf, FieldDefinition, LeafKind, TypedDataGraphWalker, TypedDataProvider, WalkPolicy,
};
use propbind_shape::{
    DataConstraints, PropShape, ShapeKind, ShapeNormalizer, ShapeRequirementTranslator,
    ShapeRequirements,
};
use propbind_types::{Cardinality, FieldExpression, MappedField, ObjectField};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Restricts matching to one entity type, optionally one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchScope {
    pub entity_type: String,
    pub bundle: Option<String>,
}

impl MatchScope {
    pub fn new(entity_type: &str, bundle: Option<&str>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.map(str::to_string),
        }
    }
}

/// One scalar shape to match, with everything that narrows it.
#[derive(Clone, Copy)]
struct ScalarRequest<'s> {
    shape: &'s PropShape,
    /// The property itself must always have a value.
    not_null: bool,
    /// Every field on the chain must be required.
    required_fields: bool,
    cardinality: Cardinality,
    /// The prop is a list; never narrow a multi-valued field to one item.
    list: bool,
    depth: u32,
}

/// Fields sharing one group in object matching. Ordered by field name first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct FieldKey {
    field_name: String,
    entity_type: String,
    bundle: Option<String>,
    delta: Option<u32>,
}

impl FieldKey {
    fn of(expression: &FieldExpression) -> Self {
        Self {
            field_name: expression.root_field_name().to_string(),
            entity_type: expression.root_entity_type().to_string(),
            bundle: expression.root_bundle().map(str::to_string),
            delta: expression.root_delta(),
        }
    }
}

/// Finds every field expression able to feed a prop shape.
pub struct FieldInstanceMatcher<'a, P: TypedDataProvider + ?Sized> {
    provider: &'a P,
    config: MatcherConfig,
    policy: WalkPolicy,
}

impl<'a, P: TypedDataProvider + ?Sized> FieldInstanceMatcher<'a, P> {
    /// Fails only if a configured field-type exception has an invalid shape.
    pub fn new(
        provider: &'a P,
        config: MatcherConfig,
        normalizer: &ShapeNormalizer,
    ) -> Result<Self> {
        let policy = config.walk_policy(normalizer)?;
        Ok(Self {
            provider,
            config,
            policy,
        })
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Returns every expression whose data fits `shape`, deduplicated.
    ///
    /// `cardinality` is the number of values requested for scalar and
    /// object shapes; array shapes derive it from `maxItems`. An empty
    /// result is normal.
    pub fn match_shape(
        &self,
        shape: &PropShape,
        required: bool,
        cardinality: Cardinality,
        scope: Option<&MatchScope>,
    ) -> Vec<FieldExpression> {
        match shape.kind() {
            ShapeKind::Array => self.match_array(shape, required, scope),
            ShapeKind::Object => self.match_object(shape, required, cardinality, false, scope),
            ShapeKind::Scalar => self.match_scalar(
                ScalarRequest {
                    shape,
                    not_null: required,
                    required_fields: required,
                    cardinality,
                    list: false,
                    depth: self.config.depth_for(shape),
                },
                scope,
            ),
        }
    }

    fn match_array(
        &self,
        shape: &PropShape,
        required: bool,
        scope: Option<&MatchScope>,
    ) -> Vec<FieldExpression> {
        if let Some(keyword) = shape.constraints.keys().find(|k| k.as_str() != "maxItems") {
            warn!(
                keyword = %keyword,
                "Unsupported array shape keyword; no data can match this shape"
            );
            return Vec::new();
        }
        let Some(items) = shape.items.as_deref() else {
            warn!("Array shape without `items`; no data can match this shape");
            return Vec::new();
        };
        let cardinality = match shape.constraint("maxItems") {
            None => Cardinality::Unlimited,
            Some(max) => match max.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) if n > 0 => Cardinality::Limited(n),
                _ => {
                    warn!(max_items = %max, "Invalid `maxItems`; no data can match this shape");
                    return Vec::new();
                }
            },
        };

        match items.kind() {
            ShapeKind::Array => {
                warn!("Nested array shapes are unsupported; no data can match this shape");
                Vec::new()
            }
            ShapeKind::Object => self.match_object(items, required, cardinality, true, scope),
            ShapeKind::Scalar => self.match_scalar(
                ScalarRequest {
                    shape: items,
                    not_null: required,
                    required_fields: required,
                    cardinality,
                    list: true,
                    depth: self.config.depth_for(items),
                },
                scope,
            ),
        }
    }

    /// Matches each named sub-property, then assembles per-field objects.
    ///
    /// Complete matches (every sub-property covered) come first, then
    /// minimal ones (every required sub-property covered), each group
    /// sorted by field name.
    fn match_object(
        &self,
        shape: &PropShape,
        required: bool,
        cardinality: Cardinality,
        list: bool,
        scope: Option<&MatchScope>,
    ) -> Vec<FieldExpression> {
        let depth = self.config.object_depth;
        let mut groups: BTreeMap<FieldKey, BTreeMap<String, Vec<FieldExpression>>> =
            BTreeMap::new();

        for (name, sub) in &shape.properties {
            if sub.kind() != ShapeKind::Scalar {
                debug!(property = %name, "Skipping non-scalar object sub-property");
                continue;
            }
            let sub_required = shape.required.contains(name);
            let request = ScalarRequest {
                shape: sub,
                not_null: sub_required,
                required_fields: required && sub_required,
                cardinality,
                list,
                depth,
            };
            for expression in self.match_scalar(request, scope) {
                groups
                    .entry(FieldKey::of(&expression))
                    .or_default()
                    .entry(name.clone())
                    .or_default()
                    .push(expression);
            }
        }

        let mut complete = Vec::new();
        let mut minimal = Vec::new();
        for (key, candidates) in groups {
            let property_mapping: BTreeMap<String, MappedField> = candidates
                .into_iter()
                .filter_map(|(name, found)| choose(&name, found).map(|mapped| (name, mapped)))
                .collect();
            if !shape.required.iter().all(|n| property_mapping.contains_key(n)) {
                continue;
            }
            let covers_all = shape.properties.keys().all(|n| property_mapping.contains_key(n));
            let object = FieldExpression::Object(ObjectField {
                entity_type: key.entity_type,
                bundle: key.bundle,
                field_name: key.field_name,
                delta: key.delta,
                property_mapping,
            });
            if covers_all {
                complete.push(object);
            } else {
                minimal.push(object);
            }
        }
        complete.extend(minimal);
        complete
    }

    fn match_scalar(
        &self,
        request: ScalarRequest<'_>,
        scope: Option<&MatchScope>,
    ) -> Vec<FieldExpression> {
        let requirements = ShapeRequirementTranslator::translate(request.shape, request.not_null);
        if requirements.is_unsupported() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.leaves(scope, request.depth, request.shape)
            .into_iter()
            .filter(|leaf| accepts(leaf, &request, &requirements))
            .map(|leaf| leaf.expression(root_delta(leaf.root_field(), &request)))
            .filter(|expression| seen.insert(expression.to_string()))
            .collect()
    }

    fn leaves(&self, scope: Option<&MatchScope>, depth: u32, shape: &PropShape) -> Vec<DataLeaf> {
        let walker = TypedDataGraphWalker::new(self.provider, &self.policy);
        match scope {
            Some(scope) => {
                walker.walk(&scope.entity_type, scope.bundle.as_deref(), depth, Some(shape))
            }
            None => self
                .provider
                .entity_types()
                .iter()
                .flat_map(|target| walker.walk_target(target, depth, Some(shape)))
                .collect(),
        }
    }
}

fn accepts(
    leaf: &DataLeaf,
    request: &ScalarRequest<'_>,
    requirements: &ShapeRequirements,
) -> bool {
    if leaf.kind != LeafKind::Scalar {
        return false;
    }
    let Some(primitive) = leaf.property.primitive else {
        return false;
    };
    if !primitive.is_compatible_with(request.shape.schema_type) {
        return false;
    }
    if !leaf.root_field().cardinality.satisfies(request.cardinality) {
        return false;
    }
    if request.required_fields && !leaf.fields().all(|f| f.required) {
        return false;
    }
    let constraints = leaf.merged_constraints();
    requirements.are_satisfied_by(&DataConstraints {
        constraints: &constraints,
        capabilities: &leaf.property.capabilities,
        required: leaf.property.required,
    })
}

/// A single value drawn from a multi-valued field reads its first item.
/// List props keep the whole field, even when they accept one item.
fn root_delta(root: &FieldDefinition, request: &ScalarRequest<'_>) -> Option<u32> {
    let single = !request.list && request.cardinality == Cardinality::SINGLE;
    (single && root.cardinality.is_multiple()).then_some(0)
}

/// Picks one candidate for an object property: direct data over
/// references, then a property named like the object property.
fn choose(name: &str, mut candidates: Vec<FieldExpression>) -> Option<MappedField> {
    candidates.sort_by_key(|e| (e.is_reference(), e.leaf_property_name() != Some(name)));
    candidates.into_iter().find_map(FieldExpression::into_mapped)
}
