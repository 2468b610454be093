//! Bounded-depth enumeration of an entity type's data leaves.

use crate::definition::{EntityTypeRef, FieldDefinition, PropertyDefinition, PropertyRole};
use crate::provider::TypedDataProvider;
use propbind_shape::{ConstraintMap, PropShape};
use propbind_types::{DirectField, FieldExpression};
use std::collections::BTreeSet;
use tracing::debug;

/// Field types that never feed a prop unless an exception allows them.
///
/// Free-form list types carry no allowed-values metadata the matcher can
/// check, so they stay out of suggestions.
pub const DEFAULT_DENIED_FIELD_TYPES: &[&str] = &[
    "password",
    "language",
    "list_string",
    "list_float",
    "list_integer",
    "map",
    "uuid",
];

/// A denied field type that may still match one exact shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTypeException {
    pub shape: PropShape,
    pub field_type: String,
}

/// Which fields and properties the walker hands out as matchable.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkPolicy {
    pub denied_field_types: BTreeSet<String>,
    pub denied_property_names: BTreeSet<String>,
    pub exceptions: Vec<FieldTypeException>,
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self {
            denied_field_types: DEFAULT_DENIED_FIELD_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            denied_property_names: BTreeSet::new(),
            exceptions: vec![FieldTypeException {
                shape: PropShape::scalar(propbind_shape::JsonSchemaType::Number),
                field_type: "list_integer".into(),
            }],
        }
    }
}

impl WalkPolicy {
    fn is_denied(&self, field: &FieldDefinition, shape: Option<&PropShape>) -> bool {
        self.denied_field_types.contains(&field.field_type)
            && !self
                .exceptions
                .iter()
                .any(|e| e.field_type == field.field_type && Some(&e.shape) == shape)
    }
}

/// Why a leaf is not offered for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Internal,
    ReferenceShadow,
    DeniedFieldType,
    DeniedProperty,
    UnresolvableReference,
}

/// Classification of one property.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafKind {
    Scalar,
    /// Resolves to the given entity type.
    Reference(EntityTypeRef),
    Skip(SkipReason),
}

/// One reference followed on the way to a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceHop {
    pub entity_type: String,
    pub bundle: Option<String>,
    pub field: FieldDefinition,
    /// The reference property (`entity`).
    pub property: String,
}

/// A property reached by the walker, with the references followed to get
/// there.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLeaf {
    pub path: Vec<ReferenceHop>,
    pub entity_type: String,
    pub bundle: Option<String>,
    pub field: FieldDefinition,
    pub property: PropertyDefinition,
    pub kind: LeafKind,
}

impl DataLeaf {
    /// The field on the entity the walk started from.
    pub fn root_field(&self) -> &FieldDefinition {
        self.path.first().map_or(&self.field, |hop| &hop.field)
    }

    /// Every field on the chain, root first, leaf last.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.path
            .iter()
            .map(|hop| &hop.field)
            .chain(std::iter::once(&self.field))
    }

    /// Field-level constraints overlaid with the property's own; the
    /// property wins when both declare the same constraint.
    pub fn merged_constraints(&self) -> ConstraintMap {
        let mut merged = self.field.constraints.clone();
        merged.extend(
            self.property
                .constraints
                .iter()
                .map(|(id, options)| (id.clone(), options.clone())),
        );
        merged
    }

    /// Builds the expression addressing this leaf.
    ///
    /// `root_delta` selects an item of the root field. Multi-valued fields
    /// past the root always address their first item.
    pub fn expression(&self, root_delta: Option<u32>) -> FieldExpression {
        let mut leaf = DirectField::new(
            self.entity_type.clone(),
            self.bundle.as_deref(),
            self.field.name.clone(),
            self.property.name.clone(),
        );
        leaf.delta = if self.path.is_empty() {
            root_delta
        } else {
            first_item_if_multiple(&self.field)
        };

        self.path
            .iter()
            .enumerate()
            .rev()
            .fold(FieldExpression::Direct(leaf), |target, (i, hop)| {
                let mut referencer = DirectField::new(
                    hop.entity_type.clone(),
                    hop.bundle.as_deref(),
                    hop.field.name.clone(),
                    hop.property.clone(),
                );
                referencer.delta = if i == 0 {
                    root_delta
                } else {
                    first_item_if_multiple(&hop.field)
                };
                FieldExpression::reference(referencer, target)
            })
    }
}

fn first_item_if_multiple(field: &FieldDefinition) -> Option<u32> {
    field.cardinality.is_multiple().then_some(0)
}

/// Which fields of an entity type to enumerate.
enum BundleScope<'s> {
    /// Base fields only.
    Base,
    /// All fields of one bundle.
    Single(&'s str),
    /// Base fields once, then each bundle's own fields.
    Multiple(&'s [String]),
}

impl<'s> BundleScope<'s> {
    fn for_target(target: &'s EntityTypeRef) -> Self {
        match target.bundles.as_slice() {
            [] => Self::Base,
            [only] => Self::Single(only),
            many => Self::Multiple(many),
        }
    }
}

/// Enumerates data leaves of an entity type, following references while
/// budget remains.
pub struct TypedDataGraphWalker<'a, P: TypedDataProvider + ?Sized> {
    provider: &'a P,
    policy: &'a WalkPolicy,
}

impl<'a, P: TypedDataProvider + ?Sized> TypedDataGraphWalker<'a, P> {
    pub fn new(provider: &'a P, policy: &'a WalkPolicy) -> Self {
        Self { provider, policy }
    }

    /// Walks `entity_type` (narrowed to `bundle` if given).
    ///
    /// A `Reference` leaf is immediately followed by the leaves of its
    /// target when `budget > 0`; each level down spends one unit.
    /// `shape` is the shape being matched, consulted only for field-type
    /// exceptions.
    pub fn walk(
        &self,
        entity_type: &str,
        bundle: Option<&str>,
        budget: u32,
        shape: Option<&PropShape>,
    ) -> Vec<DataLeaf> {
        let scope = match bundle {
            Some(bundle) => BundleScope::Single(bundle),
            None => BundleScope::Base,
        };
        let mut leaves = Vec::new();
        self.walk_into(&[], entity_type, scope, budget, shape, &mut leaves);
        leaves
    }

    /// Walks every bundle of `target` at once: base fields a single time,
    /// then each listed bundle's own fields.
    pub fn walk_target(
        &self,
        target: &EntityTypeRef,
        budget: u32,
        shape: Option<&PropShape>,
    ) -> Vec<DataLeaf> {
        let mut leaves = Vec::new();
        self.walk_into(
            &[],
            &target.entity_type,
            BundleScope::for_target(target),
            budget,
            shape,
            &mut leaves,
        );
        leaves
    }

    fn walk_into(
        &self,
        path: &[ReferenceHop],
        entity_type: &str,
        scope: BundleScope<'_>,
        budget: u32,
        shape: Option<&PropShape>,
        out: &mut Vec<DataLeaf>,
    ) {
        let mut groups: Vec<(Option<&str>, Vec<FieldDefinition>)> = Vec::new();
        match scope {
            BundleScope::Base => groups.push((None, self.provider.list_fields(entity_type, None))),
            BundleScope::Single(bundle) => groups.push((
                Some(bundle),
                self.provider.list_fields(entity_type, Some(bundle)),
            )),
            BundleScope::Multiple(bundles) => {
                groups.push((None, self.provider.list_fields(entity_type, None)));
                for bundle in bundles {
                    let own = self
                        .provider
                        .list_fields(entity_type, Some(bundle))
                        .into_iter()
                        .filter(|f| !f.is_base)
                        .collect();
                    groups.push((Some(bundle.as_str()), own));
                }
            }
        }

        for (bundle, fields) in groups {
            for field in fields {
                for property in self.provider.field_properties(&field.field_type) {
                    let kind = self.classify(entity_type, &field, &property, shape);
                    let follow = match &kind {
                        LeafKind::Reference(target) if budget > 0 => Some(target.clone()),
                        _ => None,
                    };
                    out.push(DataLeaf {
                        path: path.to_vec(),
                        entity_type: entity_type.to_string(),
                        bundle: bundle.map(str::to_string),
                        field: field.clone(),
                        property: property.clone(),
                        kind,
                    });

                    if let Some(target) = follow {
                        let mut next = path.to_vec();
                        next.push(ReferenceHop {
                            entity_type: entity_type.to_string(),
                            bundle: bundle.map(str::to_string),
                            field: field.clone(),
                            property: property.name.clone(),
                        });
                        self.walk_into(
                            &next,
                            &target.entity_type,
                            BundleScope::for_target(&target),
                            budget - 1,
                            shape,
                            out,
                        );
                    }
                }
            }
        }
    }

    fn classify(
        &self,
        entity_type: &str,
        field: &FieldDefinition,
        property: &PropertyDefinition,
        shape: Option<&PropShape>,
    ) -> LeafKind {
        match property.role {
            PropertyRole::Internal => return LeafKind::Skip(SkipReason::Internal),
            PropertyRole::ReferenceShadow => return LeafKind::Skip(SkipReason::ReferenceShadow),
            PropertyRole::Value | PropertyRole::Reference => {}
        }
        if self.policy.denied_property_names.contains(&property.name) {
            return LeafKind::Skip(SkipReason::DeniedProperty);
        }
        if self.policy.is_denied(field, shape) {
            return LeafKind::Skip(SkipReason::DeniedFieldType);
        }
        if property.role == PropertyRole::Reference {
            return match self.provider.resolve_reference_target(entity_type, field) {
                Some(target) => LeafKind::Reference(target),
                None => {
                    debug!(
                        entity_type = %entity_type,
                        field = %field.name,
                        "Reference target cannot be resolved; skipping"
                    );
                    LeafKind::Skip(SkipReason::UnresolvableReference)
                }
            };
        }
        LeafKind::Scalar
    }
}
