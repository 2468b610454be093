//! Human-readable labels for matched expressions.

use propbind_graph::TypedDataProvider;
use propbind_types::{DirectField, FieldExpression};

/// Separates the segments of a hierarchical label.
pub const LABEL_DELIMITER: &str = " → ";

/// Produces labels for suggestions.
///
/// Labels of reference chains and object properties must be
/// [`LABEL_DELIMITER`]-joined so suggestions can be reshaped into a tree.
pub trait Labeler {
    fn label(&self, expression: &FieldExpression, host_entity_type: Option<&str>) -> String;
}

/// Labels expressions from the field and property labels a
/// [`TypedDataProvider`] knows.
///
/// The entity type (and bundle) label leads only when no host type is
/// given. A property label is appended unless it is the field type's main
/// property; unknown fields fall back to their machine names.
pub struct DefinitionLabeler<'a, P: TypedDataProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: TypedDataProvider + ?Sized> DefinitionLabeler<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    fn entity_label(&self, entity_type: &str, bundle: Option<&str>) -> String {
        let entity = self
            .provider
            .entity_type_label(entity_type)
            .unwrap_or_else(|| entity_type.to_string());
        match bundle {
            Some(bundle) => {
                let bundle = self
                    .provider
                    .bundle_label(entity_type, bundle)
                    .unwrap_or_else(|| bundle.to_string());
                format!("{entity} ({bundle})")
            }
            None => entity,
        }
    }

    fn field_label(&self, entity_type: &str, bundle: Option<&str>, field_name: &str) -> String {
        self.provider
            .field(entity_type, bundle, field_name)
            .map_or_else(|| field_name.to_string(), |f| f.label)
    }

    fn push_segments(&self, expression: &FieldExpression, out: &mut Vec<String>) {
        match expression {
            FieldExpression::Direct(d) => self.push_direct(d, out),
            FieldExpression::Reference(r) => {
                let referencer = &r.referencer;
                out.push(self.field_label(
                    &referencer.entity_type,
                    referencer.bundle.as_deref(),
                    &referencer.field_name,
                ));
                self.push_segments(&r.target, out);
            }
            FieldExpression::Object(o) => {
                out.push(self.field_label(&o.entity_type, o.bundle.as_deref(), &o.field_name));
            }
        }
    }

    fn push_direct(&self, direct: &DirectField, out: &mut Vec<String>) {
        let Some(field) = self
            .provider
            .field(&direct.entity_type, direct.bundle.as_deref(), &direct.field_name)
        else {
            out.push(direct.field_name.clone());
            return;
        };
        let definition = self.provider.field_type(&field.field_type);
        out.push(field.label);

        let main = definition.as_ref().and_then(|t| t.main_property.as_deref());
        if main != Some(direct.property_name.as_str()) {
            out.push(
                definition
                    .as_ref()
                    .and_then(|t| t.property(&direct.property_name))
                    .map_or_else(|| direct.property_name.clone(), |p| p.label.clone()),
            );
        }
    }
}

impl<P: TypedDataProvider + ?Sized> Labeler for DefinitionLabeler<'_, P> {
    fn label(&self, expression: &FieldExpression, host_entity_type: Option<&str>) -> String {
        let mut segments = Vec::new();
        if host_entity_type.is_none() {
            segments.push(
                self.entity_label(expression.root_entity_type(), expression.root_bundle()),
            );
        }
        self.push_segments(expression, &mut segments);
        segments.join(LABEL_DELIMITER)
    }
}
