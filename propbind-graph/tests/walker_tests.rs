use pretty_assertions::assert_eq;
use propbind_graph::{
    EntityTypeRef, FieldDefinition, InMemoryTypedData, LeafKind, SkipReason, TypedDataGraphWalker,
    TypedDataProvider, WalkPolicy,
};
use propbind_shape::{JsonSchemaType, PropShape};
use propbind_types::Cardinality;
use proptest::prelude::*;

fn site() -> InMemoryTypedData {
    InMemoryTypedData::with_standard_field_types()
        .with_entity_type("node", "Content")
        .with_bundle("node", "article", "Article")
        .with_bundle("node", "page", "Basic page")
        .with_base_field("node", FieldDefinition::new("title", "Title", "string").required())
        .with_bundle_field("node", "article", FieldDefinition::new("field_image", "Image", "image"))
        .with_bundle_field(
            "node",
            "article",
            FieldDefinition::new("field_author", "Author", "entity_reference")
                .with_target(EntityTypeRef::new("user", &[])),
        )
        .with_bundle_field(
            "node",
            "page",
            FieldDefinition::new("field_secret", "Secret", "password"),
        )
        .with_entity_type("user", "User")
        .with_base_field("user", FieldDefinition::new("name", "Name", "string").required())
}

fn labels(leaves: &[propbind_graph::DataLeaf]) -> Vec<String> {
    leaves
        .iter()
        .map(|l| format!("{}:{}", l.field.name, l.property.name))
        .collect()
}

// ── Field enumeration ────────────────────────────────────────────

#[test]
fn base_walk_sees_only_base_fields() {
    let data = site();
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", None, 0, None);
    assert_eq!(labels(&leaves), vec!["title:value"]);
    assert_eq!(leaves[0].bundle, None);
}

#[test]
fn bundle_walk_includes_base_and_bundle_fields() {
    let data = site();
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", Some("article"), 0, None);
    let names = labels(&leaves);
    assert_eq!(names[0], "title:value");
    assert!(names.contains(&"field_image:alt".to_string()));
    assert!(names.contains(&"field_author:entity".to_string()));
    assert!(leaves.iter().all(|l| l.bundle.as_deref() == Some("article")));
}

// ── Classification ───────────────────────────────────────────────

#[test]
fn reference_shadow_is_skipped() {
    let data = site();
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", Some("article"), 0, None);
    let target_id = leaves
        .iter()
        .find(|l| l.field.name == "field_image" && l.property.name == "target_id")
        .unwrap();
    assert_eq!(target_id.kind, LeafKind::Skip(SkipReason::ReferenceShadow));
}

#[test]
fn denied_field_type_is_skipped() {
    let data = site();
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", Some("page"), 0, None);
    let secret = leaves.iter().find(|l| l.field.name == "field_secret").unwrap();
    assert_eq!(secret.kind, LeafKind::Skip(SkipReason::DeniedFieldType));
}

#[test]
fn exception_lifts_denial_for_exact_shape_only() {
    let data = InMemoryTypedData::with_standard_field_types()
        .with_entity_type("node", "Content")
        .with_base_field("node", FieldDefinition::new("field_rating", "Rating", "list_integer"));
    let policy = WalkPolicy::default();
    let walker = TypedDataGraphWalker::new(&data, &policy);

    let number = PropShape::scalar(JsonSchemaType::Number);
    let allowed = walker.walk("node", None, 0, Some(&number));
    assert_eq!(allowed[0].kind, LeafKind::Scalar);

    let integer = PropShape::scalar(JsonSchemaType::Integer);
    let denied = walker.walk("node", None, 0, Some(&integer));
    assert_eq!(denied[0].kind, LeafKind::Skip(SkipReason::DeniedFieldType));
}

#[test]
fn internal_properties_are_skipped() {
    let data = InMemoryTypedData::with_standard_field_types()
        .with_entity_type("node", "Content")
        .with_base_field("node", FieldDefinition::new("body", "Body", "text_long"))
        .with_base_field("node", FieldDefinition::new("field_link", "Link", "link"));
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", None, 0, None);

    let kind_of = |field: &str, property: &str| {
        leaves
            .iter()
            .find(|l| l.field.name == field && l.property.name == property)
            .map(|l| l.kind.clone())
    };
    assert_eq!(kind_of("body", "format"), Some(LeafKind::Skip(SkipReason::Internal)));
    assert_eq!(kind_of("field_link", "options"), Some(LeafKind::Skip(SkipReason::Internal)));
    assert_eq!(kind_of("body", "value"), Some(LeafKind::Scalar));
}

#[test]
fn denied_property_names_are_skipped() {
    let data = site();
    let policy = WalkPolicy {
        denied_property_names: ["alt".to_string()].into(),
        ..WalkPolicy::default()
    };
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", Some("article"), 0, None);
    let alt = leaves
        .iter()
        .find(|l| l.field.name == "field_image" && l.property.name == "alt")
        .unwrap();
    assert_eq!(alt.kind, LeafKind::Skip(SkipReason::DeniedProperty));
    let title = leaves
        .iter()
        .find(|l| l.field.name == "field_image" && l.property.name == "title")
        .unwrap();
    assert_eq!(title.kind, LeafKind::Scalar);
}

#[test]
fn unresolvable_reference_is_skipped() {
    let data = InMemoryTypedData::with_standard_field_types()
        .with_entity_type("node", "Content")
        .with_base_field(
            "node",
            FieldDefinition::new("field_ghost", "Ghost", "entity_reference")
                .with_target(EntityTypeRef::new("ghost", &[])),
        );
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", None, 3, None);
    let entity = leaves.iter().find(|l| l.property.name == "entity").unwrap();
    assert_eq!(entity.kind, LeafKind::Skip(SkipReason::UnresolvableReference));
}

// ── Reference following ──────────────────────────────────────────

#[test]
fn budget_zero_does_not_follow_references() {
    let data = site();
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", Some("article"), 0, None);
    assert!(leaves.iter().all(|l| l.path.is_empty()));
}

#[test]
fn budget_one_follows_into_target() {
    let data = site();
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", Some("article"), 1, None);
    let user_name = leaves
        .iter()
        .find(|l| l.entity_type == "user" && l.field.name == "name")
        .unwrap();
    assert_eq!(user_name.path.len(), 1);
    assert_eq!(user_name.root_field().name, "field_author");
    assert_eq!(
        user_name.expression(None).to_string(),
        "node:article.field_author.entity=>user.name.value"
    );
}

#[test]
fn multi_bundle_target_walks_base_fields_once() {
    let data = site()
        .with_entity_type("media", "Media")
        .with_base_field("media", FieldDefinition::new("name", "Name", "string"))
        .with_bundle_field(
            "media",
            "image",
            FieldDefinition::new("field_media_image", "Image", "image"),
        )
        .with_bundle_field(
            "media",
            "video",
            FieldDefinition::new("field_media_video", "Video", "file"),
        )
        .with_base_field(
            "node",
            FieldDefinition::new("field_media", "Media", "entity_reference")
                .with_target(EntityTypeRef::new("media", &["image", "video"])),
        );
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", None, 1, None);
    let media_names: Vec<_> = leaves
        .iter()
        .filter(|l| l.entity_type == "media" && l.field.name == "name")
        .collect();
    assert_eq!(media_names.len(), 1);
    assert_eq!(media_names[0].bundle, None);
    let in_bundle = |field: &str, bundle: &str| {
        leaves
            .iter()
            .any(|l| l.field.name == field && l.bundle.as_deref() == Some(bundle))
    };
    assert!(in_bundle("field_media_image", "image"));
    assert!(in_bundle("field_media_video", "video"));
}

#[test]
fn merged_constraints_prefer_property_level() {
    use propbind_shape::constraint;
    use serde_json::json;

    let field = FieldDefinition::new("field_link", "Link", "link").with_constraint(
        constraint::URI,
        [("allowRelative".to_string(), json!(false))].into(),
    );
    let data = InMemoryTypedData::with_standard_field_types()
        .with_entity_type("node", "Content")
        .with_base_field("node", field);
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", None, 0, None);
    let uri = leaves.iter().find(|l| l.property.name == "uri").unwrap();
    assert_eq!(
        uri.merged_constraints()[constraint::URI]["allowRelative"],
        json!(true)
    );
}

#[test]
fn expression_uses_first_item_past_the_root() {
    let data = InMemoryTypedData::with_standard_field_types()
        .with_entity_type("node", "Content")
        .with_base_field(
            "node",
            FieldDefinition::new("field_tags", "Tags", "entity_reference")
                .with_cardinality(Cardinality::Unlimited)
                .with_target(EntityTypeRef::new("term", &[])),
        )
        .with_entity_type("term", "Term")
        .with_base_field(
            "term",
            FieldDefinition::new("field_aliases", "Aliases", "string")
                .with_cardinality(Cardinality::Limited(3)),
        );
    let policy = WalkPolicy::default();
    let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", None, 1, None);
    let alias = leaves.iter().find(|l| l.field.name == "field_aliases").unwrap();
    assert_eq!(
        alias.expression(Some(0)).to_string(),
        "node.field_tags[0].entity=>term.field_aliases[0].value"
    );
}

// ── Provider ─────────────────────────────────────────────────────

#[test]
fn provider_labels_and_lookup() {
    let data = site();
    assert_eq!(data.entity_type_label("node").as_deref(), Some("Content"));
    assert_eq!(data.bundle_label("node", "page").as_deref(), Some("Basic page"));
    assert!(data.field("node", Some("article"), "field_image").is_some());
    assert!(data.field("node", None, "field_image").is_none());
    assert!(data.field_properties("nonexistent").is_empty());
}

// ── Termination ──────────────────────────────────────────────────

fn self_referencing() -> InMemoryTypedData {
    InMemoryTypedData::with_standard_field_types()
        .with_entity_type("node", "Content")
        .with_base_field("node", FieldDefinition::new("title", "Title", "string"))
        .with_base_field(
            "node",
            FieldDefinition::new("field_parent", "Parent", "entity_reference")
                .with_target(EntityTypeRef::new("node", &[])),
        )
}

proptest! {
    #[test]
    fn self_reference_terminates_with_budget_bounded_depth(budget in 0u32..6) {
        let data = self_referencing();
        let policy = WalkPolicy::default();
        let leaves = TypedDataGraphWalker::new(&data, &policy).walk("node", None, budget, None);
        // title:value, field_parent:target_id, field_parent:entity per level
        prop_assert_eq!(leaves.len(), 3 * (budget as usize + 1));
        prop_assert!(leaves.iter().all(|l| l.path.len() <= budget as usize));
    }
}
