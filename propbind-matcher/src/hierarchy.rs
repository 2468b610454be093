//! Reshapes flat suggestions into a tree following their label segments.
//!
//! `Image → Alternative text` becomes the path `["Image", "items",
//! "Alternative text"]`: a group node `Image` whose `items` hold the leaf.

use crate::aggregate::Suggestion;
use crate::labeler::LABEL_DELIMITER;
use propbind_types::{AdapterId, FieldExpression, SuggestionId};
use serde::Serialize;

/// Path component placed between two label segments.
pub const ITEMS_SEGMENT: &str = "items";

/// What a leaf of the hierarchy binds to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SuggestionSource {
    Expression(FieldExpression),
    Adapter(AdapterId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchicalSuggestion {
    pub id: SuggestionId,
    pub label: String,
    /// Set on leaves, and on groups whose own label is also a suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SuggestionSource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<HierarchicalSuggestion>,
}

/// Splits a label into segments with [`ITEMS_SEGMENT`] between them.
pub fn hierarchy_path(label: &str) -> Vec<String> {
    interleave_items(&label_segments(label))
}

fn interleave_items(segments: &[String]) -> Vec<String> {
    let mut path = Vec::with_capacity(segments.len() * 2);
    for (depth, segment) in segments.iter().enumerate() {
        if depth > 0 {
            path.push(ITEMS_SEGMENT.to_string());
        }
        path.push(segment.clone());
    }
    path
}

fn label_segments(label: &str) -> Vec<String> {
    label
        .split(LABEL_DELIMITER.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Nests a suggestion's instances and adapters by label segment.
///
/// At every level shallower entries precede deeper ones; entries of equal
/// depth keep their original order.
pub fn build_hierarchy(suggestion: &Suggestion) -> Vec<HierarchicalSuggestion> {
    let mut entries: Vec<(Vec<String>, SuggestionId, SuggestionSource)> = suggestion
        .instances
        .iter()
        .map(|i| {
            (
                label_segments(&i.label),
                i.id.clone(),
                SuggestionSource::Expression(i.expression.clone()),
            )
        })
        .chain(suggestion.adapters.iter().map(|a| {
            (
                vec![a.label.clone()],
                a.id.clone(),
                SuggestionSource::Adapter(a.adapter_id.clone()),
            )
        }))
        .collect();
    entries.sort_by_key(|(segments, _, _)| segments.len());

    let mut root = Vec::new();
    for (segments, id, source) in entries {
        insert(&mut root, &segments, id, source);
    }
    root
}

/// Places one entry under the groups named by its leading segments.
///
/// A group is identified by the hash of its [`hierarchy_path`]. When a
/// suggestion's label equals a group's label at the same level, the two
/// are one node: the suggestion's id and source, with the group's items.
fn insert(
    root: &mut Vec<HierarchicalSuggestion>,
    segments: &[String],
    id: SuggestionId,
    source: SuggestionSource,
) {
    let Some((label, groups)) = segments.split_last() else {
        return;
    };

    let mut level = root;
    for (depth, head) in groups.iter().enumerate() {
        let index = match level.iter().position(|node| node.label == *head) {
            Some(index) => index,
            None => {
                let path = interleave_items(&segments[..=depth]);
                level.push(HierarchicalSuggestion {
                    id: SuggestionId::from_content(&path.join("/")),
                    label: head.clone(),
                    source: None,
                    items: Vec::new(),
                });
                level.len() - 1
            }
        };
        level = &mut level[index].items;
    }

    match level
        .iter()
        .position(|node| node.source.is_none() && node.label == *label)
    {
        Some(index) => {
            let node = &mut level[index];
            node.id = id;
            node.source = Some(source);
        }
        None => level.push(HierarchicalSuggestion {
            id,
            label: label.clone(),
            source: Some(source),
            items: Vec::new(),
        }),
    }
}
