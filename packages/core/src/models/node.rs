//! Node and Relation Data Structures
//!
//! Mirrors the remote graph store's records.
//!
//! # Architecture
//!
//! - **Node**: content-bearing vertex with an ordered list of [`ContentBlock`]s
//! - **Relation**: typed, directed edge. `"child"` edges form the structural
//!   hierarchy, `"__type__"` edges label a child edge with a tag node, and any
//!   other type is a user-defined semantic edge
//! - **Layer**: result of a bulk hydrate-by-id call
//!
//! The graph is not a tree. A node has at most one canonical parent edge but
//! may take part in any number of other relations, and cycles are possible.

use crate::models::content::{parse_content, ContentBlock};
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Relation type for structural parent → child edges
pub const CHILD_RELATION: &str = "child";

/// Relation type that labels a child edge with a tag node
pub const TYPE_RELATION: &str = "__type__";

/// A content-bearing vertex in the remote graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_content")]
    pub content: Vec<ContentBlock>,

    #[serde(default)]
    pub author_id: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_public: bool,

    /// Tri-state: `None` means the node is not a checkbox at all
    #[serde(default)]
    pub is_checked: Option<bool>,

    #[serde(default)]
    pub canonical_relation_id: Option<String>,
}

impl Node {
    /// Create a node with text content and no metadata
    pub fn with_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: vec![ContentBlock::text(text)],
            author_id: None,
            created_at: None,
            updated_at: None,
            is_public: false,
            is_checked: None,
            canonical_relation_id: None,
        }
    }

    /// Display text: the first block when it is a text block, otherwise empty
    pub fn display_text(&self) -> &str {
        match self.content.first() {
            Some(ContentBlock::Text { value }) => value.as_str(),
            _ => "",
        }
    }

    /// All blocks flattened into one plain-text string
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::as_plain_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A typed, directed edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub relation_type_id: String,

    #[serde(default)]
    pub is_public: bool,

    #[serde(default)]
    pub canonical_relation_id: Option<String>,
}

impl Relation {
    pub fn new(
        id: impl Into<String>,
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        relation_type_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_id: from_id.into(),
            to_id: to_id.into(),
            relation_type_id: relation_type_id.into(),
            is_public: false,
            canonical_relation_id: None,
        }
    }

    pub fn is_child(&self) -> bool {
        self.relation_type_id == CHILD_RELATION
    }

    /// True for a `"child"` edge from `parent_id`
    pub fn is_child_of(&self, parent_id: &str) -> bool {
        self.is_child() && self.from_id == parent_id
    }
}

/// Result of a bulk hydrate-by-id call
///
/// Relations keep the order the store returned them in; the store's own
/// positioning decides sibling order, so callers must not re-sort them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    #[serde(default)]
    pub nodes_by_id: HashMap<String, Node>,

    #[serde(
        default,
        rename = "relationsById",
        serialize_with = "serialize_relations",
        deserialize_with = "deserialize_relations"
    )]
    pub relations: Vec<Relation>,
}

impl Layer {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes_by_id.get(id)
    }

    /// `"child"` relations from `parent_id`, in store order
    pub fn child_relations<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a Relation> {
        self.relations
            .iter()
            .filter(move |relation| relation.is_child_of(parent_id))
    }

    pub fn relation(&self, id: &str) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.id == id)
    }
}

/// Store content goes through [`parse_content`] so one unfamiliar block
/// degrades to empty text instead of failing the whole layer
fn deserialize_content<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let parsed = parse_content(&raw);
    for diagnostic in &parsed.diagnostics {
        tracing::warn!("⚠️ Unreadable node content from store: {:?}", diagnostic);
    }
    Ok(parsed.blocks)
}

fn serialize_relations<S>(relations: &[Relation], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(relations.len()))?;
    for relation in relations {
        map.serialize_entry(&relation.id, relation)?;
    }
    map.end()
}

fn deserialize_relations<'de, D>(deserializer: D) -> Result<Vec<Relation>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedRelations;

    impl<'de> Visitor<'de> for OrderedRelations {
        type Value = Vec<Relation>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of relation id to relation")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut relations = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((_, relation)) = access.next_entry::<String, Relation>()? {
                relations.push(relation);
            }
            Ok(relations)
        }
    }

    deserializer.deserialize_map(OrderedRelations)
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
