//! Transaction Operations
//!
//! A transaction is an ordered list of write operations the remote store
//! applies atomically. The mutation engine builds these lists; the store
//! either applies all of them or none.

use crate::models::content::ContentBlock;
use crate::models::node::Relation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields of a node that a write may set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentBlock>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<Option<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_relation_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A node record as written by `addNode`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub is_public: bool,
    #[serde(default)]
    pub is_checked: Option<bool>,
    #[serde(default)]
    pub canonical_relation_id: Option<String>,
}

/// Fields of a relation that a write may set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_relation_id: Option<Option<String>>,
}

/// Whether a relation-list update inserts or removes an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListAction {
    Add,
    Remove,
}

/// One ordered sub-operation of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransactionOp {
    AddNode {
        node: NewNode,
    },

    #[serde(rename_all = "camelCase")]
    UpdateNode {
        id: String,
        old_props: NodeProps,
        new_props: NodeProps,
    },

    DeleteNode {
        id: String,
    },

    AddRelation {
        relation: Relation,
    },

    #[serde(rename_all = "camelCase")]
    UpdateRelation {
        id: String,
        old_props: RelationProps,
        new_props: RelationProps,
    },

    /// Positioning metadata: the ordered relation list kept on `object_id`
    #[serde(rename_all = "camelCase")]
    UpdateRelationList {
        object_id: String,
        relation_id: String,
        action: ListAction,
    },
}

impl TransactionOp {
    /// Wire name of the operation
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddNode { .. } => "addNode",
            Self::UpdateNode { .. } => "updateNode",
            Self::DeleteNode { .. } => "deleteNode",
            Self::AddRelation { .. } => "addRelation",
            Self::UpdateRelation { .. } => "updateRelation",
            Self::UpdateRelationList { .. } => "updateRelationList",
        }
    }

    /// Id of the object this operation primarily targets
    pub fn target_id(&self) -> &str {
        match self {
            Self::AddNode { node } => &node.id,
            Self::UpdateNode { id, .. } | Self::DeleteNode { id } => id,
            Self::AddRelation { relation } => &relation.id,
            Self::UpdateRelation { id, .. } => id,
            Self::UpdateRelationList { object_id, .. } => object_id,
        }
    }
}
