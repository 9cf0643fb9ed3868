//! Materialized Tree Views
//!
//! Output of the traversal engine. A [`LoadedTree`] is owned by the call that
//! built it and never cached. Every [`TreeNode`] records both its true fan-out
//! (`total_children`) and how much of it was materialized (`shown_children`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text used for the cycle sentinel leaf
pub const CYCLE_SENTINEL: &str = "[CYCLE DETECTED]";

/// Text used for the depth-ceiling sentinel leaf
pub const MAX_DEPTH_SENTINEL: &str = "[MAX DEPTH REACHED]";

/// What a tree entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNodeKind {
    /// A materialized graph node
    Node,
    /// Stand-in for a node already on the current path
    Cycle,
    /// Stand-in for children below the depth ceiling
    MaxDepth,
}

/// One entry of a materialized tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub depth: usize,
    pub total_children: usize,
    pub shown_children: usize,
    pub has_more_children: bool,
    pub kind: TreeNodeKind,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Leaf standing in for a revisited node
    pub fn cycle(id: impl Into<String>, depth: usize) -> Self {
        Self::sentinel(id, CYCLE_SENTINEL, depth, TreeNodeKind::Cycle)
    }

    /// Leaf standing in for the unexplored children of a node at the ceiling
    pub fn max_depth(id: impl Into<String>, depth: usize) -> Self {
        Self::sentinel(id, MAX_DEPTH_SENTINEL, depth, TreeNodeKind::MaxDepth)
    }

    fn sentinel(id: impl Into<String>, text: &str, depth: usize, kind: TreeNodeKind) -> Self {
        Self {
            id: id.into(),
            text: text.to_string(),
            created_at: None,
            updated_at: None,
            depth,
            total_children: 0,
            shown_children: 0,
            has_more_children: false,
            kind,
            children: Vec::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind != TreeNodeKind::Node
    }

    /// Number of entries in this subtree, sentinels included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Deepest `depth` value in this subtree
    pub fn max_depth_in_subtree(&self) -> usize {
        self.children
            .iter()
            .map(TreeNode::max_depth_in_subtree)
            .max()
            .unwrap_or(self.depth)
            .max(self.depth)
    }

    /// Depth-first search by id (first match in render order)
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id && !self.is_sentinel() {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn contains_kind(&self, kind: TreeNodeKind) -> bool {
        self.kind == kind || self.children.iter().any(|child| child.contains_kind(kind))
    }
}

/// A rooted tree produced by one traversal call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedTree {
    pub root: TreeNode,
}

impl LoadedTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.root.find(id)
    }
}
