//! Adaptive Traversal Engine
//!
//! Builds bounded in-memory views of the remote graph:
//!
//! - [`TraversalService::explore`] - budgeted, strategy-driven level-by-level
//!   walk producing a tree with per-node fan-out information
//! - [`TraversalService::map_structure`] - structure-only map with hard size
//!   limits, explicit cycle detection and a one-level fallback
//!
//! Both return a [`LoadedTree`](crate::models::LoadedTree) that belongs to
//! the caller; nothing is cached between calls. The [`render`] module turns trees into text.
//!
//! # Remote calls
//!
//! Every remote call goes through [`GraphReadService`] and therefore through
//! the shared request queue. An `explore` call issues one root sample plus at
//! most one round (children fan-out + hydrate) per level.

pub mod adaptive;
pub mod budget;
pub mod render;
pub mod strategy;
pub mod structure;

pub use adaptive::{ExploreOptions, TraversalResult, TraversalStats};
pub use budget::{TraversalBudget, DEFAULT_BUDGET, ROUND_COST, SAMPLE_COST};
pub use render::{render_content, render_structure};
pub use strategy::{
    level_breadth, AdjustmentMode, RootClassifier, RootKind, TraversalPriority, TraversalStrategy,
    MAX_TARGET_DEPTH,
};
pub use structure::{FallbackReport, StructureLimits, StructureMap};

use crate::models::{Node, TreeNode, TreeNodeKind};
use crate::services::graph_reader::GraphReadService;
use std::sync::Arc;

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalConfig {
    /// Budget used when a call does not bring its own
    pub budget: u32,
    pub adjustment: AdjustmentMode,
    pub structure_limits: StructureLimits,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            adjustment: AdjustmentMode::Once,
            structure_limits: StructureLimits::default(),
        }
    }
}

/// Entry point for tree-building operations
#[derive(Clone)]
pub struct TraversalService {
    reader: Arc<GraphReadService>,
    classifier: RootClassifier,
    config: TraversalConfig,
}

impl TraversalService {
    pub fn new(
        reader: Arc<GraphReadService>,
        classifier: RootClassifier,
        config: TraversalConfig,
    ) -> Self {
        Self {
            reader,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    pub fn classifier(&self) -> &RootClassifier {
        &self.classifier
    }
}

/// Tree entry for a real node; children are attached by the caller
fn tree_node(node: &Node, depth: usize, total_children: usize) -> TreeNode {
    TreeNode {
        id: node.id.clone(),
        text: node.plain_text(),
        created_at: node.created_at,
        updated_at: node.updated_at,
        depth,
        total_children,
        shown_children: 0,
        has_more_children: total_children > 0,
        kind: TreeNodeKind::Node,
        children: Vec::new(),
    }
}

/// Attach `children` and recompute the shown/has-more counters
fn attach_children(parent: &mut TreeNode, children: Vec<TreeNode>) {
    parent.shown_children = children.len();
    parent.has_more_children = parent.shown_children < parent.total_children;
    parent.children = children;
}
