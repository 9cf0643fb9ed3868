//! Budgeted Level-by-Level Walk
//!
//! 1. Sample the root's children (1 budget unit)
//! 2. Pick the base strategy from the root kind, adjust it once from the
//!    observed fan-out
//! 3. For each level up to `target_depth`, while a full round is affordable:
//!    fetch children of every frontier node concurrently, cut each list to
//!    the level's breadth, then hydrate the frontier in one bulk call
//! 4. Materialize the recorded levels into a tree
//!
//! Rounds are strictly sequential and never start partially. A failed round
//! fails the whole call.

use super::budget::{TraversalBudget, ROUND_COST, SAMPLE_COST};
use super::strategy::{level_breadth, AdjustmentMode, TraversalPriority, TraversalStrategy};
use super::{attach_children, tree_node, TraversalService};
use crate::models::{Layer, LoadedTree, Node, TreeNode};
use crate::services::error::{GraphError, GraphResult};
use crate::services::graph_reader::ChildListing;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct ExploreOptions {
    pub budget: Option<u32>,
    /// Skip root classification and start from this priority
    pub priority: Option<TraversalPriority>,
    pub adjustment: Option<AdjustmentMode>,
}

/// What one walk cost and reached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalStats {
    /// BFS rounds after the root sample
    pub rounds: usize,
    pub budget_used: u32,
    pub budget_remaining: u32,
    /// Distinct nodes hydrated
    pub nodes_loaded: usize,
    pub max_depth_reached: usize,
    /// The strategy after adjustment
    pub strategy: TraversalStrategy,
    /// True when the walk stopped because a round was unaffordable
    pub budget_exhausted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalResult {
    pub tree: LoadedTree,
    pub stats: TraversalStats,
}

#[derive(Debug, Clone)]
struct ChildrenInfo {
    limited: Vec<String>,
    total: usize,
}

#[derive(Debug, Default)]
struct Walk {
    nodes: HashMap<String, Node>,
    /// Annotated child counts from `get_children`
    child_counts: HashMap<String, usize>,
    /// Keyed by parent id, so concurrent results never depend on arrival order
    children: HashMap<String, ChildrenInfo>,
}

impl Walk {
    /// Record a listing cut to `breadth`; returns the kept child ids
    fn record(&mut self, parent_id: &str, listing: ChildListing, breadth: usize) -> Vec<String> {
        if let Some(parent) = listing.parent {
            self.nodes.entry(parent.id.clone()).or_insert(parent);
        }

        let total = listing.children.len();
        let mut limited = Vec::with_capacity(total.min(breadth));
        for child in listing.children {
            self.child_counts
                .insert(child.node.id.clone(), child.child_count);
            if limited.len() < breadth {
                limited.push(child.node.id.clone());
                self.nodes.entry(child.node.id.clone()).or_insert(child.node);
            }
        }

        self.children.insert(
            parent_id.to_string(),
            ChildrenInfo {
                limited: limited.clone(),
                total,
            },
        );
        limited
    }

    /// Replace cached records of `ids` with freshly hydrated ones
    fn refresh(&mut self, layer: &Layer, ids: &[String]) {
        for id in ids {
            if let Some(node) = layer.node(id) {
                self.nodes.insert(id.clone(), node.clone());
            }
        }
    }

    fn materialize(
        &self,
        id: &str,
        depth: usize,
        target_depth: usize,
        path: &mut Vec<String>,
    ) -> Option<TreeNode> {
        let node = self.nodes.get(id)?;

        let Some(info) = self.children.get(id) else {
            // Never expanded: report what the parent's annotation said
            let total = self.child_counts.get(id).copied().unwrap_or(0);
            return Some(tree_node(node, depth, total));
        };

        let mut entry = tree_node(node, depth, info.total);
        if depth >= target_depth {
            return Some(entry);
        }

        path.push(id.to_string());
        let mut children = Vec::with_capacity(info.limited.len());
        for child_id in &info.limited {
            if path.iter().any(|ancestor| ancestor == child_id) {
                children.push(TreeNode::cycle(child_id.clone(), depth + 1));
                continue;
            }
            if let Some(child) = self.materialize(child_id, depth + 1, target_depth, path) {
                children.push(child);
            }
        }
        path.pop();

        attach_children(&mut entry, children);
        Some(entry)
    }
}

/// Order-preserving dedupe that also skips already-expanded ids
fn frontier_of(candidates: Vec<String>, expanded: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|id| !expanded.contains(id) && seen.insert(id.clone()))
        .collect()
}

/// Distinct real nodes in the tree; sentinels and unshown records excluded
fn materialized_nodes(root: &TreeNode) -> usize {
    fn collect<'a>(node: &'a TreeNode, ids: &mut HashSet<&'a str>) {
        if node.is_sentinel() {
            return;
        }
        ids.insert(node.id.as_str());
        for child in &node.children {
            collect(child, ids);
        }
    }

    let mut ids = HashSet::new();
    collect(root, &mut ids);
    ids.len()
}

impl TraversalService {
    /// Adaptive budgeted walk from `root_id`
    #[tracing::instrument(skip(self, options), fields(root = %root_id))]
    pub async fn explore(&self, root_id: &str, options: ExploreOptions) -> GraphResult<TraversalResult> {
        let mut budget = TraversalBudget::new(options.budget.unwrap_or(self.config.budget));
        let mode = options.adjustment.unwrap_or(self.config.adjustment);
        let base = match options.priority {
            Some(priority) => TraversalStrategy::for_priority(priority),
            None => self.classifier.strategy_for(root_id),
        };

        budget.charge(SAMPLE_COST);
        let sample = self.reader.get_children(root_id).await?;
        if sample.parent.is_none() {
            return Err(GraphError::node_not_found(root_id));
        }

        let strategy = base.adjusted(sample.children.len());
        tracing::debug!(
            "Root {} has {} children, strategy {:?} breadth {} depth {}",
            root_id,
            sample.children.len(),
            strategy.priority,
            strategy.max_breadth,
            strategy.target_depth
        );

        let mut walk = Walk::default();
        let mut expanded = HashSet::from([root_id.to_string()]);
        let mut candidates = walk.record(root_id, sample, strategy.max_breadth);
        let mut rounds = 0;
        let mut budget_exhausted = false;

        for depth in 1..=strategy.target_depth {
            let level = frontier_of(std::mem::take(&mut candidates), &expanded);
            if level.is_empty() {
                break;
            }
            if !budget.try_spend(ROUND_COST) {
                budget_exhausted = true;
                tracing::debug!("Budget exhausted before level {}", depth);
                break;
            }
            rounds += 1;

            let breadth = match mode {
                AdjustmentMode::Once => strategy.max_breadth,
                AdjustmentMode::PerLevel => {
                    let sample: Vec<usize> = level
                        .iter()
                        .take(3)
                        .map(|id| walk.child_counts.get(id).copied().unwrap_or(0))
                        .collect();
                    level_breadth(strategy.max_breadth, &sample)
                }
            };

            tracing::debug!(
                "Round {} at depth {}: expanding {} node(s), breadth {}",
                rounds,
                depth,
                level.len(),
                breadth
            );

            let listings = join_all(level.iter().map(|id| self.reader.get_children(id))).await;
            for (id, listing) in level.iter().zip(listings) {
                let kept = walk.record(id, listing?, breadth);
                expanded.insert(id.clone());
                if depth < strategy.target_depth {
                    candidates.extend(kept);
                }
            }

            let layer = self.reader.fetch_layer(&level).await?;
            walk.refresh(&layer, &level);
        }

        let root = walk
            .materialize(root_id, 0, strategy.target_depth, &mut Vec::new())
            .ok_or_else(|| GraphError::node_not_found(root_id))?;
        let tree = LoadedTree::new(root);

        let stats = TraversalStats {
            rounds,
            budget_used: budget.used(),
            budget_remaining: budget.remaining(),
            nodes_loaded: materialized_nodes(&tree.root),
            max_depth_reached: tree.root.max_depth_in_subtree(),
            strategy,
            budget_exhausted,
        };

        tracing::info!(
            "Explored {}: {} tree entries, {} nodes loaded in {} round(s), budget {}/{}",
            root_id,
            tree.node_count(),
            stats.nodes_loaded,
            rounds,
            stats.budget_used,
            stats.budget_used + stats.budget_remaining
        );

        Ok(TraversalResult { tree, stats })
    }
}

#[cfg(test)]
#[path = "adaptive_test.rs"]
mod adaptive_test;
