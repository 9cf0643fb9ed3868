//! Structure-Only Mapping
//!
//! Maps the whole hierarchy under a root, titles only, within hard limits
//! (depth 12, 2000 nodes, 200 children per node).
//!
//! # Phases
//!
//! 1. **Discovery**: BFS by level, one bulk hydrate per chunk of frontier ids.
//!    Each id is expanded at most once.
//! 2. **Materialization**: recursive build with a copy-on-descend `visited`
//!    set. A child already on the current path becomes a `[CYCLE DETECTED]`
//!    leaf; a node at the depth ceiling that has children gets one
//!    `[MAX DEPTH REACHED]` leaf. The node limit bounds this phase too, since
//!    shared subtrees are materialized once per path.
//!
//! When discovery fails outright, a single `get_children(root)` is tried and
//! a one-level tree is returned together with a [`FallbackReport`].

use super::{attach_children, tree_node, TraversalService};
use crate::models::{Layer, LoadedTree, Node, TreeNode};
use crate::services::error::{GraphError, GraphResult};
use crate::services::graph_reader::ChildListing;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Ids per bulk hydrate during discovery
const DISCOVERY_CHUNK: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
    pub max_children: usize,
}

impl Default for StructureLimits {
    fn default() -> Self {
        Self {
            max_depth: 12,
            max_nodes: 2000,
            max_children: 200,
        }
    }
}

/// Why the one-level fallback was used and what it produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackReport {
    pub original_error: String,
    pub outcome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureMap {
    pub tree: LoadedTree,
    pub nodes_discovered: usize,
    /// Some limit cut the map short
    pub truncated: bool,
    pub fallback: Option<FallbackReport>,
}

#[derive(Debug)]
struct ChildSlice {
    ids: Vec<String>,
    total: usize,
}

#[derive(Debug, Default)]
struct Discovery {
    nodes: HashMap<String, Node>,
    children: HashMap<String, ChildSlice>,
    truncated: bool,
}

impl Discovery {
    fn build(
        &self,
        id: &str,
        depth: usize,
        visited: &HashSet<String>,
        emitted: &mut usize,
        limits: &StructureLimits,
    ) -> Option<TreeNode> {
        let node = self.nodes.get(id)?;
        *emitted += 1;

        let slice = self.children.get(id);
        let total = slice.map_or(0, |s| s.total);
        let mut entry = tree_node(node, depth, total);
        let Some(slice) = slice.filter(|s| s.total > 0) else {
            return Some(entry);
        };

        if depth >= limits.max_depth {
            *emitted += 1;
            attach_children(&mut entry, vec![TreeNode::max_depth(id, depth + 1)]);
            entry.has_more_children = true;
            return Some(entry);
        }

        let mut visited = visited.clone();
        visited.insert(id.to_string());

        let mut children = Vec::with_capacity(slice.ids.len());
        for child_id in &slice.ids {
            if *emitted >= limits.max_nodes {
                break;
            }
            if visited.contains(child_id) {
                *emitted += 1;
                children.push(TreeNode::cycle(child_id.clone(), depth + 1));
                continue;
            }
            if let Some(child) = self.build(child_id, depth + 1, &visited, emitted, limits) {
                children.push(child);
            }
        }

        attach_children(&mut entry, children);
        Some(entry)
    }
}

/// Merge chunk layers, dropping relations seen in an earlier chunk
fn merge_layers(layers: Vec<Layer>) -> Layer {
    let mut merged = Layer::default();
    let mut relation_ids = HashSet::new();
    for layer in layers {
        merged.nodes_by_id.extend(layer.nodes_by_id);
        for relation in layer.relations {
            if relation_ids.insert(relation.id.clone()) {
                merged.relations.push(relation);
            }
        }
    }
    merged
}

/// One level, every listed child; the per-node cap does not apply here
fn fallback_tree(root: &Node, listing: &ChildListing) -> LoadedTree {
    let mut entry = tree_node(root, 0, listing.children.len());
    let children = listing
        .children
        .iter()
        .map(|child| tree_node(&child.node, 1, child.child_count))
        .collect();
    attach_children(&mut entry, children);
    LoadedTree::new(entry)
}

impl TraversalService {
    /// Titles-only map of everything under `root_id`
    #[tracing::instrument(skip(self), fields(root = %root_id))]
    pub async fn map_structure(&self, root_id: &str) -> GraphResult<StructureMap> {
        let limits = self.config.structure_limits;

        let original = match self.discover(root_id, &limits).await {
            Ok(discovery) => {
                let mut emitted = 0;
                let root = discovery
                    .build(root_id, 0, &HashSet::new(), &mut emitted, &limits)
                    .ok_or_else(|| GraphError::node_not_found(root_id))?;

                let map = StructureMap {
                    tree: LoadedTree::new(root),
                    nodes_discovered: discovery.nodes.len(),
                    truncated: discovery.truncated || emitted >= limits.max_nodes,
                    fallback: None,
                };
                tracing::info!(
                    "Mapped {}: {} nodes discovered, {} tree entries",
                    root_id,
                    map.nodes_discovered,
                    map.tree.node_count()
                );
                return Ok(map);
            }
            Err(err @ GraphError::NodeNotFound { .. }) => return Err(err),
            Err(err) => err,
        };

        tracing::warn!(
            "Structure map of {} failed, falling back to direct children: {}",
            root_id,
            original
        );

        match self.reader.get_children(root_id).await {
            Ok(listing) => {
                let Some(root) = listing.parent.as_ref() else {
                    return Err(GraphError::StructureMapFailed {
                        root_id: root_id.to_string(),
                        original: original.to_string(),
                        fallback: format!("root node {} not found", root_id),
                    });
                };
                let tree = fallback_tree(root, &listing);
                let outcome = format!(
                    "loaded {} direct child(ren) of {}",
                    tree.root.shown_children, root_id
                );
                Ok(StructureMap {
                    nodes_discovered: 1 + listing.children.len(),
                    truncated: true,
                    fallback: Some(FallbackReport {
                        original_error: original.to_string(),
                        outcome,
                    }),
                    tree,
                })
            }
            Err(fallback) => {
                tracing::error!("Fallback for {} failed too: {}", root_id, fallback);
                Err(GraphError::StructureMapFailed {
                    root_id: root_id.to_string(),
                    original: original.to_string(),
                    fallback: fallback.to_string(),
                })
            }
        }
    }

    async fn discover(&self, root_id: &str, limits: &StructureLimits) -> GraphResult<Discovery> {
        let mut discovery = Discovery::default();
        let mut seen = HashSet::from([root_id.to_string()]);
        let mut frontier = vec![root_id.to_string()];

        for depth in 0..=limits.max_depth {
            if frontier.is_empty() {
                break;
            }

            let chunks = frontier.chunks(DISCOVERY_CHUNK);
            let layers = join_all(chunks.map(|ids| self.reader.fetch_layer(ids))).await;
            let layer = merge_layers(layers.into_iter().collect::<GraphResult<Vec<_>>>()?);

            if depth == 0 && layer.node(root_id).is_none() {
                return Err(GraphError::node_not_found(root_id));
            }

            let mut next = Vec::new();
            for id in &frontier {
                if let Some(node) = layer.node(id) {
                    discovery.nodes.insert(id.clone(), node.clone());
                }

                let present: Vec<&str> = layer
                    .child_relations(id)
                    .filter(|relation| layer.node(&relation.to_id).is_some())
                    .map(|relation| relation.to_id.as_str())
                    .collect();
                let total = present.len();
                if total > limits.max_children {
                    discovery.truncated = true;
                }
                let ids: Vec<String> = present
                    .into_iter()
                    .take(limits.max_children)
                    .map(str::to_string)
                    .collect();

                if depth < limits.max_depth {
                    for child_id in &ids {
                        if seen.contains(child_id) {
                            continue;
                        }
                        if seen.len() >= limits.max_nodes {
                            discovery.truncated = true;
                            break;
                        }
                        seen.insert(child_id.clone());
                        next.push(child_id.clone());
                    }
                }

                discovery.children.insert(id.clone(), ChildSlice { ids, total });
            }

            tracing::debug!(
                "Discovery depth {}: {} node(s) expanded, {} queued",
                depth,
                frontier.len(),
                next.len()
            );
            frontier = next;
        }

        Ok(discovery)
    }
}

#[cfg(test)]
#[path = "structure_test.rs"]
mod structure_test;
