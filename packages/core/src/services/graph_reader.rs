//! Graph Read Primitives
//!
//! Thin wrappers over [`GraphStore`] that every higher-level operation builds
//! on. The interesting one is [`GraphReadService::get_children`]: it resolves
//! a parent's `"child"` relations into hydrated nodes and annotates each child
//! with its own child count using one extra bulk hydrate.

use crate::models::{Layer, Node};
use crate::remote::GraphStore;
use crate::services::error::{GraphError, GraphResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// A hydrated child of some parent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildNode {
    pub node: Node,
    /// The `"child"` relation linking it to the parent
    pub relation_id: String,
    pub has_children: bool,
    pub child_count: usize,
}

/// Result of [`GraphReadService::get_children`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildListing {
    /// `None` when the parent itself does not exist
    pub parent: Option<Node>,
    /// Children in store order
    pub children: Vec<ChildNode>,
}

impl ChildListing {
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|child| child.node.id.as_str())
    }
}

/// Read-side access to the remote graph
#[derive(Clone)]
pub struct GraphReadService {
    store: Arc<dyn GraphStore>,
}

impl GraphReadService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Direct children of `parent_id`, annotated with their own child counts
    ///
    /// Relations whose target node is missing from the hydrated layer are
    /// dropped. When nothing is left no second remote call is made.
    pub async fn get_children(&self, parent_id: &str) -> GraphResult<ChildListing> {
        let layer = self
            .store
            .fetch_layer(&[parent_id.to_string()])
            .await
            .map_err(|e| GraphError::node_operation(parent_id, "get children of", e))?;

        let parent = layer.node(parent_id).cloned();
        let mut children = Vec::new();
        for relation in layer.child_relations(parent_id) {
            match layer.node(&relation.to_id) {
                Some(node) => children.push(ChildNode {
                    node: node.clone(),
                    relation_id: relation.id.clone(),
                    has_children: false,
                    child_count: 0,
                }),
                None => tracing::debug!(
                    "Dropping dangling child relation {} ({} -> {})",
                    relation.id,
                    parent_id,
                    relation.to_id
                ),
            }
        }

        if children.is_empty() {
            return Ok(ChildListing { parent, children });
        }

        let mut child_ids: Vec<String> = Vec::with_capacity(children.len());
        for child in &children {
            if !child_ids.contains(&child.node.id) {
                child_ids.push(child.node.id.clone());
            }
        }

        let child_layer = self.store.fetch_layer(&child_ids).await.map_err(|e| {
            GraphError::batch_operation(format!("children-of-{}", parent_id), "annotate", e)
        })?;

        let counts = count_child_relations(&child_layer);
        for child in &mut children {
            let count = counts.get(child.node.id.as_str()).copied().unwrap_or(0);
            child.child_count = count;
            child.has_children = count > 0;
        }

        Ok(ChildListing { parent, children })
    }

    /// One node by id, `None` when it does not exist
    pub async fn get_node(&self, id: &str) -> GraphResult<Option<Node>> {
        let layer = self
            .store
            .fetch_layer(&[id.to_string()])
            .await
            .map_err(|e| GraphError::node_operation(id, "fetch", e))?;
        Ok(layer.nodes_by_id.get(id).cloned())
    }

    /// One node together with every relation touching it
    pub async fn get_node_layer(&self, id: &str) -> GraphResult<Layer> {
        self.store
            .fetch_layer(&[id.to_string()])
            .await
            .map_err(|e| GraphError::node_operation(id, "fetch", e))
    }

    /// Bulk hydrate passthrough
    pub async fn fetch_layer(&self, ids: &[String]) -> GraphResult<Layer> {
        self.store
            .fetch_layer(ids)
            .await
            .map_err(|e| GraphError::batch_operation(batch_label(ids), "fetch layer", e))
    }

    pub async fn search(&self, query: &str, limit: usize) -> GraphResult<Vec<Node>> {
        self.store
            .search(query, limit)
            .await
            .map_err(|e| GraphError::batch_operation(format!("search:{}", query), "search", e))
    }
}

/// Number of `"child"` relations leaving each node of the layer
pub(crate) fn count_child_relations(layer: &Layer) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for relation in layer.relations.iter().filter(|r| r.is_child()) {
        *counts.entry(relation.from_id.as_str()).or_insert(0) += 1;
    }
    counts
}

fn batch_label(ids: &[String]) -> String {
    match ids {
        [] => "empty".to_string(),
        [only] => only.clone(),
        [first, rest @ ..] => format!("{}+{}", first, rest.len()),
    }
}
