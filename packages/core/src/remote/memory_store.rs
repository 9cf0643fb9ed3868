//! In-Memory GraphStore
//!
//! A complete [`GraphStore`] held in process memory. Used by the test suites
//! and for offline development; it applies every [`TransactionOp`] kind and
//! records what it was asked to do so tests can assert on call counts and
//! submitted transactions.
//!
//! Relations are kept in insertion order, which is the "store order" callers
//! see through [`Layer::relations`].

use crate::models::{ListAction, Layer, Node, Relation, TransactionOp};
use crate::remote::error::{RemoteError, RemoteResult};
use crate::remote::store::GraphStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Default)]
struct GraphState {
    nodes: HashMap<String, Node>,
    relations: Vec<Relation>,
    /// Positioning metadata kept per object
    relation_lists: HashMap<String, Vec<String>>,
}

impl GraphState {
    fn apply(&mut self, op: &TransactionOp) -> Result<(), String> {
        match op {
            TransactionOp::AddNode { node } => {
                self.nodes.insert(
                    node.id.clone(),
                    Node {
                        id: node.id.clone(),
                        content: node.content.clone(),
                        author_id: Some(node.author_id.clone()),
                        created_at: Some(node.created_at),
                        updated_at: Some(node.created_at),
                        is_public: node.is_public,
                        is_checked: node.is_checked,
                        canonical_relation_id: node.canonical_relation_id.clone(),
                    },
                );
            }
            TransactionOp::UpdateNode { id, new_props, .. } => {
                let node = self
                    .nodes
                    .get_mut(id)
                    .ok_or_else(|| format!("node {} does not exist", id))?;
                if let Some(content) = &new_props.content {
                    node.content = content.clone();
                }
                if let Some(is_public) = new_props.is_public {
                    node.is_public = is_public;
                }
                if let Some(is_checked) = new_props.is_checked {
                    node.is_checked = is_checked;
                }
                if let Some(canonical) = &new_props.canonical_relation_id {
                    node.canonical_relation_id = canonical.clone();
                }
                if new_props.updated_at.is_some() {
                    node.updated_at = new_props.updated_at;
                }
            }
            TransactionOp::DeleteNode { id } => {
                if self.nodes.remove(id).is_none() {
                    return Err(format!("node {} does not exist", id));
                }
                self.relations
                    .retain(|relation| relation.from_id != *id && relation.to_id != *id);
            }
            TransactionOp::AddRelation { relation } => {
                if self.relations.iter().any(|r| r.id == relation.id) {
                    return Err(format!("relation {} already exists", relation.id));
                }
                self.relations.push(relation.clone());
            }
            TransactionOp::UpdateRelation { id, new_props, .. } => {
                let relation = self
                    .relations
                    .iter_mut()
                    .find(|relation| relation.id == *id)
                    .ok_or_else(|| format!("relation {} does not exist", id))?;
                if let Some(from_id) = &new_props.from_id {
                    relation.from_id = from_id.clone();
                }
                if let Some(to_id) = &new_props.to_id {
                    relation.to_id = to_id.clone();
                }
                if let Some(canonical) = &new_props.canonical_relation_id {
                    relation.canonical_relation_id = canonical.clone();
                }
            }
            TransactionOp::UpdateRelationList {
                object_id,
                relation_id,
                action,
            } => {
                let list = self.relation_lists.entry(object_id.clone()).or_default();
                match action {
                    ListAction::Add => {
                        if !list.contains(relation_id) {
                            list.push(relation_id.clone());
                        }
                    }
                    ListAction::Remove => list.retain(|id| id != relation_id),
                }
            }
        }
        Ok(())
    }
}

/// [`GraphStore`] backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
    failing_ids: HashSet<String>,
    fail_transactions: bool,
    fetch_calls: AtomicUsize,
    fetch_log: Mutex<Vec<Vec<String>>>,
    transactions: Mutex<Vec<Vec<TransactionOp>>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node
    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.state.get_mut().nodes.insert(node.id.clone(), node);
        self
    }

    /// Insert a node holding a single text block
    pub fn add_text_node(&mut self, id: &str, text: &str) -> &mut Self {
        self.add_node(Node::with_text(id, text))
    }

    pub fn add_relation(&mut self, relation: Relation) -> &mut Self {
        let state = self.state.get_mut();
        state
            .relation_lists
            .entry(relation.from_id.clone())
            .or_default()
            .push(relation.id.clone());
        state.relations.push(relation);
        self
    }

    /// Add a `"child"` edge `parent → child` and return its relation id
    pub fn add_child(&mut self, parent_id: &str, child_id: &str) -> String {
        let relation_id = format!("rel-{}-{}", parent_id, child_id);
        self.add_relation(Relation::new(
            relation_id.clone(),
            parent_id,
            child_id,
            crate::models::CHILD_RELATION,
        ));
        relation_id
    }

    /// Any `fetch_layer` call that asks for `id` fails with HTTP 503
    pub fn fail_fetches_of(&mut self, id: &str) -> &mut Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    /// Every `apply_transaction` call fails with HTTP 500
    pub fn fail_transactions(&mut self) -> &mut Self {
        self.fail_transactions = true;
        self
    }

    /// Number of `fetch_layer` calls served (failed ones included)
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// The id lists of every `fetch_layer` call, in call order
    pub async fn fetch_log(&self) -> Vec<Vec<String>> {
        self.fetch_log.lock().await.clone()
    }

    /// Every transaction that was applied, in submission order
    pub async fn transactions(&self) -> Vec<Vec<TransactionOp>> {
        self.transactions.lock().await.clone()
    }

    pub async fn node(&self, id: &str) -> Option<Node> {
        self.state.read().await.nodes.get(id).cloned()
    }

    pub async fn relations(&self) -> Vec<Relation> {
        self.state.read().await.relations.clone()
    }

    /// Positioning list recorded on `object_id`
    pub async fn relation_list(&self, object_id: &str) -> Vec<String> {
        self.state
            .read()
            .await
            .relation_lists
            .get(object_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn fetch_layer(&self, object_ids: &[String]) -> RemoteResult<Layer> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_log.lock().await.push(object_ids.to_vec());

        if let Some(id) = object_ids.iter().find(|id| self.failing_ids.contains(*id)) {
            return Err(RemoteError::status(
                "fetchLayer",
                503,
                format!("injected failure for {}", id),
            ));
        }

        let state = self.state.read().await;
        let requested: HashSet<&str> = object_ids.iter().map(String::as_str).collect();
        let mut layer = Layer::default();

        for id in &requested {
            if let Some(node) = state.nodes.get(*id) {
                layer.nodes_by_id.insert(node.id.clone(), node.clone());
            }
        }

        for relation in &state.relations {
            let touches_from = requested.contains(relation.from_id.as_str());
            let touches_to = requested.contains(relation.to_id.as_str());
            if !touches_from && !touches_to {
                continue;
            }
            for end in [&relation.from_id, &relation.to_id] {
                if let Some(node) = state.nodes.get(end) {
                    layer
                        .nodes_by_id
                        .entry(node.id.clone())
                        .or_insert_with(|| node.clone());
                }
            }
            layer.relations.push(relation.clone());
        }

        Ok(layer)
    }

    async fn apply_transaction(&self, ops: &[TransactionOp]) -> RemoteResult<()> {
        if self.fail_transactions {
            return Err(RemoteError::status(
                "applyTransaction",
                500,
                "injected transaction failure",
            ));
        }

        let mut state = self.state.write().await;
        let mut staged = state.clone();
        for op in ops {
            staged
                .apply(op)
                .map_err(|message| RemoteError::status("applyTransaction", 409, message))?;
        }
        *state = staged;

        self.transactions.lock().await.push(ops.to_vec());
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> RemoteResult<Vec<Node>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;

        let mut matches: Vec<Node> = state
            .nodes
            .values()
            .filter(|node| node.plain_text().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewNode, RelationProps};
    use chrono::Utc;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_layer_includes_both_ends_of_touching_relations() {
        let mut store = InMemoryGraphStore::new();
        store
            .add_text_node("root", "Root")
            .add_text_node("a", "A")
            .add_text_node("b", "B");
        store.add_child("root", "a");
        store.add_child("a", "b");

        let layer = store.fetch_layer(&ids(&["a"])).await.unwrap();

        assert_eq!(layer.relations.len(), 2);
        assert!(layer.node("root").is_some());
        assert!(layer.node("b").is_some());
        assert_eq!(store.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_absent() {
        let store = InMemoryGraphStore::new();
        let layer = store.fetch_layer(&ids(&["ghost"])).await.unwrap();
        assert!(layer.nodes_by_id.is_empty());
        assert!(layer.relations.is_empty());
    }

    #[tokio::test]
    async fn test_failed_op_leaves_state_untouched() {
        let mut store = InMemoryGraphStore::new();
        store.add_text_node("a", "A");

        let ops = vec![
            TransactionOp::AddNode {
                node: NewNode {
                    id: "b".to_string(),
                    content: vec![],
                    author_id: "user".to_string(),
                    created_at: Utc::now(),
                    is_public: false,
                    is_checked: None,
                    canonical_relation_id: None,
                },
            },
            TransactionOp::UpdateRelation {
                id: "missing".to_string(),
                old_props: RelationProps::default(),
                new_props: RelationProps::default(),
            },
        ];

        let err = store.apply_transaction(&ops).await.unwrap_err();
        assert_eq!(err.http_status(), Some(409));
        assert!(store.node("b").await.is_none());
        assert!(store.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_injected_fetch_failure() {
        let mut store = InMemoryGraphStore::new();
        store.add_text_node("a", "A").fail_fetches_of("a");

        let err = store.fetch_layer(&ids(&["x", "a"])).await.unwrap_err();
        assert_eq!(err.http_status(), Some(503));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_limited() {
        let mut store = InMemoryGraphStore::new();
        store
            .add_text_node("1", "Buy Milk")
            .add_text_node("2", "milk shake")
            .add_text_node("3", "bread");

        let hits = store.search("MILK", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }
}
