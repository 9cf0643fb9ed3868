//! Tests for structure-only mapping

use super::*;
use crate::models::{TreeNodeKind, CYCLE_SENTINEL, MAX_DEPTH_SENTINEL};
use crate::remote::InMemoryGraphStore;
use crate::services::graph_reader::GraphReadService;
use crate::services::traversal::{render_structure, RootClassifier, TraversalConfig};
use std::sync::Arc;

fn service_with_limits(
    store: InMemoryGraphStore,
    limits: StructureLimits,
) -> (TraversalService, Arc<InMemoryGraphStore>) {
    let store = Arc::new(store);
    let reader = Arc::new(GraphReadService::new(store.clone()));
    let config = TraversalConfig {
        structure_limits: limits,
        ..Default::default()
    };
    (
        TraversalService::new(reader, RootClassifier::default(), config),
        store,
    )
}

fn service(store: InMemoryGraphStore) -> (TraversalService, Arc<InMemoryGraphStore>) {
    service_with_limits(store, StructureLimits::default())
}

fn chain(len: usize) -> InMemoryGraphStore {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("n0", "Step 0");
    for i in 1..len {
        store.add_text_node(&format!("n{i}"), &format!("Step {i}"));
        store.add_child(&format!("n{}", i - 1), &format!("n{i}"));
    }
    store
}

#[tokio::test]
async fn test_cycle_is_cut_with_sentinel() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("a", "A").add_text_node("b", "B");
    store.add_child("a", "b");
    store.add_child("b", "a");

    let (service, _) = service(store);
    let map = service.map_structure("a").await.unwrap();

    let b = &map.tree.root.children[0];
    assert_eq!(b.id, "b");
    assert_eq!(b.children.len(), 1);
    assert_eq!(b.children[0].kind, TreeNodeKind::Cycle);
    assert_eq!(b.children[0].id, "a");

    let rendered = render_structure(&map.tree);
    assert!(rendered.contains(CYCLE_SENTINEL));
    assert!(map.fallback.is_none());
}

#[tokio::test]
async fn test_self_loop_is_a_cycle() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("a", "A");
    store.add_child("a", "a");

    let (service, _) = service(store);
    let map = service.map_structure("a").await.unwrap();
    assert_eq!(map.tree.root.children[0].kind, TreeNodeKind::Cycle);
}

#[tokio::test]
async fn test_depth_ceiling_adds_single_sentinel() {
    let (service, _) = service_with_limits(
        chain(6),
        StructureLimits {
            max_depth: 2,
            ..Default::default()
        },
    );
    let map = service.map_structure("n0").await.unwrap();

    let n2 = map.tree.find("n2").unwrap();
    assert_eq!(n2.depth, 2);
    assert_eq!(n2.children.len(), 1);
    assert_eq!(n2.children[0].kind, TreeNodeKind::MaxDepth);
    assert_eq!(n2.children[0].text, MAX_DEPTH_SENTINEL);
    assert!(map.tree.find("n3").is_none());
}

#[tokio::test]
async fn test_leaf_at_ceiling_gets_no_sentinel() {
    let (service, _) = service_with_limits(
        chain(3),
        StructureLimits {
            max_depth: 2,
            ..Default::default()
        },
    );
    let map = service.map_structure("n0").await.unwrap();
    assert!(!map.tree.root.contains_kind(TreeNodeKind::MaxDepth));
}

#[tokio::test]
async fn test_children_per_node_are_capped() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("root", "Root");
    for i in 0..250 {
        store.add_text_node(&format!("c{i}"), "child");
        store.add_child("root", &format!("c{i}"));
    }

    let (service, _) = service(store);
    let map = service.map_structure("root").await.unwrap();

    assert_eq!(map.tree.root.shown_children, 200);
    assert_eq!(map.tree.root.total_children, 250);
    assert!(map.tree.root.has_more_children);
    assert!(map.truncated);
    assert_eq!(map.tree.root.children[199].id, "c199");
}

#[tokio::test]
async fn test_node_limit_bounds_the_map() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("root", "Root");
    for i in 0..30 {
        store.add_text_node(&format!("c{i}"), "child");
        store.add_child("root", &format!("c{i}"));
    }

    let (service, _) = service_with_limits(
        store,
        StructureLimits {
            max_nodes: 10,
            ..Default::default()
        },
    );
    let map = service.map_structure("root").await.unwrap();

    assert!(map.tree.node_count() <= 10);
    assert!(map.truncated);
}

#[tokio::test]
async fn test_shared_subtree_is_expanded_once_and_shown_per_path() {
    let mut store = InMemoryGraphStore::new();
    for id in ["root", "a", "b", "c"] {
        store.add_text_node(id, id);
    }
    store.add_child("root", "a");
    store.add_child("root", "b");
    store.add_child("a", "c");
    store.add_child("b", "c");

    let (service, store) = service(store);
    let map = service.map_structure("root").await.unwrap();

    assert!(!map.tree.root.contains_kind(TreeNodeKind::Cycle));
    assert_eq!(map.tree.node_count(), 5);
    assert_eq!(map.nodes_discovered, 4);

    let log = store.fetch_log().await;
    let mut requested: Vec<String> = log.into_iter().flatten().collect();
    let before = requested.len();
    requested.sort();
    requested.dedup();
    assert_eq!(requested.len(), before);
}

#[tokio::test]
async fn test_failure_falls_back_to_direct_children() {
    let mut store = InMemoryGraphStore::new();
    store
        .add_text_node("root", "Root")
        .add_text_node("c0", "Child")
        .add_text_node("g0", "Grandchild");
    store.add_child("root", "c0");
    store.add_child("c0", "g0");
    store.fail_fetches_of("g0");

    let (service, _) = service(store);
    let map = service.map_structure("root").await.unwrap();

    let report = map.fallback.expect("fallback report");
    assert!(report.original_error.contains("g0"));
    assert!(report.outcome.contains("1 direct child"));
    assert_eq!(map.tree.root.children.len(), 1);
    assert_eq!(map.tree.root.children[0].total_children, 1);
    assert!(map.truncated);
}

#[tokio::test]
async fn test_fallback_lists_every_direct_child() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("root", "Root");
    for i in 0..250 {
        let id = format!("c{i}");
        store.add_text_node(&id, &format!("Child {i}"));
        store.add_child("root", &id);
    }
    store.add_text_node("g0", "Grandchild");
    store.add_child("c0", "g0");
    store.fail_fetches_of("g0");

    let (service, _) = service(store);
    let map = service.map_structure("root").await.unwrap();

    assert!(map.fallback.is_some());
    let root = &map.tree.root;
    assert_eq!(root.total_children, 250);
    assert_eq!(root.shown_children, 250);
    assert_eq!(root.children.len(), 250);
    assert!(!root.has_more_children);
    assert_eq!(root.children[249].id, "c249");
    assert_eq!(map.nodes_discovered, 251);
}

#[tokio::test]
async fn test_failed_fallback_reports_both_errors() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("root", "Root").fail_fetches_of("root");

    let (service, _) = service(store);
    let err = service.map_structure("root").await.unwrap_err();

    match err {
        GraphError::StructureMapFailed {
            root_id,
            original,
            fallback,
        } => {
            assert_eq!(root_id, "root");
            assert!(original.contains("injected failure"));
            assert!(fallback.contains("injected failure"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_root_is_not_found() {
    let (service, _) = service(InMemoryGraphStore::new());
    let err = service.map_structure("ghost").await.unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { .. }));
}
