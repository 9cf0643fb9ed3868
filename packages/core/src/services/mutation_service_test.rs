//! Tests for the mutation engine against the in-memory store

use super::*;
use crate::remote::InMemoryGraphStore;
use serde_json::json;

const USER: &str = "7f1c6a52-3c4e-4d9a-9b7e-2a6f0e1d5c44";

fn service(store: InMemoryGraphStore) -> (MutationService, Arc<InMemoryGraphStore>) {
    let store = Arc::new(store);
    let reader = Arc::new(GraphReadService::new(store.clone()));
    let identity = SessionIdentity::new(USER).unwrap();
    (MutationService::new(store.clone(), reader, identity), store)
}

fn kinds(ops: &[TransactionOp]) -> Vec<&'static str> {
    ops.iter().map(TransactionOp::kind).collect()
}

#[test]
fn test_session_identity_requires_uuid() {
    assert!(matches!(
        SessionIdentity::new("not-a-uuid"),
        Err(GraphError::InvalidUserIdFormat { .. })
    ));
    let identity = SessionIdentity::new(&USER.to_uppercase()).unwrap();
    assert_eq!(identity.user_id(), USER);
}

#[test]
fn test_author_resolution() {
    let identity = SessionIdentity::new(USER).unwrap();

    assert_eq!(identity.resolve_author(None).unwrap(), USER);
    assert_eq!(identity.resolve_author(Some("  ")).unwrap(), USER);
    assert_eq!(
        identity.resolve_author(Some("Claude")).unwrap(),
        AI_AUTHOR_IDS[0].1
    );
    assert_eq!(
        identity.resolve_author(Some("gemini-pro")).unwrap(),
        AI_AUTHOR_IDS[2].1
    );
    assert!(matches!(
        identity.resolve_author(Some("someone")),
        Err(GraphError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_create_root_node_is_single_op() {
    let (service, store) = service(InMemoryGraphStore::new());

    let created = service
        .create_node(CreateNodeRequest {
            content: json!("Hello"),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.op_count, 1);
    assert!(created.relation_id.is_none());

    let node = store.node(&created.node_id).await.unwrap();
    assert_eq!(node.display_text(), "Hello");
    assert_eq!(node.author_id.as_deref(), Some(USER));
}

#[tokio::test]
async fn test_create_under_parent_links_and_positions() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("parent", "Parent");
    let (service, store) = service(store);

    let created = service
        .create_node(CreateNodeRequest {
            content: json!("Child"),
            parent_id: Some("parent".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let transactions = store.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(
        kinds(&transactions[0]),
        vec!["addNode", "addRelation", "updateRelationList"]
    );

    let relation_id = created.relation_id.unwrap();
    assert_eq!(store.relation_list("parent").await, vec![relation_id]);
}

#[tokio::test]
async fn test_labeled_create_is_seven_ordered_ops() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("parent", "Parent");
    let (service, store) = service(store);

    let created = service
        .create_node(CreateNodeRequest {
            content: json!("Child"),
            parent_id: Some("parent".into()),
            relation_label: Some("blocked by".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.op_count, 7);
    let transactions = store.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(
        kinds(&transactions[0]),
        vec![
            "addNode",
            "addRelation",
            "updateRelationList",
            "addNode",
            "addRelation",
            "updateRelationList",
            "updateRelation",
        ]
    );

    let relation_id = created.relation_id.unwrap();
    let type_relation_id = created.type_relation_id.unwrap();
    let label_id = created.label_node_id.unwrap();

    let relations = store.relations().await;
    let child = relations.iter().find(|r| r.id == relation_id).unwrap();
    assert_eq!(
        child.canonical_relation_id.as_deref(),
        Some(type_relation_id.as_str())
    );

    let type_relation = relations.iter().find(|r| r.id == type_relation_id).unwrap();
    assert_eq!(type_relation.relation_type_id, TYPE_RELATION);
    assert_eq!(type_relation.from_id, relation_id);
    assert_eq!(type_relation.to_id, label_id);

    assert_eq!(
        store.node(&label_id).await.unwrap().display_text(),
        "blocked by"
    );
}

#[tokio::test]
async fn test_replacement_repoints_the_placement() {
    let mut store = InMemoryGraphStore::new();
    store
        .add_text_node("parent", "Parent")
        .add_text_node("original", "Original");
    let (service, store) = service(store);

    let created = service
        .create_node(CreateNodeRequest {
            content: json!([{"type": "replacement", "nodeId": "original"}]),
            parent_id: Some("parent".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.replaced_by.as_deref(), Some("original"));
    let relation_id = created.relation_id.unwrap();
    let relations = store.relations().await;
    let placement = relations.iter().find(|r| r.id == relation_id).unwrap();
    assert_eq!(placement.to_id, "original");
}

#[tokio::test]
async fn test_label_without_parent_is_rejected() {
    let (service, store) = service(InMemoryGraphStore::new());
    let err = service
        .create_node(CreateNodeRequest {
            content: json!("x"),
            relation_label: Some("tag".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::InvalidInput(_)));
    assert!(store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_unrecognized_content_is_reported() {
    let (service, _) = service(InMemoryGraphStore::new());
    let created = service
        .create_node(CreateNodeRequest {
            content: json!(42),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.diagnostics.len(), 1);
}

#[tokio::test]
async fn test_ai_author_override() {
    let (service, store) = service(InMemoryGraphStore::new());
    let created = service
        .create_node(CreateNodeRequest {
            content: json!("Drafted"),
            author: Some("gpt".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let node = store.node(&created.node_id).await.unwrap();
    assert_eq!(node.author_id.as_deref(), Some(AI_AUTHOR_IDS[1].1));
}

#[tokio::test]
async fn test_update_missing_node_fails_without_transaction() {
    let (service, store) = service(InMemoryGraphStore::new());
    let err = service
        .update_node(UpdateNodeRequest {
            node_id: "ghost".into(),
            content: Some(json!("x")),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::NodeNotFound { .. }));
    assert!(store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_update_records_old_and_new_props() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("n", "Before");
    let (service, store) = service(store);

    service
        .update_node(UpdateNodeRequest {
            node_id: "n".into(),
            content: Some(json!("After")),
            is_checked: Some(Some(true)),
            ..Default::default()
        })
        .await
        .unwrap();

    let transactions = store.transactions().await;
    match &transactions[0][0] {
        TransactionOp::UpdateNode {
            old_props,
            new_props,
            ..
        } => {
            assert_eq!(old_props.content, Some(vec![ContentBlock::text("Before")]));
            assert_eq!(new_props.content, Some(vec![ContentBlock::text("After")]));
            assert_eq!(old_props.is_checked, Some(None));
            assert_eq!(new_props.is_checked, Some(Some(true)));
        }
        other => panic!("unexpected op: {other:?}"),
    }

    let node = store.node("n").await.unwrap();
    assert_eq!(node.display_text(), "After");
    assert_eq!(node.is_checked, Some(true));
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("n", "Same");
    let (service, _) = service(store);

    let err = service
        .update_node(UpdateNodeRequest {
            node_id: "n".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidInput(_)));
}

#[tokio::test]
async fn test_delete_missing_node_is_a_no_op() {
    let (service, store) = service(InMemoryGraphStore::new());
    let deleted = service.delete_node("ghost").await.unwrap();

    assert!(!deleted.existed);
    assert!(store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_delete_existing_node() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("n", "Bye");
    let (service, store) = service(store);

    let deleted = service.delete_node("n").await.unwrap();
    assert!(deleted.existed);
    assert_eq!(kinds(&store.transactions().await[0]), vec!["deleteNode"]);
    assert!(store.node("n").await.is_none());
}

#[tokio::test]
async fn test_move_without_parent_relation_submits_nothing() {
    let mut store = InMemoryGraphStore::new();
    store
        .add_text_node("a", "A")
        .add_text_node("b", "B")
        .add_text_node("n", "N");
    store.add_child("b", "n");
    let (service, store) = service(store);

    let err = service.move_node("n", "a", "b").await.unwrap_err();
    assert!(matches!(err, GraphError::NoParentRelation { .. }));
    assert!(store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_move_repoints_relation_and_lists() {
    let mut store = InMemoryGraphStore::new();
    store
        .add_text_node("a", "A")
        .add_text_node("b", "B")
        .add_text_node("n", "N");
    let relation_id = store.add_child("a", "n");
    let (service, store) = service(store);

    let moved = service.move_node("n", "a", "b").await.unwrap();
    assert_eq!(moved.relation_id, relation_id);

    let transactions = store.transactions().await;
    assert_eq!(
        kinds(&transactions[0]),
        vec!["updateRelation", "updateRelationList", "updateRelationList"]
    );

    let relations = store.relations().await;
    assert_eq!(relations[0].from_id, "b");
    assert!(store.relation_list("a").await.is_empty());
    assert_eq!(store.relation_list("b").await, vec![relation_id]);
}

#[tokio::test]
async fn test_create_relation_positions_both_endpoints() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("x", "X").add_text_node("y", "Y");
    let (service, store) = service(store);

    let created = service.create_relation("x", "y", "relatedTo").await.unwrap();

    assert_eq!(
        kinds(&store.transactions().await[0]),
        vec!["addRelation", "updateRelationList", "updateRelationList"]
    );
    assert_eq!(store.relation_list("x").await, vec![created.relation_id.clone()]);
    assert_eq!(store.relation_list("y").await, vec![created.relation_id]);
}

#[tokio::test]
async fn test_store_failure_is_wrapped() {
    let mut store = InMemoryGraphStore::new();
    store.fail_transactions();
    let (service, _) = service(store);

    let err = service
        .create_node(CreateNodeRequest {
            content: json!("x"),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::NodeOperation {
            status: Some(500),
            ..
        }
    ));
}

#[tokio::test]
async fn test_outline_creates_parents_first() {
    let mut store = InMemoryGraphStore::new();
    store.add_text_node("inbox", "Inbox");
    let (service, store) = service(store);

    let created = service
        .create_from_outline(
            Some("inbox"),
            "- Trip\n  - [ ] Flights\n  - Hotel\n- Budget",
            None,
        )
        .await
        .unwrap();

    let texts: Vec<&str> = created.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Trip", "Flights", "Hotel", "Budget"]);
    assert_eq!(created[0].parent_id.as_deref(), Some("inbox"));
    assert_eq!(created[1].parent_id.as_deref(), Some(created[0].node_id.as_str()));
    assert_eq!(created[1].depth, 1);
    assert_eq!(created[3].parent_id.as_deref(), Some("inbox"));
    assert_eq!(store.transactions().await.len(), 4);

    let flights = store.node(&created[1].node_id).await.unwrap();
    assert_eq!(flights.is_checked, Some(false));
}

#[tokio::test]
async fn test_empty_outline_is_rejected() {
    let (service, _) = service(InMemoryGraphStore::new());
    let err = service.create_from_outline(None, "\n  \n", None).await.unwrap_err();
    assert!(matches!(err, GraphError::InvalidInput(_)));
}
