//! Tests for node, relation and layer wire formats

use super::*;
use serde_json::json;

#[test]
fn test_node_deserializes_with_defaults() {
    let node: Node = serde_json::from_value(json!({
        "id": "n1",
        "content": [{"type": "text", "value": "Hello"}]
    }))
    .unwrap();

    assert_eq!(node.id, "n1");
    assert_eq!(node.display_text(), "Hello");
    assert!(node.is_checked.is_none());
    assert!(node.canonical_relation_id.is_none());
    assert!(!node.is_public);
}

#[test]
fn test_display_text_requires_leading_text_block() {
    let mut node = Node::with_text("n1", "ignored");
    node.content = vec![ContentBlock::mention("other"), ContentBlock::text("tail")];

    assert_eq!(node.display_text(), "");
    assert_eq!(node.plain_text(), "@othertail");
}

#[test]
fn test_layer_preserves_relation_order() {
    let layer: Layer = serde_json::from_value(json!({
        "nodesById": {},
        "relationsById": {
            "r-z": {"id": "r-z", "fromId": "p", "toId": "c3", "relationTypeId": "child"},
            "r-a": {"id": "r-a", "fromId": "p", "toId": "c1", "relationTypeId": "child"},
            "r-m": {"id": "r-m", "fromId": "p", "toId": "c2", "relationTypeId": "child"}
        }
    }))
    .unwrap();

    let order: Vec<&str> = layer.child_relations("p").map(|r| r.to_id.as_str()).collect();
    assert_eq!(order, vec!["c3", "c1", "c2"]);
}

#[test]
fn test_layer_tolerates_missing_sections() {
    let layer: Layer = serde_json::from_value(json!({})).unwrap();
    assert!(layer.nodes_by_id.is_empty());
    assert!(layer.relations.is_empty());
}

#[test]
fn test_child_relations_ignore_semantic_edges() {
    let layer = Layer {
        nodes_by_id: HashMap::new(),
        relations: vec![
            Relation::new("r1", "p", "a", CHILD_RELATION),
            Relation::new("r2", "p", "b", "supports"),
            Relation::new("r3", "q", "c", CHILD_RELATION),
        ],
    };

    let children: Vec<&str> = layer.child_relations("p").map(|r| r.to_id.as_str()).collect();
    assert_eq!(children, vec!["a"]);
}

#[test]
fn test_layer_round_trip_keys_relations_by_id() {
    let layer = Layer {
        nodes_by_id: HashMap::new(),
        relations: vec![Relation::new("r1", "p", "a", CHILD_RELATION)],
    };

    let value = serde_json::to_value(&layer).unwrap();
    assert_eq!(value["relationsById"]["r1"]["toId"], "a");
}

#[test]
fn test_layer_survives_unfamiliar_content_blocks() {
    let layer: Layer = serde_json::from_value(json!({
        "nodesById": {
            "img": {"id": "img", "content": [{"type": "image", "url": "x"}]},
            "bare": {"id": "bare", "content": [{"type": "text"}]},
            "ok": {"id": "ok", "content": [{"type": "text", "value": "Fine"}]},
            "loose": {"id": "loose", "content": "Just a string"}
        },
        "relationsById": {}
    }))
    .unwrap();

    assert_eq!(layer.nodes_by_id.len(), 4);
    assert_eq!(layer.node("ok").unwrap().display_text(), "Fine");
    assert_eq!(layer.node("img").unwrap().content, vec![ContentBlock::text("")]);
    assert_eq!(layer.node("bare").unwrap().display_text(), "");
    assert_eq!(layer.node("loose").unwrap().display_text(), "Just a string");
}

#[test]
fn test_null_content_is_empty() {
    let node: Node = serde_json::from_value(json!({"id": "n", "content": null})).unwrap();
    assert!(node.content.is_empty());
}
