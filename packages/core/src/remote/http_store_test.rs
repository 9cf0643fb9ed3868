//! Tests for the HTTP store against a mocked remote API

use super::*;
use crate::models::{ListAction, TransactionOp};
use crate::remote::auth::{CachedTokenProvider, HttpTokenSource, StaticTokenSource};
use crate::remote::queue::QueueConfig;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer, token: &str) -> HttpGraphStore {
    let tokens = Arc::new(CachedTokenProvider::new(Arc::new(StaticTokenSource::new(
        token,
    ))));
    let queue = Arc::new(RequestQueue::new(QueueConfig::immediate(4)));
    HttpGraphStore::new(server.uri(), tokens, queue)
}

#[tokio::test]
async fn test_fetch_layer_posts_object_ids_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/layer"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({"objectIds": ["root"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodesById": {
                "root": {"id": "root", "content": [{"type": "text", "value": "Root"}]},
                "b": {"id": "b", "content": [{"type": "text", "value": "B"}]},
                "a": {"id": "a", "content": [{"type": "text", "value": "A"}]}
            },
            "relationsById": {
                "r2": {"id": "r2", "fromId": "root", "toId": "b", "relationTypeId": "child"},
                "r1": {"id": "r1", "fromId": "root", "toId": "a", "relationTypeId": "child"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, "secret");
    let layer = store.fetch_layer(&["root".to_string()]).await.unwrap();

    assert_eq!(layer.node("root").unwrap().display_text(), "Root");
    let order: Vec<&str> = layer
        .child_relations("root")
        .map(|r| r.to_id.as_str())
        .collect();
    assert_eq!(order, vec!["b", "a"]);
}

#[tokio::test]
async fn test_non_success_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/layer"))
        .respond_with(ResponseTemplate::new(500).set_body_string("store exploded"))
        .mount(&server)
        .await;

    let store = store_for(&server, "secret");
    let err = store.fetch_layer(&["x".to_string()]).await.unwrap_err();

    assert_eq!(err.http_status(), Some(500));
    assert_eq!(err.body(), Some("store exploded"));
}

#[tokio::test]
async fn test_transaction_wraps_ops_in_updates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction"))
        .and(body_json(json!({
            "updates": [{
                "type": "updateRelationList",
                "objectId": "parent",
                "relationId": "rel",
                "action": "add"
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, "secret");
    store
        .apply_transaction(&[TransactionOp::UpdateRelationList {
            object_id: "parent".to_string(),
            relation_id: "rel".to_string(),
            action: ListAction::Add,
        }])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_search_passes_query_and_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "groceries"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{"id": "n1", "content": [{"type": "text", "value": "groceries list"}]}]
        })))
        .mount(&server)
        .await;

    let store = store_for(&server, "secret");
    let nodes = store.search("groceries", 5).await.unwrap();

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, "n1");
}

#[tokio::test]
async fn test_unauthorized_response_invalidates_cached_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_json(json!({"apiKey": "key-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "tok"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/layer"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let source = HttpTokenSource::new(create_http_client(), server.uri(), "key-1");
    let tokens = Arc::new(CachedTokenProvider::new(Arc::new(source)));
    let queue = Arc::new(RequestQueue::new(QueueConfig::immediate(1)));
    let store = HttpGraphStore::new(server.uri(), tokens, queue);

    // No retry: each call fails once, but the second one has to re-fetch
    assert_eq!(
        store.fetch_layer(&["a".to_string()]).await.unwrap_err().http_status(),
        Some(401)
    );
    assert_eq!(
        store.fetch_layer(&["a".to_string()]).await.unwrap_err().http_status(),
        Some(401)
    );
}

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/layer"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = store_for(&server, "");
    let err = store.fetch_layer(&["a".to_string()]).await.unwrap_err();
    assert!(matches!(err, RemoteError::Authentication(_)));
}
