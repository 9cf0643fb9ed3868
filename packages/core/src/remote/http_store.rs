//! HTTP GraphStore Client
//!
//! Talks to the remote graph store's JSON API. Every call is routed through
//! the shared [`RequestQueue`] and authenticated with a bearer token from the
//! injected [`TokenProvider`].
//!
//! # Endpoints
//!
//! - `POST {base}/layer` - `{"objectIds": [...]}` → `{"nodesById", "relationsById"}`
//! - `POST {base}/transaction` - `{"updates": [...]}` → 2xx on success
//! - `GET {base}/search?q=&limit=` → `{"nodes": [...]}`

use crate::models::{Layer, Node, TransactionOp};
use crate::remote::auth::TokenProvider;
use crate::remote::error::{RemoteError, RemoteResult};
use crate::remote::queue::RequestQueue;
use crate::remote::store::GraphStore;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default HTTP timeout for remote store calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a configured HTTP client with timeout
#[must_use]
pub fn create_http_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    nodes: Vec<Node>,
}

/// [`GraphStore`] backed by the remote HTTP API
#[derive(Clone)]
pub struct HttpGraphStore {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    queue: Arc<RequestQueue>,
}

impl HttpGraphStore {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        queue: Arc<RequestQueue>,
    ) -> Self {
        Self::with_client(create_http_client(), base_url, tokens, queue)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        queue: Arc<RequestQueue>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            queue,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send one authenticated request through the queue and return the body
    async fn dispatch(
        &self,
        operation: &'static str,
        method: Method,
        url: String,
        body: Option<Value>,
        query: Vec<(&'static str, String)>,
    ) -> RemoteResult<String> {
        let client = self.client.clone();
        let tokens = self.tokens.clone();

        self.queue
            .enqueue(move || async move {
                let token = tokens.bearer_token().await?;

                let mut request = client.request(method, &url).bearer_auth(token);
                if !query.is_empty() {
                    request = request.query(&query);
                }
                if let Some(body) = body {
                    request = request.json(&body);
                }

                let response = request.send().await?;
                let status = response.status();
                let text = response.text().await?;

                if status == StatusCode::UNAUTHORIZED {
                    warn!("{} rejected our token, dropping it from the cache", operation);
                    tokens.invalidate().await;
                }
                if !status.is_success() {
                    return Err(RemoteError::status(operation, status.as_u16(), text));
                }

                debug!("{} → HTTP {}", operation, status.as_u16());
                Ok(text)
            })
            .await?
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    async fn fetch_layer(&self, object_ids: &[String]) -> RemoteResult<Layer> {
        let text = self
            .dispatch(
                "fetchLayer",
                Method::POST,
                self.endpoint("layer"),
                Some(json!({ "objectIds": object_ids })),
                Vec::new(),
            )
            .await?;

        serde_json::from_str(&text).map_err(|e| RemoteError::decode("fetchLayer", e.to_string()))
    }

    async fn apply_transaction(&self, ops: &[TransactionOp]) -> RemoteResult<()> {
        let updates = serde_json::to_value(ops)
            .map_err(|e| RemoteError::decode("applyTransaction", e.to_string()))?;

        self.dispatch(
            "applyTransaction",
            Method::POST,
            self.endpoint("transaction"),
            Some(json!({ "updates": updates })),
            Vec::new(),
        )
        .await?;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> RemoteResult<Vec<Node>> {
        let text = self
            .dispatch(
                "search",
                Method::GET,
                self.endpoint("search"),
                None,
                vec![("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        let response: SearchResponse =
            serde_json::from_str(&text).map_err(|e| RemoteError::decode("search", e.to_string()))?;
        Ok(response.nodes)
    }
}

#[cfg(test)]
#[path = "http_store_test.rs"]
mod http_store_test;
