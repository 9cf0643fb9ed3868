//! Bearer Token Provider
//!
//! The HTTP store holds an `Arc<dyn TokenProvider>`; it never knows where the
//! token came from. [`CachedTokenProvider`] wraps any [`TokenSource`] with a
//! fixed-TTL cache.
//!
//! # Cache Invalidation
//!
//! - **Time-based**: a token is reused until the TTL elapses
//! - **Explicit**: [`TokenProvider::invalidate`] drops it (e.g. after a 401),
//!   so the next call fetches a fresh one

use crate::remote::error::AuthError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default token lifetime before a refresh is forced
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

/// Something that can mint a fresh bearer token
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String, AuthError>;
}

/// Capability handed to remote clients: "can fetch a bearer token"
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Forget any cached token
    async fn invalidate(&self) {}
}

/// A pre-issued token that never changes
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch_token(&self) -> Result<String, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::MissingCredentials(
                "static access token is empty".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    api_key: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

/// Exchanges an API key for an access token at `{base_url}/auth/token`
#[derive(Clone)]
pub struct HttpTokenSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTokenSource {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/auth/token", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<String, AuthError> {
        let response = self
            .client
            .post(self.token_url())
            .json(&TokenRequest {
                api_key: &self.api_key,
            })
            .send()
            .await
            .map_err(|e| AuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::RequestFailed(format!("invalid token response: {}", e)))?;

        if token.access_token.is_empty() {
            return Err(AuthError::RequestFailed(
                "token endpoint returned an empty token".to_string(),
            ));
        }

        info!("🔑 Obtained new access token");
        Ok(token.access_token)
    }
}

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Fixed-TTL cache in front of a [`TokenSource`]
pub struct CachedTokenProvider {
    source: Arc<dyn TokenSource>,
    ttl: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl CachedTokenProvider {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self::with_ttl(source, DEFAULT_TOKEN_TTL)
    }

    /// Create a provider with custom TTL (primarily for testing)
    pub fn with_ttl(source: Arc<dyn TokenSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenProvider for CachedTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        // Held across the fetch so concurrent callers share one refresh
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.token.clone());
            }
            debug!("Access token expired, refreshing");
        }

        let token = self.source.fetch_token().await?;
        *cached = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }

    async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
