//! Bridge Configuration
//!
//! Everything the bridge needs at startup comes from environment variables.
//! [`BridgeConfig::from_lookup`] takes the lookup as a closure so tests can
//! feed a map instead of touching the process environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `NOTEGRAPH_API_URL` | required |
//! | `NOTEGRAPH_API_KEY` or `NOTEGRAPH_ACCESS_TOKEN` | one is required |
//! | `NOTEGRAPH_USER_ID` | required, UUID |
//! | `NOTEGRAPH_USER_ROOT_ID` | the user id |
//! | `NOTEGRAPH_SHARED_ROOT_IDS` | empty |
//! | `NOTEGRAPH_BATCH_SIZE` | 10 |
//! | `NOTEGRAPH_BATCH_DELAY_MS` | 100 |
//! | `NOTEGRAPH_MIN_SPACING_MS` | 50 |
//! | `NOTEGRAPH_TRAVERSAL_BUDGET` | 8 |
//! | `MCP_PORT` | 3100 |
//! | `HTTP_PORT` | 3001 |

use crate::remote::QueueConfig;
use crate::services::traversal::DEFAULT_BUDGET;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_MCP_PORT: u16 = 3100;
pub const DEFAULT_HTTP_PORT: u16 = 3001;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Either NOTEGRAPH_API_KEY or NOTEGRAPH_ACCESS_TOKEN must be set")]
    MissingCredentials,

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("NOTEGRAPH_USER_ID is not a valid UUID: {0}")]
    InvalidUserId(String),
}

/// How the bridge authenticates against the remote store
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Exchanged for short-lived bearer tokens
    ApiKey(String),
    /// Used as the bearer token directly
    AccessToken(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::AccessToken(_) => f.write_str("AccessToken(***)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub api_url: String,
    pub credentials: Credentials,
    /// Hyphenated lowercase UUID
    pub user_id: String,
    pub user_root_id: String,
    pub shared_root_ids: Vec<String>,
    pub queue: QueueConfig,
    pub traversal_budget: u32,
    pub mcp_port: u16,
    pub http_port: u16,
}

impl BridgeConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_url = get("NOTEGRAPH_API_URL")
            .ok_or(ConfigError::Missing("NOTEGRAPH_API_URL"))?
            .trim_end_matches('/')
            .to_string();

        // An API key can be refreshed, so it wins over a fixed token
        let credentials = match (get("NOTEGRAPH_API_KEY"), get("NOTEGRAPH_ACCESS_TOKEN")) {
            (Some(key), _) => Credentials::ApiKey(key),
            (None, Some(token)) => Credentials::AccessToken(token),
            (None, None) => return Err(ConfigError::MissingCredentials),
        };

        let raw_user = get("NOTEGRAPH_USER_ID").ok_or(ConfigError::Missing("NOTEGRAPH_USER_ID"))?;
        let user_id = Uuid::parse_str(&raw_user)
            .map_err(|_| ConfigError::InvalidUserId(raw_user.clone()))?
            .hyphenated()
            .to_string();

        let user_root_id = get("NOTEGRAPH_USER_ROOT_ID").unwrap_or_else(|| user_id.clone());

        let shared_root_ids = get("NOTEGRAPH_SHARED_ROOT_IDS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let defaults = QueueConfig::default();
        let batch_size: usize = parse_or(&get, "NOTEGRAPH_BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                var: "NOTEGRAPH_BATCH_SIZE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let batch_delay_ms: u64 = parse_or(
            &get,
            "NOTEGRAPH_BATCH_DELAY_MS",
            defaults.batch_delay.as_millis() as u64,
        )?;
        let min_spacing_ms: u64 = parse_or(
            &get,
            "NOTEGRAPH_MIN_SPACING_MS",
            defaults.min_spacing.as_millis() as u64,
        )?;

        Ok(Self {
            api_url,
            credentials,
            user_id,
            user_root_id,
            shared_root_ids,
            queue: QueueConfig {
                batch_size,
                batch_delay: Duration::from_millis(batch_delay_ms),
                min_spacing: Duration::from_millis(min_spacing_ms),
            },
            traversal_budget: parse_or(&get, "NOTEGRAPH_TRAVERSAL_BUDGET", DEFAULT_BUDGET)?,
            mcp_port: parse_or(&get, "MCP_PORT", DEFAULT_MCP_PORT)?,
            http_port: parse_or(&get, "HTTP_PORT", DEFAULT_HTTP_PORT)?,
        })
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
