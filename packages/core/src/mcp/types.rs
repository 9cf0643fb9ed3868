//! MCP JSON-RPC 2.0 Types
//!
//! Type definitions for Model Context Protocol communication.
//! Shared by the stdio transport and `POST /mcp`.

use crate::services::GraphError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request structure
///
/// # Example
///
/// ```json
/// {
///     "jsonrpc": "2.0",
///     "id": 7,
///     "method": "tools/call",
///     "params": {
///         "name": "explore_tree",
///         "arguments": { "node_id": "inbox" }
///     }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct MCPRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,

    /// Request identifier (used to match responses)
    pub id: u64,

    /// Method name to invoke
    pub method: String,

    /// Method parameters; clients may omit them for `tools/list`
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 notification: a request without an `id`
///
/// No response is ever written for a notification.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MCPNotification {
    #[serde(deserialize_with = "jsonrpc_version")]
    pub jsonrpc: String,

    pub method: String,

    #[serde(default)]
    pub params: Value,
}

fn jsonrpc_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let version = String::deserialize(deserializer)?;
    if version != "2.0" {
        return Err(serde::de::Error::custom(format!(
            "unsupported jsonrpc version: {}",
            version
        )));
    }
    Ok(version)
}

/// JSON-RPC 2.0 response structure
///
/// # Error Example
///
/// ```json
/// {
///     "jsonrpc": "2.0",
///     "id": 7,
///     "error": {
///         "code": -32000,
///         "message": "Node not found: inbox",
///         "data": { "kind": "node_not_found", "status": 404, ... }
///     }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct MCPResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (matches request)
    pub id: u64,

    /// Success result (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

/// JSON-RPC 2.0 error structure
#[derive(Debug, Serialize, Clone)]
pub struct MCPError {
    /// Error code (standard JSON-RPC or bridge-specific)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Structured error payload (`{kind, message, status, details}`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// JSON-RPC 2.0 standard error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Bridge-specific error codes (application errors: -32000 to -32010)
pub const NODE_NOT_FOUND: i32 = -32000;
pub const NODE_CREATION_FAILED: i32 = -32001;
pub const NODE_UPDATE_FAILED: i32 = -32002;
pub const NODE_DELETE_FAILED: i32 = -32003;
pub const VALIDATION_ERROR: i32 = -32004;
pub const AUTHENTICATION_FAILED: i32 = -32005;
pub const REMOTE_ERROR: i32 = -32006;
pub const NO_PARENT_RELATION: i32 = -32007;
pub const STRUCTURE_MAP_FAILED: i32 = -32008;
pub const TRANSPORT_ERROR: i32 = -32009;
pub const INVALID_USER_ID: i32 = -32010;

impl MCPError {
    fn new(code: i32, message: String) -> Self {
        Self {
            code,
            message,
            data: None,
        }
    }

    /// Create a parse error
    pub fn parse_error(message: String) -> Self {
        Self::new(PARSE_ERROR, message)
    }

    /// Create an invalid request error
    pub fn invalid_request(message: String) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    /// Create a method not found error
    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    /// Create an invalid params error
    pub fn invalid_params(message: String) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    /// Create an internal error
    pub fn internal_error(message: String) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    /// Create a node not found error
    pub fn node_not_found(node_id: &str) -> Self {
        Self::new(NODE_NOT_FOUND, format!("Node not found: {}", node_id))
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<GraphError> for MCPError {
    fn from(err: GraphError) -> Self {
        let code = match &err {
            GraphError::NodeNotFound { .. } => NODE_NOT_FOUND,
            GraphError::NodeOperation { operation, .. } => match operation.as_str() {
                "create" => NODE_CREATION_FAILED,
                "update" => NODE_UPDATE_FAILED,
                "delete" => NODE_DELETE_FAILED,
                _ => REMOTE_ERROR,
            },
            GraphError::RelationOperation { .. } | GraphError::BatchOperation { .. } => {
                REMOTE_ERROR
            }
            GraphError::InvalidInput(_) => VALIDATION_ERROR,
            GraphError::Authentication(_) => AUTHENTICATION_FAILED,
            GraphError::NoParentRelation { .. } => NO_PARENT_RELATION,
            GraphError::StructureMapFailed { .. } => STRUCTURE_MAP_FAILED,
            GraphError::Transport(_) => TRANSPORT_ERROR,
            GraphError::InvalidUserIdFormat { .. } => INVALID_USER_ID,
        };

        let payload = err.to_payload();
        let data = serde_json::to_value(&payload).unwrap_or(Value::Null);
        Self {
            code,
            message: payload.message,
            data: Some(data),
        }
    }
}

impl MCPResponse {
    /// Create a success response
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: u64, error: MCPError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
