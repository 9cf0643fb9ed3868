//! MCP Request Handlers
//!
//! One module per tool family. Handlers take JSON params, call a service and
//! return JSON; `tools` routes `tools/call` to them.

pub mod initialize;
pub mod nodes;
pub mod outline;
pub mod relations;
pub mod tools;
pub mod traversal;

use crate::mcp::types::MCPError;
use crate::utils::parse_node_ref;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Deserialize tool arguments, reporting failures as invalid params
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, MCPError> {
    // A missing params member arrives as null
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| MCPError::invalid_params(format!("Invalid parameters: {}", e)))
}

/// Resolve a raw id or app link passed in `field`
pub(crate) fn node_ref(field: &str, raw: &str) -> Result<String, MCPError> {
    parse_node_ref(raw).ok_or_else(|| {
        MCPError::invalid_params(format!("'{}' is not a node id or link: {:?}", field, raw))
    })
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value, MCPError> {
    serde_json::to_value(value)
        .map_err(|e| MCPError::internal_error(format!("Failed to serialize result: {}", e)))
}
