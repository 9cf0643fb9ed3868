//! MCP Initialize Handler
//!
//! Handles the MCP initialization handshake and capability discovery.
//! This is the first method called when a client connects to the server.

use crate::mcp::types::MCPError;
use serde_json::{json, Value};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "notegraph-bridge";

/// Supported MCP protocol versions (for backward compatibility)
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &[
    "2025-06-18", // Latest spec
    "2025-03-26", // Streamable HTTP
    "2024-11-05", // HTTP+SSE (deprecated but supported)
];

/// Handle MCP initialize request
///
/// # Protocol Flow
///
/// 1. Client sends initialize request with their protocol version
/// 2. Server validates version compatibility
/// 3. Server returns the same version + capabilities
/// 4. Client sends `notifications/initialized` (accepted silently)
/// 5. Normal operations begin
///
/// # Errors
///
/// Returns error if:
/// - protocolVersion is missing
/// - Client requests unsupported protocol version
pub fn handle_initialize(params: Value) -> Result<Value, MCPError> {
    let client_version = params["protocolVersion"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing protocolVersion parameter".to_string()))?;

    if !SUPPORTED_PROTOCOL_VERSIONS.contains(&client_version) {
        return Err(MCPError::invalid_request(format!(
            "Unsupported protocol version: {}. Server supports: {:?}",
            client_version, SUPPORTED_PROTOCOL_VERSIONS
        )));
    }

    Ok(json!({
        "protocolVersion": client_version,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            },
            "resources": {},
            "prompts": {}
        },
        "instructions": {
            "node_refs": "Every node_id style argument accepts either a raw node id or a link copied from the app; links are reduced to the node they point at.",
            "exploring": "Use explore_tree for a budgeted look at a subtree (content previews, truncated wide levels marked [+N more]) and map_structure for titles only over a deep subtree with cycle markers.",
            "content": "Node content is a string or a list of blocks: {\"type\":\"text\",\"value\":..}, {\"type\":\"mention\",\"nodeId\":..} and {\"type\":\"replacement\",\"nodeId\":..}.",
            "hierarchy": "Parent/child structure is made of relations. move_node needs the node's current parent so the existing child relation can be re-pointed."
        }
    }))
}

#[cfg(test)]
#[path = "initialize_test.rs"]
mod initialize_test;
