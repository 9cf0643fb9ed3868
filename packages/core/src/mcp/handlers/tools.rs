//! MCP Tools Handler
//!
//! Implements MCP-compliant tools/list and tools/call methods. The same
//! routing (`execute_tool`) backs direct JSON-RPC method calls and the
//! legacy `POST /api/<tool>` endpoints.

use crate::mcp::handlers::{nodes, outline, relations, traversal};
use crate::mcp::server::McpServices;
use crate::mcp::types::MCPError;
use serde_json::{json, Value};

/// Every tool the bridge exposes, in catalog order
pub const TOOL_NAMES: [&str; 12] = [
    "get_node",
    "get_children",
    "fetch_layer",
    "search_nodes",
    "create_node",
    "update_node",
    "delete_node",
    "move_node",
    "create_relation",
    "explore_tree",
    "map_structure",
    "create_nodes_from_outline",
];

pub fn is_known_tool(name: &str) -> bool {
    TOOL_NAMES.contains(&name)
}

/// Handle tools/list MCP request
pub fn handle_tools_list(_params: Value) -> Result<Value, MCPError> {
    Ok(json!({
        "tools": get_tool_schemas()
    }))
}

/// Run a tool by name and return its raw JSON result
pub async fn execute_tool(
    services: &McpServices,
    tool_name: &str,
    arguments: Value,
) -> Result<Value, MCPError> {
    match tool_name {
        // Reads
        "get_node" => nodes::handle_get_node(&services.reader, arguments).await,
        "get_children" => nodes::handle_get_children(&services.reader, arguments).await,
        "fetch_layer" => nodes::handle_fetch_layer(&services.reader, arguments).await,
        "search_nodes" => nodes::handle_search_nodes(&services.reader, arguments).await,

        // Writes
        "create_node" => nodes::handle_create_node(&services.mutations, arguments).await,
        "update_node" => nodes::handle_update_node(&services.mutations, arguments).await,
        "delete_node" => nodes::handle_delete_node(&services.mutations, arguments).await,
        "move_node" => nodes::handle_move_node(&services.mutations, arguments).await,
        "create_relation" => {
            relations::handle_create_relation(&services.mutations, arguments).await
        }
        "create_nodes_from_outline" => {
            outline::handle_create_nodes_from_outline(&services.mutations, arguments).await
        }

        // Traversal
        "explore_tree" => traversal::handle_explore_tree(&services.traversal, arguments).await,
        "map_structure" => traversal::handle_map_structure(&services.traversal, arguments).await,

        _ => Err(MCPError::method_not_found(tool_name)),
    }
}

/// Handle tools/call MCP request
///
/// Request format:
/// ```json
/// { "name": "tool_name", "arguments": { ... } }
/// ```
///
/// Tool failures are successful JSON-RPC responses with `isError: true`;
/// the structured error payload rides along in `structuredContent`.
/// Only a missing or unknown tool name is a JSON-RPC error.
pub async fn handle_tools_call(services: &McpServices, params: Value) -> Result<Value, MCPError> {
    let tool_name = params["name"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing 'name' parameter".to_string()))?;

    if !is_known_tool(tool_name) {
        return Err(MCPError::invalid_params(format!(
            "Unknown tool: {}",
            tool_name
        )));
    }

    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    match execute_tool(services, tool_name, arguments).await {
        Ok(data) => {
            let text = serde_json::to_string_pretty(&data).map_err(|e| {
                MCPError::internal_error(format!("JSON serialization failed: {}", e))
            })?;

            // Rendered trees read better as their own text block
            let mut content = Vec::new();
            if let Some(rendered) = data["rendered"].as_str() {
                content.push(json!({ "type": "text", "text": rendered }));
            }
            content.push(json!({ "type": "text", "text": text }));

            Ok(json!({
                "content": content,
                "structuredContent": data,
                "isError": false
            }))
        }
        Err(e) => {
            tracing::warn!("Tool {} failed: {} (code: {})", tool_name, e.message, e.code);
            let payload = match e.data {
                Some(data) => data,
                None => json!({ "message": e.message, "code": e.code }),
            };
            Ok(json!({
                "content": [{
                    "type": "text",
                    "text": e.message
                }],
                "structuredContent": payload,
                "isError": true
            }))
        }
    }
}

const NODE_REF_HINT: &str = "Node id or a link copied from the app";

/// JSON schemas for every tool
///
/// Maintained by hand so descriptions stay precise.
fn get_tool_schemas() -> Value {
    json!([
        {
            "name": "get_node",
            "description": "Retrieve a single node with its content blocks and plain text",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_id": { "type": "string", "description": NODE_REF_HINT }
                },
                "required": ["node_id"]
            }
        },
        {
            "name": "get_children",
            "description": "List the direct children of a node in order, each annotated with has_children and child_count",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_id": { "type": "string", "description": NODE_REF_HINT }
                },
                "required": ["node_id"]
            }
        },
        {
            "name": "fetch_layer",
            "description": "Bulk-fetch nodes and the relations touching them. Unknown ids are reported under 'missing'",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Node ids or links"
                    }
                },
                "required": ["node_ids"]
            }
        },
        {
            "name": "search_nodes",
            "description": "Full-text search over node content",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to search for" },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 100,
                        "description": "Maximum results (default 20)"
                    }
                },
                "required": ["query"]
            }
        },
        {
            "name": "create_node",
            "description": "Create a node, optionally under a parent and with a label on the parent relation. Content is a string or a list of text/mention/replacement blocks",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "content": {
                        "description": "String or array of {type: text|mention|replacement, ...} blocks"
                    },
                    "parent_id": { "type": "string", "description": NODE_REF_HINT },
                    "relation_label": {
                        "type": "string",
                        "description": "Text of a label node attached to the new parent relation"
                    },
                    "author": {
                        "type": "string",
                        "description": "Author: an AI name (claude, gpt, gemini, llama) or a user UUID. Defaults to the session user"
                    },
                    "is_public": { "type": "boolean" },
                    "is_checked": {
                        "type": "boolean",
                        "description": "Make the node a checkbox with this state"
                    }
                },
                "required": ["content"]
            }
        },
        {
            "name": "update_node",
            "description": "Update a node's content, visibility or checkbox state",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_id": { "type": "string", "description": NODE_REF_HINT },
                    "content": { "description": "Replacement content" },
                    "is_public": { "type": "boolean" },
                    "is_checked": {
                        "type": ["boolean", "null"],
                        "description": "New checkbox state; null removes the checkbox"
                    }
                },
                "required": ["node_id"]
            }
        },
        {
            "name": "delete_node",
            "description": "Delete a node. Deleting an id that does not exist succeeds with existed=false",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_id": { "type": "string", "description": NODE_REF_HINT }
                },
                "required": ["node_id"]
            }
        },
        {
            "name": "move_node",
            "description": "Move a node from its current parent to a new parent by re-pointing the existing child relation",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_id": { "type": "string", "description": NODE_REF_HINT },
                    "old_parent_id": { "type": "string", "description": "Current parent" },
                    "new_parent_id": { "type": "string", "description": "New parent" }
                },
                "required": ["node_id", "old_parent_id", "new_parent_id"]
            }
        },
        {
            "name": "create_relation",
            "description": "Create a typed relation between two nodes",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "from_id": { "type": "string", "description": NODE_REF_HINT },
                    "to_id": { "type": "string", "description": NODE_REF_HINT },
                    "relation_type": {
                        "type": "string",
                        "description": "Relation type, usually the id of a tag node"
                    }
                },
                "required": ["from_id", "to_id", "relation_type"]
            }
        },
        {
            "name": "explore_tree",
            "description": "Explore the subtree under a node within a fixed budget of remote calls. Wide levels are truncated and marked [+N more]; returns a rendered tree plus traversal stats",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_id": { "type": "string", "description": NODE_REF_HINT },
                    "budget": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Remote-call budget (default 8)"
                    },
                    "priority": {
                        "type": "string",
                        "enum": ["breadth", "balanced", "depth"],
                        "description": "Override the strategy picked from the root"
                    },
                    "adjustment": {
                        "type": "string",
                        "enum": ["once", "per_level"],
                        "description": "Adjust breadth once from the root sample, or again on every level"
                    },
                    "titles_only": { "type": "boolean" },
                    "include_tree": { "type": "boolean" }
                },
                "required": ["node_id"]
            }
        },
        {
            "name": "map_structure",
            "description": "Map the titles of a deep subtree (up to 12 levels, 2000 nodes, 200 children per node). Cycles are marked [CYCLE DETECTED]",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "node_id": { "type": "string", "description": NODE_REF_HINT },
                    "include_tree": { "type": "boolean" }
                },
                "required": ["node_id"]
            }
        },
        {
            "name": "create_nodes_from_outline",
            "description": "Create nested nodes from an indented outline (one node per line; '- [ ]' lines become checkboxes)",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "outline": { "type": "string", "description": "Indented outline text" },
                    "parent_id": { "type": "string", "description": NODE_REF_HINT },
                    "author": { "type": "string" }
                },
                "required": ["outline"]
            }
        }
    ])
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;
