//! MCP Node Handlers
//!
//! Reads go through `GraphReadService`, writes through `MutationService`.
//! Every node argument accepts a raw id or an app link.

use super::{node_ref, parse_params, to_value};
use crate::mcp::types::MCPError;
use crate::services::{CreateNodeRequest, GraphReadService, MutationService, UpdateNodeRequest};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;

/// Default and ceiling for `search_nodes`
const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

/// Parameters for tools that take a single node
#[derive(Debug, Deserialize)]
pub struct NodeIdParams {
    pub node_id: String,
}

/// Parameters for fetch_layer
#[derive(Debug, Deserialize)]
pub struct FetchLayerParams {
    pub node_ids: Vec<String>,
}

/// Parameters for search_nodes
#[derive(Debug, Deserialize)]
pub struct SearchNodesParams {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for create_node
#[derive(Debug, Deserialize)]
pub struct CreateNodeParams {
    /// String, block object or array of blocks
    pub content: Value,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub relation_label: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub is_checked: Option<bool>,
}

/// Parameters for update_node
#[derive(Debug, Deserialize)]
pub struct UpdateNodeParams {
    pub node_id: String,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub is_public: Option<bool>,
    /// Absent leaves the checkbox alone, `null` removes it
    #[serde(default, deserialize_with = "present_or_null")]
    pub is_checked: Option<Option<bool>>,
}

/// Parameters for move_node
#[derive(Debug, Deserialize)]
pub struct MoveNodeParams {
    pub node_id: String,
    pub old_parent_id: String,
    pub new_parent_id: String,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<bool>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(Some)
}

/// Handle get_node MCP request
pub async fn handle_get_node(
    reader: &Arc<GraphReadService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: NodeIdParams = parse_params(params)?;
    let node_id = node_ref("node_id", &params.node_id)?;

    match reader.get_node(&node_id).await? {
        Some(node) => Ok(json!({
            "node": to_value(&node)?,
            "text": node.plain_text(),
        })),
        None => Err(MCPError::node_not_found(&node_id)),
    }
}

/// Handle get_children MCP request
pub async fn handle_get_children(
    reader: &Arc<GraphReadService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: NodeIdParams = parse_params(params)?;
    let node_id = node_ref("node_id", &params.node_id)?;

    let listing = reader.get_children(&node_id).await?;
    if listing.parent.is_none() {
        return Err(MCPError::node_not_found(&node_id));
    }

    Ok(json!({
        "parent_id": node_id,
        "count": listing.children.len(),
        "children": to_value(&listing.children)?,
    }))
}

/// Handle fetch_layer MCP request
pub async fn handle_fetch_layer(
    reader: &Arc<GraphReadService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: FetchLayerParams = parse_params(params)?;
    if params.node_ids.is_empty() {
        return Err(MCPError::invalid_params(
            "node_ids must contain at least one id".to_string(),
        ));
    }

    let ids = params
        .node_ids
        .iter()
        .map(|raw| node_ref("node_ids", raw))
        .collect::<Result<Vec<_>, _>>()?;

    let layer = reader.fetch_layer(&ids).await?;
    let missing: Vec<&String> = ids.iter().filter(|id| layer.node(id).is_none()).collect();

    Ok(json!({
        "layer": to_value(&layer)?,
        "missing": missing,
    }))
}

/// Handle search_nodes MCP request
pub async fn handle_search_nodes(
    reader: &Arc<GraphReadService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: SearchNodesParams = parse_params(params)?;
    let query = params.query.trim();
    if query.is_empty() {
        return Err(MCPError::invalid_params("query must not be empty".to_string()));
    }
    let limit = params
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let nodes = reader.search(query, limit).await?;
    let results: Vec<Value> = nodes
        .iter()
        .map(|node| {
            json!({
                "id": node.id,
                "text": node.plain_text(),
                "updatedAt": node.updated_at,
            })
        })
        .collect();

    Ok(json!({
        "query": query,
        "count": results.len(),
        "nodes": results,
    }))
}

/// Handle create_node MCP request
pub async fn handle_create_node(
    mutations: &Arc<MutationService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: CreateNodeParams = parse_params(params)?;
    let parent_id = params
        .parent_id
        .as_deref()
        .map(|raw| node_ref("parent_id", raw))
        .transpose()?;

    let created = mutations
        .create_node(CreateNodeRequest {
            content: params.content,
            parent_id,
            relation_label: params.relation_label,
            author: params.author,
            is_public: params.is_public,
            is_checked: params.is_checked,
        })
        .await?;

    Ok(json!({
        "node_id": created.node_id,
        "relation_id": created.relation_id,
        "label_node_id": created.label_node_id,
        "replaced_by": created.replaced_by,
        "author_id": created.author_id,
        "operations": created.op_count,
        "diagnostics": to_value(&created.diagnostics)?,
        "success": true
    }))
}

/// Handle update_node MCP request
pub async fn handle_update_node(
    mutations: &Arc<MutationService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: UpdateNodeParams = parse_params(params)?;
    let node_id = node_ref("node_id", &params.node_id)?;

    let updated = mutations
        .update_node(UpdateNodeRequest {
            node_id,
            content: params.content,
            is_public: params.is_public,
            is_checked: params.is_checked,
        })
        .await?;

    Ok(json!({
        "node_id": updated.node_id,
        "diagnostics": to_value(&updated.diagnostics)?,
        "success": true
    }))
}

/// Handle delete_node MCP request
///
/// Deleting an id that does not exist succeeds with `existed: false`.
pub async fn handle_delete_node(
    mutations: &Arc<MutationService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: NodeIdParams = parse_params(params)?;
    let node_id = node_ref("node_id", &params.node_id)?;

    let deleted = mutations.delete_node(&node_id).await?;

    Ok(json!({
        "node_id": deleted.node_id,
        "existed": deleted.existed,
        "success": true
    }))
}

/// Handle move_node MCP request
pub async fn handle_move_node(
    mutations: &Arc<MutationService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: MoveNodeParams = parse_params(params)?;
    let node_id = node_ref("node_id", &params.node_id)?;
    let old_parent = node_ref("old_parent_id", &params.old_parent_id)?;
    let new_parent = node_ref("new_parent_id", &params.new_parent_id)?;

    let moved = mutations
        .move_node(&node_id, &old_parent, &new_parent)
        .await?;

    Ok(json!({
        "node_id": moved.node_id,
        "relation_id": moved.relation_id,
        "old_parent_id": moved.old_parent_id,
        "new_parent_id": moved.new_parent_id,
        "success": true
    }))
}

#[cfg(test)]
#[path = "nodes_test.rs"]
mod nodes_test;
