//! MCP Outline Import Handler
//!
//! Creates one node per line of an indented outline, nested by indentation.

use super::{node_ref, parse_params, to_value};
use crate::mcp::types::MCPError;
use crate::services::MutationService;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Parameters for create_nodes_from_outline
#[derive(Debug, Deserialize)]
pub struct CreateFromOutlineParams {
    pub outline: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Handle create_nodes_from_outline MCP request
///
/// Creation stops at the first failing line; nodes created before it stay.
pub async fn handle_create_nodes_from_outline(
    mutations: &Arc<MutationService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: CreateFromOutlineParams = parse_params(params)?;
    let parent_id = params
        .parent_id
        .as_deref()
        .map(|raw| node_ref("parent_id", raw))
        .transpose()?;

    let created = mutations
        .create_from_outline(parent_id.as_deref(), &params.outline, params.author.as_deref())
        .await?;

    Ok(json!({
        "parent_id": parent_id,
        "count": created.len(),
        "nodes": to_value(&created)?,
        "success": true
    }))
}
