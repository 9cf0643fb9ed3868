//! MCP Traversal Handlers
//!
//! `explore_tree` runs the adaptive budgeted walk and renders content
//! previews; `map_structure` renders titles only over a deep subtree.
//! Both return the rendered text under `rendered` so `tools/call` can show
//! it as-is.

use super::{node_ref, parse_params, to_value};
use crate::mcp::types::MCPError;
use crate::services::traversal::{render_content, render_structure};
use crate::services::{AdjustmentMode, ExploreOptions, TraversalPriority, TraversalService};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Parameters for explore_tree
#[derive(Debug, Deserialize)]
pub struct ExploreTreeParams {
    pub node_id: String,
    /// Remote-call budget; the configured default when absent
    #[serde(default)]
    pub budget: Option<u32>,
    /// Overrides the root-based strategy pick
    #[serde(default)]
    pub priority: Option<TraversalPriority>,
    #[serde(default)]
    pub adjustment: Option<AdjustmentMode>,
    /// Render titles instead of content previews
    #[serde(default)]
    pub titles_only: bool,
    /// Also return the materialized tree as JSON
    #[serde(default)]
    pub include_tree: bool,
}

/// Parameters for map_structure
#[derive(Debug, Deserialize)]
pub struct MapStructureParams {
    pub node_id: String,
    #[serde(default)]
    pub include_tree: bool,
}

/// Handle explore_tree MCP request
pub async fn handle_explore_tree(
    traversal: &Arc<TraversalService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: ExploreTreeParams = parse_params(params)?;
    let root_id = node_ref("node_id", &params.node_id)?;
    if params.budget == Some(0) {
        return Err(MCPError::invalid_params(
            "budget must be at least 1".to_string(),
        ));
    }

    let result = traversal
        .explore(
            &root_id,
            ExploreOptions {
                budget: params.budget,
                priority: params.priority,
                adjustment: params.adjustment,
            },
        )
        .await?;

    let rendered = if params.titles_only {
        render_structure(&result.tree)
    } else {
        render_content(&result.tree)
    };

    let mut response = json!({
        "root_id": root_id,
        "rendered": rendered,
        "stats": to_value(&result.stats)?,
    });
    if params.include_tree {
        response["tree"] = to_value(&result.tree)?;
    }
    Ok(response)
}

/// Handle map_structure MCP request
pub async fn handle_map_structure(
    traversal: &Arc<TraversalService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: MapStructureParams = parse_params(params)?;
    let root_id = node_ref("node_id", &params.node_id)?;

    let map = traversal.map_structure(&root_id).await?;

    let mut response = json!({
        "root_id": root_id,
        "rendered": render_structure(&map.tree),
        "nodes_discovered": map.nodes_discovered,
        "nodes_shown": map.tree.node_count(),
        "truncated": map.truncated,
        "fallback": to_value(&map.fallback)?,
    });
    if params.include_tree {
        response["tree"] = to_value(&map.tree)?;
    }
    Ok(response)
}
