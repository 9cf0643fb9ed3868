//! MCP Relation Handlers

use super::{node_ref, parse_params};
use crate::mcp::types::MCPError;
use crate::services::MutationService;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Parameters for create_relation
#[derive(Debug, Deserialize)]
pub struct CreateRelationParams {
    pub from_id: String,
    pub to_id: String,
    /// Relation type, usually the id of a tag node
    pub relation_type: String,
}

/// Handle create_relation MCP request
pub async fn handle_create_relation(
    mutations: &Arc<MutationService>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: CreateRelationParams = parse_params(params)?;
    let from_id = node_ref("from_id", &params.from_id)?;
    let to_id = node_ref("to_id", &params.to_id)?;

    let created = mutations
        .create_relation(&from_id, &to_id, &params.relation_type)
        .await?;

    Ok(json!({
        "relation_id": created.relation_id,
        "from_id": created.from_id,
        "to_id": created.to_id,
        "relation_type": created.relation_type_id,
        "success": true
    }))
}
