//! Legacy HTTP Endpoints
//!
//! Plain REST access to the same tools the MCP server exposes, for callers
//! that predate MCP.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check
//! - `POST /api/:tool` - Run a tool; the JSON body uses the tool's argument
//!   names and the response is the tool's raw result
//!
//! ```bash
//! curl -X POST http://localhost:3001/api/explore_tree \
//!   -H 'content-type: application/json' \
//!   -d '{"node_id": "inbox", "budget": 8}'
//! ```

mod http_error;

pub use http_error::HttpError;

use crate::mcp::handlers::tools;
use crate::mcp::McpServices;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Create the legacy API router
pub fn create_router(services: McpServices) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/:tool", post(run_tool))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(services)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn run_tool(
    State(services): State<McpServices>,
    Path(tool): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, HttpError> {
    if !tools::is_known_tool(&tool) {
        return Err(HttpError::unknown_tool(&tool));
    }

    let arguments: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| HttpError::invalid_input(format!("Invalid JSON body: {}", e)))?
    };

    tracing::debug!("📥 Legacy call {}", tool);
    let result = tools::execute_tool(&services, &tool, arguments).await?;
    Ok(Json(result))
}

/// Start the legacy HTTP server
///
/// # Errors
///
/// Returns error if server fails to bind or start.
pub async fn start_server(services: McpServices, port: u16) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    tracing::info!("🚀 Legacy HTTP server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, create_router(services)).await?;

    Ok(())
}
