//! MCP Server
//!
//! JSON-RPC 2.0 over stdin/stdout (one message per line) or over
//! `POST /mcp`. Both transports share [`handle_message`].

use crate::mcp::handlers::{initialize, tools};
use crate::mcp::types::{MCPError, MCPNotification, MCPRequest, MCPResponse};
use crate::remote::GraphStore;
use crate::services::{
    GraphReadService, MutationService, RootClassifier, SessionIdentity, TraversalConfig,
    TraversalService,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};

/// Services the MCP handlers dispatch to
#[derive(Clone)]
pub struct McpServices {
    pub reader: Arc<GraphReadService>,
    pub traversal: Arc<TraversalService>,
    pub mutations: Arc<MutationService>,
}

impl McpServices {
    /// Wire the read, traversal and mutation services over one store
    pub fn new(
        store: Arc<dyn GraphStore>,
        identity: SessionIdentity,
        classifier: RootClassifier,
        config: TraversalConfig,
    ) -> Self {
        let reader = Arc::new(GraphReadService::new(store.clone()));
        let traversal = Arc::new(TraversalService::new(reader.clone(), classifier, config));
        let mutations = Arc::new(MutationService::new(store, reader.clone(), identity));
        Self {
            reader,
            traversal,
            mutations,
        }
    }
}

/// Where the MCP server listens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpTransport {
    Stdio,
    Http { port: u16 },
}

/// Run the MCP server on the given transport until stdin closes or the
/// listener fails
pub async fn run_mcp_server(services: McpServices, transport: McpTransport) -> anyhow::Result<()> {
    match transport {
        McpTransport::Stdio => {
            serve_lines(
                &services,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await
        }
        McpTransport::Http { port } => serve_http(services, port).await,
    }
}

/// Line-delimited JSON-RPC loop
///
/// Reads requests from `reader` and writes one response line per request
/// to `writer`. Notifications get no response.
#[instrument(skip_all)]
pub async fn serve_lines<R, W>(services: &McpServices, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("🔌 MCP stdio server started");

    let mut writer = tokio::io::BufWriter::new(writer);
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("📥 MCP request: {}", line);

        if let Some(response) = handle_message(services, &line).await {
            debug!(
                "📤 MCP response (id={}, error={})",
                response.id,
                response.error.is_some()
            );
            write_response(&mut writer, &response).await?;
        }
    }

    info!("🔌 MCP stdio server stopped (stdin closed)");
    Ok(())
}

/// Parse one JSON-RPC message and produce its response
///
/// Returns `None` for notifications.
pub async fn handle_message(services: &McpServices, raw: &str) -> Option<MCPResponse> {
    match serde_json::from_str::<MCPRequest>(raw) {
        Ok(request) => Some(handle_request(services, request).await),
        Err(request_err) => match serde_json::from_str::<MCPNotification>(raw) {
            Ok(notification) => {
                debug!("📨 MCP notification: {}", notification.method);
                None
            }
            Err(_) => {
                warn!("❌ Failed to parse JSON-RPC request: {}", request_err);
                Some(MCPResponse::error(
                    0, // Unknown ID since parsing failed
                    MCPError::parse_error(format!("Invalid JSON-RPC message: {}", request_err)),
                ))
            }
        },
    }
}

/// Handle a JSON-RPC request and return a response
#[instrument(skip(services, request), fields(method = %request.method, id = %request.id))]
pub async fn handle_request(services: &McpServices, request: MCPRequest) -> MCPResponse {
    if request.jsonrpc != "2.0" {
        return MCPResponse::error(
            request.id,
            MCPError::invalid_request(format!(
                "Unsupported jsonrpc version: {}",
                request.jsonrpc
            )),
        );
    }

    let result = match request.method.as_str() {
        "initialize" => initialize::handle_initialize(request.params),
        "ping" => Ok(json!({})),
        "tools/list" => tools::handle_tools_list(request.params),
        "tools/call" => tools::handle_tools_call(services, request.params).await,
        // Tools are also callable as plain methods
        name if tools::is_known_tool(name) => {
            tools::execute_tool(services, name, request.params).await
        }
        _ => {
            warn!("⚠️  Unknown MCP method: {}", request.method);
            Err(MCPError::method_not_found(&request.method))
        }
    };

    match result {
        Ok(result) => {
            debug!("✅ MCP request {} succeeded", request.id);
            MCPResponse::success(request.id, result)
        }
        Err(error) => {
            error!(
                "❌ MCP request {} failed: {} (code: {})",
                request.id, error.message, error.code
            );
            MCPResponse::error(request.id, error)
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &MCPResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Router exposing `POST /mcp`
pub fn mcp_router(services: McpServices) -> Router {
    Router::new()
        .route("/mcp", post(mcp_endpoint))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}

async fn mcp_endpoint(State(services): State<McpServices>, body: String) -> impl IntoResponse {
    match handle_message(&services, &body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn serve_http(services: McpServices, port: u16) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    info!("🚀 MCP HTTP server starting on http://{}/mcp", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, mcp_router(services)).await?;

    Ok(())
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
