//! Model Context Protocol (MCP) Integration
//!
//! JSON-RPC 2.0 server giving AI agents access to the remote note graph.
//!
//! # Architecture
//!
//! - **types**: request, response, notification and error structures
//! - **handlers**: one module per tool family, plus `initialize` and `tools`
//! - **server**: stdio loop and `POST /mcp` router over the same dispatch
//!
//! # Usage
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "method": "tools/call",
//!   "params": {
//!     "name": "explore_tree",
//!     "arguments": { "node_id": "inbox", "budget": 8 }
//!   }
//! }
//! ```

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{
    handle_message, mcp_router, run_mcp_server, serve_lines, McpServices, McpTransport,
};
pub use types::{MCPError, MCPNotification, MCPRequest, MCPResponse};
