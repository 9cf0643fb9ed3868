//! NoteGraph Bridge Core
//!
//! Exposes a remote graph-based note store to AI agents (MCP over stdio or
//! HTTP) and to legacy REST callers.
//!
//! # Architecture
//!
//! - **Remote access**: every call to the note store goes through one
//!   batching request queue with cached bearer tokens
//! - **Read primitives**: ordered children with child-count annotations
//! - **Adaptive traversal**: budgeted level-by-level walks and bounded
//!   structure maps with cycle markers
//! - **Mutations**: one atomic transaction per logical write
//!
//! # Modules
//!
//! - [`models`] - Nodes, relations, content blocks, transactions, trees
//! - [`remote`] - `GraphStore` trait, HTTP and in-memory stores, queue, auth
//! - [`services`] - Read, traversal and mutation services
//! - [`mcp`] - MCP server (stdio and `POST /mcp`)
//! - [`http`] - Legacy `POST /api/<tool>` endpoints
//! - [`config`] - Environment configuration
//! - [`utils`] - Outline parser, node-ref parser, text helpers

pub mod config;
pub mod http;
pub mod mcp;
pub mod models;
pub mod remote;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::{BridgeConfig, ConfigError, Credentials};
pub use models::*;
pub use remote::{GraphStore, HttpGraphStore, InMemoryGraphStore, RemoteError};
pub use services::*;
