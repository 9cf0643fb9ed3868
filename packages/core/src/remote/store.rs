//! GraphStore Trait
//!
//! The boundary between this bridge and the remote graph store. Everything
//! above this trait (read primitives, traversal, mutations) is written
//! against it, so tests can swap in [`InMemoryGraphStore`] for the HTTP client.
//!
//! [`InMemoryGraphStore`]: crate::remote::InMemoryGraphStore

use crate::models::{Layer, Node, TransactionOp};
use crate::remote::error::RemoteResult;
use async_trait::async_trait;

/// Remote graph store primitives
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Bulk hydrate by id.
    ///
    /// Returns the requested nodes, every relation touching them, and the
    /// nodes at the other end of those relations. Ids that do not exist are
    /// simply absent from the result; duplicate ids are allowed.
    async fn fetch_layer(&self, object_ids: &[String]) -> RemoteResult<Layer>;

    /// Apply an ordered list of operations atomically
    async fn apply_transaction(&self, ops: &[TransactionOp]) -> RemoteResult<()>;

    /// Full-text search over node content
    async fn search(&self, query: &str, limit: usize) -> RemoteResult<Vec<Node>>;
}
