//! Remote Access Layer
//!
//! Everything that talks to the remote graph store:
//!
//! - [`store`] - the [`GraphStore`] trait the service layer is written against
//! - [`http_store`] - reqwest implementation of the store's JSON API
//! - [`memory_store`] - in-process implementation for tests and offline use
//! - [`queue`] - the shared outbound FIFO dispatcher
//! - [`auth`] - bearer token sources and the TTL cache

pub mod auth;
pub mod error;
pub mod http_store;
pub mod memory_store;
pub mod queue;
pub mod store;

pub use auth::{
    CachedTokenProvider, HttpTokenSource, StaticTokenSource, TokenProvider, TokenSource,
    DEFAULT_TOKEN_TTL,
};
pub use error::{AuthError, RemoteError, RemoteResult};
pub use http_store::{create_http_client, HttpGraphStore};
pub use memory_store::InMemoryGraphStore;
pub use queue::{QueueConfig, RequestQueue};
pub use store::GraphStore;
