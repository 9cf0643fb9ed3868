//! Business Services
//!
//! This module contains the service layer the MCP and HTTP surfaces call:
//!
//! - `GraphReadService` - read primitives (children, node, layer, search)
//! - `TraversalService` - adaptive budgeted walks and structure maps
//! - `MutationService` - one transaction per logical write
//!
//! Services hold an `Arc<dyn GraphStore>` and never talk HTTP themselves.

pub mod error;
pub mod graph_reader;
pub mod mutation_service;
pub mod traversal;

pub use error::{ErrorPayload, GraphError, GraphResult};
pub use graph_reader::{ChildListing, ChildNode, GraphReadService};
pub use mutation_service::{
    CreateNodeRequest, CreatedNode, CreatedRelation, DeletedNode, MovedNode, MutationService,
    OutlineEntry, SessionIdentity, UpdateNodeRequest, UpdatedNode, AI_AUTHOR_IDS,
};
pub use traversal::{
    AdjustmentMode, ExploreOptions, RootClassifier, StructureLimits, StructureMap,
    TraversalConfig, TraversalPriority, TraversalResult, TraversalService, TraversalStats,
    TraversalStrategy,
};
