//! Data Models
//!
//! - [`node`] - remote graph records (Node, Relation, Layer)
//! - [`content`] - typed content blocks and the loose-input parser
//! - [`transaction`] - ordered write operations
//! - [`tree`] - materialized tree views produced by traversal

pub mod content;
pub mod node;
pub mod transaction;
pub mod tree;

pub use content::{parse_content, ContentBlock, ContentDiagnostic, ParsedContent};
pub use node::{Layer, Node, Relation, CHILD_RELATION, TYPE_RELATION};
pub use transaction::{ListAction, NewNode, NodeProps, RelationProps, TransactionOp};
pub use tree::{LoadedTree, TreeNode, TreeNodeKind, CYCLE_SENTINEL, MAX_DEPTH_SENTINEL};
