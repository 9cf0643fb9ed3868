//! Utility modules

pub mod node_ref;
pub mod outline;
pub mod text;

pub use node_ref::parse_node_ref;
pub use outline::{parse_outline, OutlineNode};
pub use text::{normalize_whitespace, preview, title};
