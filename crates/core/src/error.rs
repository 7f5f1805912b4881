//! # Error Types
//!
//! Tree construction errors. A tree is built once and then only read, so
//! every failure here is about wiring a child into a slot that doesn't exist.

use thiserror::Error;

use crate::tree::NodeId;

/// Errors raised while building or addressing a [`Tree`](crate::Tree).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The node id doesn't belong to this tree.
    #[error("Unknown node: {node} (tree has {len} nodes)")]
    UnknownNode { node: NodeId, len: usize },

    /// The property slot doesn't exist on the node.
    #[error("Invalid property {property} on {node} (node has {n_properties} properties)")]
    InvalidProperty {
        node: NodeId,
        property: usize,
        n_properties: usize,
    },

    /// The arena ran out of `u32` indices.
    #[error("Tree exceeds {max} nodes")]
    TooManyNodes { max: usize },
}
