//! Error types for tree probability computations.
//!
//! Every variant is a broken contract: a traversal-order violation or a
//! rule/tree pair the matcher had already accepted. None of them is
//! recoverable within the query that raised it.

use thiserror::Error;
use tsg_core::NodeId;

use crate::config::MatchPolicy;

/// Errors that abort a tree probability query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbError {
    /// A node's probability was needed before it was computed.
    #[error("No probability computed yet for {node}")]
    MissingProbability { node: NodeId },

    /// A node's probability was computed twice.
    #[error("Probability for {node} was already computed")]
    DuplicateProbability { node: NodeId },

    /// A node id outside the tree reached the probability table.
    #[error("{node} is outside the tree ({len} nodes)")]
    ForeignNode { node: NodeId, len: usize },

    /// Rule and tree child counts violate the matching policy.
    #[error(
        "Arity mismatch at {node}, property {property}: rule has {rule_children} children, \
         tree has {tree_children} ({policy} matching)"
    )]
    ArityMismatch {
        node: NodeId,
        property: usize,
        rule_children: usize,
        tree_children: usize,
        policy: MatchPolicy,
    },

    /// A rule's internal payload differs from the tree node it is aligned with.
    #[error("Rule payload does not match the payload of {node}")]
    PayloadMismatch { node: NodeId },
}
