//! Error types for corpus processing.

use thiserror::Error;
use tsg_core::TreeError;

/// Errors raised while rebuilding or scanning corpus trees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorpusError {
    /// A rebuilt tree could not be assembled.
    #[error("Tree construction failed: {0}")]
    Tree(#[from] TreeError),

    /// A sample refers to a pattern id that was never registered.
    #[error("Unknown pattern id {id} ({registered} patterns registered)")]
    UnknownPattern { id: u32, registered: usize },
}
