//! Per-node log₂-probabilities of one derivation tree.

use tsg_core::NodeId;

use crate::error::ProbError;

/// Dense table `NodeId → log₂P`, keyed by node identity.
///
/// Each node is written exactly once; reading an unwritten node is a
/// [`ProbError::MissingProbability`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProbabilities {
    log2_probs: Vec<Option<f64>>,
}

impl NodeProbabilities {
    /// An empty table for a tree with `len` nodes.
    pub fn new(len: usize) -> Self {
        Self {
            log2_probs: vec![None; len],
        }
    }

    /// The log₂-probability of `node`, if computed.
    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.log2_probs.get(node.index()).copied().flatten()
    }

    /// The log₂-probability of `node`, which must already be computed.
    pub fn require(&self, node: NodeId) -> Result<f64, ProbError> {
        self.get(node).ok_or(ProbError::MissingProbability { node })
    }

    /// Record the log₂-probability of `node`.
    pub fn insert(&mut self, node: NodeId, log2_prob: f64) -> Result<(), ProbError> {
        let len = self.log2_probs.len();
        let Some(slot) = self.log2_probs.get_mut(node.index()) else {
            return Err(ProbError::ForeignNode { node, len });
        };
        if slot.is_some() {
            return Err(ProbError::DuplicateProbability { node });
        }
        *slot = Some(log2_prob);
        Ok(())
    }

    /// Number of nodes with a computed probability.
    pub fn len(&self) -> usize {
        self.log2_probs.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every node of the tree has a probability.
    pub fn is_complete(&self) -> bool {
        self.log2_probs.iter().all(Option::is_some)
    }

    /// Computed `(node, log₂P)` pairs, by node id.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.log2_probs
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (NodeId::new(i as u32), p)))
    }
}
