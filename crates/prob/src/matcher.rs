//! Aligning grammar rules with positions of a derivation tree.
//!
//! A rule is walked in lock-step with the tree, starting at the rule root and
//! a tree node. Internal rule nodes must agree with the tree on payload and
//! (per the [`MatchPolicy`]) on child counts. Rule leaves are frontier points:
//! the tree node paired with a rule leaf is where the rule stops and the rest
//! of the derivation resumes.
//!
//! # Example
//!
//! ```rust
//! use tsg_core::{PayloadEq, Tree};
//! use tsg_prob::{MatchPolicy, RuleMatcher};
//!
//! // Rule A(B, C) against tree A(B(D), C)
//! let rule = Tree::node("A", vec![vec![Tree::leaf("B"), Tree::leaf("C")]]);
//! let tree = Tree::node(
//!     "A",
//!     vec![vec![Tree::node("B", vec![vec![Tree::leaf("D")]]), Tree::leaf("C")]],
//! );
//!
//! let matcher = RuleMatcher::new(&PayloadEq, MatchPolicy::Exact);
//! assert!(matcher.matches(&rule, &tree, tree.root()));
//!
//! // The frontier sits at B and C; D is below the rule.
//! let endpoints = matcher.endpoints(&rule, &tree, tree.root()).unwrap();
//! assert_eq!(endpoints.len(), 2);
//! ```

use std::collections::BTreeSet;

use tsg_core::{NodeEq, NodeId, Tree};

use crate::config::MatchPolicy;
use crate::error::ProbError;

/// Matches rule-trees against derivation-tree nodes under one policy.
#[derive(Debug)]
pub struct RuleMatcher<'a, E: ?Sized> {
    eq: &'a E,
    policy: MatchPolicy,
}

impl<E: ?Sized> Clone for RuleMatcher<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: ?Sized> Copy for RuleMatcher<'_, E> {}

impl<'a, E: ?Sized> RuleMatcher<'a, E> {
    pub fn new(eq: &'a E, policy: MatchPolicy) -> Self {
        Self { eq, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Whether `rule` can be applied at `node` of `tree`.
    ///
    /// Payloads must agree at every rule node, frontier leaves included.
    /// Child counts are checked per property at every internal rule node;
    /// a property one side lacks counts as empty. A rule that is a single
    /// leaf covers nothing and never matches.
    pub fn matches<T>(&self, rule: &Tree<T>, tree: &Tree<T>, node: NodeId) -> bool
    where
        E: NodeEq<T>,
    {
        if rule.is_leaf(rule.root()) {
            return false;
        }

        let mut stack = vec![(rule.root(), node)];
        while let Some((rule_node, tree_node)) = stack.pop() {
            if !self.eq.equal(rule.data(rule_node), tree.data(tree_node)) {
                return false;
            }
            if rule.is_leaf(rule_node) {
                continue;
            }

            let n_properties = rule
                .n_properties(rule_node)
                .max(tree.n_properties(tree_node));
            for property in 0..n_properties {
                let rule_children = rule.children(rule_node, property);
                let tree_children = tree.children(tree_node, property);
                if !self.policy.accepts(rule_children.len(), tree_children.len()) {
                    return false;
                }
                let pairs = rule_children.iter().zip(tree_children);
                stack.extend(pairs.map(|(&r, &t)| (r, t)));
            }
        }
        true
    }

    /// The tree nodes paired with the leaves of `rule` when it is applied at
    /// `node`.
    ///
    /// Under [`MatchPolicy::Partial`] only the first `k` tree children of a
    /// property are visited, where `k` is the rule's child count there.
    ///
    /// # Errors
    ///
    /// Fails when the pair doesn't match; call [`RuleMatcher::matches`]
    /// first. A failure here means the pair was never compatible.
    pub fn endpoints<T>(
        &self,
        rule: &Tree<T>,
        tree: &Tree<T>,
        node: NodeId,
    ) -> Result<BTreeSet<NodeId>, ProbError>
    where
        E: NodeEq<T>,
    {
        let mut endpoints = BTreeSet::new();
        let mut rule_stack = vec![rule.root()];
        let mut tree_stack = vec![node];

        while let (Some(rule_node), Some(tree_node)) = (rule_stack.pop(), tree_stack.pop()) {
            if rule.is_leaf(rule_node) {
                endpoints.insert(tree_node);
                continue;
            }
            if !self.eq.equal(rule.data(rule_node), tree.data(tree_node)) {
                return Err(ProbError::PayloadMismatch { node: tree_node });
            }

            let n_properties = rule
                .n_properties(rule_node)
                .max(tree.n_properties(tree_node));
            for property in 0..n_properties {
                let rule_children = rule.children(rule_node, property);
                let tree_children = tree.children(tree_node, property);
                if !self.policy.accepts(rule_children.len(), tree_children.len()) {
                    return Err(ProbError::ArityMismatch {
                        node: tree_node,
                        property,
                        rule_children: rule_children.len(),
                        tree_children: tree_children.len(),
                        policy: self.policy,
                    });
                }
                rule_stack.extend_from_slice(rule_children);
                tree_stack.extend_from_slice(&tree_children[..rule_children.len()]);
            }
        }
        Ok(endpoints)
    }
}
