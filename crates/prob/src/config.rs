//! Query configuration.

use std::fmt;

use serde::Deserialize;

/// How a rule's children line up with a tree node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Per property, the rule declares exactly as many children as the tree
    /// node has.
    #[default]
    Exact,
    /// Per property, the rule may declare a prefix of the tree node's
    /// children; the rest are generated outside the rule.
    Partial,
}

impl MatchPolicy {
    /// `Exact` when every child must be covered, `Partial` otherwise.
    pub fn from_require_all_children(require_all_children: bool) -> Self {
        if require_all_children {
            MatchPolicy::Exact
        } else {
            MatchPolicy::Partial
        }
    }

    pub fn requires_all_children(&self) -> bool {
        matches!(self, MatchPolicy::Exact)
    }

    /// Whether a rule property with `rule_children` children may align with
    /// a tree property holding `tree_children`.
    #[inline]
    pub fn accepts(&self, rule_children: usize, tree_children: usize) -> bool {
        match self {
            MatchPolicy::Exact => rule_children == tree_children,
            MatchPolicy::Partial => rule_children <= tree_children,
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            MatchPolicy::Exact => "exact",
            MatchPolicy::Partial => "partial",
        })
    }
}

/// Knobs of a [`TreeProbabilityComputer`](crate::TreeProbabilityComputer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComputerConfig {
    /// Rule/tree arity policy.
    pub matching: MatchPolicy,
    /// Back off to the node's one-level production when the grammar lacks it.
    pub cfg_fallback: bool,
}

impl ComputerConfig {
    pub fn new(matching: MatchPolicy, cfg_fallback: bool) -> Self {
        Self {
            matching,
            cfg_fallback,
        }
    }
}

impl Default for ComputerConfig {
    fn default() -> Self {
        Self {
            matching: MatchPolicy::Exact,
            cfg_fallback: true,
        }
    }
}
