//! # Tree Probability
//!
//! The log₂-probability that a derivation tree was generated by a TSG,
//! computed bottom-up over the tree.
//!
//! For every internal node, each grammar rule that can be applied there is
//! one way the node may have been generated: the rule's own probability
//! times the probabilities of the subtrees hanging off its frontier. The
//! alternatives are mutually exclusive, so the node's probability is their
//! sum, taken in log space with [`log2_sum_exp`].
//!
//! ## Back-off
//!
//! - A label with no grammar entry is expanded deterministically: the node's
//!   probability is the product of its children's.
//! - With `cfg_fallback` enabled, the node's one-level production is added
//!   as an extra alternative unless the grammar already holds it, so every
//!   node keeps at least one derivation.
//!
//! ## Example
//!
//! ```rust
//! use tsg_core::{Grammar, PayloadEq, Tree};
//! use tsg_prob::{ComputerConfig, TreeProbabilityComputer};
//!
//! let mut grammar = Grammar::new();
//! grammar.add_rule(Tree::node("A", vec![vec![Tree::leaf("B"), Tree::leaf("C")]]));
//! grammar.add_rule(Tree::node("A", vec![vec![Tree::leaf("B")]]));
//!
//! let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, ComputerConfig::default());
//!
//! // One of the two rules covers A(B, C): P = 1/2
//! let tree = Tree::node("A", vec![vec![Tree::leaf("B"), Tree::leaf("C")]]);
//! let log2_prob = computer.log2_probability_of(&tree).unwrap();
//! assert!((log2_prob - -1.0).abs() < 1e-12);
//! ```

use tracing::{debug, trace, warn};
use tsg_core::{NodeEq, NodeId, RulePosterior, RuleSet, RuleSource, Tree};

use crate::config::ComputerConfig;
use crate::error::ProbError;
use crate::matcher::RuleMatcher;
use crate::memo::NodeProbabilities;
use crate::plan::compute_plan;
use crate::stats::log2_sum_exp;

/// Computes tree log₂-probabilities against one grammar.
///
/// Holds only the grammar, comparator, and optional posterior; every query
/// builds its own [`NodeProbabilities`] and drops it when done.
pub struct TreeProbabilityComputer<'g, T, G: ?Sized, E> {
    grammar: &'g G,
    eq: E,
    config: ComputerConfig,
    posterior: Option<&'g dyn RulePosterior<T>>,
}

impl<'g, T, G, E> TreeProbabilityComputer<'g, T, G, E>
where
    T: Clone,
    G: RuleSource<T> + ?Sized,
    E: NodeEq<T>,
{
    /// Rule probabilities default to relative frequencies within each
    /// label's rule set.
    pub fn new(grammar: &'g G, eq: E, config: ComputerConfig) -> Self {
        Self {
            grammar,
            eq,
            config,
            posterior: None,
        }
    }

    /// Take rule probabilities from `posterior` instead of relative
    /// frequencies. The posterior also scores back-off productions.
    pub fn with_posterior(mut self, posterior: &'g dyn RulePosterior<T>) -> Self {
        self.posterior = Some(posterior);
        self
    }

    pub fn config(&self) -> &ComputerConfig {
        &self.config
    }

    /// Pre-order of `tree`; processed in reverse by the queries below.
    pub fn compute_plan(&self, tree: &Tree<T>) -> Vec<NodeId> {
        compute_plan(tree)
    }

    /// log₂P of the whole tree.
    pub fn log2_probability_of(&self, tree: &Tree<T>) -> Result<f64, ProbError> {
        self.node_log2_probabilities(tree)?.require(tree.root())
    }

    /// log₂P of every subtree of `tree`, keyed by node.
    pub fn node_log2_probabilities(&self, tree: &Tree<T>) -> Result<NodeProbabilities, ProbError> {
        let plan = self.compute_plan(tree);
        let matcher = RuleMatcher::new(&self.eq, self.config.matching);
        let mut probabilities = NodeProbabilities::new(tree.len());

        for &node in plan.iter().rev() {
            if tree.is_leaf(node) {
                probabilities.insert(node, 0.0)?;
                continue;
            }

            let log2_prob = match self.grammar.productions_for(tree.data(node), &self.eq) {
                Some(rules) => {
                    self.node_log2_probability(&matcher, tree, node, rules, &probabilities)?
                }
                None => children_log2_probability(tree, node, &probabilities)?,
            };
            if log2_prob == f64::NEG_INFINITY {
                warn!(node = %node, "no derivation for node");
            }
            probabilities.insert(node, log2_prob)?;
        }

        debug!(
            nodes = tree.len(),
            log2_prob = ?probabilities.get(tree.root()),
            "computed tree probability"
        );
        Ok(probabilities)
    }

    /// Sum over every rule applicable at `node`, plus the back-off
    /// production when enabled.
    fn node_log2_probability(
        &self,
        matcher: &RuleMatcher<'_, E>,
        tree: &Tree<T>,
        node: NodeId,
        rules: &RuleSet<T>,
        probabilities: &NodeProbabilities,
    ) -> Result<f64, ProbError> {
        let total_log2 = (rules.total_count() as f64).log2();
        let mut candidates = Vec::new();

        for (rule, count) in rules.iter() {
            if !matcher.matches(rule, tree, node) {
                continue;
            }
            let mut log2_prob = match self.posterior {
                Some(posterior) => posterior.log2_prob(rule),
                None => (count as f64).log2() - total_log2,
            };
            for endpoint in matcher.endpoints(rule, tree, node)? {
                log2_prob += probabilities.require(endpoint)?;
            }
            candidates.push(log2_prob);
        }
        let matched = candidates.len();

        let mut backed_off = false;
        if self.config.cfg_fallback {
            let production = tree.one_level_production(node);
            if !rules.contains_by(&production, &self.eq) {
                let production_log2 = self
                    .posterior
                    .map_or(0.0, |posterior| posterior.log2_prob(&production));
                let children_log2 = children_log2_probability(tree, node, probabilities)?;
                candidates.push(production_log2 + children_log2);
                backed_off = true;
            }
        }

        trace!(
            node = %node,
            rules = rules.len(),
            matched,
            backed_off,
            "aggregated node derivations"
        );
        Ok(log2_sum_exp(&candidates))
    }
}

/// Sum of the children's log₂-probabilities: a deterministic expansion.
fn children_log2_probability<T>(
    tree: &Tree<T>,
    node: NodeId,
    probabilities: &NodeProbabilities,
) -> Result<f64, ProbError> {
    tree.all_children(node)
        .map(|child| probabilities.require(child))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchPolicy;
    use tsg_core::{Grammar, PayloadEq};

    const TOLERANCE: f64 = 1e-12;

    fn leaves(root: &'static str, kids: &[&'static str]) -> Tree<&'static str> {
        Tree::node(root, vec![kids.iter().map(|&k| Tree::leaf(k)).collect()])
    }

    fn exact(cfg_fallback: bool) -> ComputerConfig {
        ComputerConfig::new(MatchPolicy::Exact, cfg_fallback)
    }

    #[test]
    fn test_leaf_is_certain() {
        let grammar: Grammar<&str> = Grammar::new();
        let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(true));
        assert_eq!(computer.log2_probability_of(&Tree::leaf("A")).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_label_multiplies_children() {
        // B(D) has two rules with counts 1 and 3; A has no entry.
        let mut grammar = Grammar::new();
        grammar.add_rule(leaves("B", &["D"]));
        grammar.add_rule_count(leaves("B", &["E"]), 3);

        let tree = Tree::node("A", vec![vec![leaves("B", &["D"]), Tree::leaf("C")]]);
        let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(false));
        let probabilities = computer.node_log2_probabilities(&tree).unwrap();

        let b = tree.child(tree.root(), 0, 0).unwrap();
        assert!((probabilities.require(b).unwrap() - -2.0).abs() < TOLERANCE);
        let root = probabilities.require(tree.root()).unwrap();
        assert!((root - -2.0).abs() < TOLERANCE);
        assert!(probabilities.is_complete());
    }

    #[test]
    fn test_relative_frequency() {
        let mut grammar = Grammar::new();
        grammar.add_rule(leaves("A", &["B", "C"]));
        grammar.add_rule_count(leaves("A", &["B"]), 3);

        let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(true));
        let log2_prob = computer.log2_probability_of(&leaves("A", &["B", "C"])).unwrap();
        assert!((log2_prob - -2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_no_match_without_fallback_is_impossible() {
        let mut grammar = Grammar::new();
        grammar.add_rule(leaves("A", &["B", "C"]));

        let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(false));
        let log2_prob = computer.log2_probability_of(&leaves("A", &["B", "D"])).unwrap();
        assert_eq!(log2_prob, f64::NEG_INFINITY);
    }

    #[test]
    fn test_fallback_uses_posterior_when_given() {
        let mut grammar = Grammar::new();
        grammar.add_rule(leaves("A", &["B", "C"]));
        let posterior = |rule: &Tree<&'static str>| if rule.len() == 3 { -3.0 } else { -5.0 };

        let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(true))
            .with_posterior(&posterior);
        let log2_prob = computer.log2_probability_of(&leaves("A", &["B", "D"])).unwrap();
        assert!((log2_prob - -3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_frontier_below_rule_contributes() {
        // Rule A(B(D), C) with P = 1/2 and B(D(E)) scored by the sub-rule D(E).
        let mut grammar = Grammar::new();
        let rule_b = Tree::node("B", vec![vec![Tree::leaf("D")]]);
        grammar.add_rule(Tree::node("A", vec![vec![rule_b, Tree::leaf("C")]]));
        grammar.add_rule(leaves("A", &["X"]));
        grammar.add_rule(leaves("D", &["E"]));
        grammar.add_rule(leaves("D", &["F"]));

        let b = Tree::node("B", vec![vec![leaves("D", &["E"])]]);
        let tree = Tree::node("A", vec![vec![b, Tree::leaf("C")]]);
        let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(false));
        let log2_prob = computer.log2_probability_of(&tree).unwrap();
        // P(A) = 1/2 * P(D) * P(C) = 1/2 * 1/2 * 1
        assert!((log2_prob - -2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_partial_policy_covers_extra_children_by_fallback_only() {
        let mut grammar = Grammar::new();
        grammar.add_rule(leaves("A", &["B"]));

        let tree = leaves("A", &["B", "C"]);
        let partial = TreeProbabilityComputer::new(
            &grammar,
            PayloadEq,
            ComputerConfig::new(MatchPolicy::Partial, false),
        );
        // The rule matches the prefix B; its frontier is B alone.
        let log2_prob = partial.log2_probability_of(&tree).unwrap();
        assert!(log2_prob.abs() < TOLERANCE);

        let strict = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(false));
        let log2_prob = strict.log2_probability_of(&tree).unwrap();
        assert_eq!(log2_prob, f64::NEG_INFINITY);
    }

    #[test]
    fn test_plan_matches_planner() {
        let grammar: Grammar<&str> = Grammar::new();
        let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, exact(true));
        let tree = leaves("A", &["B", "C"]);
        assert_eq!(computer.compute_plan(&tree), compute_plan(&tree));
        assert_eq!(computer.config().matching, MatchPolicy::Exact);
    }
}
