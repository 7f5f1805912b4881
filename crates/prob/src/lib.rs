//! # Prob - Tree Probabilities under Tree Substitution Grammars
//!
//! This crate computes how likely a labeled derivation tree is under a
//! probabilistic TSG, whose productions are multi-level rule-trees rather
//! than single-level rewrites.
//!
//! ## Core Concepts
//!
//! - **Bottom-up dynamic programming**: every node's log₂-probability is
//!   computed once, after all of its descendants ([`compute_plan`])
//! - **Competing derivations add up**: all rules applicable at a node are
//!   alternatives, summed with [`log2_sum_exp`]
//! - **Frontier alignment**: a rule's leaves locate the subtrees whose
//!   probabilities it multiplies in ([`RuleMatcher`])
//! - **Two matching policies**: exact child counts or a declared prefix
//!   ([`MatchPolicy`])
//! - **Back-off**: labels without rules, or nodes whose one-level production
//!   the grammar lacks, still get a derivation
//!
//! ## Example: Two Competing Rules
//!
//! ```rust
//! use tsg_core::{Grammar, Tree};
//! use tsg_prob::{ComputerConfig, TreeProbabilityComputer};
//!
//! // Payload = (symbol, rule tag); only the symbol identifies a grammar symbol.
//! let rule = |tag: u32| {
//!     Tree::node(("A", tag), vec![vec![Tree::leaf(("B", tag)), Tree::leaf(("C", tag))]])
//! };
//! let same_symbol = |a: &(&str, u32), b: &(&str, u32)| a.0 == b.0;
//! let mut grammar = Grammar::new();
//! grammar.add_rule_by(rule(1), &same_symbol);
//! grammar.add_rule_by(rule(2), &same_symbol);
//! assert_eq!(grammar.len(), 1);
//!
//! let posterior = |r: &Tree<(&str, u32)>| match r.data(r.root()).1 {
//!     1 => 0.3_f64.log2(),
//!     _ => 0.2_f64.log2(),
//! };
//! let computer = TreeProbabilityComputer::new(&grammar, same_symbol, ComputerConfig::default())
//!     .with_posterior(&posterior);
//!
//! let tree = rule(0);
//! let p = computer.log2_probability_of(&tree).unwrap().exp2();
//! assert!((p - 0.5).abs() < 1e-9);
//! ```

mod computer;
mod config;
mod error;
mod matcher;
mod memo;
mod plan;
mod stats;

pub use computer::TreeProbabilityComputer;
pub use config::{ComputerConfig, MatchPolicy};
pub use error::ProbError;
pub use matcher::RuleMatcher;
pub use memo::NodeProbabilities;
pub use plan::compute_plan;
pub use stats::{log2_sum_exp, log_sum_exp};

/// Tolerance for comparing log₂-probabilities.
pub const LOG2_TOLERANCE: f64 = 1e-9;
