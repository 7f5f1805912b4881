//! # Core - Labeled Trees and Tree Substitution Grammars
//!
//! This crate provides the data model shared by the TSG crates:
//!
//! - **Trees**: Arena-allocated labeled trees with property slots
//! - **Equality**: Caller-supplied payload comparison ([`NodeEq`])
//! - **Grammars**: Root label → multiset of rule-trees ([`Grammar`], [`RuleSet`])
//! - **Posteriors**: Rule → log₂-probability capability ([`RulePosterior`])
//! - **Errors**: Tree construction failures
//!
//! ## Design Philosophy
//!
//! Nodes are identified by arena handles, never by value. Two structurally
//! identical subtrees at different positions are different nodes, which is
//! what per-node dynamic programming over a derivation tree needs.

pub mod eq;
pub mod error;
pub mod grammar;
pub mod tree;

// Re-export key types at crate root for convenience
pub use eq::{ByKey, NodeEq, PayloadEq};
pub use error::TreeError;
pub use grammar::{Grammar, RulePosterior, RuleSet, RuleSource};
pub use tree::{NodeId, Preorder, Tree};
