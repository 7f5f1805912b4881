//! # Pattern samples
//!
//! Frequent, sizeable grammar rules become numbered patterns. Walking a tree
//! in pre-order, every node where a pattern matches yields a [`Sample`]: the
//! pattern id together with the payloads of the nodes visited just before.
//! These are the training rows for a model that predicts which pattern comes
//! next from the recent context.

use std::collections::VecDeque;
use std::fmt;

use serde::Deserialize;
use tracing::{debug, trace};
use tsg_core::{Grammar, NodeEq, Tree};
use tsg_prob::{MatchPolicy, RuleMatcher};

use crate::error::CorpusError;

/// Pattern id reserved for "no pattern".
pub const NO_PATTERN: u32 = 0;

/// Settings for [`PatternExtractor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Context window: how many previously visited payloads a sample keeps.
    pub n_previous_nodes: usize,
    /// Rules with fewer nodes are not patterns.
    pub min_size_pattern: usize,
    /// Rules seen fewer times are not patterns.
    pub min_pattern_count: u64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            n_previous_nodes: 10,
            min_size_pattern: 6,
            min_pattern_count: 20,
        }
    }
}

/// One occurrence of a pattern and the pre-order context leading up to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sample<T> {
    pub pattern_id: u32,
    /// Oldest first.
    pub previous_nodes: Vec<T>,
}

/// Registers patterns from a grammar and scans trees for them.
#[derive(Debug, Clone)]
pub struct PatternExtractor<T> {
    config: PatternConfig,
    patterns: Vec<Tree<T>>,
}

impl<T: Clone> PatternExtractor<T> {
    /// Register every rule of `grammar` that is frequent and large enough.
    /// Ids are handed out from 1 in grammar order.
    pub fn from_grammar(grammar: &Grammar<T>, config: PatternConfig) -> Self {
        let mut extractor = Self {
            config,
            patterns: Vec::new(),
        };
        for (_, rules) in grammar.iter() {
            for (rule, count) in rules.iter() {
                if count >= config.min_pattern_count && rule.len() >= config.min_size_pattern {
                    extractor.patterns.push(rule.clone());
                }
            }
        }
        debug!(
            rules = grammar.iter().map(|(_, rules)| rules.len()).sum::<usize>(),
            patterns = extractor.patterns.len(),
            "registered tree patterns"
        );
        extractor
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The pattern registered under `id`, if any.
    pub fn pattern(&self, id: u32) -> Option<&Tree<T>> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.patterns.get(index)
    }

    /// Registered patterns with their ids.
    pub fn patterns(&self) -> impl Iterator<Item = (u32, &Tree<T>)> + '_ {
        (1u32..).zip(self.patterns.iter())
    }

    /// Samples for every pattern occurrence in `tree`.
    ///
    /// Nodes are visited in pre-order, last child first. A node can yield
    /// several samples when several patterns match there.
    pub fn samples_for<E>(&self, tree: &Tree<T>, eq: &E) -> Vec<Sample<T>>
    where
        E: NodeEq<T> + ?Sized,
    {
        let matcher = RuleMatcher::new(eq, MatchPolicy::Exact);
        let window = self.config.n_previous_nodes;
        let mut previous: VecDeque<T> = VecDeque::with_capacity(window);
        let mut samples = Vec::new();

        for node in tree.preorder(tree.root()) {
            for (id, pattern) in self.patterns() {
                if matcher.matches(pattern, tree, node) {
                    samples.push(Sample {
                        pattern_id: id,
                        previous_nodes: previous.iter().cloned().collect(),
                    });
                }
            }

            if window > 0 {
                if previous.len() == window {
                    previous.pop_front();
                }
                previous.push_back(tree.data(node).clone());
            }
        }

        trace!(
            nodes = tree.len(),
            samples = samples.len(),
            "scanned tree for patterns"
        );
        samples
    }

    /// Samples for every tree of a corpus, in corpus order.
    pub fn samples_for_corpus<'a, I, E>(&self, trees: I, eq: &E) -> Vec<Sample<T>>
    where
        T: 'a,
        I: IntoIterator<Item = &'a Tree<T>>,
        E: NodeEq<T> + ?Sized,
    {
        trees
            .into_iter()
            .flat_map(|tree| self.samples_for(tree, eq))
            .collect()
    }
}

impl<T: fmt::Display> PatternExtractor<T> {
    /// Human-readable rendering of `sample`.
    ///
    /// ```text
    /// Sample [tsgPattern=A(B, C), previousNodes=[S, X]]
    /// ```
    pub fn describe(&self, sample: &Sample<T>) -> Result<String, CorpusError> {
        let pattern = if sample.pattern_id == NO_PATTERN {
            "NO_PATTERN".to_string()
        } else {
            let index = sample.pattern_id as usize - 1;
            self.patterns
                .get(index)
                .ok_or(CorpusError::UnknownPattern {
                    id: sample.pattern_id,
                    registered: self.patterns.len(),
                })?
                .to_string()
        };
        let previous: Vec<String> = sample
            .previous_nodes
            .iter()
            .map(ToString::to_string)
            .collect();
        Ok(format!(
            "Sample [tsgPattern={pattern}, previousNodes=[{}]]",
            previous.join(", ")
        ))
    }
}
