//! # Rare-production filter
//!
//! Counts every one-level production across a corpus, then cuts each tree
//! wherever a node expands through a production seen fewer than
//! `count_limit` times. The node stays in its parent as a leaf; each of its
//! children starts a new tree. Roots left without children are dropped.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use serde::Deserialize;
use tracing::debug;
use tsg_core::{NodeId, Tree};

use crate::error::CorpusError;

/// Settings for [`CorpusFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Productions seen fewer times than this are cut.
    pub count_limit: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { count_limit: 2 }
    }
}

/// A one-level production: a parent payload and its children's payloads,
/// one list per property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production<T> {
    pub root: T,
    pub children: Vec<Vec<T>>,
}

impl<T: Clone> Production<T> {
    /// The production that expands `node` in `tree`.
    pub fn of(tree: &Tree<T>, node: NodeId) -> Self {
        Self {
            root: tree.data(node).clone(),
            children: tree
                .children_by_property(node)
                .iter()
                .map(|ids| ids.iter().map(|&id| tree.data(id).clone()).collect())
                .collect(),
        }
    }
}

/// Collects a corpus and splits its trees at rare productions.
#[derive(Debug, Clone)]
pub struct CorpusFilter<T> {
    config: FilterConfig,
    counts: HashMap<Production<T>, u64>,
    trees: Vec<Tree<T>>,
}

impl<T: Clone + Eq + Hash> CorpusFilter<T> {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            counts: HashMap::new(),
            trees: Vec::new(),
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Number of trees added so far.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Add `tree` to the corpus and count the production of each of its
    /// internal nodes.
    pub fn add_tree(&mut self, tree: Tree<T>) {
        for node in tree.preorder(tree.root()) {
            if tree.is_leaf(node) {
                continue;
            }
            *self.counts.entry(Production::of(&tree, node)).or_insert(0) += 1;
        }
        self.trees.push(tree);
    }

    /// How often the production expanding `node` occurred in the corpus.
    pub fn production_count(&self, tree: &Tree<T>, node: NodeId) -> u64 {
        self.counts
            .get(&Production::of(tree, node))
            .copied()
            .unwrap_or(0)
    }

    fn is_rare(&self, tree: &Tree<T>, node: NodeId) -> bool {
        !tree.is_leaf(node) && self.production_count(tree, node) < self.config.count_limit
    }

    /// Every added tree, cut at its rare productions.
    ///
    /// For each corpus tree the pieces come out root first, then in the order
    /// their roots were cut off. Trees that were added are left untouched.
    pub fn filtered_trees(&self) -> Result<Vec<Tree<T>>, CorpusError> {
        let mut filtered = Vec::new();
        for tree in &self.trees {
            let before = filtered.len();
            self.split(tree, &mut filtered)?;
            debug!(
                nodes = tree.len(),
                pieces = filtered.len() - before,
                "filtered corpus tree"
            );
        }
        Ok(filtered)
    }

    /// Rebuild `tree` as pieces, breadth first over the cut points.
    fn split(&self, tree: &Tree<T>, out: &mut Vec<Tree<T>>) -> Result<(), CorpusError> {
        let mut roots = VecDeque::from([tree.root()]);

        while let Some(root) = roots.pop_front() {
            let mut piece = Tree::new(tree.data(root).clone(), tree.n_properties(root));
            let mut stack = vec![(root, piece.root())];

            while let Some((src, dst)) = stack.pop() {
                if self.is_rare(tree, src) {
                    roots.extend(tree.all_children(src));
                    continue;
                }
                for (property, children) in tree.children_by_property(src).iter().enumerate() {
                    for &child in children {
                        let id = piece.add_child(
                            dst,
                            property,
                            tree.data(child).clone(),
                            tree.n_properties(child),
                        )?;
                        stack.push((child, id));
                    }
                }
            }

            if !piece.is_leaf(piece.root()) {
                out.push(piece);
            }
        }
        Ok(())
    }
}

impl<T: Clone + Eq + Hash> Default for CorpusFilter<T> {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}
