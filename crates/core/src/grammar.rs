//! # Tree Substitution Grammars
//!
//! A TSG maps every root label to a multiset of rule-trees rooted at that
//! label. A rule's internal nodes constrain structure; its leaves are
//! *frontier points* where any derivation of a matching symbol attaches.
//!
//! ```rust
//! use tsg_core::{Grammar, Tree};
//!
//! let mut grammar = Grammar::new();
//! grammar.add_rule(Tree::node("A", vec![vec![Tree::leaf("B"), Tree::leaf("C")]]));
//! grammar.add_rule(Tree::node("A", vec![vec![Tree::leaf("B"), Tree::leaf("C")]]));
//! grammar.add_rule(Tree::node("A", vec![vec![Tree::leaf("D")]]));
//!
//! let rules = grammar.productions(&"A").unwrap();
//! assert_eq!(rules.len(), 2);
//! assert_eq!(rules.total_count(), 3);
//! ```

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use crate::eq::NodeEq;
use crate::tree::Tree;

/// A multiset of rule-trees sharing one root label.
///
/// Structurally equal rules (same payloads, same shape) are merged and their
/// counts added. Rules are bucketed by their structural hash, so merging and
/// counting only compare trees that share a bucket.
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<(Tree<T>, u64)>,
    buckets: HashMap<u64, Vec<usize>>,
    hasher: RandomState,
    total: u64,
}

impl<T> RuleSet<T> {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            buckets: HashMap::new(),
            hasher: RandomState::new(),
            total: 0,
        }
    }

    /// Distinct rules with their counts, in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tree<T>, u64)> + '_ {
        self.rules.iter().map(|(rule, count)| (rule, *count))
    }

    /// Number of distinct rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sum of all rule counts.
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Whether some rule is structurally equal to `rule` under `eq`.
    pub fn contains_by<E>(&self, rule: &Tree<T>, eq: &E) -> bool
    where
        E: NodeEq<T> + ?Sized,
    {
        self.rules.iter().any(|(candidate, _)| {
            candidate.structurally_equal_by(candidate.root(), rule, rule.root(), eq)
        })
    }
}

impl<T: Eq + Hash> RuleSet<T> {
    /// Add one occurrence of `rule`.
    pub fn add(&mut self, rule: Tree<T>) {
        self.add_count(rule, 1);
    }

    /// Add `count` occurrences of `rule`. A zero count is ignored.
    pub fn add_count(&mut self, rule: Tree<T>, count: u64) {
        if count == 0 {
            return;
        }
        self.total += count;
        let hash = self.hasher.hash_one(&rule);
        match self.find(hash, &rule) {
            Some(slot) => self.rules[slot].1 += count,
            None => {
                let slot = self.rules.len();
                self.buckets.entry(hash).or_default().push(slot);
                self.rules.push((rule, count));
            }
        }
    }

    /// Occurrences of `rule` (0 when absent).
    pub fn count(&self, rule: &Tree<T>) -> u64 {
        let hash = self.hasher.hash_one(rule);
        self.find(hash, rule).map_or(0, |slot| self.rules[slot].1)
    }

    fn find(&self, hash: u64, rule: &Tree<T>) -> Option<usize> {
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|&slot| self.rules[slot].0 == *rule)
    }
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash> FromIterator<Tree<T>> for RuleSet<T> {
    fn from_iter<I: IntoIterator<Item = Tree<T>>>(iter: I) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.add(rule);
        }
        set
    }
}

/// Lookup of the rules applicable to a node label.
pub trait RuleSource<T> {
    /// The rules for `label`, or `None` when the grammar has no entry for it.
    /// `eq` is the comparator used by the caller to match symbols.
    fn productions_for(&self, label: &T, eq: &dyn NodeEq<T>) -> Option<&RuleSet<T>>;
}

/// Log₂-probability of a rule, e.g. a smoothed posterior estimate.
pub trait RulePosterior<T> {
    fn log2_prob(&self, rule: &Tree<T>) -> f64;
}

impl<T, F> RulePosterior<T> for F
where
    F: Fn(&Tree<T>) -> f64,
{
    fn log2_prob(&self, rule: &Tree<T>) -> f64 {
        self(rule)
    }
}

/// A TSG keyed by root label, iterated in insertion order.
///
/// Entries are keyed by the whole payload through `Eq + Hash`.
/// [`Grammar::add_rule`] therefore opens a separate entry for every distinct
/// payload, even when a coarser [`NodeEq`] would treat two of them as one
/// symbol. [`RuleSource::productions_for`] only ever returns one entry, so a
/// grammar meant to be read through a coarse comparator should be built with
/// [`Grammar::add_rule_by`], which merges into the entry that comparator
/// finds.
#[derive(Debug, Clone)]
pub struct Grammar<T> {
    labels: Vec<T>,
    rule_sets: Vec<RuleSet<T>>,
    index: HashMap<T, usize>,
}

impl<T> Grammar<T> {
    /// Number of labels with an entry.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels, in insertion order.
    pub fn labels(&self) -> &[T] {
        &self.labels
    }

    /// `(label, rules)` pairs, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &RuleSet<T>)> + '_ {
        self.labels.iter().zip(self.rule_sets.iter())
    }

    /// Total number of rule occurrences across all labels.
    pub fn total_count(&self) -> u64 {
        self.rule_sets.iter().map(RuleSet::total_count).sum()
    }
}

impl<T: Clone + Eq + Hash> Grammar<T> {
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            rule_sets: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add one occurrence of `rule` under its root label.
    pub fn add_rule(&mut self, rule: Tree<T>) {
        self.add_rule_count(rule, 1);
    }

    /// Add `count` occurrences of `rule` under its root label.
    pub fn add_rule_count(&mut self, rule: Tree<T>, count: u64) {
        let label = rule.data(rule.root()).clone();
        self.entry(label).add_count(rule, count);
    }

    /// The rule set for `label`, created empty if missing.
    pub fn entry(&mut self, label: T) -> &mut RuleSet<T> {
        let slot = match self.index.get(&label) {
            Some(&slot) => slot,
            None => {
                let slot = self.labels.len();
                self.index.insert(label.clone(), slot);
                self.labels.push(label);
                self.rule_sets.push(RuleSet::new());
                slot
            }
        };
        &mut self.rule_sets[slot]
    }

    /// Add one occurrence of `rule` to the entry `eq` finds for its root.
    pub fn add_rule_by<E>(&mut self, rule: Tree<T>, eq: &E)
    where
        E: NodeEq<T> + ?Sized,
    {
        self.add_rule_count_by(rule, 1, eq);
    }

    /// Add `count` occurrences of `rule` to the entry `eq` finds for its
    /// root payload, looked up as in [`RuleSource::productions_for`]. A new
    /// entry keyed by the root payload is opened when none matches.
    pub fn add_rule_count_by<E>(&mut self, rule: Tree<T>, count: u64, eq: &E)
    where
        E: NodeEq<T> + ?Sized,
    {
        match self.slot_by(rule.data(rule.root()), eq) {
            Some(slot) => self.rule_sets[slot].add_count(rule, count),
            None => self.add_rule_count(rule, count),
        }
    }

    /// The rule set stored under exactly `label`.
    pub fn productions(&self, label: &T) -> Option<&RuleSet<T>> {
        self.index.get(label).map(|&slot| &self.rule_sets[slot])
    }
}

impl<T: Eq + Hash> Grammar<T> {
    /// Exact key first, then the first label in insertion order that `eq`
    /// accepts.
    fn slot_by<E>(&self, label: &T, eq: &E) -> Option<usize>
    where
        E: NodeEq<T> + ?Sized,
    {
        match self.index.get(label) {
            Some(&slot) => Some(slot),
            None => self.labels.iter().position(|key| eq.equal(key, label)),
        }
    }
}

impl<T: Clone + Eq + Hash> Default for Grammar<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> FromIterator<Tree<T>> for Grammar<T> {
    fn from_iter<I: IntoIterator<Item = Tree<T>>>(iter: I) -> Self {
        let mut grammar = Self::new();
        for rule in iter {
            grammar.add_rule(rule);
        }
        grammar
    }
}

/// Exact key lookup first; otherwise the first label (in insertion order)
/// that `eq` accepts.
impl<T: Eq + Hash> RuleSource<T> for Grammar<T> {
    fn productions_for(&self, label: &T, eq: &dyn NodeEq<T>) -> Option<&RuleSet<T>> {
        self.slot_by(label, eq).map(|slot| &self.rule_sets[slot])
    }
}

/// A plain label → rule set map; the comparator is not consulted.
impl<T: Eq + Hash> RuleSource<T> for HashMap<T, RuleSet<T>> {
    fn productions_for(&self, label: &T, _eq: &dyn NodeEq<T>) -> Option<&RuleSet<T>> {
        self.get(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eq::{ByKey, PayloadEq};

    fn rule(root: &'static str, kids: &[&'static str]) -> Tree<&'static str> {
        Tree::node(root, vec![kids.iter().map(|&k| Tree::leaf(k)).collect()])
    }

    #[test]
    fn test_rule_set_merges_equal_rules() {
        let mut set = RuleSet::new();
        set.add(rule("A", &["B", "C"]));
        set.add_count(rule("A", &["B", "C"]), 2);
        set.add(rule("A", &["B"]));
        set.add_count(rule("A", &["Z"]), 0);

        assert_eq!(set.len(), 2);
        assert_eq!(set.total_count(), 4);
        assert_eq!(set.count(&rule("A", &["B", "C"])), 3);
        assert_eq!(set.count(&rule("A", &["Z"])), 0);
    }

    #[test]
    fn test_rule_set_counts_among_many_rules() {
        let mut set = RuleSet::new();
        for width in 0..200u32 {
            set.add(Tree::node(0, vec![(0..width).map(Tree::leaf).collect()]));
        }
        for width in (0..200u32).step_by(7) {
            set.add(Tree::node(0, vec![(0..width).map(Tree::leaf).collect()]));
        }

        assert_eq!(set.len(), 200);
        assert_eq!(set.total_count(), 229);
        let seven = Tree::node(0, vec![(0..7).map(Tree::leaf).collect()]);
        let eight = Tree::node(0, vec![(0..8).map(Tree::leaf).collect()]);
        assert_eq!(set.count(&seven), 2);
        assert_eq!(set.count(&eight), 1);
        // A childless rule equals one with an empty property.
        assert_eq!(set.count(&Tree::leaf(0)), 2);
    }

    #[test]
    fn test_contains_by_uses_comparator() {
        let stored = Tree::node((1, 'a'), vec![vec![Tree::leaf((2, 'b'))]]);
        let set: RuleSet<(u32, char)> = [stored].into_iter().collect();

        let query = Tree::node((1, 'x'), vec![vec![Tree::leaf((2, 'y'))]]);
        assert!(!set.contains_by(&query, &PayloadEq));
        assert!(set.contains_by(&query, &ByKey(|s: &(u32, char)| s.0)));
    }

    #[test]
    fn test_grammar_groups_by_root_label() {
        let mut grammar = Grammar::new();
        grammar.add_rule(rule("A", &["B", "C"]));
        grammar.add_rule(rule("B", &["D"]));
        grammar.add_rule(rule("A", &["B"]));

        assert_eq!(grammar.len(), 2);
        assert_eq!(grammar.labels(), &["A", "B"]);
        assert_eq!(grammar.productions(&"A").unwrap().len(), 2);
        assert!(grammar.productions(&"C").is_none());
        assert_eq!(grammar.total_count(), 3);
    }

    #[test]
    fn test_rule_source_falls_back_to_comparator() {
        let mut grammar = Grammar::new();
        grammar.add_rule(Tree::node((7, 'r'), vec![vec![Tree::leaf((8, 'r'))]]));

        let by_key = ByKey(|s: &(u32, char)| s.0);
        assert!(grammar.productions_for(&(7, 'r'), &PayloadEq).is_some());
        assert!(grammar.productions_for(&(7, 'i'), &PayloadEq).is_none());
        assert!(grammar.productions_for(&(7, 'i'), &by_key).is_some());
        assert!(grammar.productions_for(&(9, 'i'), &by_key).is_none());
    }

    #[test]
    fn test_add_rule_by_merges_coarsely_equal_roots() {
        let by_key = ByKey(|s: &(u32, char)| s.0);
        let rule = |tag: char| Tree::node((1, tag), vec![vec![Tree::leaf((2, tag))]]);

        let mut keyed = Grammar::new();
        keyed.add_rule(rule('a'));
        keyed.add_rule(rule('b'));
        assert_eq!(keyed.len(), 2);

        let mut merged = Grammar::new();
        merged.add_rule_by(rule('a'), &by_key);
        merged.add_rule_count_by(rule('b'), 2, &by_key);
        let other = Tree::node((3, 'a'), vec![vec![Tree::leaf((1, 'a'))]]);
        merged.add_rule_by(other, &by_key);

        assert_eq!(merged.labels(), &[(1, 'a'), (3, 'a')]);
        let rules = merged.productions_for(&(1, 'z'), &by_key).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.total_count(), 3);
        assert_eq!(rules.count(&rule('b')), 2);
    }

    #[test]
    fn test_closure_posterior() {
        let posterior = |rule: &Tree<&str>| -(rule.len() as f64);
        assert_eq!(posterior.log2_prob(&rule("A", &["B", "C"])), -3.0);
    }
}
