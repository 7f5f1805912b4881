//! Corpus pipeline tests: filter a corpus, build a grammar from what is
//! left, score trees against it and mine patterns.

use proptest::prelude::*;
use tsg_core::{Grammar, PayloadEq, Tree};
use tsg_corpus::{CorpusFilter, FilterConfig, PatternConfig, PatternExtractor};
use tsg_prob::{ComputerConfig, TreeProbabilityComputer};

fn leaves(root: &'static str, kids: &[&'static str]) -> Tree<&'static str> {
    Tree::node(root, vec![kids.iter().map(|&k| Tree::leaf(k)).collect()])
}

fn corpus() -> Vec<Tree<&'static str>> {
    let call = || leaves("Call", &["f", "x"]);
    let calls = Tree::node("Block", vec![vec![call(), call()]]);
    vec![
        calls.clone(),
        calls,
        Tree::node("Block", vec![vec![leaves("Ret", &["x"])]]),
    ]
}

// ============================================================================
// Filter -> grammar -> probability
// ============================================================================

#[test]
fn filtered_corpus_feeds_a_grammar() {
    let mut filter = CorpusFilter::new(FilterConfig { count_limit: 2 });
    for tree in corpus() {
        filter.add_tree(tree);
    }
    let filtered = filter.filtered_trees().unwrap();

    // Block(Ret) and Ret(x) are rare: the third tree contributes nothing.
    assert_eq!(filtered.len(), 2);

    let grammar: Grammar<&'static str> = filtered
        .iter()
        .flat_map(|tree| {
            tree.node_ids()
                .filter(|&n| !tree.is_leaf(n))
                .map(|n| tree.one_level_production(n))
                .collect::<Vec<_>>()
        })
        .collect();
    let calls = grammar.productions(&"Call").map(|r| r.total_count());
    assert_eq!(calls, Some(4));

    let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, ComputerConfig::default());
    let log2_prob = computer.log2_probability_of(&filtered[0]).unwrap();
    assert!(
        log2_prob.abs() < 1e-9,
        "only one production per label, got {log2_prob}"
    );
}

#[test]
fn patterns_from_a_grammar_are_found_in_the_corpus() {
    let mut grammar = Grammar::new();
    let call = leaves("Call", &["f", "x"]);
    let block = Tree::node("Block", vec![vec![call, Tree::leaf("Call")]]);
    grammar.add_rule_count(block, 3);

    let extractor = PatternExtractor::from_grammar(
        &grammar,
        PatternConfig {
            n_previous_nodes: 3,
            min_size_pattern: 5,
            min_pattern_count: 3,
        },
    );
    assert_eq!(extractor.len(), 1);

    let samples = extractor.samples_for_corpus(&corpus(), &PayloadEq);
    assert_eq!(samples.len(), 2);
    assert!(samples
        .iter()
        .all(|s| s.pattern_id == 1 && s.previous_nodes.is_empty()));
    assert!(extractor
        .describe(&samples[0])
        .unwrap()
        .starts_with("Sample [tsgPattern=Block(Call(f, x), Call)"));
}

// ============================================================================
// Filter invariants
// ============================================================================

fn arb_tree() -> impl Strategy<Value = Tree<u8>> {
    let leaf = (0u8..3).prop_map(Tree::leaf);
    leaf.prop_recursive(4, 24, 3, |inner| {
        (0u8..3, prop::collection::vec(inner, 1..3))
            .prop_map(|(label, children)| Tree::node(label, vec![children]))
    })
}

proptest! {
    #[test]
    fn pieces_only_keep_frequent_productions(
        trees in prop::collection::vec(arb_tree(), 1..6),
        count_limit in 0u64..4,
    ) {
        let mut filter = CorpusFilter::new(FilterConfig { count_limit });
        for tree in &trees {
            filter.add_tree(tree.clone());
        }
        for piece in filter.filtered_trees().unwrap() {
            prop_assert!(!piece.is_leaf(piece.root()));
            for node in piece.node_ids().filter(|&n| !piece.is_leaf(n)) {
                prop_assert!(filter.production_count(&piece, node) >= count_limit);
            }
        }
    }

    #[test]
    fn zero_limit_returns_the_corpus(trees in prop::collection::vec(arb_tree(), 1..6)) {
        let mut filter = CorpusFilter::new(FilterConfig { count_limit: 0 });
        for tree in &trees {
            filter.add_tree(tree.clone());
        }
        let expected: Vec<_> = trees.into_iter().filter(|t| !t.is_leaf(t.root())).collect();
        prop_assert_eq!(filter.filtered_trees().unwrap(), expected);
    }
}
