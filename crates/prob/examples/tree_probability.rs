//! Tree probabilities under a small TSG
//!
//! Run with: cargo run -p tsg-prob --example tree_probability
//!
//! This example demonstrates:
//! - Building a grammar from multi-level rules with counts
//! - Relative-frequency versus posterior rule probabilities
//! - Exact and partial matching of rule children
//! - The one-level back-off for nodes no rule covers
//!
//! Set `RUST_LOG=tsg_prob=trace` to see every node's aggregation.

use tracing_subscriber::EnvFilter;
use tsg_core::{Grammar, PayloadEq, Tree};
use tsg_prob::{ComputerConfig, MatchPolicy, ProbError, TreeProbabilityComputer};

fn leaves(root: &'static str, kids: &[&'static str]) -> Tree<&'static str> {
    Tree::node(root, vec![kids.iter().map(|&k| Tree::leaf(k)).collect()])
}

fn main() -> Result<(), ProbError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Tree Probabilities under a Tree Substitution Grammar ===\n");

    // -------------------------------------------------------------------------
    // 1. The grammar
    // -------------------------------------------------------------------------
    println!("1. The grammar");
    println!("--------------");

    let mut grammar = Grammar::new();
    grammar.add_rule_count(
        Tree::node("Stmt", vec![vec![leaves("Call", &["Name", "Args"])]]),
        3,
    );
    grammar.add_rule(leaves("Stmt", &["Assign"]));
    grammar.add_rule_count(leaves("Call", &["Name", "Args"]), 2);
    grammar.add_rule(leaves("Call", &["Name"]));

    for (label, rules) in grammar.iter() {
        for (rule, count) in rules.iter() {
            let total = rules.total_count();
            println!("  {label:<5} -> {rule}  (count {count}/{total})");
        }
    }
    println!();

    // -------------------------------------------------------------------------
    // 2. Relative frequencies
    // -------------------------------------------------------------------------
    println!("2. Relative frequencies");
    println!("-----------------------");

    let tree = Tree::node("Stmt", vec![vec![leaves("Call", &["Name", "Args"])]]);
    let computer = TreeProbabilityComputer::new(&grammar, PayloadEq, ComputerConfig::default());
    let probabilities = computer.node_log2_probabilities(&tree)?;

    println!("Tree: {tree}");
    for node in tree.preorder(tree.root()) {
        println!(
            "  {:<6} log2 P = {:>8.4}",
            tree.data(node),
            probabilities.require(node)?
        );
    }
    println!(
        "P(tree) = {:.4}  (3/4 from the two-level rule + 2/3 from the Stmt(Call) back-off)",
        computer.log2_probability_of(&tree)?.exp2()
    );
    println!();

    // -------------------------------------------------------------------------
    // 3. A posterior over rules
    // -------------------------------------------------------------------------
    println!("3. A posterior over rules");
    println!("-------------------------");

    let posterior = |rule: &Tree<&'static str>| -(rule.len() as f64);
    let scored = TreeProbabilityComputer::new(&grammar, PayloadEq, ComputerConfig::default())
        .with_posterior(&posterior);
    println!("Posterior: log2 P(rule) = -(nodes in rule)");
    println!("P(tree) = {:.4}", scored.log2_probability_of(&tree)?.exp2());
    println!();

    // -------------------------------------------------------------------------
    // 4. Exact versus partial matching
    // -------------------------------------------------------------------------
    println!("4. Exact versus partial matching");
    println!("--------------------------------");

    let long_call = leaves("Call", &["Name", "Args", "Kwargs"]);
    for matching in [MatchPolicy::Exact, MatchPolicy::Partial] {
        let computer = TreeProbabilityComputer::new(
            &grammar,
            PayloadEq,
            ComputerConfig::new(matching, false),
        );
        println!(
            "  {matching:<7} P({long_call}) = {:.4}",
            computer.log2_probability_of(&long_call)?.exp2()
        );
    }
    println!();

    // -------------------------------------------------------------------------
    // 5. Back-off
    // -------------------------------------------------------------------------
    println!("5. Back-off");
    println!("-----------");

    let unseen = leaves("Call", &["Attr"]);
    for cfg_fallback in [false, true] {
        let computer = TreeProbabilityComputer::new(
            &grammar,
            PayloadEq,
            ComputerConfig::new(MatchPolicy::Exact, cfg_fallback),
        );
        println!(
            "  cfg_fallback = {cfg_fallback:<5} log2 P({unseen}) = {}",
            computer.log2_probability_of(&unseen)?
        );
    }

    println!("\n=== Done ===");
    Ok(())
}
