//! Processing order for the bottom-up pass.

use tsg_core::{NodeId, Tree};

/// Every node of `tree` in pre-order: each node precedes all of its
/// descendants.
///
/// Walking the plan backwards visits every node after its descendants, which
/// is the order the per-node probabilities must be filled in. The walk uses
/// an explicit stack, so tree depth is not bounded by the call stack.
pub fn compute_plan<T>(tree: &Tree<T>) -> Vec<NodeId> {
    let mut ordered = Vec::with_capacity(tree.len());
    let mut stack = vec![tree.root()];
    while let Some(current) = stack.pop() {
        ordered.push(current);
        for children in tree.children_by_property(current) {
            stack.extend(children.iter().copied());
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(plan: &[NodeId], node: NodeId) -> usize {
        plan.iter().position(|&n| n == node).unwrap()
    }

    #[test]
    fn test_plan_covers_every_node_once() {
        let b = Tree::node("B", vec![vec![Tree::leaf("D")]]);
        let tree = Tree::node("A", vec![vec![b, Tree::leaf("C")], vec![Tree::leaf("E")]]);
        let mut plan = compute_plan(&tree);
        assert_eq!(plan.len(), tree.len());
        plan.sort();
        plan.dedup();
        assert_eq!(plan.len(), tree.len());
    }

    #[test]
    fn test_descendants_come_later() {
        let tree = Tree::node(
            "A",
            vec![vec![
                Tree::node("B", vec![vec![Tree::leaf("D"), Tree::leaf("E")]]),
                Tree::node("C", vec![vec![Tree::leaf("F")]]),
            ]],
        );
        let plan = compute_plan(&tree);
        for node in tree.node_ids() {
            for descendant in tree.preorder(node).skip(1) {
                assert!(position(&plan, node) < position(&plan, descendant));
            }
        }
    }

    #[test]
    fn test_plan_is_restartable() {
        let tree = Tree::node("A", vec![vec![Tree::leaf("B"), Tree::leaf("C")]]);
        assert_eq!(compute_plan(&tree), compute_plan(&tree));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut tree = Tree::new(0u32, 1);
        let mut parent = tree.root();
        for depth in 1..200_000u32 {
            parent = tree.add_child(parent, 0, depth, 1).unwrap();
        }
        let plan = compute_plan(&tree);
        assert_eq!(plan.len(), 200_000);
        assert_eq!(*tree.data(plan[plan.len() - 1]), 199_999);
    }
}
