//! Property-based invariant tests for the traversal iterators.
//!
//! These hold for arbitrarily-shaped trees (random parent assignment,
//! random expandable/expanded flags):
//!
//! 1. Every iterator is finite and yields each node at most once.
//! 2. `TopToBottom` from the root equals `PreOrder` from the root.
//! 3. `BottomToTop` is the reverse of the pre-order prefix ending at its
//!    start, whenever the start is part of the (pruned) order.
//! 4. Pruned pre-order is a subsequence of the full pre-order.
//! 5. `BreadthFirst` visits parents before children.
//! 6. A start id outside the tree yields exactly itself.

use proptest::prelude::*;

use treetop_core::iter::{BottomToTop, BreadthFirst, PreOrder, TopToBottom, TraversalOptions};
use treetop_core::node::NodeId;
use treetop_core::tree::{NodeSpec, Tree};

// ── Helpers ─────────────────────────────────────────────────────────────

/// `(parent seed, expandable, expanded)` per inserted node.
fn shape_strategy() -> impl Strategy<Value = Vec<(usize, bool, bool)>> {
    proptest::collection::vec((any::<usize>(), any::<bool>(), any::<bool>()), 0..24)
}

fn build_tree(shape: &[(usize, bool, bool)]) -> (Tree, Vec<NodeId>) {
    let mut tree = Tree::build(NodeSpec::new("n0").expanded(true)).unwrap();
    let mut ids = vec![tree.root()];
    for (index, &(parent_seed, expandable, expanded)) in shape.iter().enumerate() {
        let parent = ids[parent_seed % ids.len()];
        let mut spec = NodeSpec::new(format!("n{}", index + 1));
        if expandable {
            spec = spec.expanded(expanded);
        }
        let id = tree.insert_child(parent, spec).unwrap();
        ids.push(id);
    }
    (tree, ids)
}

fn options(prune: bool) -> TraversalOptions {
    TraversalOptions::new().prune_collapsed(prune)
}

fn assert_unique(ids: &[NodeId]) -> Result<(), TestCaseError> {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    prop_assert_eq!(sorted.len(), ids.len(), "iterator yielded a node twice");
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Finite, at most once
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn iterators_yield_each_node_at_most_once(
        shape in shape_strategy(),
        start_seed in any::<usize>(),
        prune in any::<bool>(),
    ) {
        let (tree, ids) = build_tree(&shape);
        let start = ids[start_seed % ids.len()];
        let opts = options(prune);

        for collected in [
            PreOrder::new(&tree, start, opts).collect::<Vec<_>>(),
            BreadthFirst::new(&tree, start, opts).collect::<Vec<_>>(),
            TopToBottom::new(&tree, start, opts).collect::<Vec<_>>(),
            BottomToTop::new(&tree, start, opts).collect::<Vec<_>>(),
        ] {
            prop_assert!(collected.len() <= tree.len());
            assert_unique(&collected)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. TopToBottom from the root is pre-order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn top_to_bottom_from_root_is_pre_order(
        shape in shape_strategy(),
        prune in any::<bool>(),
    ) {
        let (tree, _) = build_tree(&shape);
        let opts = options(prune);
        let forward: Vec<NodeId> = TopToBottom::new(&tree, tree.root(), opts).collect();
        let pre: Vec<NodeId> = PreOrder::new(&tree, tree.root(), opts).collect();
        prop_assert_eq!(forward, pre);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. BottomToTop reverses the pre-order prefix
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bottom_to_top_reverses_the_prefix(
        shape in shape_strategy(),
        start_seed in any::<usize>(),
        prune in any::<bool>(),
    ) {
        let (tree, ids) = build_tree(&shape);
        let start = ids[start_seed % ids.len()];
        let opts = options(prune);
        let order: Vec<NodeId> = PreOrder::new(&tree, tree.root(), opts).collect();
        let Some(position) = order.iter().position(|id| *id == start) else {
            // Start hidden under a collapsed subtree; not part of the order.
            return Ok(());
        };
        let mut expected = order[..=position].to_vec();
        expected.reverse();
        let backward: Vec<NodeId> = BottomToTop::new(&tree, start, opts).collect();
        prop_assert_eq!(backward, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Pruned pre-order is a subsequence of the full pre-order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pruned_pre_order_is_a_subsequence(shape in shape_strategy()) {
        let (tree, _) = build_tree(&shape);
        let full: Vec<NodeId> = PreOrder::new(&tree, tree.root(), options(false)).collect();
        let pruned: Vec<NodeId> = PreOrder::new(&tree, tree.root(), options(true)).collect();
        let mut cursor = full.iter();
        for id in &pruned {
            prop_assert!(
                cursor.any(|candidate| candidate == id),
                "pruned order is not a subsequence at {}",
                id
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. BreadthFirst visits parents before children
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn breadth_first_parents_come_first(shape in shape_strategy()) {
        let (tree, _) = build_tree(&shape);
        let order: Vec<NodeId> = BreadthFirst::new(&tree, tree.root(), options(false)).collect();
        for (position, id) in order.iter().enumerate() {
            if let Some(parent) = tree.node(*id).and_then(|node| node.parent()) {
                let parent_position = order.iter().position(|other| *other == parent);
                prop_assert!(matches!(parent_position, Some(p) if p < position));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Foreign starts yield exactly themselves
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn foreign_start_yields_itself(shape in shape_strategy(), prune in any::<bool>()) {
        let (tree, _) = build_tree(&shape);
        let stale = NodeId::new(u64::from(u32::MAX)).unwrap();
        prop_assert!(!tree.contains(stale));
        let opts = options(prune);
        prop_assert_eq!(PreOrder::new(&tree, stale, opts).collect::<Vec<_>>(), vec![stale]);
        prop_assert_eq!(BreadthFirst::new(&tree, stale, opts).collect::<Vec<_>>(), vec![stale]);
        prop_assert_eq!(TopToBottom::new(&tree, stale, opts).collect::<Vec<_>>(), vec![stale]);
        prop_assert_eq!(BottomToTop::new(&tree, stale, opts).collect::<Vec<_>>(), vec![stale]);
    }
}
