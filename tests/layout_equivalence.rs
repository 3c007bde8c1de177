//! Cross-layout equivalence and repacking invariants.
//!
//! The three compact encodings are optimizations of one another, never a
//! semantic change: for any well-formed table and any feature vector they
//! must reach bit-identical leaf values.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rstest::rstest;

use covertree::testing::{default_path_leaf, random_rows, random_table};
use covertree::trees::preorder::STRIDE as PREORDER_STRIDE;
use covertree::trees::words::BranchWord;
use covertree::{
    BreadthTree, DenseFVec, FVec, Layout, NarrowTree, NodeTableBuilder, PreorderTree, RegTree,
    SparseFVec, TreeWalk,
};

#[rstest]
#[case::breadth(Layout::Breadth)]
#[case::preorder(Layout::Preorder)]
#[case::narrow(Layout::Narrow)]
fn two_level_scenario(#[case] layout: Layout) {
    let mut builder = NodeTableBuilder::new();
    builder.add_split(0, 0.5, true, 1, 2, 10.0);
    builder.add_leaf(-1.0, 6.0);
    builder.add_leaf(1.0, 4.0);
    let tree = RegTree::from_table(&builder.build(), layout).unwrap();

    assert_eq!(tree.leaf_value(&SparseFVec::from_pairs([(0, 0.2)])), -1.0);
    assert_eq!(tree.leaf_value(&SparseFVec::from_pairs([(0, 0.7)])), 1.0);
    assert_eq!(tree.leaf_value(&SparseFVec::default()), -1.0);
}

#[rstest]
#[case::breadth(Layout::Breadth)]
#[case::preorder(Layout::Preorder)]
#[case::narrow(Layout::Narrow)]
fn single_node_tree_ignores_features(#[case] layout: Layout) {
    let mut builder = NodeTableBuilder::new();
    builder.add_leaf(0.75, 1.0);
    let tree = RegTree::from_table(&builder.build(), layout).unwrap();

    assert_eq!(tree.leaf_value(&SparseFVec::default()), 0.75);
    assert_eq!(
        tree.leaf_value(&DenseFVec::from_f32(&[1.0, 2.0, 3.0], false)),
        0.75
    );
}

#[test]
fn layouts_agree_on_random_trees() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

    for round in 0..20 {
        let table = random_table(&mut rng, 10, 12);
        let breadth = BreadthTree::from_table(&table);
        let preorder = PreorderTree::from_table(&table);
        let narrow = NarrowTree::from_table(&table).unwrap();

        for row in random_rows(&mut rng, 64, 12, 0.25) {
            let expected = breadth.leaf_value(&row, 0);
            assert_eq!(
                preorder.leaf_value(&row, 0).to_bits(),
                expected.to_bits(),
                "preorder diverged on round {round}"
            );
            assert_eq!(
                narrow.leaf_value(&row, 0).to_bits(),
                expected.to_bits(),
                "narrow diverged on round {round}"
            );
        }
    }
}

#[test]
fn sparse_and_dense_rows_agree() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(13);
    let table = random_table(&mut rng, 8, 6);
    let tree = RegTree::from_table(&table, Layout::Preorder).unwrap();

    // Fully-present rows have an exact dense counterpart.
    for row in random_rows(&mut rng, 32, 6, 0.0) {
        let values: Vec<f32> = (0..6).map(|index| row.fvalue(index).unwrap()).collect();
        let dense = DenseFVec::from_f32(&values, false);
        assert_eq!(
            tree.leaf_value(&row).to_bits(),
            tree.leaf_value(&dense).to_bits()
        );
    }
}

#[rstest]
#[case::breadth(Layout::Breadth)]
#[case::preorder(Layout::Preorder)]
#[case::narrow(Layout::Narrow)]
fn nan_value_takes_else_branch_not_default(#[case] layout: Layout) {
    // root: feat0 < 0.5, default left. A stored NaN is a present value:
    // it compares false under `<` and lands on the right leaf, while a
    // genuinely missing feature follows the default to the left leaf.
    let mut builder = NodeTableBuilder::new();
    builder.add_split(0, 0.5, true, 1, 2, 10.0);
    builder.add_leaf(-1.0, 6.0);
    builder.add_leaf(1.0, 4.0);
    let tree = RegTree::from_table(&builder.build(), layout).unwrap();

    let dense_nan = DenseFVec::from_f32(&[f32::NAN], false);
    assert_eq!(tree.leaf_value(&dense_nan), 1.0);

    let sparse_nan = SparseFVec::from_pairs([(0, f32::NAN)]);
    assert_eq!(tree.leaf_value(&sparse_nan), 1.0);

    assert_eq!(tree.leaf_value(&SparseFVec::default()), -1.0);
}

#[test]
fn repacking_preserves_leaf_value_multiset() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(99);

    for _ in 0..10 {
        let table = random_table(&mut rng, 9, 8);
        let preorder = PreorderTree::from_table(&table);

        let mut original: Vec<f32> = table
            .nodes()
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.leaf_value)
            .collect();

        let words = preorder.words();
        let mut repacked: Vec<f32> = (0..words.len())
            .step_by(PREORDER_STRIDE)
            .filter(|&base| BranchWord::from_bits(words[base + 1]).is_leaf())
            .map(|base| f32::from_bits(words[base]))
            .collect();

        original.sort_by(f32::total_cmp);
        repacked.sort_by(f32::total_cmp);
        assert_eq!(original.len(), repacked.len());
        for (a, b) in original.iter().zip(&repacked) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}

#[test]
fn coverage_never_increases_down_the_tree() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);

    for _ in 0..10 {
        let table = random_table(&mut rng, 10, 8);
        for node in table.nodes() {
            if !node.is_leaf() {
                assert!(node.coverage >= table.node(node.left as usize).coverage);
                assert!(node.coverage >= table.node(node.right as usize).coverage);
            }
        }
    }
}

#[rstest]
#[case::breadth(Layout::Breadth)]
#[case::preorder(Layout::Preorder)]
#[case::narrow(Layout::Narrow)]
fn all_missing_rows_follow_default_path(#[case] layout: Layout) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);

    for _ in 0..10 {
        let table = random_table(&mut rng, 8, 8);
        let expected = default_path_leaf(&table);
        let tree = RegTree::from_table(&table, layout).unwrap();

        assert_eq!(
            tree.leaf_value(&SparseFVec::default()).to_bits(),
            expected.to_bits()
        );
    }
}

#[test]
fn zero_as_missing_policy_changes_routing() {
    // root: feat0 < 0.5, default right.
    let mut builder = NodeTableBuilder::new();
    builder.add_split(0, 0.5, false, 1, 2, 10.0);
    builder.add_leaf(-1.0, 4.0);
    builder.add_leaf(1.0, 6.0);
    let tree = RegTree::from_table(&builder.build(), Layout::Preorder).unwrap();

    // A real zero compares below the threshold; a zero declared missing
    // takes the default direction instead.
    let zero = DenseFVec::from_f32(&[0.0], false);
    assert_eq!(tree.leaf_value(&zero), -1.0);

    let zero_missing = DenseFVec::from_f32(&[0.0], true);
    assert_eq!(tree.leaf_value(&zero_missing), 1.0);
}

#[test]
fn preorder_rare_offsets_stay_in_bounds() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(77);

    for _ in 0..10 {
        let table = random_table(&mut rng, 10, 8);
        let preorder = PreorderTree::from_table(&table);
        let words = preorder.words();

        for base in (0..words.len()).step_by(PREORDER_STRIDE) {
            let branch = BranchWord::from_bits(words[base + 1]);
            if !branch.is_leaf() {
                // The rare child always lives strictly beyond the adjacent
                // slot, and within this tree's array.
                assert!(branch.offset() > PREORDER_STRIDE);
                assert!(base + branch.offset() < words.len());
            }
        }
    }
}
