//! Testing utilities: float assertions, stream writing, and random trees.
//!
//! Used by unit tests, the integration suite, and the benches. The random
//! tree generator produces well-formed breadth-first tables whose coverage
//! statistics are consistent (children partition their parent's coverage),
//! which is what real training output looks like.

use std::collections::VecDeque;

use rand::Rng;

use crate::fvec::SparseFVec;
use crate::trees::{NodeTable, NodeTableBuilder, RawNode};

/// Default tolerance for floating point comparisons.
pub const DEFAULT_TOLERANCE: f32 = 1e-6;

/// Assert two `f32` values are approximately equal (absolute difference).
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, $crate::testing::DEFAULT_TOLERANCE)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (left, right) = ($left, $right);
        assert!(
            approx::abs_diff_eq!(left, right, epsilon = $tol),
            "approx assertion failed: {} vs {} (tolerance {})",
            left,
            right,
            $tol
        );
    }};
}

/// Serialize a node table into the historical little-endian stream form:
/// header, every structural node record, then every statistics record.
pub fn write_table(table: &NodeTable) -> Vec<u8> {
    let params = table.params();
    let mut bytes = Vec::new();

    for value in [
        params.num_roots,
        params.num_nodes,
        params.num_deleted,
        params.max_depth,
        params.num_features,
        params.leaf_vector_size,
    ] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    for value in params.reserved {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    for node in table.nodes() {
        bytes.extend_from_slice(&node.parent.to_le_bytes());
        bytes.extend_from_slice(&node.left.to_le_bytes());
        bytes.extend_from_slice(&node.right.to_le_bytes());
        bytes.extend_from_slice(&node.split.bits().to_le_bytes());
        bytes.extend_from_slice(&node.value_bits().to_le_bytes());
    }
    for node in table.nodes() {
        bytes.extend_from_slice(&node.loss_change.to_le_bytes());
        bytes.extend_from_slice(&node.coverage.to_le_bytes());
        bytes.extend_from_slice(&node.base_weight.to_le_bytes());
        bytes.extend_from_slice(&node.leaf_child_count.to_le_bytes());
    }

    bytes
}

/// Generate a random well-formed tree in breadth-first order.
///
/// Nodes split with probability 3/4 until `max_depth`; children receive
/// random fractions of their parent's coverage, so the parent-vs-child
/// coverage invariant holds by construction.
pub fn random_table<R: Rng>(rng: &mut R, max_depth: usize, num_features: usize) -> NodeTable {
    let mut builder = NodeTableBuilder::new();
    let mut queue: VecDeque<(usize, f32)> = VecDeque::new();
    queue.push_back((0, 1000.0));
    let mut next_id = 1u32;

    while let Some((depth, coverage)) = queue.pop_front() {
        let splits = depth < max_depth && rng.gen::<f32>() < 0.75;
        if splits {
            let left_coverage = coverage * rng.gen_range(0.05..0.95);
            builder.add_split(
                rng.gen_range(0..num_features) as u32,
                rng.gen_range(-1.0..1.0),
                rng.gen_bool(0.5),
                next_id,
                next_id + 1,
                coverage,
            );
            queue.push_back((depth + 1, left_coverage));
            queue.push_back((depth + 1, coverage - left_coverage));
            next_id += 2;
        } else {
            builder.add_leaf(rng.gen_range(-2.0..2.0), coverage);
        }
    }

    builder.build()
}

/// Generate sparse rows with values in `[-1.5, 1.5]`; each feature is left
/// out (missing) with probability `missing_rate`.
pub fn random_rows<R: Rng>(
    rng: &mut R,
    count: usize,
    num_features: usize,
    missing_rate: f64,
) -> Vec<SparseFVec> {
    (0..count)
        .map(|_| {
            SparseFVec::from_pairs((0..num_features).filter_map(|index| {
                if rng.gen_bool(missing_rate) {
                    None
                } else {
                    Some((index, rng.gen_range(-1.5..1.5)))
                }
            }))
        })
        .collect()
}

/// Leaf value reached by following every node's default direction from the
/// root of a raw table. Reference result for the missing-value property.
pub fn default_path_leaf(table: &NodeTable) -> f32 {
    let mut node: &RawNode = table.node(0);
    while !node.is_leaf() {
        let next = if node.default_left() {
            node.left
        } else {
            node.right
        };
        node = table.node(next as usize);
    }
    node.leaf_value
}
