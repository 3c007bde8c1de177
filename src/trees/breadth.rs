//! Breadth-first compact encoding.
//!
//! The direct image of the on-disk node order. Each node occupies three
//! consecutive `u32` words:
//!
//! ```text
//!   ------------------------------------------------------
//! 1 |       Split condition / Leaf value (IEEE bits)     |
//!   ------------------------------------------------------
//! 2 |  Left child word address, pre-multiplied by stride | (zero iff leaf)
//!   ------------------------------------------------------
//! 3 |  Feature index (31 bits) | Default is right (1 bit)|
//!   ------------------------------------------------------
//! ```
//!
//! Children are stored as adjacent pairs, so the right child address is the
//! left child address plus one stride. Word address 0 is the root, which no
//! node legitimately addresses as a child, so zero doubles as the leaf mark.

use crate::fvec::FVec;

use super::table::NodeTable;
use super::traversal::TreeWalk;
use super::words::SplitWord;

/// Words per node.
pub const STRIDE: usize = 3;

/// Breadth-first tree encoding (layout A).
#[derive(Debug, Clone)]
pub struct BreadthTree {
    nodes: Box<[u32]>,
}

impl BreadthTree {
    /// Encode a decoded node table.
    pub fn from_table(table: &NodeTable) -> Self {
        let mut nodes = vec![0u32; STRIDE * table.len()];

        for (id, node) in table.nodes().iter().enumerate() {
            let base = id * STRIDE;
            nodes[base] = node.value_bits();
            nodes[base + 1] = if node.is_leaf() {
                0
            } else {
                node.left as u32 * STRIDE as u32
            };
            nodes[base + 2] = SplitWord::new(node.split_index(), node.default_left()).bits();
        }

        Self {
            nodes: nodes.into_boxed_slice(),
        }
    }

    /// Raw word array, three words per node.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.nodes
    }

    /// Word address of a breadth-first node id.
    #[inline]
    pub fn address_of(&self, id: usize) -> usize {
        id * STRIDE
    }
}

impl TreeWalk for BreadthTree {
    #[inline]
    fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node + 1] == 0
    }

    #[inline]
    fn next_node<F: FVec>(&self, node: usize, features: &F) -> usize {
        let split = SplitWord::from_bits(self.nodes[node + 2]);
        let left = self.nodes[node + 1] as usize;

        match features.fvalue(split.feature_index() as usize) {
            None => {
                if split.default_left() {
                    left
                } else {
                    left + STRIDE
                }
            }
            Some(value) => {
                if value < f32::from_bits(self.nodes[node]) {
                    left
                } else {
                    left + STRIDE
                }
            }
        }
    }

    #[inline]
    fn leaf_value_at(&self, node: usize) -> f32 {
        f32::from_bits(self.nodes[node])
    }
}
