//! Depth-first, coverage-ordered compact encoding.
//!
//! Decoded trees arrive breadth-first, so child nodes drift increasingly far
//! in memory from their parents. This encoding repacks the tree depth-first,
//! expanding the higher-coverage child of every split first. Coverage is the
//! hessian weight of training rows that reached the node, an empirical
//! estimate of how often the branch is taken online. The result: at every
//! split the common child sits in the immediately adjacent slot and is
//! reached by a stride increment, while only the rare child costs a jump.
//!
//! Each node occupies three consecutive `u32` words:
//!
//! ```text
//!   ------------------------------------------------------
//! 1 |       Split condition / Leaf value (IEEE bits)     |
//!   ------------------------------------------------------
//! 2 |   Rare child offset (31 bits) | Swapped (1 bit)    | (zero iff leaf)
//!   ------------------------------------------------------
//! 3 | Feature Index (31 bits) | Default is right (1 bit) |
//!   ------------------------------------------------------
//! ```
//!
//! "Left" in this layout means the adjacent slot. When the original right
//! child had the higher coverage the children are exchanged, the swapped bit
//! is set, and the default bit in word 3 is flipped to keep the default path
//! correct relative to the physical layout.
//!
//! Coverage comparison is strict: equal-coverage children take the swap
//! branch. This tie-break is part of the encoding contract; reference
//! encoders produce bit-identical arrays.
//!
//! A parent always has coverage at least that of each of its children, but a
//! node's coverage says nothing about a sibling's descendants. The rare path
//! therefore still jumps forward, never backward.

use crate::fvec::FVec;

use super::table::NodeTable;
use super::traversal::TreeWalk;
use super::words::{BranchWord, SplitWord};

/// Words per node.
pub const STRIDE: usize = 3;

const UNVISITED: usize = usize::MAX;

/// Depth-first coverage-ordered tree encoding (layout B).
#[derive(Debug, Clone)]
pub struct PreorderTree {
    nodes: Box<[u32]>,
}

impl PreorderTree {
    /// Repack a decoded node table.
    ///
    /// First pass: explicit-stack depth-first traversal from the root. Each
    /// popped node takes the next contiguous slot and emits its value and
    /// split words immediately; the branch word holds a placeholder because
    /// the rare child's final address is not known yet. The higher-coverage
    /// child is pushed last so its whole subtree is expanded before the
    /// sibling is visited at all.
    ///
    /// Second pass: resolve every rare child's new offset through the
    /// old-id-to-new-offset map and patch the branch words. Nodes the
    /// traversal never reached (deleted nodes) are skipped.
    pub fn from_table(table: &NodeTable) -> Self {
        let mut nodes = vec![0u32; STRIDE * table.len()];
        let mut offsets = vec![UNVISITED; table.len()];
        let mut stack = Vec::with_capacity(table.params().max_depth.max(1) as usize);
        let mut cursor = 0usize;

        stack.push(0usize);

        while let Some(id) = stack.pop() {
            let node = table.node(id);
            offsets[id] = cursor;

            nodes[cursor] = node.value_bits();
            let mut split = SplitWord::new(node.split_index(), node.default_left());

            let branch = if node.is_leaf() {
                BranchWord::LEAF
            } else {
                let left = table.node(node.left as usize);
                let right = table.node(node.right as usize);

                if left.coverage > right.coverage {
                    stack.push(node.right as usize);
                    stack.push(node.left as usize);
                    BranchWord::pending(false)
                } else {
                    stack.push(node.left as usize);
                    stack.push(node.right as usize);
                    split = split.flipped();
                    BranchWord::pending(true)
                }
            };

            nodes[cursor + 1] = branch.bits();
            nodes[cursor + 2] = split.bits();
            cursor += STRIDE;
        }

        for node in table.nodes() {
            if node.is_leaf() || offsets[node.id as usize] == UNVISITED {
                continue;
            }
            let base = offsets[node.id as usize];
            let branch = BranchWord::from_bits(nodes[base + 1]);

            let rare_id = if branch.swapped() {
                node.left
            } else {
                node.right
            } as usize;
            let offset = offsets[rare_id] - base;
            nodes[base + 1] = BranchWord::with_offset(offset, branch.swapped()).bits();
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
}

impl TreeWalk for PreorderTree {
    #[inline]
    fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node + 1] == 0
    }

    #[inline]
    fn next_node<F: FVec>(&self, node: usize, features: &F) -> usize {
        let split = SplitWord::from_bits(self.nodes[node + 2]);
        let branch = BranchWord::from_bits(self.nodes[node + 1]);

        match features.fvalue(split.feature_index() as usize) {
            None => {
                if split.default_left() {
                    node + STRIDE
                } else {
                    node + branch.offset()
                }
            }
            Some(value) => {
                // Xor of the branch outcome with the swapped bit: if exactly
                // one holds, the taken branch is the adjacent slot.
                if (value < f32::from_bits(self.nodes[node])) != branch.swapped() {
                    node + STRIDE
                } else {
                    node + branch.offset()
                }
            }
        }
    }

    #[inline]
    fn leaf_value_at(&self, node: usize) -> f32 {
        f32::from_bits(self.nodes[node])
    }
}
