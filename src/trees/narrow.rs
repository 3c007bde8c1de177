//! Narrow compact encoding with 16-bit child ids.
//!
//! Four `u32` words per node, with both child ids truncated to 16 bits and
//! packed into a single word:
//!
//! ```text
//!   ------------------------------------------------------
//! 1 |       Split condition / Leaf value (IEEE bits)     |
//!   ------------------------------------------------------
//! 2 |     Left child id (16 bits) | Right child id (16)  |
//!   ------------------------------------------------------
//! 3 |              Feature index (32 bits)               |
//!   ------------------------------------------------------
//! 4 |     Tag: 2 = leaf; bit 0 of a split = default left |
//!   ------------------------------------------------------
//! ```
//!
//! Branch-light decoding in exchange for a hard ceiling: any child id past
//! 65535 fails at build time rather than truncating silently.

use crate::fvec::FVec;

use super::table::NodeTable;
use super::traversal::TreeWalk;
use super::words::{ChildPair, NodeTag};
use super::DecodeError;

/// Words per node.
pub const STRIDE: usize = 4;

/// Maximum addressable child id.
const MAX_CHILD: i32 = u16::MAX as i32;

/// Narrow tree encoding (layout C).
#[derive(Debug, Clone)]
pub struct NarrowTree {
    nodes: Box<[u32]>,
}

impl NarrowTree {
    /// Encode a decoded node table.
    ///
    /// Fails with [`DecodeError::TreeTooWide`] if any child id exceeds the
    /// 16-bit addressable range.
    pub fn from_table(table: &NodeTable) -> Result<Self, DecodeError> {
        let mut nodes = vec![0u32; STRIDE * table.len()];

        for (id, node) in table.nodes().iter().enumerate() {
            let base = id * STRIDE;
            nodes[base] = node.value_bits();

            if node.is_leaf() {
                nodes[base + 3] = NodeTag::LEAF.bits();
                continue;
            }

            for child in [node.left, node.right] {
                if child > MAX_CHILD {
                    return Err(DecodeError::TreeTooWide { node: id, child });
                }
            }

            nodes[base + 1] = ChildPair::new(node.left as u16, node.right as u16).bits();
            nodes[base + 2] = node.split_index();
            nodes[base + 3] = NodeTag::split(node.default_left()).bits();
        }

        Ok(Self {
            nodes: nodes.into_boxed_slice(),
        })
    }

    /// Raw word array, four words per node.
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

impl TreeWalk for NarrowTree {
    #[inline]
    fn is_leaf(&self, node: usize) -> bool {
        NodeTag::from_bits(self.nodes[node + 3]).is_leaf()
    }

    #[inline]
    fn next_node<F: FVec>(&self, node: usize, features: &F) -> usize {
        let tag = NodeTag::from_bits(self.nodes[node + 3]);
        let children = ChildPair::from_bits(self.nodes[node + 1]);

        let child = match features.fvalue(self.nodes[node + 2] as usize) {
            None => {
                if tag.default_left() {
                    children.left()
                } else {
                    children.right()
                }
            }
            Some(value) => {
                if value < f32::from_bits(self.nodes[node]) {
                    children.left()
                } else {
                    children.right()
                }
            }
        };

        child as usize * STRIDE
    }

    #[inline]
    fn leaf_value_at(&self, node: usize) -> f32 {
        f32::from_bits(self.nodes[node])
    }
}
