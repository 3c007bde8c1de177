//! Tree traversal: the walk-to-leaf loop and load-time layout selection.

use std::io::Read;

use rayon::prelude::*;

use crate::fvec::FVec;
use crate::io::ModelReader;

use super::breadth::{self, BreadthTree};
use super::narrow::{self, NarrowTree};
use super::preorder::PreorderTree;
use super::table::{NodeTable, TreeParams};
use super::DecodeError;

// =============================================================================
// TreeWalk Trait
// =============================================================================

/// A compact tree encoding that can be walked from a node address to a leaf.
///
/// Node addresses are word offsets into the encoding's backing array; 0 is
/// always a root. Every implementation guarantees that `next_node` on a
/// well-formed encoding only moves to valid addresses, so the walk loop
/// terminates within tree depth steps. A malformed encoding containing a
/// cycle is not defended against here.
pub trait TreeWalk {
    /// Whether the node at `node` is a leaf.
    fn is_leaf(&self, node: usize) -> bool;

    /// Address of the next node on the path for `features`.
    ///
    /// Must only be called on a non-leaf address. Missing features take the
    /// stored default direction without touching the threshold; present
    /// values compare strictly `value < threshold`. A present NaN compares
    /// false and falls to the else branch; only "missing" triggers the
    /// default path.
    fn next_node<F: FVec>(&self, node: usize, features: &F) -> usize;

    /// Leaf value at a leaf address: the node's first word reinterpreted as
    /// an IEEE-754 float.
    fn leaf_value_at(&self, node: usize) -> f32;

    /// Walk from `start` to a leaf and return its address.
    #[inline]
    fn leaf_index<F: FVec>(&self, features: &F, start: usize) -> usize {
        let mut node = start;
        while !self.is_leaf(node) {
            node = self.next_node(node, features);
        }
        node
    }

    /// Walk from `start` to a leaf and return its value.
    #[inline]
    fn leaf_value<F: FVec>(&self, features: &F, start: usize) -> f32 {
        self.leaf_value_at(self.leaf_index(features, start))
    }
}

// =============================================================================
// Layout Selection
// =============================================================================

/// Physical layout to encode a tree into at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Breadth-first with absolute child addresses ([`BreadthTree`]).
    Breadth,
    /// Depth-first coverage-ordered ([`PreorderTree`]). The default: several
    /// times faster than breadth-first order on deep trees.
    #[default]
    Preorder,
    /// 16-bit dual child slots ([`NarrowTree`]).
    Narrow,
}

#[derive(Debug, Clone)]
enum Encoded {
    Breadth(BreadthTree),
    Preorder(PreorderTree),
    Narrow(NarrowTree),
}

// =============================================================================
// RegTree
// =============================================================================

/// A loaded regression tree: one compact encoding plus tree metadata.
///
/// Immutable after construction; evaluation is a pure read and safe to call
/// concurrently from any number of threads.
#[derive(Debug, Clone)]
pub struct RegTree {
    params: TreeParams,
    encoded: Encoded,
}

impl RegTree {
    /// Encode a decoded node table into the requested layout.
    pub fn from_table(table: &NodeTable, layout: Layout) -> Result<Self, DecodeError> {
        let encoded = match layout {
            Layout::Breadth => Encoded::Breadth(BreadthTree::from_table(table)),
            Layout::Preorder => Encoded::Preorder(PreorderTree::from_table(table)),
            Layout::Narrow => Encoded::Narrow(NarrowTree::from_table(table)?),
        };
        Ok(Self {
            params: table.params().clone(),
            encoded,
        })
    }

    /// Decode one tree off a model stream and encode it. The intermediate
    /// node table is dropped once the encoding is built.
    pub fn read<R: Read>(reader: &mut ModelReader<R>, layout: Layout) -> Result<Self, DecodeError> {
        let table = NodeTable::read(reader)?;
        Self::from_table(&table, layout)
    }

    /// Tree-level metadata from the model header.
    #[inline]
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Layout this tree was encoded into.
    pub fn layout(&self) -> Layout {
        match self.encoded {
            Encoded::Breadth(_) => Layout::Breadth,
            Encoded::Preorder(_) => Layout::Preorder,
            Encoded::Narrow(_) => Layout::Narrow,
        }
    }

    /// Number of declared roots (historically always 1).
    #[inline]
    pub fn num_roots(&self) -> usize {
        self.params.num_roots as usize
    }

    /// Word address of a declared root, or `None` when this encoding cannot
    /// address it.
    ///
    /// The id-addressed layouts place every declared root at `root * stride`.
    /// The repacked layout places only root 0; a file may legally declare
    /// more (historical files never do), and those roots have no address
    /// there. Out-of-range roots are `None` on every layout.
    pub fn root_offset(&self, root: usize) -> Option<usize> {
        if root >= self.num_roots() {
            return None;
        }
        match self.encoded {
            Encoded::Breadth(_) => Some(root * breadth::STRIDE),
            Encoded::Narrow(_) => Some(root * narrow::STRIDE),
            Encoded::Preorder(_) => (root == 0).then_some(0),
        }
    }

    /// Leaf value for `features`, starting at root 0.
    #[inline]
    pub fn leaf_value<F: FVec>(&self, features: &F) -> f32 {
        self.leaf_value_from(features, 0)
    }

    /// Leaf value for `features`, starting at `start`.
    #[inline]
    pub fn leaf_value_from<F: FVec>(&self, features: &F, start: usize) -> f32 {
        match &self.encoded {
            Encoded::Breadth(tree) => tree.leaf_value(features, start),
            Encoded::Preorder(tree) => tree.leaf_value(features, start),
            Encoded::Narrow(tree) => tree.leaf_value(features, start),
        }
    }

    /// Word address of the leaf reached for `features`, starting at root 0.
    #[inline]
    pub fn leaf_index<F: FVec>(&self, features: &F) -> usize {
        self.leaf_index_from(features, 0)
    }

    /// Word address of the leaf reached for `features`, starting at `start`.
    #[inline]
    pub fn leaf_index_from<F: FVec>(&self, features: &F, start: usize) -> usize {
        match &self.encoded {
            Encoded::Breadth(tree) => tree.leaf_index(features, start),
            Encoded::Preorder(tree) => tree.leaf_index(features, start),
            Encoded::Narrow(tree) => tree.leaf_index(features, start),
        }
    }

    /// Leaf values for a batch of rows, evaluated in parallel from root 0.
    ///
    /// Each row is an independent pure read of the shared encoding, so rows
    /// split across the rayon pool without synchronization.
    pub fn leaf_values<F: FVec + Sync>(&self, rows: &[F]) -> Vec<f32> {
        rows.par_iter().map(|row| self.leaf_value(row)).collect()
    }
}
