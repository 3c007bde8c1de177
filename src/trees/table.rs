//! Raw node table: the decoded breadth-first form of one tree.
//!
//! The model stream stores a tree header, then every node's structural record
//! in breadth-first id order, then every node's statistics record in the same
//! order. The table keeps all of it, including fields traversal never reads
//! (parent pointers, loss change, base weight): the statistics drive the
//! coverage-ordered repacking, and the rest is retained for fidelity with the
//! on-disk format.
//!
//! The table is an intermediate form. Once a compact encoding is built from
//! it, the table is normally dropped.

use std::io::Read;

use crate::io::ModelReader;

use super::words::SplitIndex;
use super::DecodeError;

/// Number of reserved header words.
pub const RESERVED_WORDS: usize = 31;

/// Sentinel child id marking a leaf.
const NO_CHILD: i32 = -1;

/// Tree-level metadata, read ahead of the node records.
#[derive(Debug, Clone)]
pub struct TreeParams {
    /// Number of start roots (historically always 1).
    pub num_roots: i32,
    /// Total number of nodes, including deleted ones.
    pub num_nodes: i32,
    /// Number of deleted (unreachable) nodes.
    pub num_deleted: i32,
    /// Maximum depth statistic.
    pub max_depth: i32,
    /// Number of features used for construction.
    pub num_features: i32,
    /// Leaf vector size, used for vector trees.
    pub leaf_vector_size: i32,
    /// Reserved block carried through unread.
    pub reserved: [i32; RESERVED_WORDS],
}

impl TreeParams {
    /// Read and validate the tree header.
    pub fn read<R: Read>(reader: &mut ModelReader<R>) -> Result<Self, DecodeError> {
        let num_roots = reader.read_i32()?;
        let num_nodes = reader.read_i32()?;
        let num_deleted = reader.read_i32()?;
        let max_depth = reader.read_i32()?;
        let num_features = reader.read_i32()?;
        let leaf_vector_size = reader.read_i32()?;
        let reserved: [i32; RESERVED_WORDS] = reader
            .read_i32_array(RESERVED_WORDS)?
            .try_into()
            .expect("fixed-length read");

        let checks = [
            ("num_roots", num_roots, 1),
            ("num_nodes", num_nodes, 1),
            ("num_deleted", num_deleted, 0),
            ("max_depth", max_depth, 0),
            ("num_features", num_features, 0),
            ("leaf_vector_size", leaf_vector_size, 0),
        ];
        for (field, value, min) in checks {
            if value < min {
                return Err(DecodeError::MalformedHeader { field, value });
            }
        }

        Ok(Self {
            num_roots,
            num_nodes,
            num_deleted,
            max_depth,
            num_features,
            leaf_vector_size,
            reserved,
        })
    }
}

/// One decoded node record.
///
/// Exactly one of `split_threshold` / `leaf_value` is defined; the other is
/// NaN. A node is a leaf iff `left == -1`.
#[derive(Debug, Clone, Copy)]
pub struct RawNode {
    /// Position in breadth-first order; 0 is the root.
    pub id: u32,
    /// Parent id. Unused at evaluation time, retained for fidelity.
    pub parent: i32,
    /// Left child id, or -1 for a leaf.
    pub left: i32,
    /// Right child id, or -1 for a leaf.
    pub right: i32,
    /// Packed split feature index and default direction.
    pub split: SplitIndex,
    /// Split threshold; NaN for leaves.
    pub split_threshold: f32,
    /// Leaf value; NaN for internal nodes.
    pub leaf_value: f32,
    /// Loss change caused by this split.
    pub loss_change: f32,
    /// Sum of hessian weight of training rows reaching this node. Drives the
    /// repacking order.
    pub coverage: f32,
    /// Weight of this node.
    pub base_weight: f32,
    /// Number of leaf children.
    pub leaf_child_count: i32,
}

impl RawNode {
    fn read<R: Read>(id: u32, reader: &mut ModelReader<R>) -> Result<Self, DecodeError> {
        let parent = reader.read_i32()?;
        let left = reader.read_i32()?;
        let right = reader.read_i32()?;
        let split = SplitIndex::from_bits(reader.read_u32()?);
        let value = reader.read_f32()?;

        let (split_threshold, leaf_value) = if left == NO_CHILD {
            (f32::NAN, value)
        } else {
            (value, f32::NAN)
        };

        Ok(Self {
            id,
            parent,
            left,
            right,
            split,
            split_threshold,
            leaf_value,
            loss_change: 0.0,
            coverage: 0.0,
            base_weight: 0.0,
            leaf_child_count: 0,
        })
    }

    fn read_stats<R: Read>(&mut self, reader: &mut ModelReader<R>) -> Result<(), DecodeError> {
        self.loss_change = reader.read_f32()?;
        self.coverage = reader.read_f32()?;
        self.base_weight = reader.read_f32()?;
        self.leaf_child_count = reader.read_i32()?;
        Ok(())
    }

    /// Whether this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left == NO_CHILD
    }

    /// Split feature index.
    #[inline]
    pub fn split_index(&self) -> u32 {
        self.split.feature_index()
    }

    /// Whether missing values branch left.
    #[inline]
    pub fn default_left(&self) -> bool {
        self.split.default_left()
    }

    /// IEEE-754 bits of the threshold (internal) or leaf value (leaf). This
    /// is the word every compact encoding stores at the node's first slot.
    #[inline]
    pub fn value_bits(&self) -> u32 {
        if self.is_leaf() {
            self.leaf_value.to_bits()
        } else {
            self.split_threshold.to_bits()
        }
    }
}

/// A decoded tree: header plus breadth-first node records.
#[derive(Debug, Clone)]
pub struct NodeTable {
    params: TreeParams,
    nodes: Vec<RawNode>,
}

impl NodeTable {
    /// Decode one tree off a model stream.
    ///
    /// Reads the header, every structural node record, then every statistics
    /// record, in the fixed on-disk order. Fails without exposing a partial
    /// table if the stream is short or the header is malformed.
    pub fn read<R: Read>(reader: &mut ModelReader<R>) -> Result<Self, DecodeError> {
        let params = TreeParams::read(reader)?;
        let num_nodes = params.num_nodes as usize;

        let mut nodes = Vec::with_capacity(num_nodes);
        for id in 0..num_nodes {
            nodes.push(RawNode::read(id as u32, reader)?);
        }
        for node in &mut nodes {
            node.read_stats(reader)?;
        }

        Ok(Self { params, nodes })
    }

    /// Build from already-decoded parts.
    pub fn from_parts(params: TreeParams, nodes: Vec<RawNode>) -> Self {
        debug_assert_eq!(params.num_nodes as usize, nodes.len());
        Self { params, nodes }
    }

    /// Tree-level metadata.
    #[inline]
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// All node records in breadth-first id order.
    #[inline]
    pub fn nodes(&self) -> &[RawNode] {
        &self.nodes
    }

    /// Record for one node id.
    #[inline]
    pub fn node(&self, id: usize) -> &RawNode {
        &self.nodes[id]
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the table has no nodes. Decoding never produces an empty
    /// table; this exists for completeness of the container API.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builder assembling a [`NodeTable`] node by node.
///
/// Nodes are appended in breadth-first id order; split nodes name their
/// children by the ids those later calls will receive. `build` derives the
/// header (parent links, depth, feature count) from the added nodes.
#[derive(Debug, Default)]
pub struct NodeTableBuilder {
    nodes: Vec<RawNode>,
}

impl NodeTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a split node. Returns its id.
    pub fn add_split(
        &mut self,
        feature_index: u32,
        threshold: f32,
        default_left: bool,
        left: u32,
        right: u32,
        coverage: f32,
    ) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(RawNode {
            id,
            parent: NO_CHILD,
            left: left as i32,
            right: right as i32,
            split: SplitIndex::new(feature_index, default_left),
            split_threshold: threshold,
            leaf_value: f32::NAN,
            loss_change: 0.0,
            coverage,
            base_weight: 0.0,
            leaf_child_count: 0,
        });
        id
    }

    /// Append a leaf node. Returns its id.
    pub fn add_leaf(&mut self, value: f32, coverage: f32) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(RawNode {
            id,
            parent: NO_CHILD,
            left: NO_CHILD,
            right: NO_CHILD,
            split: SplitIndex::new(0, false),
            split_threshold: f32::NAN,
            leaf_value: value,
            loss_change: 0.0,
            coverage,
            base_weight: 0.0,
            leaf_child_count: 0,
        });
        id
    }

    /// Number of nodes added so far (the id the next node will receive).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes have been added yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finish the table, deriving header metadata from the added nodes.
    ///
    /// # Panics
    ///
    /// Panics if no nodes were added or a split names a child id that was
    /// never added.
    pub fn build(self) -> NodeTable {
        let mut nodes = self.nodes;
        assert!(!nodes.is_empty(), "a tree needs at least a root leaf");

        // Parent links, derived rather than caller-supplied.
        let links: Vec<(u32, i32, i32)> = nodes
            .iter()
            .filter(|n| !n.is_leaf())
            .map(|n| (n.id, n.left, n.right))
            .collect();
        for (id, left, right) in links {
            nodes[left as usize].parent = id as i32;
            nodes[right as usize].parent = id as i32;
        }

        let num_features = nodes
            .iter()
            .filter(|n| !n.is_leaf())
            .map(|n| n.split_index() + 1)
            .max()
            .unwrap_or(0) as i32;

        // Depth of the tree rooted at node 0.
        let mut max_depth = 0i32;
        let mut stack = vec![(0usize, 0i32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = &nodes[id];
            if !node.is_leaf() {
                stack.push((node.left as usize, depth + 1));
                stack.push((node.right as usize, depth + 1));
            }
        }

        let params = TreeParams {
            num_roots: 1,
            num_nodes: nodes.len() as i32,
            num_deleted: 0,
            max_depth,
            num_features,
            leaf_vector_size: 0,
            reserved: [0; RESERVED_WORDS],
        };

        NodeTable::from_parts(params, nodes)
    }
}
