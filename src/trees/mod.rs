//! Tree decoding, compact encodings, and traversal.
//!
//! A tree moves through three representations:
//!
//! 1. [`NodeTable`] — the decoded breadth-first node records straight off the
//!    model stream, including per-node training statistics.
//! 2. A compact encoding — [`BreadthTree`], [`PreorderTree`], or
//!    [`NarrowTree`] — a flat `u32` word array addressed by word offset.
//! 3. [`RegTree`] — a loaded tree with its layout chosen at load time,
//!    exposing leaf lookup to callers.

pub mod breadth;
pub mod narrow;
pub mod preorder;
pub mod table;
pub mod traversal;
pub mod words;

pub use breadth::BreadthTree;
pub use narrow::NarrowTree;
pub use preorder::PreorderTree;
pub use table::{NodeTable, NodeTableBuilder, RawNode, TreeParams, RESERVED_WORDS};
pub use traversal::{Layout, RegTree, TreeWalk};

use crate::io::ReadError;

/// Errors raised while decoding a tree or building a compact encoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream ended before the declared node records were read.
    #[error("truncated tree stream: {0}")]
    Truncated(#[from] ReadError),

    /// A header field holds a negative or implausible count.
    #[error("malformed tree header: {field} = {value}")]
    MalformedHeader {
        /// Name of the offending header field.
        field: &'static str,
        /// Declared value.
        value: i32,
    },

    /// A child id does not fit the 16-bit addressing of [`NarrowTree`].
    #[error("tree too wide for 16-bit child addressing: node {node} references child {child}")]
    TreeTooWide {
        /// Breadth-first id of the split node.
        node: usize,
        /// The child id that overflowed.
        child: i32,
    },
}
