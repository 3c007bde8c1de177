//! covertree: cache-efficient inference for gradient-boosted decision trees.
//!
//! This crate loads single regression trees from the historical XGBoost binary
//! node format and evaluates them against feature vectors. It is inference
//! only: no training, no gradient computation, no model construction beyond
//! parsing.
//!
//! Trees are stored in one of three interchangeable compact encodings:
//!
//! - [`BreadthTree`]: breadth-first node order with absolute child addresses,
//!   the direct image of the on-disk layout.
//! - [`PreorderTree`]: depth-first, coverage-ordered repacking where the
//!   higher-coverage child of every split sits in the adjacent memory slot.
//!   The common path through the tree becomes a sequential walk, which is the
//!   whole point of this crate.
//! - [`NarrowTree`]: four words per node with both child ids packed into a
//!   single word, limited to 65535 nodes per tree.
//!
//! All encodings are immutable after construction and safe to evaluate from
//! any number of threads.
//!
//! # Example
//!
//! ```
//! use covertree::{DenseFVec, Layout, NodeTableBuilder, RegTree};
//!
//! // root: feature 0 < 0.5, default left; leaves -1.0 / 1.0
//! let mut builder = NodeTableBuilder::new();
//! builder.add_split(0, 0.5, true, 1, 2, 10.0);
//! builder.add_leaf(-1.0, 6.0);
//! builder.add_leaf(1.0, 4.0);
//! let table = builder.build();
//!
//! let tree = RegTree::from_table(&table, Layout::Preorder).unwrap();
//!
//! let row = DenseFVec::from_f32(&[0.2], false);
//! assert_eq!(tree.leaf_value(&row), -1.0);
//!
//! let row = DenseFVec::from_f32(&[0.7], false);
//! assert_eq!(tree.leaf_value(&row), 1.0);
//!
//! // feature 0 missing: follow the default direction
//! let row = DenseFVec::from_f32(&[], false);
//! assert_eq!(tree.leaf_value(&row), -1.0);
//! ```

pub mod fvec;
pub mod io;
pub mod testing;
pub mod trees;

pub use fvec::{DenseFVec, FVec, SparseFVec};
pub use io::{ModelReader, ReadError};
pub use trees::{
    BreadthTree, DecodeError, Layout, NarrowTree, NodeTable, NodeTableBuilder, PreorderTree,
    RegTree, TreeParams, TreeWalk,
};
