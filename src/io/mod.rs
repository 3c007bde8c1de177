//! Binary model I/O.

pub mod reader;

pub use reader::{ModelReader, ReadError};
