//! Primitive reader over a binary model stream.
//!
//! The historical tree format stores all integers and floats little-endian.
//! This reader yields exactly the primitives the tree decoder consumes:
//! `int32`, `uint32`, `float32`, and fixed-length `int32` arrays.

use std::io::{ErrorKind, Read};

use thiserror::Error;

/// Errors raised while pulling primitives off a model stream.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The stream ended before the declared contents were read.
    #[error("model stream truncated while reading {needed} bytes")]
    Truncated {
        /// Size of the read that could not be completed.
        needed: usize,
    },

    /// Underlying I/O failure other than end-of-stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reader yielding primitive values from a binary model stream.
#[derive(Debug)]
pub struct ModelReader<R> {
    inner: R,
}

impl<R: Read> ModelReader<R> {
    /// Wrap a byte source.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consume the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        self.inner.read_exact(buf).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                ReadError::Truncated { needed: buf.len() }
            } else {
                ReadError::Io(err)
            }
        })
    }

    /// Read a little-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a little-endian `f32`.
    pub fn read_f32(&mut self) -> Result<f32, ReadError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Read `len` little-endian `i32` values.
    pub fn read_i32_array(&mut self, len: usize) -> Result<Vec<i32>, ReadError> {
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_i32()?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> ModelReader<&[u8]> {
        ModelReader::new(bytes)
    }

    #[test]
    fn reads_i32_le() {
        let mut r = reader(&[0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(r.read_i32().unwrap(), 1);
        assert_eq!(r.read_i32().unwrap(), -1);
    }

    #[test]
    fn reads_u32_le() {
        let mut r = reader(&[0xff, 0xff, 0xff, 0xff]);
        assert_eq!(r.read_u32().unwrap(), u32::MAX);
    }

    #[test]
    fn reads_f32_bits() {
        let bytes = 0.5f32.to_le_bytes();
        let mut r = reader(&bytes);
        assert_eq!(r.read_f32().unwrap().to_bits(), 0.5f32.to_bits());
    }

    #[test]
    fn reads_i32_array() {
        let mut bytes = Vec::new();
        for v in [3i32, -7, 0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let mut r = reader(&bytes);
        assert_eq!(r.read_i32_array(3).unwrap(), vec![3, -7, 0]);
    }

    #[test]
    fn short_read_is_truncated() {
        let mut r = reader(&[0x01, 0x02]);
        match r.read_i32() {
            Err(ReadError::Truncated { needed: 4 }) => {}
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn truncated_mid_array() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&[0x01]);
        let mut r = reader(&bytes);
        assert!(matches!(
            r.read_i32_array(2),
            Err(ReadError::Truncated { .. })
        ));
    }
}
