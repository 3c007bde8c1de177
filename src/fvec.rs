//! Feature vector types consumed by tree traversal.
//!
//! A feature vector is a read-only mapping from feature index to a value, or
//! "missing" when the row has no value at that index. Missing values steer
//! traversal down a node's stored default direction instead of comparing
//! against the threshold.
//!
//! Values are held as `f32` so that comparisons against the stored 32-bit
//! thresholds are bit-exact; the `f64` constructor narrows up front.

use std::collections::HashMap;

/// Read-only lookup from feature index to a value or "missing".
///
/// Implementations decide what counts as missing (absent key, out-of-range
/// index, or a configured sentinel). A `Some(NaN)` is a legal value, not
/// missing: traversal does not special-case it, so it compares false under
/// `<` and falls to the else branch.
pub trait FVec {
    /// Value at `index`, or `None` if the feature is missing.
    fn fvalue(&self, index: usize) -> Option<f32>;
}

impl<F: FVec> FVec for &F {
    #[inline]
    fn fvalue(&self, index: usize) -> Option<f32> {
        (**self).fvalue(index)
    }
}

/// Dense array-backed feature vector.
///
/// Indices past the end of the array are missing. With `zero_as_missing`, a
/// stored `0.0` is reported as missing too; this matches rows densified from
/// sparse data where zero means "not present". A stored NaN is a value like
/// any other and falls to the else branch at every split it meets.
#[derive(Debug, Clone)]
pub struct DenseFVec {
    values: Box<[f32]>,
    zero_as_missing: bool,
}

impl DenseFVec {
    /// Build from `f32` values.
    pub fn from_f32(values: &[f32], zero_as_missing: bool) -> Self {
        Self {
            values: values.into(),
            zero_as_missing,
        }
    }

    /// Build from `f64` values, narrowing to the tree's working precision.
    pub fn from_f64(values: &[f64], zero_as_missing: bool) -> Self {
        Self {
            values: values.iter().map(|&v| v as f32).collect(),
            zero_as_missing,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector stores no values at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FVec for DenseFVec {
    #[inline]
    fn fvalue(&self, index: usize) -> Option<f32> {
        let value = *self.values.get(index)?;
        if self.zero_as_missing && value == 0.0 {
            return None;
        }
        Some(value)
    }
}

/// Sparse map-backed feature vector. Absent keys are missing.
#[derive(Debug, Clone, Default)]
pub struct SparseFVec {
    values: HashMap<usize, f32>,
}

impl SparseFVec {
    /// Build from `(index, value)` pairs.
    pub fn from_pairs<I: IntoIterator<Item = (usize, f32)>>(pairs: I) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }
}

impl FVec for SparseFVec {
    #[inline]
    fn fvalue(&self, index: usize) -> Option<f32> {
        self.values.get(&index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_lookup() {
        let fvec = DenseFVec::from_f32(&[1.0, 2.5], false);
        assert_eq!(fvec.fvalue(0), Some(1.0));
        assert_eq!(fvec.fvalue(1), Some(2.5));
    }

    #[test]
    fn dense_out_of_range_is_missing() {
        let fvec = DenseFVec::from_f32(&[1.0], false);
        assert_eq!(fvec.fvalue(1), None);
        assert_eq!(fvec.fvalue(100), None);
    }

    #[test]
    fn dense_nan_is_a_value_not_missing() {
        let fvec = DenseFVec::from_f32(&[f32::NAN], false);
        assert!(fvec.fvalue(0).is_some_and(f32::is_nan));

        // Even with the zero sentinel active, NaN stays a value.
        let fvec = DenseFVec::from_f32(&[f32::NAN], true);
        assert!(fvec.fvalue(0).is_some_and(f32::is_nan));
    }

    #[test]
    fn dense_zero_policy() {
        let fvec = DenseFVec::from_f32(&[0.0, 1.0], false);
        assert_eq!(fvec.fvalue(0), Some(0.0));

        let fvec = DenseFVec::from_f32(&[0.0, 1.0], true);
        assert_eq!(fvec.fvalue(0), None);
        assert_eq!(fvec.fvalue(1), Some(1.0));
    }

    #[test]
    fn dense_from_f64_narrows() {
        let fvec = DenseFVec::from_f64(&[0.1f64], false);
        assert_eq!(fvec.fvalue(0), Some(0.1f64 as f32));
    }

    #[test]
    fn sparse_lookup() {
        let fvec = SparseFVec::from_pairs([(3, 1.5), (7, -2.0)]);
        assert_eq!(fvec.fvalue(3), Some(1.5));
        assert_eq!(fvec.fvalue(7), Some(-2.0));
        assert_eq!(fvec.fvalue(0), None);
        assert_eq!(fvec.fvalue(4), None);
    }

    #[test]
    fn fvec_through_reference() {
        let fvec = DenseFVec::from_f32(&[1.0], false);
        let by_ref: &DenseFVec = &fvec;
        assert_eq!(by_ref.fvalue(0), Some(1.0));
    }
}
