//! Element-count arithmetic and C `int` narrowing.

use std::ffi::c_int;

use crate::errors::{OdrError, OdrResult};

/// Narrow a dimension or length to the solver's C `int`.
///
/// # Errors
/// Returns [`OdrError::TooLarge`] if `value > c_int::MAX`.
pub fn to_c_int(name: &'static str, value: usize) -> OdrResult<c_int> {
    c_int::try_from(value).map_err(|_| OdrError::TooLarge { name, value })
}

/// Product of `dims`, checked for overflow.
///
/// # Errors
/// Returns [`OdrError::TooLarge`] if the product overflows `usize`.
pub fn element_count(name: &'static str, dims: &[usize]) -> OdrResult<usize> {
    dims.iter().try_fold(1usize, |acc, &d| {
        acc.checked_mul(d).ok_or(OdrError::TooLarge { name, value: usize::MAX })
    })
}

/// Widen a solver-supplied `int` dimension, treating negatives as zero.
#[inline]
pub(crate) fn dim(value: c_int) -> usize {
    usize::try_from(value).unwrap_or(0)
}
