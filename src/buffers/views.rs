//! Borrowing arrays as flat buffers, and wrapping solver pointers as views.
//!
//! Outbound (caller → solver): [`contiguous`] and [`contiguous_mut`] check
//! that a view is C-contiguous and holds the element count the solver will
//! read, then hand back the underlying slice with the view's own lifetime.
//!
//! Inbound (solver → model): [`beta_view`] and [`xplusd_view`] wrap the raw
//! callback pointers. `x + delta` is stored by the solver as `m` columns of
//! leading dimension `ldn`; a univariate problem (`m == 1`) is exposed as a
//! 1-D view of length `n`, otherwise as an `(m, n)` view.

use ndarray::{ArrayView, ArrayView1, ArrayViewD, ArrayViewMut, Dimension, IxDyn, ShapeBuilder};

use crate::errors::{OdrError, OdrResult};

/// Required size of a buffer crossing the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// Exactly this many elements.
    Exactly(usize),
    /// Any positive number of elements (work arrays; length is forwarded).
    NonEmpty,
}

impl Extent {
    fn check(self, name: &'static str, found: usize) -> OdrResult<()> {
        match self {
            Extent::Exactly(expected) if expected != found => {
                Err(OdrError::Dimension { name, expected, found })
            }
            Extent::NonEmpty if found == 0 => Err(OdrError::Dimension { name, expected: 1, found }),
            _ => Ok(()),
        }
    }
}

/// Borrow `view` as a flat, row-major slice.
///
/// # Errors
/// - [`OdrError::NonContiguous`] if the view is not in standard layout.
/// - [`OdrError::Dimension`] if its length violates `extent`.
pub fn contiguous<'a, T, D: Dimension>(
    name: &'static str, view: ArrayView<'a, T, D>, extent: Extent,
) -> OdrResult<&'a [T]> {
    let slice = view.to_slice().ok_or(OdrError::NonContiguous { name })?;
    extent.check(name, slice.len())?;
    Ok(slice)
}

/// Mutable counterpart of [`contiguous`].
///
/// # Errors
/// Same as [`contiguous`].
pub fn contiguous_mut<'a, T, D: Dimension>(
    name: &'static str, view: ArrayViewMut<'a, T, D>, extent: Extent,
) -> OdrResult<&'a mut [T]> {
    let slice = view.into_slice().ok_or(OdrError::NonContiguous { name })?;
    extent.check(name, slice.len())?;
    Ok(slice)
}

/// Wrap the solver's current parameter vector.
///
/// # Safety
/// `ptr` must be valid for `npar` reads for `'a` and not mutated meanwhile.
pub(crate) unsafe fn beta_view<'a>(ptr: *const f64, npar: usize) -> ArrayView1<'a, f64> {
    ArrayView1::from_shape_ptr(npar, ptr)
}

/// Wrap the solver's current `x + delta` buffer.
///
/// # Safety
/// `ptr` must be valid for `ldn * m` reads for `'a`, `n <= ldn`, and the
/// memory must not be mutated meanwhile.
pub(crate) unsafe fn xplusd_view<'a>(
    ptr: *const f64, n: usize, m: usize, ldn: usize,
) -> ArrayViewD<'a, f64> {
    if m == 1 {
        ArrayViewD::from_shape_ptr(IxDyn(&[n]), ptr)
    } else {
        ArrayViewD::from_shape_ptr(IxDyn(&[m, n]).strides(IxDyn(&[ldn, 1])), ptr)
    }
}
