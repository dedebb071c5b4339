//! Write-back of model results into solver-owned output buffers.

use ndarray::ArrayD;

use crate::{
    bridge::quantity::Quantity,
    buffers::views::{contiguous, Extent},
    errors::OdrResult,
};

/// Copy `result` element by element into `dst`.
///
/// `dst.len()` is the count the solver expects for `quantity`: `nq * ldn`
/// for the response, `nq * ldnp * ldn` for the parameter jacobian and
/// `nq * ldm * ldn` for the error jacobian.
///
/// # Errors
/// - [`crate::errors::OdrError::NonContiguous`] if `result` is not in
///   standard layout.
/// - [`crate::errors::OdrError::Dimension`] if `result.len() != dst.len()`.
///
/// On error `dst` is left untouched.
pub fn write_quantity(quantity: Quantity, result: &ArrayD<f64>, dst: &mut [f64]) -> OdrResult<()> {
    let src = contiguous(quantity.name(), result.view(), Extent::Exactly(dst.len()))?;
    dst.copy_from_slice(src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OdrError;
    use ndarray::{Array2, IxDyn};

    #[test]
    // Purpose
    // -------
    // A correctly sized `(npar, n)` jacobian is copied in row-major order.
    //
    // Given
    // -----
    // - A 2×3 result and a 6-element destination.
    //
    // Expect
    // ------
    // - The destination equals the flattened result.
    fn write_quantity_copies_row_major() {
        // Arrange
        let result = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap()
            .into_dyn();
        let mut dst = [0.0; 6];

        // Act
        write_quantity(Quantity::BetaJacobian, &result, &mut dst).unwrap();

        // Assert
        assert_eq!(dst, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    // Purpose
    // -------
    // Short results are rejected and never partially copied.
    //
    // Given
    // -----
    // - A 3-element response and a 4-element destination pre-filled with -1.
    //
    // Expect
    // ------
    // - `Dimension { name: "f", expected: 4, found: 3 }`; destination unchanged.
    fn write_quantity_rejects_short_result_without_copying() {
        // Arrange
        let result = ArrayD::from_elem(IxDyn(&[3]), 9.0);
        let mut dst = [-1.0; 4];

        // Act
        let err = write_quantity(Quantity::Response, &result, &mut dst);

        // Assert
        assert!(matches!(
            err,
            Err(OdrError::Dimension { name: "f", expected: 4, found: 3 })
        ));
        assert_eq!(dst, [-1.0; 4]);
    }

    #[test]
    // Purpose
    // -------
    // Fortran-ordered results are rejected rather than copied in the wrong
    // element order.
    fn write_quantity_rejects_fortran_order_result() {
        // Arrange
        let result = Array2::<f64>::zeros((2, 3)).reversed_axes().into_dyn();
        let mut dst = [0.0; 6];

        // Act
        let err = write_quantity(Quantity::DeltaJacobian, &result, &mut dst);

        // Assert
        assert!(matches!(err, Err(OdrError::NonContiguous { name: "fjacd" })));
    }
}
