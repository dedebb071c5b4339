//! User model callables grouped per invocation.

use ndarray::{ArrayD, ArrayView1, ArrayViewD};

use crate::{
    bridge::quantity::{Quantity, QuantitySet},
    errors::ModelResult,
};

/// Signature shared by all model callables: `(beta, x + delta) -> array`.
///
/// `beta` has length `npar`. `x + delta` has shape `(n,)` when `m == 1` and
/// `(m, n)` otherwise. The returned array must be in standard layout with
/// the element count of the requested quantity: `nq * n` for the response,
/// `nq * npar * n` for the beta jacobian and `nq * m * n` for the delta
/// jacobian.
pub type ModelFn<'a> =
    dyn Fn(ArrayView1<'_, f64>, ArrayViewD<'_, f64>) -> ModelResult<ArrayD<f64>> + 'a;

/// ModelCallbackSet — up to three model callables for one `odr` call.
///
/// Purpose
/// -------
/// Hold the response function and the optional analytic jacobians the
/// solver may request while it runs.
///
/// Key behaviors
/// -------------
/// - Built with chained setters; any slot may stay empty.
/// - [`ModelCallbackSet::get`] returns the callable for a quantity, or
///   `None` when the slot is empty.
///
/// Notes
/// -----
/// - Jacobian callables are only requested when the job code asks for
///   user-supplied derivatives. An implicit model (job digit 1 == 1) still
///   needs a response callable.
#[derive(Default)]
pub struct ModelCallbackSet<'a> {
    response: Option<Box<ModelFn<'a>>>,
    beta_jacobian: Option<Box<ModelFn<'a>>>,
    delta_jacobian: Option<Box<ModelFn<'a>>>,
}

impl<'a> ModelCallbackSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn response<F>(mut self, f: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>, ArrayViewD<'_, f64>) -> ModelResult<ArrayD<f64>> + 'a,
    {
        self.response = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn beta_jacobian<F>(mut self, f: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>, ArrayViewD<'_, f64>) -> ModelResult<ArrayD<f64>> + 'a,
    {
        self.beta_jacobian = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn delta_jacobian<F>(mut self, f: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>, ArrayViewD<'_, f64>) -> ModelResult<ArrayD<f64>> + 'a,
    {
        self.delta_jacobian = Some(Box::new(f));
        self
    }

    pub fn get(&self, quantity: Quantity) -> Option<&ModelFn<'a>> {
        match quantity {
            Quantity::Response => self.response.as_deref(),
            Quantity::BetaJacobian => self.beta_jacobian.as_deref(),
            Quantity::DeltaJacobian => self.delta_jacobian.as_deref(),
        }
    }

    /// Quantities with a callable installed.
    pub fn installed(&self) -> QuantitySet {
        Quantity::ALL.into_iter().filter(|q| self.get(*q).is_some()).collect()
    }
}

impl std::fmt::Debug for ModelCallbackSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCallbackSet")
            .field("response", &self.response.is_some())
            .field("beta_jacobian", &self.beta_jacobian.is_some())
            .field("delta_jacobian", &self.delta_jacobian.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};

    #[test]
    // Purpose
    // -------
    // Setters fill only their own slot and `installed` reports exactly those.
    //
    // Given
    // -----
    // - A set with a response and a delta jacobian but no beta jacobian.
    //
    // Expect
    // ------
    // - `get(BetaJacobian)` is `None`; `installed` contains the other two.
    fn setters_fill_only_their_slot() {
        // Arrange
        let set = ModelCallbackSet::new()
            .response(|beta, _x| Ok(beta.to_owned().into_dyn()))
            .delta_jacobian(|_beta, x| Ok(x.to_owned()));

        // Act
        let installed = set.installed();

        // Assert
        assert!(set.get(Quantity::BetaJacobian).is_none());
        assert!(installed.contains(Quantity::Response));
        assert!(installed.contains(Quantity::DeltaJacobian));
        assert!(!installed.contains(Quantity::BetaJacobian));
    }

    #[test]
    // Purpose
    // -------
    // Stored callables are invoked with the views they are given.
    fn get_returns_callable_that_sees_its_inputs() {
        // Arrange
        let set = ModelCallbackSet::new().response(|beta, x| {
            let scale = beta[0];
            Ok(x.mapv(|v| v * scale))
        });
        let beta = array![2.0];
        let x = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0, 2.0, 3.0]).unwrap();

        // Act
        let f = set.get(Quantity::Response).unwrap();
        let out = f(beta.view(), x.view()).unwrap();

        // Assert
        assert_eq!(out.as_slice().unwrap(), &[2.0, 4.0, 6.0]);
    }
}
