//! Model quantities the solver can request, and the `ideval` decoder.
//!
//! The solver packs its request into one integer: the ones digit asks for
//! the response, the tens digit for the jacobian with respect to `beta`, and
//! the hundreds digit for the jacobian with respect to `delta`.
//! [`QuantitySet::from_ideval`] turns that into a small flag set so the
//! dispatch logic never does digit arithmetic itself.

use std::ffi::c_int;

/// One model quantity the solver may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Model response `f(beta, x + delta)`.
    Response,
    /// Jacobian of the response with respect to `beta`.
    BetaJacobian,
    /// Jacobian of the response with respect to `delta`.
    DeltaJacobian,
}

impl Quantity {
    /// All quantities, in the order the bridge evaluates them.
    pub const ALL: [Quantity; 3] = [Quantity::Response, Quantity::BetaJacobian, Quantity::DeltaJacobian];

    /// Name of the solver output buffer receiving this quantity.
    pub fn name(self) -> &'static str {
        match self {
            Quantity::Response => "f",
            Quantity::BetaJacobian => "fjacb",
            Quantity::DeltaJacobian => "fjacd",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Quantity::Response => 0b001,
            Quantity::BetaJacobian => 0b010,
            Quantity::DeltaJacobian => 0b100,
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Response => write!(f, "the model response (f)"),
            Quantity::BetaJacobian => write!(f, "the jacobian wrt beta (fjacb)"),
            Quantity::DeltaJacobian => write!(f, "the jacobian wrt delta (fjacd)"),
        }
    }
}

/// Set of quantities requested by one callback invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuantitySet(u8);

impl QuantitySet {
    pub const EMPTY: QuantitySet = QuantitySet(0);

    /// Decode the solver's packed `ideval`.
    ///
    /// - `ideval % 10 > 0` → response
    /// - `(ideval / 10) % 10 != 0` → beta jacobian
    /// - `(ideval / 100) % 10 != 0` → delta jacobian
    pub fn from_ideval(ideval: c_int) -> Self {
        let mut set = QuantitySet::EMPTY;
        if ideval % 10 > 0 {
            set = set.with(Quantity::Response);
        }
        if (ideval / 10) % 10 != 0 {
            set = set.with(Quantity::BetaJacobian);
        }
        if (ideval / 100) % 10 != 0 {
            set = set.with(Quantity::DeltaJacobian);
        }
        set
    }

    #[must_use]
    pub fn with(self, q: Quantity) -> Self {
        QuantitySet(self.0 | q.bit())
    }

    pub fn contains(self, q: Quantity) -> bool {
        self.0 & q.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Requested quantities in evaluation order.
    pub fn iter(self) -> impl Iterator<Item = Quantity> {
        Quantity::ALL.into_iter().filter(move |q| self.contains(*q))
    }
}

impl FromIterator<Quantity> for QuantitySet {
    fn from_iter<I: IntoIterator<Item = Quantity>>(iter: I) -> Self {
        iter.into_iter().fold(QuantitySet::EMPTY, QuantitySet::with)
    }
}
