//! Decoding of the solver's packed `job` code.
//!
//! `job` is a five-digit integer; digit 1 is the rightmost. Only the digits
//! the bridge and its callers act on get named accessors:
//!
//! | digit | meaning                                        |
//! |-------|------------------------------------------------|
//! | 1     | 0 explicit ODR, 1 implicit ODR, 2 OLS          |
//! | 2     | > 1 means user-supplied jacobians              |
//! | 4     | > 0 means `delta` holds user initial values    |
//! | 5     | > 0 means restart from a previous `work`       |
//!
//! A negative code asks the solver for all defaults and decodes as `0`.

use std::ffi::c_int;

/// Packed `job` code, passed to the solver by address.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Job(c_int);

impl Job {
    pub const fn new(code: c_int) -> Self {
        Job(code)
    }

    pub const fn code(self) -> c_int {
        self.0
    }

    pub(crate) fn as_raw(&self) -> &c_int {
        &self.0
    }

    /// The `position`-th digit from the right (1-based).
    pub fn digit(self, position: u32) -> c_int {
        let code = self.0.max(0);
        match 10_i32.checked_pow(position.saturating_sub(1)) {
            Some(scale) => (code / scale) % 10,
            None => 0,
        }
    }

    /// Orthogonal distance regression (explicit or implicit), not OLS.
    pub fn is_odr(self) -> bool {
        self.digit(1) < 2
    }

    pub fn is_implicit(self) -> bool {
        self.digit(1) == 1
    }

    pub fn user_jacobians(self) -> bool {
        self.digit(2) > 1
    }

    pub fn has_delta0(self) -> bool {
        self.digit(4) > 0
    }

    pub fn is_restart(self) -> bool {
        self.digit(5) > 0
    }
}

impl From<c_int> for Job {
    fn from(code: c_int) -> Self {
        Job(code)
    }
}
