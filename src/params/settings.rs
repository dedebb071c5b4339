//! SolverSettings — optional scalar tuning parameters for one `odr` call.
//!
//! Purpose
//! -------
//! Carry `job`, `ndigit`, `taufac`, `sstol`, `partol`, `maxit` and `iprint`
//! as explicit `Option`s. Unset values reach the solver as null pointers and
//! take the solver's built-in defaults.
//!
//! Key behaviors
//! -------------
//! - Chained setters (`with_*`) store `Some(value)`; nothing is defaulted
//!   on this side of the boundary.
//! - [`SolverSettings::validate`] rejects non-finite floating-point
//!   tolerances before any native call.
//!
//! Invariants & assumptions
//! ------------------------
//! - Range checks (e.g. `0 < taufac <= 1`) are left to the solver, which
//!   reports them through `info`.
//!
//! Conventions
//! -----------
//! - Integer settings are C `int`s because the solver reads them by address.

use std::ffi::c_int;

use crate::{
    errors::{OdrError, OdrResult},
    params::job::Job,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolverSettings {
    pub job: Option<Job>,
    pub ndigit: Option<c_int>,
    pub taufac: Option<f64>,
    pub sstol: Option<f64>,
    pub partol: Option<f64>,
    pub maxit: Option<c_int>,
    pub iprint: Option<c_int>,
}

impl SolverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_job(mut self, job: impl Into<Job>) -> Self {
        self.job = Some(job.into());
        self
    }

    #[must_use]
    pub fn with_ndigit(mut self, ndigit: c_int) -> Self {
        self.ndigit = Some(ndigit);
        self
    }

    #[must_use]
    pub fn with_taufac(mut self, taufac: f64) -> Self {
        self.taufac = Some(taufac);
        self
    }

    #[must_use]
    pub fn with_sstol(mut self, sstol: f64) -> Self {
        self.sstol = Some(sstol);
        self
    }

    #[must_use]
    pub fn with_partol(mut self, partol: f64) -> Self {
        self.partol = Some(partol);
        self
    }

    #[must_use]
    pub fn with_maxit(mut self, maxit: c_int) -> Self {
        self.maxit = Some(maxit);
        self
    }

    #[must_use]
    pub fn with_iprint(mut self, iprint: c_int) -> Self {
        self.iprint = Some(iprint);
        self
    }

    /// The job code the solver will act on (`0` when unset).
    pub fn effective_job(&self) -> Job {
        self.job.unwrap_or_default()
    }

    /// Check that every present floating-point setting is finite.
    ///
    /// # Errors
    /// Returns [`OdrError::InvalidSetting`] naming the first offending field.
    pub fn validate(&self) -> OdrResult<()> {
        for (name, value) in [("taufac", self.taufac), ("sstol", self.sstol), ("partol", self.partol)] {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(OdrError::InvalidSetting {
                        name,
                        value,
                        reason: "Setting must be finite.",
                    });
                }
            }
        }
        Ok(())
    }
}
