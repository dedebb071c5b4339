//! OdrProblem — every buffer and scalar for one solver invocation.
//!
//! Purpose
//! -------
//! Bundle borrowed model buffers, optional weighting/scaling/bound arrays,
//! optional work arrays, scalar settings and diagnostic file paths into one
//! value consumed by [`crate::odr::run::odr`].
//!
//! Key behaviors
//! -------------
//! - Required buffers (`beta`, `y`, `x`, `delta`) are supplied to
//!   [`OdrProblem::new`] together with [`ProblemDims`].
//! - Each optional array has a `with_*` setter. Arrays whose storage is
//!   described by leading dimensions (`we`, `wd`, `ifixx`, `stpd`, `scld`)
//!   take those dimensions in the same call.
//! - `beta`, `delta`, `work` and `iwork` are mutable views; the solver
//!   updates them in place.
//!
//! Invariants & assumptions
//! ------------------------
//! - Dimensions and leading dimensions are the caller's declaration. The
//!   bridge checks each buffer against them but never infers them.
//! - Array storage follows the solver's layout read in row-major order:
//!   `y` is `(nq, n)`, `x` and `delta` are `(m, n)`, `we` is
//!   `(nq, ld2we, ldwe)` and `wd` is `(m, ld2wd, ldwd)`.
//!
//! Downstream usage
//! ----------------
//! - Higher-level fitting APIs derive dimensions from array shapes, allocate
//!   `delta` and work arrays, and then build an `OdrProblem`.

use std::ffi::c_int;

use ndarray::{ArrayView1, ArrayViewD, ArrayViewMut1, ArrayViewMutD};

use crate::{params::settings::SolverSettings, streams::StreamConfig};

/// Problem size: observations, input columns, parameters, responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemDims {
    pub n: usize,
    pub m: usize,
    pub npar: usize,
    pub nq: usize,
}

impl ProblemDims {
    pub fn new(n: usize, m: usize, npar: usize, nq: usize) -> Self {
        ProblemDims { n, m, npar, nq }
    }
}

/// Leading dimensions of the optional arrays. All default to `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadingDims {
    pub ldwe: usize,
    pub ld2we: usize,
    pub ldwd: usize,
    pub ld2wd: usize,
    pub ldifx: usize,
    pub ldstpd: usize,
    pub ldscld: usize,
}

impl Default for LeadingDims {
    fn default() -> Self {
        LeadingDims { ldwe: 1, ld2we: 1, ldwd: 1, ld2wd: 1, ldifx: 1, ldstpd: 1, ldscld: 1 }
    }
}

#[derive(Debug)]
pub struct OdrProblem<'a> {
    pub dims: ProblemDims,
    pub leading: LeadingDims,

    pub beta: ArrayViewMut1<'a, f64>,
    pub y: ArrayViewD<'a, f64>,
    pub x: ArrayViewD<'a, f64>,
    pub delta: ArrayViewMutD<'a, f64>,

    pub we: Option<ArrayViewD<'a, f64>>,
    pub wd: Option<ArrayViewD<'a, f64>>,
    pub ifixb: Option<ArrayView1<'a, c_int>>,
    pub ifixx: Option<ArrayViewD<'a, c_int>>,
    pub stpb: Option<ArrayView1<'a, f64>>,
    pub stpd: Option<ArrayViewD<'a, f64>>,
    pub sclb: Option<ArrayView1<'a, f64>>,
    pub scld: Option<ArrayViewD<'a, f64>>,
    pub lower: Option<ArrayView1<'a, f64>>,
    pub upper: Option<ArrayView1<'a, f64>>,

    pub work: Option<ArrayViewMut1<'a, f64>>,
    pub iwork: Option<ArrayViewMut1<'a, c_int>>,

    pub settings: SolverSettings,
    pub streams: StreamConfig,
}

impl<'a> OdrProblem<'a> {
    pub fn new(
        dims: ProblemDims, beta: ArrayViewMut1<'a, f64>, y: ArrayViewD<'a, f64>,
        x: ArrayViewD<'a, f64>, delta: ArrayViewMutD<'a, f64>,
    ) -> Self {
        OdrProblem {
            dims,
            leading: LeadingDims::default(),
            beta,
            y,
            x,
            delta,
            we: None,
            wd: None,
            ifixb: None,
            ifixx: None,
            stpb: None,
            stpd: None,
            sclb: None,
            scld: None,
            lower: None,
            upper: None,
            work: None,
            iwork: None,
            settings: SolverSettings::default(),
            streams: StreamConfig::default(),
        }
    }

    #[must_use]
    pub fn with_we(mut self, we: ArrayViewD<'a, f64>, ldwe: usize, ld2we: usize) -> Self {
        self.we = Some(we);
        self.leading.ldwe = ldwe;
        self.leading.ld2we = ld2we;
        self
    }

    #[must_use]
    pub fn with_wd(mut self, wd: ArrayViewD<'a, f64>, ldwd: usize, ld2wd: usize) -> Self {
        self.wd = Some(wd);
        self.leading.ldwd = ldwd;
        self.leading.ld2wd = ld2wd;
        self
    }

    #[must_use]
    pub fn with_ifixb(mut self, ifixb: ArrayView1<'a, c_int>) -> Self {
        self.ifixb = Some(ifixb);
        self
    }

    #[must_use]
    pub fn with_ifixx(mut self, ifixx: ArrayViewD<'a, c_int>, ldifx: usize) -> Self {
        self.ifixx = Some(ifixx);
        self.leading.ldifx = ldifx;
        self
    }

    #[must_use]
    pub fn with_stpb(mut self, stpb: ArrayView1<'a, f64>) -> Self {
        self.stpb = Some(stpb);
        self
    }

    #[must_use]
    pub fn with_stpd(mut self, stpd: ArrayViewD<'a, f64>, ldstpd: usize) -> Self {
        self.stpd = Some(stpd);
        self.leading.ldstpd = ldstpd;
        self
    }

    #[must_use]
    pub fn with_sclb(mut self, sclb: ArrayView1<'a, f64>) -> Self {
        self.sclb = Some(sclb);
        self
    }

    #[must_use]
    pub fn with_scld(mut self, scld: ArrayViewD<'a, f64>, ldscld: usize) -> Self {
        self.scld = Some(scld);
        self.leading.ldscld = ldscld;
        self
    }

    #[must_use]
    pub fn with_bounds(
        mut self, lower: Option<ArrayView1<'a, f64>>, upper: Option<ArrayView1<'a, f64>>,
    ) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    #[must_use]
    pub fn with_work(mut self, work: ArrayViewMut1<'a, f64>, iwork: ArrayViewMut1<'a, c_int>) -> Self {
        self.work = Some(work);
        self.iwork = Some(iwork);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_streams(mut self, streams: StreamConfig) -> Self {
        self.streams = streams;
        self
    }
}
