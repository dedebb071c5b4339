//! solver — the raw ODRPACK95 interface consumed by the bridge.
//!
//! Purpose
//! -------
//! Describe the external solver as a trait ([`OdrSolver`]) over its six C
//! entry points, together with the ABI types those entry points exchange:
//! the fixed callback signature [`OdrFcn`], the pointer bundle [`RawCall`],
//! and the `#[repr(C)]` offset records [`IworkIdx`] and [`WorkIdx`].
//!
//! Key behaviors
//! -------------
//! - [`OdrSolver::odr`] is the single `unsafe` seam: it receives raw,
//!   possibly-null pointers and runs the solver to completion on the
//!   calling thread.
//! - The file and workspace queries are safe wrappers; implementors own the
//!   pointer plumbing for them.
//! - [`native::NativeSolver`] (feature `native`) links the real library.
//!   Tests provide scripted implementations of the same trait.
//!
//! Invariants & assumptions
//! ------------------------
//! - Field order of [`IworkIdx`] and [`WorkIdx`] matches the C structs
//!   `iworkidx_t` / `workidx_t` exactly (23 and 53 `int`s). `WorkIdx::apsma`
//!   is carried for layout only and is not one of the 52 named keys.
//! - Offsets reported by `diwinf` / `dwinf` are 0-based.
//! - A null pointer in [`RawCall`] means "argument absent"; the solver then
//!   applies its built-in default.

use std::{
    ffi::{c_double, c_int, CStr},
    marker::PhantomData,
};

#[cfg(feature = "native")]
pub mod native;

/// Fixed signature of the user-model callback invoked by the solver.
///
/// Arguments, in order: `n, m, npar, nq, ldn, ldm, ldnp, beta, xplusd,
/// ifixb, ifixx, ldifx, ideval, f, fjacb, fjacd, istop`.
pub type OdrFcn = unsafe extern "C" fn(
    n: *const c_int,
    m: *const c_int,
    npar: *const c_int,
    nq: *const c_int,
    ldn: *const c_int,
    ldm: *const c_int,
    ldnp: *const c_int,
    beta: *const c_double,
    xplusd: *const c_double,
    ifixb: *const c_int,
    ifixx: *const c_int,
    ldifx: *const c_int,
    ideval: *const c_int,
    f: *mut c_double,
    fjacb: *mut c_double,
    fjacd: *mut c_double,
    istop: *mut c_int,
);

/// OdrSolver — entry points of an ODRPACK95-compatible solver.
///
/// Purpose
/// -------
/// Abstract over the native library so the bridge can be driven by the real
/// solver or by any other backend honoring the same contract.
///
/// Notes
/// -----
/// - `open_file` returns the unit number on success and the solver's error
///   code on failure.
/// - `close_file` returns the solver's error code (`0` means success).
pub trait OdrSolver {
    /// Run the long-form ODR driver and return its `info` code.
    ///
    /// # Safety
    /// Every non-null pointer in `call` must be valid for the element count
    /// the solver derives from the dimensions in `call`, and `fcn` must be
    /// safe to invoke with the solver's arguments for the whole call.
    unsafe fn odr(&self, fcn: OdrFcn, call: &mut RawCall<'_>) -> c_int;

    fn open_file(&self, path: &CStr) -> Result<c_int, c_int>;

    fn close_file(&self, unit: c_int) -> c_int;

    /// Required `(lwork, liwork)` for a problem of the given size.
    fn workspace_dimensions(
        &self, n: c_int, m: c_int, npar: c_int, nq: c_int, isodr: bool,
    ) -> (c_int, c_int);

    fn diwinf(&self, m: c_int, npar: c_int, nq: c_int) -> IworkIdx;

    #[allow(clippy::too_many_arguments)]
    fn dwinf(
        &self, n: c_int, m: c_int, npar: c_int, nq: c_int, ldwe: c_int, ld2we: c_int,
        isodr: bool,
    ) -> WorkIdx;
}

/// RawCall — every argument of `odr_long_c` except the callback and `info`.
///
/// Built by [`crate::params::resolve`] from borrowed caller buffers; the
/// lifetime `'a` ties the pointers to those borrows.
#[derive(Debug)]
pub struct RawCall<'a> {
    pub n: c_int,
    pub m: c_int,
    pub npar: c_int,
    pub nq: c_int,
    pub ldwe: c_int,
    pub ld2we: c_int,
    pub ldwd: c_int,
    pub ld2wd: c_int,
    pub ldifx: c_int,
    pub ldstpd: c_int,
    pub ldscld: c_int,
    pub lwork: c_int,
    pub liwork: c_int,

    pub beta: *mut c_double,
    pub y: *const c_double,
    pub x: *const c_double,
    pub we: *const c_double,
    pub wd: *const c_double,
    pub ifixb: *const c_int,
    pub ifixx: *const c_int,
    pub stpb: *const c_double,
    pub stpd: *const c_double,
    pub sclb: *const c_double,
    pub scld: *const c_double,
    pub delta: *mut c_double,
    pub lower: *const c_double,
    pub upper: *const c_double,
    pub work: *mut c_double,
    pub iwork: *mut c_int,

    pub job: *const c_int,
    pub ndigit: *const c_int,
    pub taufac: *const c_double,
    pub sstol: *const c_double,
    pub partol: *const c_double,
    pub maxit: *const c_int,
    pub iprint: *const c_int,

    pub lunerr: c_int,
    pub lunrpt: c_int,

    pub(crate) _borrow: PhantomData<&'a mut ()>,
}

/// Offsets of the named regions of the integer workspace (`iworkidx_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IworkIdx {
    pub msgb: c_int,
    pub msgd: c_int,
    pub ifix2: c_int,
    pub istop: c_int,
    pub nnzw: c_int,
    pub npp: c_int,
    pub idf: c_int,
    pub job: c_int,
    pub iprin: c_int,
    pub luner: c_int,
    pub lunrp: c_int,
    pub nrow: c_int,
    pub ntol: c_int,
    pub neta: c_int,
    pub maxit: c_int,
    pub niter: c_int,
    pub nfev: c_int,
    pub njev: c_int,
    pub int2: c_int,
    pub irank: c_int,
    pub ldtt: c_int,
    pub bound: c_int,
    pub liwkmn: c_int,
}

impl IworkIdx {
    /// `(name, offset)` pairs in declaration order.
    pub fn fields(&self) -> [(&'static str, c_int); 23] {
        [
            ("msgb", self.msgb),
            ("msgd", self.msgd),
            ("ifix2", self.ifix2),
            ("istop", self.istop),
            ("nnzw", self.nnzw),
            ("npp", self.npp),
            ("idf", self.idf),
            ("job", self.job),
            ("iprin", self.iprin),
            ("luner", self.luner),
            ("lunrp", self.lunrp),
            ("nrow", self.nrow),
            ("ntol", self.ntol),
            ("neta", self.neta),
            ("maxit", self.maxit),
            ("niter", self.niter),
            ("nfev", self.nfev),
            ("njev", self.njev),
            ("int2", self.int2),
            ("irank", self.irank),
            ("ldtt", self.ldtt),
            ("bound", self.bound),
            ("liwkmn", self.liwkmn),
        ]
    }
}

/// Offsets of the named regions of the real workspace (`workidx_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkIdx {
    pub delta: c_int,
    pub eps: c_int,
    pub xplus: c_int,
    pub fn_: c_int,
    pub sd: c_int,
    pub vcv: c_int,
    pub rvar: c_int,
    pub wss: c_int,
    pub wssde: c_int,
    pub wssep: c_int,
    pub rcond: c_int,
    pub eta: c_int,
    pub olmav: c_int,
    pub tau: c_int,
    pub alpha: c_int,
    pub actrs: c_int,
    pub pnorm: c_int,
    pub rnors: c_int,
    pub prers: c_int,
    pub partl: c_int,
    pub sstol: c_int,
    pub taufc: c_int,
    /// Reserved scalar slot; not exposed as a layout key.
    pub apsma: c_int,
    pub epsma: c_int,
    pub beta0: c_int,
    pub betac: c_int,
    pub betas: c_int,
    pub betan: c_int,
    pub s: c_int,
    pub ss: c_int,
    pub ssf: c_int,
    pub qraux: c_int,
    pub u: c_int,
    pub fs: c_int,
    pub fjacb: c_int,
    pub we1: c_int,
    pub diff: c_int,
    pub delts: c_int,
    pub deltn: c_int,
    pub t: c_int,
    pub tt: c_int,
    pub omega: c_int,
    pub fjacd: c_int,
    pub wrk1: c_int,
    pub wrk2: c_int,
    pub wrk3: c_int,
    pub wrk4: c_int,
    pub wrk5: c_int,
    pub wrk6: c_int,
    pub wrk7: c_int,
    pub lower: c_int,
    pub upper: c_int,
    pub lwkmn: c_int,
}

impl WorkIdx {
    /// `(name, offset)` pairs in declaration order, with solver key names.
    pub fn fields(&self) -> [(&'static str, c_int); 52] {
        [
            ("delta", self.delta),
            ("eps", self.eps),
            ("xplus", self.xplus),
            ("fn", self.fn_),
            ("sd", self.sd),
            ("vcv", self.vcv),
            ("rvar", self.rvar),
            ("wss", self.wss),
            ("wssde", self.wssde),
            ("wssep", self.wssep),
            ("rcond", self.rcond),
            ("eta", self.eta),
            ("olmav", self.olmav),
            ("tau", self.tau),
            ("alpha", self.alpha),
            ("actrs", self.actrs),
            ("pnorm", self.pnorm),
            ("rnors", self.rnors),
            ("prers", self.prers),
            ("partl", self.partl),
            ("sstol", self.sstol),
            ("taufc", self.taufc),
            ("epsma", self.epsma),
            ("beta0", self.beta0),
            ("betac", self.betac),
            ("betas", self.betas),
            ("betan", self.betan),
            ("s", self.s),
            ("ss", self.ss),
            ("ssf", self.ssf),
            ("qraux", self.qraux),
            ("u", self.u),
            ("fs", self.fs),
            ("fjacb", self.fjacb),
            ("we1", self.we1),
            ("diff", self.diff),
            ("delts", self.delts),
            ("deltn", self.deltn),
            ("t", self.t),
            ("tt", self.tt),
            ("omega", self.omega),
            ("fjacd", self.fjacd),
            ("wrk1", self.wrk1),
            ("wrk2", self.wrk2),
            ("wrk3", self.wrk3),
            ("wrk4", self.wrk4),
            ("wrk5", self.wrk5),
            ("wrk6", self.wrk6),
            ("wrk7", self.wrk7),
            ("lower", self.lower),
            ("upper", self.upper),
            ("lwkmn", self.lwkmn),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    // Purpose
    // -------
    // The offset records have exactly the size of their C counterparts, so
    // `diwinf_c` / `dwinf_c` never write past them.
    fn offset_records_match_c_struct_sizes() {
        assert_eq!(size_of::<IworkIdx>(), 23 * size_of::<c_int>());
        assert_eq!(size_of::<WorkIdx>(), 53 * size_of::<c_int>());
    }

    #[test]
    // Purpose
    // -------
    // The reserved `apsma` slot sits between `taufc` and `epsma` but is not
    // a named key.
    fn reserved_slot_is_not_a_named_key() {
        let idx = WorkIdx { taufc: 21, apsma: 22, epsma: 23, ..WorkIdx::default() };
        let fields = idx.fields();

        assert_eq!(fields.len(), 52);
        assert!(fields.iter().all(|(name, _)| *name != "apsma"));
        assert!(fields.contains(&("taufc", 21)));
        assert!(fields.contains(&("epsma", 23)));
    }
}
