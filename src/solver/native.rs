//! Linked ODRPACK95 backend.
//!
//! Declares the C binding of `libodrpack` and implements [`OdrSolver`] on
//! top of it. Enabled with the `native` feature; the library must be on the
//! linker search path.

use std::ffi::{c_char, c_double, c_int, CStr};

use super::{IworkIdx, OdrFcn, OdrSolver, RawCall, WorkIdx};

#[link(name = "odrpack")]
extern "C" {
    fn odr_long_c(
        fcn: OdrFcn, n: *const c_int, m: *const c_int, npar: *const c_int, nq: *const c_int,
        ldwe: *const c_int, ld2we: *const c_int, ldwd: *const c_int, ld2wd: *const c_int,
        ldifx: *const c_int, ldstpd: *const c_int, ldscld: *const c_int, lwork: *const c_int,
        liwork: *const c_int, beta: *mut c_double, y: *const c_double, x: *const c_double,
        we: *const c_double, wd: *const c_double, ifixb: *const c_int, ifixx: *const c_int,
        stpb: *const c_double, stpd: *const c_double, sclb: *const c_double,
        scld: *const c_double, delta: *mut c_double, lower: *const c_double,
        upper: *const c_double, work: *mut c_double, iwork: *mut c_int, job: *const c_int,
        ndigit: *const c_int, taufac: *const c_double, sstol: *const c_double,
        partol: *const c_double, maxit: *const c_int, iprint: *const c_int,
        lunerr: *const c_int, lunrpt: *const c_int, info: *mut c_int,
    );

    fn open_file(filename: *const c_char, lun: *mut c_int, ierr: *mut c_int);

    fn close_file(lun: *const c_int, ierr: *mut c_int);

    fn workspace_dimensions_c(
        n: *const c_int, m: *const c_int, npar: *const c_int, nq: *const c_int,
        isodr: *const bool, lwork: *mut c_int, liwork: *mut c_int,
    );

    fn diwinf_c(m: *const c_int, npar: *const c_int, nq: *const c_int, iworkidx: *mut IworkIdx);

    fn dwinf_c(
        n: *const c_int, m: *const c_int, npar: *const c_int, nq: *const c_int,
        ldwe: *const c_int, ld2we: *const c_int, isodr: *const bool, workidx: *mut WorkIdx,
    );
}

/// The ODRPACK95 library linked into this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSolver;

impl OdrSolver for NativeSolver {
    unsafe fn odr(&self, fcn: OdrFcn, call: &mut RawCall<'_>) -> c_int {
        let mut info: c_int = -1;
        odr_long_c(
            fcn, &call.n, &call.m, &call.npar, &call.nq, &call.ldwe, &call.ld2we, &call.ldwd,
            &call.ld2wd, &call.ldifx, &call.ldstpd, &call.ldscld, &call.lwork, &call.liwork,
            call.beta, call.y, call.x, call.we, call.wd, call.ifixb, call.ifixx, call.stpb,
            call.stpd, call.sclb, call.scld, call.delta, call.lower, call.upper, call.work,
            call.iwork, call.job, call.ndigit, call.taufac, call.sstol, call.partol, call.maxit,
            call.iprint, &call.lunerr, &call.lunrpt, &mut info,
        );
        info
    }

    fn open_file(&self, path: &CStr) -> Result<c_int, c_int> {
        let mut lun: c_int = 0;
        let mut ierr: c_int = 1;
        // SAFETY: `path` is NUL-terminated; both out-pointers are live locals.
        unsafe { open_file(path.as_ptr(), &mut lun, &mut ierr) };
        if ierr == 0 {
            Ok(lun)
        } else {
            Err(ierr)
        }
    }

    fn close_file(&self, unit: c_int) -> c_int {
        let mut ierr: c_int = 1;
        // SAFETY: both pointers reference live locals.
        unsafe { close_file(&unit, &mut ierr) };
        ierr
    }

    fn workspace_dimensions(
        &self, n: c_int, m: c_int, npar: c_int, nq: c_int, isodr: bool,
    ) -> (c_int, c_int) {
        let (mut lwork, mut liwork) = (0, 0);
        // SAFETY: all pointers reference live locals for the duration of the call.
        unsafe { workspace_dimensions_c(&n, &m, &npar, &nq, &isodr, &mut lwork, &mut liwork) };
        (lwork, liwork)
    }

    fn diwinf(&self, m: c_int, npar: c_int, nq: c_int) -> IworkIdx {
        let mut idx = IworkIdx::default();
        // SAFETY: `IworkIdx` is `#[repr(C)]` and field-compatible with `iworkidx_t`.
        unsafe { diwinf_c(&m, &npar, &nq, &mut idx) };
        idx
    }

    fn dwinf(
        &self, n: c_int, m: c_int, npar: c_int, nq: c_int, ldwe: c_int, ld2we: c_int,
        isodr: bool,
    ) -> WorkIdx {
        let mut idx = WorkIdx::default();
        // SAFETY: `WorkIdx` is `#[repr(C)]` and field-compatible with `workidx_t`.
        unsafe { dwinf_c(&n, &m, &npar, &nq, &ldwe, &ld2we, &isodr, &mut idx) };
        idx
    }
}
