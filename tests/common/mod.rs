//! Shared fixtures for the integration tests.
//!
//! Purpose
//! -------
//! - Provide [`ScriptedSolver`], an in-process [`OdrSolver`] that calls the
//!   bridge's callback with a fixed sequence of `ideval` codes and records
//!   what it was handed (pointer null-ness, work lengths, unit numbers).
//! - Provide the reference workspace formulas of ODRPACK95 so layout
//!   queries can be checked without the native library.
//! - Serialize tests that run a full invocation: the invocation lock is
//!   process-wide, so parallel test threads would see each other.
#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    ffi::{c_int, CStr},
    sync::{Mutex, MutexGuard},
};

use ndarray::{Array1, ArrayD, IxDyn};
use odrpack_bridge::{
    bridge::{is_armed, InvocationLock},
    odr::{OdrProblem, ProblemDims},
    solver::{IworkIdx, OdrFcn, OdrSolver, RawCall, WorkIdx},
};

/// `info` reported when a callback asked the solver to stop.
pub const USER_STOP_INFO: c_int = 51000;

static SERIAL: Mutex<()> = Mutex::new(());

/// Hold for the duration of a test that runs `odr`.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// What the scripted solver saw during its last `odr` call.
#[derive(Debug, Default, Clone)]
pub struct Observed {
    pub istops: Vec<c_int>,
    pub responses: Vec<Vec<f64>>,
    pub fjacb: Vec<Vec<f64>>,
    pub fjacd: Vec<Vec<f64>>,
    pub job: Option<c_int>,
    pub maxit: Option<c_int>,
    pub sstol: Option<f64>,
    pub taufac: Option<f64>,
    pub null_optionals: Vec<&'static str>,
    pub work_null: bool,
    pub iwork_null: bool,
    pub lwork: c_int,
    pub liwork: c_int,
    pub lunrpt: c_int,
    pub lunerr: c_int,
    pub armed: bool,
    pub lock_held: bool,
}

/// In-process solver driven by a fixed `ideval` script.
pub struct ScriptedSolver {
    pub script: Vec<c_int>,
    pub info: c_int,
    pub observed: RefCell<Observed>,
    pub opened: RefCell<Vec<String>>,
    pub closed: RefCell<Vec<c_int>>,
    /// Paths ending in this suffix fail to open with code `2`.
    pub fail_open_suffix: Option<&'static str>,
    pub close_code: c_int,
    next_unit: Cell<c_int>,
}

impl ScriptedSolver {
    pub fn new(script: Vec<c_int>) -> Self {
        ScriptedSolver {
            script,
            info: 1,
            observed: RefCell::new(Observed::default()),
            opened: RefCell::new(Vec::new()),
            closed: RefCell::new(Vec::new()),
            fail_open_suffix: None,
            close_code: 0,
            next_unit: Cell::new(10),
        }
    }

    pub fn with_info(mut self, info: c_int) -> Self {
        self.info = info;
        self
    }

    pub fn failing_open(mut self, suffix: &'static str) -> Self {
        self.fail_open_suffix = Some(suffix);
        self
    }

    pub fn failing_close(mut self, code: c_int) -> Self {
        self.close_code = code;
        self
    }

    pub fn observed(&self) -> Observed {
        self.observed.borrow().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.borrow().len()
    }

    pub fn close_count(&self) -> usize {
        self.closed.borrow().len()
    }
}

unsafe fn read<T: Copy>(p: *const T) -> Option<T> {
    if p.is_null() {
        None
    } else {
        Some(*p)
    }
}

impl OdrSolver for ScriptedSolver {
    unsafe fn odr(&self, fcn: OdrFcn, call: &mut RawCall<'_>) -> c_int {
        let (n, m, npar, nq) = (call.n, call.m, call.npar, call.nq);
        let (nu, mu, pu, qu) = (n as usize, m as usize, npar as usize, nq as usize);

        {
            let mut obs = self.observed.borrow_mut();
            *obs = Observed::default();
            obs.job = read(call.job);
            obs.maxit = read(call.maxit);
            obs.sstol = read(call.sstol);
            obs.taufac = read(call.taufac);
            for (name, null) in [
                ("we", call.we.is_null()),
                ("wd", call.wd.is_null()),
                ("ifixb", call.ifixb.is_null()),
                ("ifixx", call.ifixx.is_null()),
                ("stpb", call.stpb.is_null()),
                ("stpd", call.stpd.is_null()),
                ("sclb", call.sclb.is_null()),
                ("scld", call.scld.is_null()),
                ("lower", call.lower.is_null()),
                ("upper", call.upper.is_null()),
                ("ndigit", call.ndigit.is_null()),
                ("partol", call.partol.is_null()),
                ("iprint", call.iprint.is_null()),
            ] {
                if null {
                    obs.null_optionals.push(name);
                }
            }
            obs.work_null = call.work.is_null();
            obs.iwork_null = call.iwork.is_null();
            obs.lwork = call.lwork;
            obs.liwork = call.liwork;
            obs.lunrpt = call.lunrpt;
            obs.lunerr = call.lunerr;
            obs.armed = is_armed();
            obs.lock_held = InvocationLock::is_held();
        }

        let x = std::slice::from_raw_parts(call.x, mu * nu);
        let delta = std::slice::from_raw_parts(call.delta, mu * nu);
        let xplusd: Vec<f64> = x.iter().zip(delta).map(|(a, b)| a + b).collect();
        let beta: Vec<f64> = std::slice::from_raw_parts(call.beta, pu).to_vec();

        let (ldn, ldm, ldnp) = (n, m, npar);
        let ldifx: c_int = 1;
        for &ideval in &self.script {
            let mut f = vec![0.0; qu * nu];
            let mut fjacb = vec![0.0; qu * pu * nu];
            let mut fjacd = vec![0.0; qu * mu * nu];
            let mut istop: c_int = 0;

            fcn(
                &n,
                &m,
                &npar,
                &nq,
                &ldn,
                &ldm,
                &ldnp,
                beta.as_ptr(),
                xplusd.as_ptr(),
                call.ifixb,
                call.ifixx,
                &ldifx,
                &ideval,
                f.as_mut_ptr(),
                fjacb.as_mut_ptr(),
                fjacd.as_mut_ptr(),
                &mut istop,
            );

            let mut obs = self.observed.borrow_mut();
            obs.istops.push(istop);
            obs.responses.push(f);
            obs.fjacb.push(fjacb);
            obs.fjacd.push(fjacd);
            if istop < 0 {
                return USER_STOP_INFO;
            }
        }

        let beta = std::slice::from_raw_parts_mut(call.beta, pu);
        for b in beta.iter_mut() {
            *b += 1.0;
        }
        self.info
    }

    fn open_file(&self, path: &CStr) -> Result<c_int, c_int> {
        let path = path.to_string_lossy().into_owned();
        if let Some(suffix) = self.fail_open_suffix {
            if path.ends_with(suffix) {
                return Err(2);
            }
        }
        self.opened.borrow_mut().push(path);
        let unit = self.next_unit.get();
        self.next_unit.set(unit + 1);
        Ok(unit)
    }

    fn close_file(&self, unit: c_int) -> c_int {
        self.closed.borrow_mut().push(unit);
        self.close_code
    }

    fn workspace_dimensions(
        &self, n: c_int, m: c_int, npar: c_int, nq: c_int, isodr: bool,
    ) -> (c_int, c_int) {
        reference_workspace_dimensions(n, m, npar, nq, isodr)
    }

    fn diwinf(&self, m: c_int, npar: c_int, nq: c_int) -> IworkIdx {
        reference_diwinf(m, npar, nq)
    }

    fn dwinf(
        &self, n: c_int, m: c_int, npar: c_int, nq: c_int, ldwe: c_int, ld2we: c_int,
        isodr: bool,
    ) -> WorkIdx {
        reference_dwinf(n, m, npar, nq, ldwe, ld2we, isodr)
    }
}

/// `(lwork, liwork)` as documented for ODRPACK95 with `ldwe = n`,
/// `ld2we = nq`.
pub fn reference_workspace_dimensions(
    n: c_int, m: c_int, np: c_int, nq: c_int, isodr: bool,
) -> (c_int, c_int) {
    let common = 18 + 13 * np + np * np + m + m * m + 4 * n * nq + 2 * n * nq * np + 5 * nq
        + nq * (np + m)
        + n * nq * nq;
    let lwork = if isodr {
        common + 6 * n * m + 2 * n * nq * m + nq * nq
    } else {
        common + 2 * n * m
    };
    let liwork = 20 + 2 * np + nq * (np + m);
    (lwork, liwork)
}

/// 0-based integer workspace offsets.
pub fn reference_diwinf(m: c_int, np: c_int, nq: c_int) -> IworkIdx {
    let msgb = 1;
    let msgd = msgb + nq * np + 1;
    let ifix2 = msgd + nq * m + 1;
    let istop = ifix2 + np;
    let nnzw = istop + 1;
    let npp = nnzw + 1;
    let idf = npp + 1;
    let job = idf + 1;
    let iprin = job + 1;
    let luner = iprin + 1;
    let lunrp = luner + 1;
    let nrow = lunrp + 1;
    let ntol = nrow + 1;
    let neta = ntol + 1;
    let maxit = neta + 1;
    let niter = maxit + 1;
    let nfev = niter + 1;
    let njev = nfev + 1;
    let int2 = njev + 1;
    let irank = int2 + 1;
    let ldtt = irank + 1;
    let bound = ldtt + 1;
    let liwkmn = bound + np - 1;
    IworkIdx {
        msgb: msgb - 1,
        msgd: msgd - 1,
        ifix2: ifix2 - 1,
        istop: istop - 1,
        nnzw: nnzw - 1,
        npp: npp - 1,
        idf: idf - 1,
        job: job - 1,
        iprin: iprin - 1,
        luner: luner - 1,
        lunrp: lunrp - 1,
        nrow: nrow - 1,
        ntol: ntol - 1,
        neta: neta - 1,
        maxit: maxit - 1,
        niter: niter - 1,
        nfev: nfev - 1,
        njev: njev - 1,
        int2: int2 - 1,
        irank: irank - 1,
        ldtt: ldtt - 1,
        bound: bound - 1,
        liwkmn: liwkmn - 1,
    }
}

/// 0-based real workspace offsets.
pub fn reference_dwinf(
    n: c_int, m: c_int, np: c_int, nq: c_int, ldwe: c_int, ld2we: c_int, isodr: bool,
) -> WorkIdx {
    let delta = 1;
    let eps = delta + n * m;
    let xplus = eps + n * nq;
    let fn_ = xplus + n * m;
    let sd = fn_ + n * nq;
    let vcv = sd + np;
    let rvar = vcv + np * np;
    let wss = rvar + 1;
    let wssde = wss + 1;
    let wssep = wssde + 1;
    let rcond = wssep + 1;
    let eta = rcond + 1;
    let olmav = eta + 1;
    let tau = olmav + 1;
    let alpha = tau + 1;
    let actrs = alpha + 1;
    let pnorm = actrs + 1;
    let rnors = pnorm + 1;
    let prers = rnors + 1;
    let partl = prers + 1;
    let sstol = partl + 1;
    let taufc = sstol + 1;
    let apsma = taufc + 1;
    let epsma = apsma + 1;
    let beta0 = epsma + 1;
    let betac = beta0 + np;
    let betas = betac + np;
    let betan = betas + np;
    let s = betan + np;
    let ss = s + np;
    let ssf = ss + np;
    let qraux = ssf + np;
    let u = qraux + np;
    let fs = u + np;
    let fjacb = fs + n * nq;
    let we1 = fjacb + n * np * nq;
    let diff = we1 + ldwe * ld2we * nq;
    let delts = diff + nq * (np + m);
    let (deltn, t, tt, omega, fjacd, wrk1, wrk2) = if isodr {
        let deltn = delts + n * m;
        let t = deltn + n * m;
        let tt = t + n * m;
        let omega = tt + n * m;
        let fjacd = omega + nq * nq;
        let wrk1 = fjacd + n * m * nq;
        let wrk2 = wrk1 + n * m * nq;
        (deltn, t, tt, omega, fjacd, wrk1, wrk2)
    } else {
        (delts, delts, delts, delts, delts, delts, delts)
    };
    let wrk3 = wrk2 + n * nq;
    let wrk4 = wrk3 + np;
    let wrk5 = wrk4 + m * m;
    let wrk6 = wrk5 + m;
    let wrk7 = wrk6 + n * nq * np;
    let lower = wrk7 + 5 * nq;
    let upper = lower + np;
    let lwkmn = upper + np - 1;

    WorkIdx {
        delta: delta - 1,
        eps: eps - 1,
        xplus: xplus - 1,
        fn_: fn_ - 1,
        sd: sd - 1,
        vcv: vcv - 1,
        rvar: rvar - 1,
        wss: wss - 1,
        wssde: wssde - 1,
        wssep: wssep - 1,
        rcond: rcond - 1,
        eta: eta - 1,
        olmav: olmav - 1,
        tau: tau - 1,
        alpha: alpha - 1,
        actrs: actrs - 1,
        pnorm: pnorm - 1,
        rnors: rnors - 1,
        prers: prers - 1,
        partl: partl - 1,
        sstol: sstol - 1,
        taufc: taufc - 1,
        apsma: apsma - 1,
        epsma: epsma - 1,
        beta0: beta0 - 1,
        betac: betac - 1,
        betas: betas - 1,
        betan: betan - 1,
        s: s - 1,
        ss: ss - 1,
        ssf: ssf - 1,
        qraux: qraux - 1,
        u: u - 1,
        fs: fs - 1,
        fjacb: fjacb - 1,
        we1: we1 - 1,
        diff: diff - 1,
        delts: delts - 1,
        deltn: deltn - 1,
        t: t - 1,
        tt: tt - 1,
        omega: omega - 1,
        fjacd: fjacd - 1,
        wrk1: wrk1 - 1,
        wrk2: wrk2 - 1,
        wrk3: wrk3 - 1,
        wrk4: wrk4 - 1,
        wrk5: wrk5 - 1,
        wrk6: wrk6 - 1,
        wrk7: wrk7 - 1,
        lower: lower - 1,
        upper: upper - 1,
        lwkmn: lwkmn - 1,
    }
}

/// Owned buffers for a one-input, one-response problem.
pub struct Fixture {
    pub dims: ProblemDims,
    pub beta: Array1<f64>,
    pub y: ArrayD<f64>,
    pub x: ArrayD<f64>,
    pub delta: ArrayD<f64>,
}

impl Fixture {
    /// `n` observations of a scalar model with `npar` parameters.
    pub fn scalar(n: usize, npar: usize) -> Self {
        Fixture {
            dims: ProblemDims::new(n, 1, npar, 1),
            beta: Array1::from_elem(npar, 1.0),
            y: ArrayD::from_shape_fn(IxDyn(&[n]), |i| 2.0 * i[0] as f64),
            x: ArrayD::from_shape_fn(IxDyn(&[n]), |i| i[0] as f64),
            delta: ArrayD::zeros(IxDyn(&[n])),
        }
    }

    pub fn problem(&mut self) -> OdrProblem<'_> {
        OdrProblem::new(
            self.dims,
            self.beta.view_mut(),
            self.y.view(),
            self.x.view(),
            self.delta.view_mut(),
        )
    }
}

/// Response `beta[0] * x`, shape `(n,)`.
pub fn linear_response(
    beta: ndarray::ArrayView1<'_, f64>, x: ndarray::ArrayViewD<'_, f64>,
) -> odrpack_bridge::errors::ModelResult<ArrayD<f64>> {
    Ok(x.mapv(|v| beta[0] * v))
}
