//! python — PyO3 functions exposed by the `_odrpack_bridge` extension.
//!
//! Purpose
//! -------
//! Make the bridge callable from Python with the same argument list as the
//! solver binding: dimensions, three model callables, NumPy buffers, optional
//! scalars and two optional file names.
//!
//! Key behaviors
//! -------------
//! - Python callables are wrapped as [`crate::bridge::ModelFn`] closures.
//!   `beta` and `x + delta` are passed as fresh NumPy arrays; the returned
//!   array is read back as `float64` in C order.
//! - Raising [`OdrStop`] in a callable rejects the current trial step. Any
//!   other Python exception stops the solver and is re-raised unchanged
//!   from `odr` once cleanup has run.
//! - `workspace_dimensions`, `diwinf` and `dwinf` return a tuple and two
//!   `dict[str, int]` tables.
//!
//! Invariants & assumptions
//! ------------------------
//! - The GIL is held for the whole `odr` call; callbacks run on the calling
//!   thread.
//! - Shapes and leading dimensions are computed by the Python caller; this
//!   layer only checks them against buffer sizes.
//!
//! Testing notes
//! -------------
//! - The unit tests below embed an interpreter and only build with the
//!   `python-tests` feature (`extension-module` cannot link a test binary).

use std::{collections::BTreeMap, ffi::c_int, path::PathBuf};

use ndarray::{ArrayD, ArrayView1, ArrayViewD};
use numpy::{
    IntoPyArray, PyReadonlyArray1, PyReadonlyArrayDyn, PyReadwriteArray1, PyReadwriteArrayDyn,
};
use pyo3::{create_exception, exceptions::PyException, prelude::*};

use crate::{
    bridge::ModelCallbackSet,
    errors::{ModelError, ModelResult},
    odr::{odr as run_odr, LeadingDims, OdrProblem, ProblemDims},
    params::SolverSettings,
    solver::native::NativeSolver,
    streams::StreamConfig,
    workspace,
};

create_exception!(
    _odrpack_bridge,
    OdrStop,
    PyException,
    "Raise from a model function to reject the current trial step."
);

/// Wrap a Python callable `(beta, x) -> ndarray` as a model closure.
fn py_model<'py>(
    py: Python<'py>, func: Bound<'py, PyAny>,
) -> impl Fn(ArrayView1<'_, f64>, ArrayViewD<'_, f64>) -> ModelResult<ArrayD<f64>> + 'py {
    move |beta, x| {
        let beta = beta.to_owned().into_pyarray(py);
        let x = x.to_owned().into_pyarray(py);
        let out = func.call1((beta, x)).map_err(|err| {
            if err.is_instance_of::<OdrStop>(py) {
                ModelError::RejectStep
            } else {
                ModelError::failed(err)
            }
        })?;
        let arr: PyReadonlyArrayDyn<'py, f64> = out.extract().map_err(ModelError::failed)?;
        Ok(arr.as_array().as_standard_layout().into_owned())
    }
}

fn callbacks<'py>(
    py: Python<'py>, f: Option<Bound<'py, PyAny>>, fjacb: Option<Bound<'py, PyAny>>,
    fjacd: Option<Bound<'py, PyAny>>,
) -> ModelCallbackSet<'py> {
    let mut set = ModelCallbackSet::new();
    if let Some(f) = f {
        set = set.response(py_model(py, f));
    }
    if let Some(fjacb) = fjacb {
        set = set.beta_jacobian(py_model(py, fjacb));
    }
    if let Some(fjacd) = fjacd {
        set = set.delta_jacobian(py_model(py, fjacd));
    }
    set
}

/// Run the ODR solver. Returns the solver's `info` code.
///
/// `beta`, `delta`, `work` and `iwork` are updated in place.
#[pyfunction]
#[pyo3(signature = (
    n, m, npar, nq, ldwe, ld2we, ldwd, ld2wd, ldifx, ldstpd, ldscld,
    f, fjacb, fjacd, beta, y, x, delta,
    we=None, wd=None, ifixb=None, ifixx=None, stpb=None, stpd=None, sclb=None, scld=None,
    lower=None, upper=None, work=None, iwork=None,
    job=None, ndigit=None, taufac=None, sstol=None, partol=None, maxit=None, iprint=None,
    errfile=None, rptfile=None
))]
#[allow(clippy::too_many_arguments)]
pub fn odr<'py>(
    py: Python<'py>, n: usize, m: usize, npar: usize, nq: usize, ldwe: usize, ld2we: usize,
    ldwd: usize, ld2wd: usize, ldifx: usize, ldstpd: usize, ldscld: usize,
    f: Option<Bound<'py, PyAny>>, fjacb: Option<Bound<'py, PyAny>>,
    fjacd: Option<Bound<'py, PyAny>>, mut beta: PyReadwriteArray1<'py, f64>,
    y: PyReadonlyArrayDyn<'py, f64>, x: PyReadonlyArrayDyn<'py, f64>,
    mut delta: PyReadwriteArrayDyn<'py, f64>, we: Option<PyReadonlyArrayDyn<'py, f64>>,
    wd: Option<PyReadonlyArrayDyn<'py, f64>>, ifixb: Option<PyReadonlyArray1<'py, c_int>>,
    ifixx: Option<PyReadonlyArrayDyn<'py, c_int>>, stpb: Option<PyReadonlyArray1<'py, f64>>,
    stpd: Option<PyReadonlyArrayDyn<'py, f64>>, sclb: Option<PyReadonlyArray1<'py, f64>>,
    scld: Option<PyReadonlyArrayDyn<'py, f64>>, lower: Option<PyReadonlyArray1<'py, f64>>,
    upper: Option<PyReadonlyArray1<'py, f64>>, mut work: Option<PyReadwriteArray1<'py, f64>>,
    mut iwork: Option<PyReadwriteArray1<'py, c_int>>, job: Option<c_int>, ndigit: Option<c_int>,
    taufac: Option<f64>, sstol: Option<f64>, partol: Option<f64>, maxit: Option<c_int>,
    iprint: Option<c_int>, errfile: Option<PathBuf>, rptfile: Option<PathBuf>,
) -> PyResult<c_int> {
    let models = callbacks(py, f, fjacb, fjacd);

    let mut problem = OdrProblem::new(
        ProblemDims::new(n, m, npar, nq),
        beta.as_array_mut(),
        y.as_array(),
        x.as_array(),
        delta.as_array_mut(),
    );
    problem.leading = LeadingDims { ldwe, ld2we, ldwd, ld2wd, ldifx, ldstpd, ldscld };
    problem.we = we.as_ref().map(|a| a.as_array());
    problem.wd = wd.as_ref().map(|a| a.as_array());
    problem.ifixb = ifixb.as_ref().map(|a| a.as_array());
    problem.ifixx = ifixx.as_ref().map(|a| a.as_array());
    problem.stpb = stpb.as_ref().map(|a| a.as_array());
    problem.stpd = stpd.as_ref().map(|a| a.as_array());
    problem.sclb = sclb.as_ref().map(|a| a.as_array());
    problem.scld = scld.as_ref().map(|a| a.as_array());
    problem.lower = lower.as_ref().map(|a| a.as_array());
    problem.upper = upper.as_ref().map(|a| a.as_array());
    problem.work = work.as_mut().map(|a| a.as_array_mut());
    problem.iwork = iwork.as_mut().map(|a| a.as_array_mut());
    problem.settings = SolverSettings { job: job.map(Into::into), ndigit, taufac, sstol, partol, maxit, iprint };
    problem.streams = StreamConfig { report: rptfile, error: errfile };

    let termination = run_odr(&NativeSolver, &models, problem)?;
    Ok(termination.info)
}

/// Lengths `(lwork, liwork)` of the work arrays.
#[pyfunction]
#[pyo3(signature = (n, m, npar, nq, isodr))]
pub fn workspace_dimensions(
    n: usize, m: usize, npar: usize, nq: usize, isodr: bool,
) -> PyResult<(usize, usize)> {
    let dims = workspace::workspace_dimensions(&NativeSolver, n, m, npar, nq, isodr)?;
    Ok((dims.lwork, dims.liwork))
}

/// 0-based storage locations within the integer work space.
#[pyfunction]
#[pyo3(signature = (m, npar, nq))]
pub fn diwinf(m: usize, npar: usize, nq: usize) -> PyResult<BTreeMap<&'static str, usize>> {
    let layout = workspace::iwork_layout(&NativeSolver, m, npar, nq)?;
    Ok(layout.iter().collect())
}

/// 0-based storage locations within the real work space.
#[pyfunction]
#[pyo3(signature = (n, m, npar, nq, ldwe, ld2we, isodr))]
#[allow(clippy::too_many_arguments)]
pub fn dwinf(
    n: usize, m: usize, npar: usize, nq: usize, ldwe: usize, ld2we: usize, isodr: bool,
) -> PyResult<BTreeMap<&'static str, usize>> {
    let layout = workspace::work_layout(&NativeSolver, n, m, npar, nq, ldwe, ld2we, isodr)?;
    Ok(layout.iter().collect())
}
