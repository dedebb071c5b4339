//! odrpack_bridge — safe callback bridge to the ODRPACK95 orthogonal distance
//! regression solver, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 module that
//! exposes the bridge to Python via the `_odrpack_bridge` extension. The
//! bridge lowers user buffers to the solver's flat C interface, routes the
//! solver's model-evaluation callbacks to user callables, manages the
//! solver's diagnostic files and answers workspace size/layout queries.
//!
//! Key behaviors
//! -------------
//! - [`odr::odr`] runs one solver invocation against any
//!   [`solver::OdrSolver`]; [`solver::native::NativeSolver`] (feature
//!   `native`) links the real library.
//! - [`bridge`] holds the callback machinery: the per-invocation context,
//!   the `extern "C"` trampoline and the process-wide invocation lock.
//! - [`workspace`] answers `(lwork, liwork)` and the named offset tables of
//!   both work arrays.
//! - With `python-bindings`, `_odrpack_bridge` exports `odr`,
//!   `workspace_dimensions`, `diwinf`, `dwinf` and the `OdrStop` exception.
//!
//! Invariants & assumptions
//! ------------------------
//! - At most one solver invocation is active per process. A second one,
//!   including one started from inside a model callable, fails with
//!   [`errors::OdrError::ReentrancyViolation`].
//! - Panics and errors raised by model callables never unwind through the
//!   solver. They stop the solver and surface from [`odr::odr`] after
//!   cleanup.
//!
//! Conventions
//! -----------
//! - Buffers are read in row-major order with the solver's column-major
//!   layout reversed: `x` is `(m, n)`, `y` is `(nq, n)`.
//! - Workspace offsets are 0-based.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module. Integration tests under `tests/`
//!   drive the full invocation path through a scripted in-process solver;
//!   `tests/native_odrpack.rs` runs against the linked library when the
//!   `native` feature is enabled.

pub mod bridge;
pub mod buffers;
pub mod errors;
pub mod odr;
pub mod params;
pub mod solver;
pub mod streams;
pub mod workspace;

#[cfg(feature = "python")]
mod python;

/// Common imports for driving the solver from Rust.
pub mod prelude {
    pub use crate::{
        bridge::{ModelCallbackSet, Quantity, QuantitySet},
        errors::{ModelError, ModelResult, OdrError, OdrResult},
        odr::{odr, LeadingDims, OdrProblem, ProblemDims, StopReason, Termination},
        params::{Job, SolverSettings},
        solver::OdrSolver,
        streams::StreamConfig,
        workspace::{iwork_layout, layouts, work_layout, workspace_dimensions, WorkspaceLayout},
    };
}

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn _odrpack_bridge<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(python::odr, m)?)?;
    m.add_function(wrap_pyfunction!(python::workspace_dimensions, m)?)?;
    m.add_function(wrap_pyfunction!(python::diwinf, m)?)?;
    m.add_function(wrap_pyfunction!(python::dwinf, m)?)?;
    m.add("OdrStop", py.get_type::<python::OdrStop>())?;
    Ok(())
}
