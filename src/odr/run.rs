//! Top-level solver invocation: Idle → Armed → Executing → Cleanup → Idle.
//!
//! [`odr`] takes the process-wide invocation lock, validates and lowers the
//! problem, opens diagnostic streams, arms the callback context and runs
//! the solver. Teardown is done by guards, so the context is cleared, the
//! opened files are closed and the lock is released on every exit path.
//! A failure captured inside a callback is only surfaced after teardown.

use std::{ffi::c_int, panic};

use log::debug;

use crate::{
    bridge::{
        context::{ArmedContext, CallbackContext, Failure, InvocationLock},
        model::ModelCallbackSet,
        trampoline::trampoline,
    },
    errors::OdrResult,
    odr::{problem::OdrProblem, stop::StopReason},
    params::resolve::resolve,
    solver::OdrSolver,
    streams::OpenStreams,
};

/// Outcome of a solver run that was not aborted by a callback failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// Raw `info` code returned by the solver.
    pub info: c_int,
    pub stop_reason: StopReason,
    /// Number of times the solver called back into the bridge.
    pub callback_calls: usize,
    /// Number of trial steps rejected by a model callable.
    pub rejected_steps: usize,
}

impl Termination {
    /// `info < 4`, the solver's own success criterion.
    pub fn is_success(&self) -> bool {
        self.info < 4
    }
}

/// Run the solver on `problem`, evaluating the model through `models`.
///
/// `beta`, `delta` and (when supplied) `work` / `iwork` in `problem` are
/// updated in place.
///
/// # Errors
/// - [`crate::errors::OdrError::ReentrancyViolation`] if another invocation
///   is active in this process.
/// - Validation errors from [`resolve`] (dimensions, contiguity, settings).
/// - [`crate::errors::OdrError::StreamOpen`] /
///   [`crate::errors::OdrError::InvalidPath`] if a diagnostic file cannot
///   be opened. The solver is not run.
/// - [`crate::errors::OdrError::CallbackFailure`] /
///   [`crate::errors::OdrError::MissingCallback`] if a model callable
///   failed. The solver was stopped at that point.
///
/// # Panics
/// Re-raises, with its original payload, any panic raised by a model
/// callable, after cleanup has completed.
pub fn odr<S: OdrSolver + ?Sized>(
    solver: &S, models: &ModelCallbackSet<'_>, mut problem: OdrProblem<'_>,
) -> OdrResult<Termination> {
    let lock = InvocationLock::acquire()?;

    let stream_config = problem.streams.clone();
    let mut call = resolve(&mut problem)?;
    let streams = OpenStreams::open(solver, &stream_config)?;
    call.lunrpt = streams.lunrpt();
    call.lunerr = streams.lunerr();

    let ctx = CallbackContext::new(models);
    let info = {
        let _armed = ArmedContext::arm(&ctx);
        debug!(
            "Invoking ODR solver: n={}, m={}, npar={}, nq={}, lunrpt={}, lunerr={}",
            call.n, call.m, call.npar, call.nq, call.lunrpt, call.lunerr
        );
        // SAFETY: `resolve` checked every non-null buffer against the
        // dimensions in `call`. `call` holds the mutable borrow of `problem`
        // until after this block, so no buffer moves or is aliased while the
        // solver runs. `ctx` is declared before `_armed` and outlives the
        // call, so `trampoline` never sees a dangling context.
        unsafe { solver.odr(trampoline, &mut call) }
    };
    drop(streams);

    let termination = Termination {
        info,
        stop_reason: StopReason::from_info(info),
        callback_calls: ctx.calls(),
        rejected_steps: ctx.rejections(),
    };
    debug!(
        "ODR solver returned info={info} ({}) after {} callback calls",
        termination.stop_reason, termination.callback_calls
    );

    match ctx.take_failure() {
        None => Ok(termination),
        Some(Failure::Error(err)) => Err(err),
        Some(Failure::Panic(payload)) => {
            drop(lock);
            panic::resume_unwind(payload)
        }
    }
}
