//! The single `extern "C"` callback handed to the solver.
//!
//! [`trampoline`] has the fixed [`OdrFcn`](crate::solver::OdrFcn) signature.
//! It rebuilds an [`EvaluationRequest`] from the raw arguments, forwards it
//! to the armed [`CallbackContext`](super::context), and writes back `istop`.
//!
//! No Rust panic crosses this frame: a panic in user code is caught here,
//! parked in the context, and reported to the solver as "stop". The bridge
//! resumes it once the solver has returned.

use std::{
    ffi::{c_double, c_int},
    panic::{self, AssertUnwindSafe},
    slice,
};

use log::error;

use crate::{
    bridge::{
        context::{with_active, EvaluationRequest, Failure, ISTOP_ABORT},
        quantity::{Quantity, QuantitySet},
    },
    buffers::{
        validation::dim,
        views::{beta_view, xplusd_view},
    },
};

/// Adapter from the solver's callback ABI to the armed model callables.
///
/// # Safety
/// Must only be called by the solver during an `odr` call driven by this
/// crate, with pointers valid for the sizes implied by the dimension
/// arguments: `beta` for `npar` reads, `xplusd` for `ldn * m` reads, `f` for
/// `nq * ldn` writes, `fjacb` for `nq * ldnp * ldn` writes and `fjacd` for
/// `nq * ldm * ldn` writes (output pointers only when requested by `ideval`).
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn trampoline(
    n: *const c_int, m: *const c_int, npar: *const c_int, nq: *const c_int, ldn: *const c_int,
    ldm: *const c_int, ldnp: *const c_int, beta: *const c_double, xplusd: *const c_double,
    _ifixb: *const c_int, _ifixx: *const c_int, _ldifx: *const c_int, ideval: *const c_int,
    f: *mut c_double, fjacb: *mut c_double, fjacd: *mut c_double, istop: *mut c_int,
) {
    let status = with_active(|ctx| {
        let Some(ctx) = ctx else {
            error!("ODR callback invoked with no armed context; stopping the solver");
            return ISTOP_ABORT;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let (n, m, npar, nq) = (dim(*n), dim(*m), dim(*npar), dim(*nq));
            let (ldn, ldm, ldnp) = (dim(*ldn), dim(*ldm), dim(*ldnp));
            let requested = QuantitySet::from_ideval(*ideval);

            let mut req = EvaluationRequest {
                requested,
                beta: beta_view(beta, npar),
                xplusd: xplusd_view(xplusd, n, m, ldn),
                f: output(f, requested.contains(Quantity::Response), nq * ldn),
                fjacb: output(
                    fjacb,
                    requested.contains(Quantity::BetaJacobian),
                    nq * ldnp * ldn,
                ),
                fjacd: output(
                    fjacd,
                    requested.contains(Quantity::DeltaJacobian),
                    nq * ldm * ldn,
                ),
            };
            ctx.evaluate(&mut req)
        }));

        outcome.unwrap_or_else(|payload| {
            error!("Panic in ODR model callable; stopping the solver");
            ctx.record(Failure::Panic(payload));
            ISTOP_ABORT
        })
    });

    if !istop.is_null() {
        *istop = status;
    }
}

/// Borrow a solver output buffer only when it is requested and non-null.
unsafe fn output<'s>(ptr: *mut c_double, requested: bool, len: usize) -> &'s mut [f64] {
    if requested && !ptr.is_null() {
        slice::from_raw_parts_mut(ptr, len)
    } else {
        &mut []
    }
}
