//! Callback context, its thread-local slot, and the invocation lock.
//!
//! Purpose
//! -------
//! The solver's callback carries no user-data pointer, so the model
//! callables for the running invocation are reached through a thread-local
//! slot. This module owns that slot and the guards around it.
//!
//! Key behaviors
//! -------------
//! - [`InvocationLock::acquire`] flips a process-wide atomic flag. A second
//!   acquisition while the first is held fails fast with
//!   [`OdrError::ReentrancyViolation`], whether it comes from another thread
//!   or from inside a model callable.
//! - [`ArmedContext::arm`] installs a [`CallbackContext`] in the slot and
//!   clears it on drop, on every exit path including unwinding.
//! - [`CallbackContext::evaluate`] runs the requested callables for one
//!   [`EvaluationRequest`], writes their results into solver memory, and
//!   returns the `istop` value for the solver.
//! - The first hard failure (error or panic) is stored in the context.
//!   Every later callback call short-circuits with [`ISTOP_ABORT`] without
//!   running user code.
//!
//! Invariants & assumptions
//! ------------------------
//! - The slot is non-empty only while an [`ArmedContext`] is alive on the
//!   same thread, and that guard borrows the context it points to.
//! - The lock is always acquired before the slot is armed, so a rejected
//!   nested invocation never touches the active slot.
//!
//! Conventions
//! -----------
//! - `istop`: `0` accept, `1` reject the trial step, negative stop the run.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    ffi::c_int,
    marker::PhantomData,
    ptr::NonNull,
    sync::atomic::{AtomicBool, Ordering},
};

use log::{debug, warn};
use ndarray::{ArrayView1, ArrayViewD};

use crate::{
    bridge::{
        model::ModelCallbackSet,
        quantity::{Quantity, QuantitySet},
    },
    buffers::output::write_quantity,
    errors::{ModelError, OdrError, OdrResult},
};

/// Evaluation succeeded.
pub const ISTOP_ACCEPT: c_int = 0;
/// The trial point is unacceptable; the solver retries with a smaller step.
pub const ISTOP_REJECT: c_int = 1;
/// Stop the computation and return to the caller.
pub const ISTOP_ABORT: c_int = -1;

static IN_USE: AtomicBool = AtomicBool::new(false);

thread_local! {
    static ACTIVE: Cell<Option<NonNull<CallbackContext<'static>>>> = const { Cell::new(None) };
}

/// Process-wide guard allowing at most one active invocation.
#[derive(Debug)]
pub struct InvocationLock {
    _private: (),
}

impl InvocationLock {
    /// # Errors
    /// Returns [`OdrError::ReentrancyViolation`] if another invocation holds
    /// the lock.
    pub fn acquire() -> OdrResult<Self> {
        IN_USE
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| InvocationLock { _private: () })
            .map_err(|_| OdrError::ReentrancyViolation)
    }

    pub fn is_held() -> bool {
        IN_USE.load(Ordering::Acquire)
    }
}

impl Drop for InvocationLock {
    fn drop(&mut self) {
        IN_USE.store(false, Ordering::Release);
    }
}

/// A failure captured inside a callback, surfaced after the solver returns.
pub(crate) enum Failure {
    Error(OdrError),
    Panic(Box<dyn Any + Send + 'static>),
}

impl std::fmt::Debug for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Failure::Panic(_) => f.write_str("Panic(..)"),
        }
    }
}

/// One callback invocation as seen by the bridge.
pub struct EvaluationRequest<'s> {
    pub requested: QuantitySet,
    pub beta: ArrayView1<'s, f64>,
    pub xplusd: ArrayViewD<'s, f64>,
    pub f: &'s mut [f64],
    pub fjacb: &'s mut [f64],
    pub fjacd: &'s mut [f64],
}

impl EvaluationRequest<'_> {
    fn output(&mut self, quantity: Quantity) -> &mut [f64] {
        match quantity {
            Quantity::Response => &mut *self.f,
            Quantity::BetaJacobian => &mut *self.fjacb,
            Quantity::DeltaJacobian => &mut *self.fjacd,
        }
    }
}

/// State shared between `odr` and the callback for one invocation.
pub(crate) struct CallbackContext<'a> {
    models: &'a ModelCallbackSet<'a>,
    failure: RefCell<Option<Failure>>,
    calls: Cell<usize>,
    rejections: Cell<usize>,
}

impl<'a> CallbackContext<'a> {
    pub(crate) fn new(models: &'a ModelCallbackSet<'a>) -> Self {
        CallbackContext {
            models,
            failure: RefCell::new(None),
            calls: Cell::new(0),
            rejections: Cell::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn rejections(&self) -> usize {
        self.rejections.get()
    }

    pub(crate) fn has_failed(&self) -> bool {
        self.failure.borrow().is_some()
    }

    /// Keep the first failure; later ones are consequences of it.
    pub(crate) fn record(&self, failure: Failure) {
        let mut slot = self.failure.borrow_mut();
        if slot.is_none() {
            *slot = Some(failure);
        }
    }

    pub(crate) fn take_failure(&self) -> Option<Failure> {
        self.failure.borrow_mut().take()
    }

    /// Run the requested callables and return the `istop` for the solver.
    pub(crate) fn evaluate(&self, req: &mut EvaluationRequest<'_>) -> c_int {
        self.calls.set(self.calls.get() + 1);
        if self.has_failed() {
            return ISTOP_ABORT;
        }

        for quantity in req.requested.iter() {
            let Some(model) = self.models.get(quantity) else {
                self.record(Failure::Error(OdrError::MissingCallback { quantity }));
                return ISTOP_ABORT;
            };

            match model(req.beta.view(), req.xplusd.view()) {
                Ok(result) => {
                    if let Err(err) = write_quantity(quantity, &result, req.output(quantity)) {
                        self.record(Failure::Error(OdrError::CallbackFailure {
                            quantity,
                            source: Box::new(err),
                        }));
                        return ISTOP_ABORT;
                    }
                }
                Err(ModelError::RejectStep) => {
                    self.rejections.set(self.rejections.get() + 1);
                    warn!("Model rejected trial step while evaluating {quantity}; istop = 1");
                    return ISTOP_REJECT;
                }
                Err(ModelError::Failed(source)) => {
                    self.record(Failure::Error(OdrError::CallbackFailure { quantity, source }));
                    return ISTOP_ABORT;
                }
            }
        }
        ISTOP_ACCEPT
    }
}

/// Scope guard holding a [`CallbackContext`] in the thread-local slot.
pub(crate) struct ArmedContext<'ctx, 'a> {
    _ctx: PhantomData<&'ctx CallbackContext<'a>>,
}

impl<'ctx, 'a> ArmedContext<'ctx, 'a> {
    pub(crate) fn arm(ctx: &'ctx CallbackContext<'a>) -> Self {
        let erased = NonNull::from(ctx).cast::<CallbackContext<'static>>();
        ACTIVE.with(|slot| slot.set(Some(erased)));
        debug!("Callback context armed ({:?})", ctx.models.installed());
        ArmedContext { _ctx: PhantomData }
    }
}

impl Drop for ArmedContext<'_, '_> {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.set(None));
        debug!("Callback context cleared");
    }
}

/// Whether a callback context is armed on this thread.
pub fn is_armed() -> bool {
    ACTIVE.with(|slot| slot.get().is_some())
}

/// Run `f` with the context armed on this thread, if any.
pub(crate) fn with_active<R>(f: impl FnOnce(Option<&CallbackContext<'_>>) -> R) -> R {
    let ptr = ACTIVE.with(|slot| slot.get());
    // SAFETY: the slot is only non-empty while the `ArmedContext` that set
    // it is alive on this thread, and that guard borrows the context.
    let ctx = ptr.map(|p| unsafe { p.as_ref() });
    f(ctx)
}
