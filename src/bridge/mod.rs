//! bridge — adapting Rust model callables to the solver's native callback.
//!
//! Purpose
//! -------
//! Connect up to three user model callables (response, jacobian wrt `beta`,
//! jacobian wrt `delta`) to the one fixed-signature `extern "C"` callback
//! the solver invokes, for the duration of one `odr` call.
//!
//! Key behaviors
//! -------------
//! - [`model::ModelCallbackSet`] groups the callables.
//! - [`quantity::QuantitySet::from_ideval`] decodes the solver's request.
//! - [`context`] holds the per-invocation state in a thread-local slot
//!   behind a scope guard, plus the process-wide [`InvocationLock`].
//! - [`trampoline::trampoline`] is the `extern "C"` entry point the solver
//!   calls. It never lets a panic unwind into solver frames.
//!
//! Invariants & assumptions
//! ------------------------
//! - Lifecycle per invocation: Idle → Armed → Executing → Cleanup → Idle.
//!   The lock is taken before arming; the slot is cleared and the lock
//!   released by guards, whatever the exit path.
//! - The solver calls the callback synchronously on the thread that called
//!   `odr`.
//!
//! Downstream usage
//! ----------------
//! - [`crate::odr::run::odr`] drives the lifecycle; callers normally only
//!   build a [`ModelCallbackSet`] and return [`crate::errors::ModelError`]
//!   from their closures.
//!
//! Testing notes
//! -------------
//! - Each submodule tests its own piece. The integration tests in `tests/`
//!   drive the trampoline through a scripted solver.

pub mod context;
pub mod model;
pub mod quantity;
pub mod trampoline;

pub use context::{is_armed, InvocationLock, ISTOP_ABORT, ISTOP_ACCEPT, ISTOP_REJECT};
pub use model::{ModelCallbackSet, ModelFn};
pub use quantity::{Quantity, QuantitySet};
pub use trampoline::trampoline;
