//! buffers — shape-aware adaptors between `ndarray` views and flat solver
//! buffers.
//!
//! Purpose
//! -------
//! Turn caller-owned arrays into the raw, contiguous, correctly-sized
//! buffers the solver reads and writes, and turn the solver's raw callback
//! arguments back into read-only array views for user model code.
//!
//! Key behaviors
//! -------------
//! - [`views::contiguous`] / [`views::contiguous_mut`] borrow an array as a
//!   flat slice after checking row-major contiguity and element count.
//! - [`views::beta_view`] / [`views::xplusd_view`] wrap solver pointers as
//!   `ndarray` views without copying.
//! - [`output::write_quantity`] copies a model result into a solver-owned
//!   output buffer after the same checks.
//! - [`validation`] holds the element-count arithmetic and `usize → c_int`
//!   narrowing shared by the rest of the crate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Nothing here copies caller input; the only copy is the model-output
//!   write-back into solver memory.
//! - Leading dimensions are taken as given. A buffer is checked against the
//!   count the solver will derive from them, never against each other.
//!
//! Conventions
//! -----------
//! - Buffer names used in errors match the argument names of `odr`
//!   (`"beta"`, `"we"`, `"ifixx"`, ...).

pub mod output;
pub mod validation;
pub mod views;

pub use views::Extent;
