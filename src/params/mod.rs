//! params — optional parameters and their lowering to solver arguments.
//!
//! Purpose
//! -------
//! Represent every optional solver input as an explicit `Option` and turn
//! it into the solver's sentinel convention (null pointer = absent) at the
//! last possible moment.
//!
//! Key behaviors
//! -------------
//! - [`settings::SolverSettings`]: optional scalar tuning parameters.
//! - [`job::Job`]: packed `job` code with digit accessors.
//! - [`optional`]: `Option<&T>` / `Option<&[T]>` → pointer helpers, and the
//!   `(null, 1)` convention for absent work buffers.
//! - [`resolve::resolve`]: validates an [`crate::odr::problem::OdrProblem`]
//!   and builds the [`crate::solver::RawCall`] for it.
//!
//! Invariants & assumptions
//! ------------------------
//! - A present value (including zero) always lowers to a non-null pointer
//!   to its own storage; an absent one always lowers to null.

pub mod job;
pub mod optional;
pub mod resolve;
pub mod settings;

pub use job::Job;
pub use resolve::resolve;
pub use settings::SolverSettings;
