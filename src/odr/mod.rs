//! odr — one complete solver invocation.
//!
//! Purpose
//! -------
//! Provide the entry point callers use: describe the problem with
//! [`problem::OdrProblem`], supply callables in a
//! [`crate::bridge::ModelCallbackSet`], and call [`run::odr`] with a solver.
//!
//! Key behaviors
//! -------------
//! - [`run::odr`] returns a [`run::Termination`] carrying the solver's
//!   `info` code and its decoded [`stop::StopReason`].
//! - Step rejections by the model are counted, not reported as errors.
//!
//! Conventions
//! -----------
//! - `info < 4` is success, matching the solver's documentation.

pub mod problem;
pub mod run;
pub mod stop;

pub use problem::{LeadingDims, OdrProblem, ProblemDims};
pub use run::{odr, Termination};
pub use stop::StopReason;
