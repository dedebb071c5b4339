//! Interpretation of the solver's `info` code.

use std::ffi::c_int;

/// Why the solver stopped, decoded from `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `info == 1`.
    SumOfSquaresConvergence,
    /// `info == 2`.
    ParameterConvergence,
    /// `info == 3`.
    BothConvergence,
    /// `info == 4`.
    IterationLimit,
    /// `info >= 5`: see the report and error files.
    QuestionableOrFatal,
    /// `info <= 0`: not produced by a completed run.
    Unknown,
}

impl StopReason {
    pub fn from_info(info: c_int) -> Self {
        match info {
            1 => StopReason::SumOfSquaresConvergence,
            2 => StopReason::ParameterConvergence,
            3 => StopReason::BothConvergence,
            4 => StopReason::IterationLimit,
            i if i >= 5 => StopReason::QuestionableOrFatal,
            _ => StopReason::Unknown,
        }
    }

    pub fn is_converged(self) -> bool {
        matches!(
            self,
            StopReason::SumOfSquaresConvergence
                | StopReason::ParameterConvergence
                | StopReason::BothConvergence
        )
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::SumOfSquaresConvergence => write!(f, "Sum of squares convergence."),
            StopReason::ParameterConvergence => write!(f, "Parameter convergence."),
            StopReason::BothConvergence => write!(f, "Sum of squares and parameter convergence."),
            StopReason::IterationLimit => write!(f, "Iteration limit reached."),
            StopReason::QuestionableOrFatal => write!(
                f,
                "Questionable results or fatal errors detected. See report and error message."
            ),
            StopReason::Unknown => write!(f, "Solver did not report a stop reason."),
        }
    }
}
