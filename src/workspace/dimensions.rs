//! Required lengths of the solver's real and integer workspaces.

use crate::{
    buffers::validation::to_c_int,
    errors::{OdrError, OdrResult},
    solver::OdrSolver,
};

/// Lengths of `work` (`f64`) and `iwork` (`c_int`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceDims {
    pub lwork: usize,
    pub liwork: usize,
}

/// Query the solver for the workspace lengths of a problem.
///
/// `isodr` selects orthogonal distance regression (`true`) or ordinary
/// least squares (`false`); OLS needs a smaller real workspace.
///
/// # Errors
/// - [`OdrError::TooLarge`] if a dimension does not fit in a C `int`.
/// - [`OdrError::SolverContract`] if the solver reports a non-positive
///   length.
pub fn workspace_dimensions<S: OdrSolver + ?Sized>(
    solver: &S, n: usize, m: usize, npar: usize, nq: usize, isodr: bool,
) -> OdrResult<WorkspaceDims> {
    let (lwork, liwork) = solver.workspace_dimensions(
        to_c_int("n", n)?,
        to_c_int("m", m)?,
        to_c_int("npar", npar)?,
        to_c_int("nq", nq)?,
        isodr,
    );
    match (usize::try_from(lwork), usize::try_from(liwork)) {
        (Ok(lwork), Ok(liwork)) if lwork > 0 && liwork > 0 => Ok(WorkspaceDims { lwork, liwork }),
        _ => Err(OdrError::SolverContract {
            text: format!("workspace_dimensions returned lwork={lwork}, liwork={liwork}"),
        }),
    }
}
