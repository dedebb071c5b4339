//! Named offsets inside the solver's flat workspaces.
//!
//! Purpose
//! -------
//! Expose `diwinf` / `dwinf` as immutable name → offset tables so callers
//! can pull results (`"eps"`, `"sd"`, `"vcv"`, `"niter"`, ...) out of the
//! raw `work` / `iwork` buffers after a run.
//!
//! Key behaviors
//! -------------
//! - Keys are the solver's own short names, reproduced verbatim: 23 for the
//!   integer workspace and 52 for the real workspace.
//! - Offsets are 0-based indices into the corresponding buffer.
//! - [`WorkspaceLayout::window`] returns a bounds-checked sub-slice of a
//!   buffer for a named field.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every offset is non-negative; a negative value from the solver is a
//!   contract violation.
//! - In OLS mode the solver collapses the delta-only regions
//!   (`delts` .. `wrk2`) onto one offset, so offsets are not necessarily
//!   distinct.

use std::collections::BTreeMap;

use crate::{
    buffers::validation::to_c_int,
    errors::{OdrError, OdrResult},
    solver::OdrSolver,
};

/// Which flat workspace a layout describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    /// `work`, `f64` elements.
    Real,
    /// `iwork`, C `int` elements.
    Integer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    kind: Workspace,
    offsets: BTreeMap<&'static str, usize>,
}

impl WorkspaceLayout {
    fn from_fields(
        kind: Workspace, fields: impl IntoIterator<Item = (&'static str, std::ffi::c_int)>,
    ) -> OdrResult<Self> {
        let mut offsets = BTreeMap::new();
        for (name, raw) in fields {
            let offset = usize::try_from(raw).map_err(|_| OdrError::SolverContract {
                text: format!("negative {kind:?} workspace offset {raw} for '{name}'"),
            })?;
            offsets.insert(name, offset);
        }
        Ok(WorkspaceLayout { kind, offsets })
    }

    pub fn kind(&self) -> Workspace {
        self.kind
    }

    /// Offset of `name`, if it is a field of this layout.
    pub fn offset(&self, name: &str) -> Option<usize> {
        self.offsets.get(name).copied()
    }

    /// Offset of `name`.
    ///
    /// # Errors
    /// Returns [`OdrError::UnknownField`] if `name` is not a field.
    pub fn get(&self, name: &str) -> OdrResult<usize> {
        self.offset(name).ok_or_else(|| OdrError::UnknownField { name: name.to_string() })
    }

    /// `(name, offset)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.offsets.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The `len` elements of `buffer` starting at field `name`.
    ///
    /// # Errors
    /// - [`OdrError::UnknownField`] if `name` is not a field.
    /// - [`OdrError::FieldOutOfBounds`] if the window passes the end of
    ///   `buffer`.
    pub fn window<'b, T>(&self, buffer: &'b [T], name: &str, len: usize) -> OdrResult<&'b [T]> {
        let (key, &offset) = self
            .offsets
            .get_key_value(name)
            .ok_or_else(|| OdrError::UnknownField { name: name.to_string() })?;
        offset
            .checked_add(len)
            .and_then(|end| buffer.get(offset..end))
            .ok_or(OdrError::FieldOutOfBounds { name: *key, offset, len, buffer_len: buffer.len() })
    }

    /// The single element of `buffer` at field `name`.
    ///
    /// # Errors
    /// Same as [`WorkspaceLayout::window`].
    pub fn scalar<T: Copy>(&self, buffer: &[T], name: &str) -> OdrResult<T> {
        self.window(buffer, name, 1).map(|w| w[0])
    }
}

/// Both layouts of one problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layouts {
    pub iwork: WorkspaceLayout,
    pub work: WorkspaceLayout,
}

/// Offsets inside the integer workspace.
///
/// # Errors
/// - [`OdrError::TooLarge`] if a dimension does not fit in a C `int`.
/// - [`OdrError::SolverContract`] if the solver reports a negative offset.
pub fn iwork_layout<S: OdrSolver + ?Sized>(
    solver: &S, m: usize, npar: usize, nq: usize,
) -> OdrResult<WorkspaceLayout> {
    let idx = solver.diwinf(to_c_int("m", m)?, to_c_int("npar", npar)?, to_c_int("nq", nq)?);
    WorkspaceLayout::from_fields(Workspace::Integer, idx.fields())
}

/// Offsets inside the real workspace.
///
/// # Errors
/// Same as [`iwork_layout`].
#[allow(clippy::too_many_arguments)]
pub fn work_layout<S: OdrSolver + ?Sized>(
    solver: &S, n: usize, m: usize, npar: usize, nq: usize, ldwe: usize, ld2we: usize,
    isodr: bool,
) -> OdrResult<WorkspaceLayout> {
    let idx = solver.dwinf(
        to_c_int("n", n)?,
        to_c_int("m", m)?,
        to_c_int("npar", npar)?,
        to_c_int("nq", nq)?,
        to_c_int("ldwe", ldwe)?,
        to_c_int("ld2we", ld2we)?,
        isodr,
    );
    WorkspaceLayout::from_fields(Workspace::Real, idx.fields())
}

/// Integer and real layouts in one query.
///
/// # Errors
/// Same as [`iwork_layout`].
#[allow(clippy::too_many_arguments)]
pub fn layouts<S: OdrSolver + ?Sized>(
    solver: &S, n: usize, m: usize, npar: usize, nq: usize, ldwe: usize, ld2we: usize,
    isodr: bool,
) -> OdrResult<Layouts> {
    Ok(Layouts {
        iwork: iwork_layout(solver, m, npar, nq)?,
        work: work_layout(solver, n, m, npar, nq, ldwe, ld2we, isodr)?,
    })
}
