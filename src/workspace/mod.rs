//! workspace — size and layout queries for the solver's flat workspaces.
//!
//! Purpose
//! -------
//! Precompute `work` / `iwork` lengths before a run and locate named
//! results inside them afterwards.
//!
//! Key behaviors
//! -------------
//! - [`dimensions::workspace_dimensions`]: `(lwork, liwork)` for a problem.
//! - [`layout::iwork_layout`], [`layout::work_layout`],
//!   [`layout::layouts`]: name → offset tables.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every query is a pure function of the dimensions. None of them reads
//!   or touches callback state, so they are safe to call at any time,
//!   including from inside a model callable.

pub mod dimensions;
pub mod layout;

pub use dimensions::{workspace_dimensions, WorkspaceDims};
pub use layout::{iwork_layout, layouts, work_layout, Layouts, Workspace, WorkspaceLayout};
