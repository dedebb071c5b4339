//! streams — diagnostic output channels of the solver.
//!
//! Purpose
//! -------
//! Map the solver's two diagnostic channels (report and error) to Fortran
//! unit numbers for one invocation: the default pre-opened unit, or a file
//! opened through the solver's own `open_file` entry point.
//!
//! Key behaviors
//! -------------
//! - Without a path a channel uses [`DEFAULT_UNIT`] (`6`) and nothing is
//!   opened or closed for it.
//! - A report path is opened first. A failure is returned as
//!   [`OdrError::StreamOpen`] before the solver runs.
//! - An error path equal to the report path aliases the report unit; the
//!   file is opened once and closed once.
//! - [`OpenStreams`] closes every unit it opened when dropped, including on
//!   early return after a partial open. Close failures are logged with
//!   `log::warn!` and never change the solver's result.
//!
//! Invariants & assumptions
//! ------------------------
//! - Default units are never closed.
//! - A unit opened here is closed exactly once.
//!
//! Testing notes
//! -------------
//! - Integration tests count open/close calls against a scripted solver,
//!   including the aliasing and partial-failure paths.

use std::{
    ffi::{c_int, CString},
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{
    errors::{OdrError, OdrResult},
    solver::OdrSolver,
};

/// Preconnected Fortran unit used by both channels when no file is given.
pub const DEFAULT_UNIT: c_int = 6;

/// Logical diagnostic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Report,
    Error,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Report => write!(f, "report"),
            Channel::Error => write!(f, "error"),
        }
    }
}

/// Optional file destinations for the two channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    pub report: Option<PathBuf>,
    pub error: Option<PathBuf>,
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_error(mut self, path: impl Into<PathBuf>) -> Self {
        self.error = Some(path.into());
        self
    }

    fn error_aliases_report(&self) -> bool {
        matches!((&self.report, &self.error), (Some(r), Some(e)) if r == e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Unit {
    number: c_int,
    owned: bool,
}

impl Unit {
    const DEFAULT: Unit = Unit { number: DEFAULT_UNIT, owned: false };
}

/// Units in use for one invocation; closes what it opened on drop.
pub struct OpenStreams<'s, S: OdrSolver + ?Sized> {
    solver: &'s S,
    report: Unit,
    error: Unit,
}

impl<'s, S: OdrSolver + ?Sized> OpenStreams<'s, S> {
    /// Open the configured files.
    ///
    /// # Errors
    /// - [`OdrError::InvalidPath`] if a path is not valid UTF-8 or contains
    ///   a NUL byte.
    /// - [`OdrError::StreamOpen`] if the solver cannot open a file. Any unit
    ///   already opened by this call is closed before returning.
    pub fn open(solver: &'s S, config: &StreamConfig) -> OdrResult<Self> {
        let mut streams = OpenStreams { solver, report: Unit::DEFAULT, error: Unit::DEFAULT };

        if let Some(path) = &config.report {
            streams.report = open_unit(solver, Channel::Report, path)?;
        }

        if let Some(path) = &config.error {
            if config.error_aliases_report() {
                streams.error = Unit { number: streams.report.number, owned: false };
                debug!("Error channel aliases report unit {}", streams.report.number);
            } else {
                streams.error = open_unit(solver, Channel::Error, path)?;
            }
        }

        Ok(streams)
    }

    pub fn lunrpt(&self) -> c_int {
        self.report.number
    }

    pub fn lunerr(&self) -> c_int {
        self.error.number
    }

    /// Close the opened units now and return any close failures.
    ///
    /// Failures are also logged. Calling this is optional; dropping the
    /// value closes the same units.
    pub fn close(mut self) -> Vec<OdrError> {
        self.close_owned()
    }

    fn close_owned(&mut self) -> Vec<OdrError> {
        let mut failures = Vec::new();
        for (channel, unit) in [(Channel::Report, &mut self.report), (Channel::Error, &mut self.error)] {
            if !unit.owned {
                continue;
            }
            unit.owned = false;
            let code = self.solver.close_file(unit.number);
            if code == 0 {
                debug!("Closed {channel} file on unit {}", unit.number);
            } else {
                let err = OdrError::StreamClose { channel, unit: unit.number, code };
                warn!("{err}");
                failures.push(err);
            }
        }
        failures
    }
}

impl<S: OdrSolver + ?Sized> Drop for OpenStreams<'_, S> {
    fn drop(&mut self) {
        self.close_owned();
    }
}

impl<S: OdrSolver + ?Sized> std::fmt::Debug for OpenStreams<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStreams").field("report", &self.report).field("error", &self.error).finish()
    }
}

fn open_unit<S: OdrSolver + ?Sized>(solver: &S, channel: Channel, path: &Path) -> OdrResult<Unit> {
    let invalid = |reason| OdrError::InvalidPath { channel, path: path.to_path_buf(), reason };
    let text = path.to_str().ok_or_else(|| invalid("path is not valid UTF-8"))?;
    let c_path = CString::new(text).map_err(|_| invalid("path contains a NUL byte"))?;

    match solver.open_file(&c_path) {
        Ok(number) => {
            debug!("Opened {channel} file {} on unit {number}", path.display());
            Ok(Unit { number, owned: true })
        }
        Err(code) => Err(OdrError::StreamOpen { channel, path: path.to_path_buf(), code }),
    }
}
