//! errors — error taxonomy for the ODRPACK callback bridge.
//!
//! Purpose
//! -------
//! Collect every failure the bridge can surface to its caller in a single
//! [`OdrError`] enum, plus the [`ModelError`] type returned by user model
//! callables to signal step rejection or failure.
//!
//! Key behaviors
//! -------------
//! - Buffer validation failures ([`OdrError::Dimension`],
//!   [`OdrError::NonContiguous`], [`OdrError::TooLarge`]) are raised before
//!   any native call is made.
//! - Stream failures distinguish opening (fatal, [`OdrError::StreamOpen`])
//!   from closing ([`OdrError::StreamClose`], only ever logged).
//! - Callback failures wrap the caller's own error as `source`, so
//!   `std::error::Error::source` walks back to the original cause.
//! - With the `python` feature, `From<OdrError> for PyErr` maps
//!   bridge errors to Python exceptions and hands back untouched any
//!   Python exception raised by a model callable.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`ModelError::RejectStep`] is never surfaced as an [`OdrError`]; the
//!   bridge maps it to the solver's `istop = 1` convention.
//! - All error payloads are `Send + Sync` so failures captured inside a
//!   callback can be carried across the native frame and returned.
//!
//! Testing notes
//! -------------
//! - Unit tests check that `Display` messages embed their payloads and
//!   that `source()` exposes wrapped callback failures.

use std::path::PathBuf;

#[cfg(feature = "python")]
use pyo3::{
    exceptions::{PyOSError, PyRuntimeError, PyValueError},
    PyErr,
};

use crate::{bridge::quantity::Quantity, streams::Channel};

/// Boxed error type carried by callback failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias for bridge operations.
pub type OdrResult<T> = Result<T, OdrError>;

/// Result type returned by user model callables.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug)]
pub enum OdrError {
    // ---- Buffers ----
    /// Buffer element count does not match the declared dimensions.
    Dimension { name: &'static str, expected: usize, found: usize },

    /// Buffer is not laid out contiguously in row-major order.
    NonContiguous { name: &'static str },

    /// A dimension or length does not fit in the solver's C `int`.
    TooLarge { name: &'static str, value: usize },

    // ---- Settings ----
    /// Floating-point tuning parameter is not finite.
    InvalidSetting { name: &'static str, value: f64, reason: &'static str },

    // ---- Streams ----
    /// Diagnostic file path cannot be handed to the solver.
    InvalidPath { channel: Channel, path: PathBuf, reason: &'static str },

    /// Diagnostic file could not be opened.
    StreamOpen { channel: Channel, path: PathBuf, code: i32 },

    /// Diagnostic file could not be closed. Logged, never returned by `odr`.
    StreamClose { channel: Channel, unit: i32, code: i32 },

    // ---- Callbacks ----
    /// A model callable failed while evaluating `quantity`.
    CallbackFailure { quantity: Quantity, source: BoxError },

    /// The solver requested a quantity with no callable installed.
    MissingCallback { quantity: Quantity },

    /// Another solver invocation is already active in this process.
    ReentrancyViolation,

    // ---- Workspace ----
    /// Field name is not part of the requested workspace layout.
    UnknownField { name: String },

    /// Named window reaches past the end of the workspace buffer.
    FieldOutOfBounds { name: &'static str, offset: usize, len: usize, buffer_len: usize },

    // ---- Solver ----
    /// The native solver returned a value outside its documented contract.
    SolverContract { text: String },
}

impl std::error::Error for OdrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OdrError::CallbackFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for OdrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Buffers ----
            OdrError::Dimension { name, expected, found } => {
                write!(f, "Dimension mismatch for '{name}': expected {expected} elements, found {found}")
            }
            OdrError::NonContiguous { name } => {
                write!(f, "Buffer '{name}' must be C-contiguous")
            }
            OdrError::TooLarge { name, value } => {
                write!(f, "Value {value} for '{name}' does not fit in a C int")
            }

            // ---- Settings ----
            OdrError::InvalidSetting { name, value, reason } => {
                write!(f, "Invalid setting '{name}' = {value}: {reason}")
            }

            // ---- Streams ----
            OdrError::InvalidPath { channel, path, reason } => {
                write!(f, "Invalid {channel} file path {}: {reason}", path.display())
            }
            OdrError::StreamOpen { channel, path, code } => {
                write!(f, "Error opening {channel} file {} (code {code})", path.display())
            }
            OdrError::StreamClose { channel, unit, code } => {
                write!(f, "Error closing {channel} file on unit {unit} (code {code})")
            }

            // ---- Callbacks ----
            OdrError::CallbackFailure { quantity, source } => {
                write!(f, "Model callable for {quantity} failed: {source}")
            }
            OdrError::MissingCallback { quantity } => {
                write!(f, "Solver requested {quantity} but no callable was supplied")
            }
            OdrError::ReentrancyViolation => {
                write!(f, "Another ODR invocation is already active in this process")
            }

            // ---- Workspace ----
            OdrError::UnknownField { name } => {
                write!(f, "Unknown workspace field '{name}'")
            }
            OdrError::FieldOutOfBounds { name, offset, len, buffer_len } => {
                write!(
                    f,
                    "Workspace field '{name}' at offset {offset} with length {len} exceeds buffer length {buffer_len}"
                )
            }

            // ---- Solver ----
            OdrError::SolverContract { text } => {
                write!(f, "Solver contract violated: {text}")
            }
        }
    }
}

/// ModelError — outcome of a failed model evaluation.
///
/// Purpose
/// -------
/// Let a model callable tell the bridge either to reject the current trial
/// step (recoverable) or that evaluation failed outright.
///
/// Variants
/// --------
/// - `RejectStep`
///   The point `(beta, x + delta)` is unacceptable. The solver discards the
///   trial step and continues with a smaller one.
/// - `Failed(BoxError)`
///   Any other failure. The solver run is stopped and the error is returned
///   to the caller of `odr` as [`OdrError::CallbackFailure`].
#[derive(Debug)]
pub enum ModelError {
    RejectStep,
    Failed(BoxError),
}

impl ModelError {
    /// Wrap any error type as a hard evaluation failure.
    pub fn failed<E: Into<BoxError>>(err: E) -> Self {
        ModelError::Failed(err.into())
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Failed(source) => Some(source.as_ref()),
            ModelError::RejectStep => None,
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::RejectStep => write!(f, "Model rejected the trial step"),
            ModelError::Failed(source) => write!(f, "Model evaluation failed: {source}"),
        }
    }
}

#[cfg(feature = "python")]
impl From<OdrError> for PyErr {
    fn from(err: OdrError) -> PyErr {
        match err {
            OdrError::CallbackFailure { source, quantity } => match source.downcast::<PyErr>() {
                Ok(py_err) => *py_err,
                Err(source) => {
                    PyRuntimeError::new_err(OdrError::CallbackFailure { quantity, source }.to_string())
                }
            },
            err @ (OdrError::StreamOpen { .. } | OdrError::StreamClose { .. }) => {
                PyOSError::new_err(err.to_string())
            }
            err @ (OdrError::ReentrancyViolation | OdrError::SolverContract { .. }) => {
                PyRuntimeError::new_err(err.to_string())
            }
            err => PyValueError::new_err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `Display` messages for representative `OdrError` / `ModelError`
    //   variants.
    // - `source()` chaining for wrapped callback failures.
    //
    // They intentionally DO NOT cover:
    // - Conversion to `PyErr`; see the `python` module tests (feature
    //   `python-tests`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `Dimension` messages name the buffer and both counts.
    //
    // Given
    // -----
    // - `name = "we"`, `expected = 12`, `found = 10`.
    //
    // Expect
    // ------
    // - The rendered message contains all three payload values.
    fn dimension_display_embeds_payload() {
        // Arrange
        let err = OdrError::Dimension { name: "we", expected: 12, found: 10 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("'we'"));
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
    }

    #[test]
    // Purpose
    // -------
    // `CallbackFailure` exposes the wrapped error through `source()`.
    //
    // Given
    // -----
    // - A callback failure wrapping a plain string error.
    //
    // Expect
    // ------
    // - `source()` is `Some` and renders the original message.
    fn callback_failure_source_returns_wrapped_error() {
        // Arrange
        let err = OdrError::CallbackFailure {
            quantity: Quantity::Response,
            source: "division by zero".into(),
        };

        // Act
        let source = err.source();

        // Assert
        assert_eq!(source.map(|s| s.to_string()), Some("division by zero".to_string()));
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    // Purpose
    // -------
    // `ModelError::failed` boxes arbitrary errors and `RejectStep` carries no
    // source.
    //
    // Given
    // -----
    // - A `std::io::Error` and a `RejectStep`.
    //
    // Expect
    // ------
    // - The failed variant keeps the io error as its source.
    // - `RejectStep.source()` is `None`.
    fn model_error_failed_keeps_source() {
        // Arrange
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");

        // Act
        let failed = ModelError::failed(io);
        let reject = ModelError::RejectStep;

        // Assert
        assert!(failed.source().is_some());
        assert!(failed.to_string().contains("disk gone"));
        assert!(reject.source().is_none());
    }
}
