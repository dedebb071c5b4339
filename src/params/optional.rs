//! Lowering of `Option` parameters to the solver's null-pointer convention.
//!
//! The solver tells "argument absent" from "argument present and zero" by
//! pointer identity, so absence is only ever expressed as a null pointer,
//! and only at the point a [`RawCall`](crate::solver::RawCall) is built.

use std::{ffi::c_int, ptr};

use crate::{buffers::validation::to_c_int, errors::OdrResult};

/// Address of a present scalar, or null.
#[inline]
pub fn scalar_ptr<T>(value: Option<&T>) -> *const T {
    value.map_or(ptr::null(), |v| v as *const T)
}

/// Data pointer of a present array, or null.
#[inline]
pub fn array_ptr<T>(values: Option<&[T]>) -> *const T {
    values.map_or(ptr::null(), <[T]>::as_ptr)
}

/// Work buffer pointer and the length to report for it.
///
/// An absent buffer is passed as null with length `1`, which the solver
/// reads as "allocate the workspace internally".
///
/// # Errors
/// Returns [`crate::errors::OdrError::TooLarge`] if a present buffer's
/// length does not fit in a C `int`.
pub fn work_ptr<T>(name: &'static str, values: Option<&mut [T]>) -> OdrResult<(*mut T, c_int)> {
    match values {
        Some(buf) => Ok((buf.as_mut_ptr(), to_c_int(name, buf.len())?)),
        None => Ok((ptr::null_mut(), 1)),
    }
}
