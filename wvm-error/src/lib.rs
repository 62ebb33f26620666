// WVM - wvm-error
// Module: WVM Error Handling
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WVM error handling library
//!
//! This library provides the unified error type for the WVM virtual machine.
//! Errors are organized into categories, each with its own range of error
//! codes:
//!
//! - Parse errors (1000+): malformed module binary, truncated sections
//! - Type errors (2000+): signature limits, unsupported value kinds
//! - Import errors (3000+): unknown host calls, wrong import kinds
//! - Compile errors (4000+): label/operand stack inconsistencies
//! - Runtime errors (5000+): stale table slots, memory cap violations
//! - WASI errors (6000+): host bridge failures that cannot map to an errno
//!
//! All of these are structural violations: the module binary comes from a
//! single trusted producer, so an `Error` reaching the top level terminates
//! the process rather than being recovered from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codes;
mod errors;

pub use errors::{Error, ErrorCategory};

/// Result type alias using the WVM [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
