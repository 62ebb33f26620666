// WVM - wvm-error
// Module: WVM Error Types
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The unified error type for WVM operations.

use core::fmt;

use crate::codes;

/// `Error` categories for WVM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Module binary parsing errors
    Parse = 1,
    /// Type section and signature errors
    Type = 2,
    /// Import resolution errors
    Import = 3,
    /// Bytecode compilation errors
    Compile = 4,
    /// Execution engine errors
    Runtime = 5,
    /// Host call bridge errors
    Wasi = 6,
}

/// WVM `Error` type
///
/// Categorized error with a numeric code and a static message. Errors are
/// cheap to construct and copy; messages are static because every error in
/// this system is terminal and only ever formatted once, on the way out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code: u16,
    /// `Error` message
    pub message: &'static str,
}

impl Error {
    /// Create a new error.
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self {
            category,
            code,
            message,
        }
    }

    /// Creates a parse error with the given message
    #[must_use]
    pub const fn parse_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, codes::PARSE_ERROR, message)
    }

    /// Creates a truncated-input parse error
    #[must_use]
    pub const fn truncated(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, codes::TRUNCATED_INPUT, message)
    }

    /// Creates a compile error with the given message
    #[must_use]
    pub const fn compile_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Compile, codes::COMPILE_ERROR, message)
    }

    /// Creates a runtime execution error with the given message
    #[must_use]
    pub const fn execution_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::EXECUTION_ERROR, message)
    }

    /// Check if this is a parse error
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        self.category == ErrorCategory::Parse
    }

    /// Check if this is a compile error
    #[must_use]
    pub fn is_compile_error(&self) -> bool {
        self.category == ErrorCategory::Compile
    }

    /// Check if this is a runtime error
    #[must_use]
    pub fn is_runtime_error(&self) -> bool {
        self.category == ErrorCategory::Runtime
    }

    /// Check if this is a host call bridge error
    #[must_use]
    pub fn is_wasi_error(&self) -> bool {
        self.category == ErrorCategory::Wasi
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}][E{:04}] {}",
            self.category, self.code, self.message
        )
    }
}

impl std::error::Error for Error {}
