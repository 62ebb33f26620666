// WVM - wvm-format
// Module: WebAssembly Binary Format
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly binary format handling for WVM.
//!
//! This crate provides the byte-level vocabulary of the module binary
//! format: magic/version constants, section ids, opcode bytes, value-type
//! codes, and the primitive readers (LEB128, fixed-width, length-prefixed
//! strings) that the loader and compiler are built on. It does not hold
//! any decoded module structure; that lives in `wvm-loader`.

#![forbid(unsafe_code)]

pub mod binary;
mod types;

pub use types::{width_of_value_type, Width};
