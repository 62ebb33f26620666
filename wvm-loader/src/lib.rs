// WVM - wvm-loader
// Module: Module Loader and Table Builder
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly module loader for WVM.
//!
//! This crate turns raw module bytes into a [`Module`]: it verifies the
//! header, indexes section byte ranges in one linear pass, then builds the
//! type, import, function, global, table, and memory tables, applying
//! element and data segments to their initial contents. Section contents
//! are consumed exactly once; nothing here validates guest code beyond the
//! structural assumptions the rest of the VM relies on. The module binary
//! comes from a single trusted producer, so any inconsistency is a
//! terminal error, never a recoverable condition.

#![forbid(unsafe_code)]

mod hostcall;
mod module;
mod sections;
mod tables;

pub use hostcall::HostCall;
pub use module::{Module, MAX_PAGES, NO_FUNC, PAGE_SIZE};
pub use sections::SectionIndex;
pub use tables::{Export, Function, Import, TypeInfo};
