// WVM - wvm-runtime
// Module: Bytecode Compiler and Execution Engine
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The WVM bytecode compiler and stack-machine execution engine.
//!
//! A loaded [`wvm_loader::Module`] is recompiled function-by-function into
//! a flattened two-array internal bytecode ([`CompiledProgram`]) optimized
//! for fast dispatch, then interpreted by the [`Engine`]. Host imports are
//! dispatched synchronously through the [`HostBridge`] trait; the bridge
//! implementation lives in `wvm-wasi`.
//!
//! The compiler is a single forward pass per function: it tracks the
//! operand-stack depth and a width record for every live slot, resolves
//! structured control flow into absolute branch targets, and skips
//! provably dead code. It trusts the producer to have emitted a
//! well-typed module; there is no independent verification pass.

#![forbid(unsafe_code)]

mod compiler;
mod engine;
mod host;
mod memory;
mod opcode;
mod stack;

pub use compiler::{compile_module, CompiledProgram};
pub use engine::Engine;
pub use host::{HostBridge, HostOutcome};
pub use memory::{LinearMemory, MAX_PAGES};
pub use opcode::{Op, Pc};
pub use stack::ValueStack;
