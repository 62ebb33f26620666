// WVM - wvm-runtime
// Module: Host Call Bridge Interface
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The interface the execution engine uses to reach host calls.
//!
//! The engine does not know how any host call is implemented; it hands the
//! bridge the resolved call id plus mutable views of the operand stack and
//! linear memory for the duration of exactly one call. The bridge pops its
//! arguments in the documented order, writes any outputs into guest
//! memory, and pushes the errno result back. The exception is
//! `proc_exit`, which ends the run through [`HostOutcome::Exit`].

use wvm_error::Result;
use wvm_loader::HostCall;

use crate::memory::LinearMemory;
use crate::stack::ValueStack;

/// What the engine should do after a host call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOutcome {
    /// Resume dispatch at the saved program counter.
    Continue,
    /// The guest requested process exit with the given code.
    Exit(u32),
}

/// Synchronous host call dispatch.
pub trait HostBridge {
    /// Execute one host call against the VM state.
    ///
    /// Errors from this method are structural (e.g. an argument that does
    /// not describe valid guest memory) and terminate the run; ordinary
    /// host I/O failures are mapped to errno values and returned to the
    /// guest as a pushed result instead.
    fn dispatch(
        &mut self,
        call: HostCall,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<HostOutcome>;
}
