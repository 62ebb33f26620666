// WVM - wvm-wasi
// Module: WASI Preview1 Host
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The WASI preview1 host-call surface.
//!
//! [`WasiHost`] implements [`HostBridge`] over a fixed call set: argument
//! and environment marshalling, clocks, randomness, a descriptor table
//! with preopened directories, and the path/fd file operations. Host I/O
//! failures map to WASI errno values pushed back to the guest; only
//! structurally invalid guest pointers escalate to fatal errors.
//!
//! Sandboxing is by construction: every path the guest names resolves
//! relative to a preopened directory, and absolute or parent-escaping
//! paths are refused with `NOTCAPABLE`.

#![forbid(unsafe_code)]

pub mod errno;

mod fd;
mod fs;

pub use fd::{FdEntry, FdTable};

use std::io::Write;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::RngCore;
use wvm_error::Result;
use wvm_loader::HostCall;
use wvm_runtime::{HostBridge, HostOutcome, LinearMemory, ValueStack};

/// The WASI host state for one guest instance.
pub struct WasiHost {
    /// NUL-terminated argument strings, `argv[0]` first
    args: Vec<Vec<u8>>,
    /// NUL-terminated `KEY=VALUE` strings
    environ: Vec<Vec<u8>>,
    fds: FdTable,
    /// Monotonic clock origin
    epoch: Instant,
}

impl WasiHost {
    /// Build a host with the given guest argv, environment, and
    /// preopened directories (mapped to fds 3 and up, in order).
    #[must_use]
    pub fn new(args: Vec<String>, env: Vec<(String, String)>, preopens: Vec<PathBuf>) -> Self {
        let args = args
            .into_iter()
            .map(|a| {
                let mut bytes = a.into_bytes();
                bytes.push(0);
                bytes
            })
            .collect();
        let environ = env
            .into_iter()
            .map(|(key, value)| {
                let mut bytes = key.into_bytes();
                bytes.push(b'=');
                bytes.extend_from_slice(value.as_bytes());
                bytes.push(0);
                bytes
            })
            .collect();
        Self {
            args,
            environ,
            fds: FdTable::new(preopens),
            epoch: Instant::now(),
        }
    }

    pub(crate) fn fds(&mut self) -> &mut FdTable {
        &mut self.fds
    }

    fn list_sizes_get(
        list: &[Vec<u8>],
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let buf_size_ptr = stack.pop() as u32;
        let count_ptr = stack.pop() as u32;
        let total: usize = list.iter().map(Vec::len).sum();
        write_u32(memory, count_ptr, list.len() as u32)?;
        write_u32(memory, buf_size_ptr, total as u32)?;
        Ok(errno::SUCCESS)
    }

    fn list_get(
        list: &[Vec<u8>],
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let buf_ptr = stack.pop() as u32;
        let ptrs_ptr = stack.pop() as u32;
        let mut cursor = buf_ptr;
        for (i, item) in list.iter().enumerate() {
            write_u32(memory, ptrs_ptr + 4 * i as u32, cursor)?;
            memory
                .range_mut(cursor, item.len() as u32)?
                .copy_from_slice(item);
            cursor += item.len() as u32;
        }
        Ok(errno::SUCCESS)
    }

    fn clock_time_get(&self, stack: &mut ValueStack, memory: &mut LinearMemory) -> Result<u16> {
        let time_ptr = stack.pop() as u32;
        let _precision = stack.pop();
        let id = stack.pop() as u32;
        let nanos = match id {
            // realtime
            0 => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_nanos() as u64),
            // monotonic
            1 => self.epoch.elapsed().as_nanos() as u64,
            _ => return Ok(errno::INVAL),
        };
        write_u64(memory, time_ptr, nanos)?;
        Ok(errno::SUCCESS)
    }

    fn random_get(stack: &mut ValueStack, memory: &mut LinearMemory) -> Result<u16> {
        let len = stack.pop() as u32;
        let ptr = stack.pop() as u32;
        rand::thread_rng().fill_bytes(memory.range_mut(ptr, len)?);
        Ok(errno::SUCCESS)
    }

    fn debug_print(stack: &mut ValueStack, memory: &LinearMemory) -> Result<()> {
        let len = stack.pop() as u32;
        let ptr = stack.pop() as u32;
        let bytes = memory.range(ptr, len)?;
        let _ = std::io::stderr().write_all(bytes);
        Ok(())
    }
}

impl HostBridge for WasiHost {
    fn dispatch(
        &mut self,
        call: HostCall,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<HostOutcome> {
        log::trace!("host call {call:?}");
        let errno = match call {
            HostCall::ProcExit => {
                let code = stack.pop() as u32;
                return Ok(HostOutcome::Exit(code));
            }
            HostCall::DebugPrint => {
                Self::debug_print(stack, memory)?;
                return Ok(HostOutcome::Continue);
            }
            HostCall::DebugValue => {
                let value = stack.pop() as i64;
                eprintln!("{value}");
                return Ok(HostOutcome::Continue);
            }
            HostCall::ArgsGet => Self::list_get(&self.args, stack, memory)?,
            HostCall::ArgsSizesGet => Self::list_sizes_get(&self.args, stack, memory)?,
            HostCall::EnvironGet => Self::list_get(&self.environ, stack, memory)?,
            HostCall::EnvironSizesGet => Self::list_sizes_get(&self.environ, stack, memory)?,
            HostCall::ClockTimeGet => self.clock_time_get(stack, memory)?,
            HostCall::RandomGet => Self::random_get(stack, memory)?,
            HostCall::FdPrestatGet => self.fd_prestat_get(stack, memory)?,
            HostCall::FdPrestatDirName => self.fd_prestat_dir_name(stack, memory)?,
            HostCall::FdClose => self.fd_close(stack)?,
            HostCall::FdRead => self.fd_read(stack, memory)?,
            HostCall::FdWrite => self.fd_write(stack, memory)?,
            HostCall::FdPwrite => self.fd_pwrite(stack, memory)?,
            HostCall::FdFilestatGet => self.fd_filestat_get(stack, memory)?,
            HostCall::FdFilestatSetSize => self.fd_filestat_set_size(stack)?,
            HostCall::FdFdstatGet => self.fd_fdstat_get(stack, memory)?,
            HostCall::PathOpen => self.path_open(stack, memory)?,
            HostCall::PathFilestatGet => self.path_filestat_get(stack, memory)?,
            HostCall::PathCreateDirectory => self.path_create_directory(stack, memory)?,
            HostCall::PathRename => self.path_rename(stack, memory)?,
        };
        stack.push(u64::from(errno));
        Ok(HostOutcome::Continue)
    }
}

pub(crate) fn write_u32(memory: &mut LinearMemory, addr: u32, value: u32) -> Result<()> {
    memory
        .range_mut(addr, 4)?
        .copy_from_slice(&value.to_le_bytes());
    Ok(())
}

pub(crate) fn write_u64(memory: &mut LinearMemory, addr: u32, value: u64) -> Result<()> {
    memory
        .range_mut(addr, 8)?
        .copy_from_slice(&value.to_le_bytes());
    Ok(())
}
