// WVM - wvm-loader
// Module: Host Call Enumeration
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The closed set of host calls the VM supports.
//!
//! Imports resolve against this enumeration at load time; there is no
//! dynamic registration. The WASI-preview1 calls live under the
//! `wasi_snapshot_preview1` module, the two debug-only calls under `env`.

/// Import module name for the WASI call surface.
pub const WASI_MODULE: &str = "wasi_snapshot_preview1";

/// Import module name for the debug-only calls.
pub const ENV_MODULE: &str = "env";

/// A resolved host call id.
///
/// Argument order below is the push order on the guest stack; the bridge
/// pops them in reverse. Every call except `proc_exit` and the debug
/// calls pushes one errno result word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCall {
    /// `args_get(argv: ptr, argv_buf: ptr) -> errno`
    ArgsGet,
    /// `args_sizes_get(argc: ptr, argv_buf_size: ptr) -> errno`
    ArgsSizesGet,
    /// `environ_get(environ: ptr, environ_buf: ptr) -> errno`
    EnvironGet,
    /// `environ_sizes_get(count: ptr, buf_size: ptr) -> errno`
    EnvironSizesGet,
    /// `clock_time_get(id: i32, precision: i64, time: ptr) -> errno`
    ClockTimeGet,
    /// `random_get(buf: ptr, buf_len: i32) -> errno`
    RandomGet,
    /// `fd_prestat_get(fd: i32, prestat: ptr) -> errno`
    FdPrestatGet,
    /// `fd_prestat_dir_name(fd: i32, path: ptr, path_len: i32) -> errno`
    FdPrestatDirName,
    /// `fd_close(fd: i32) -> errno`
    FdClose,
    /// `fd_read(fd: i32, iovs: ptr, iovs_len: i32, nread: ptr) -> errno`
    FdRead,
    /// `fd_write(fd: i32, iovs: ptr, iovs_len: i32, nwritten: ptr) -> errno`
    FdWrite,
    /// `fd_pwrite(fd: i32, iovs: ptr, iovs_len: i32, offset: i64, nwritten: ptr) -> errno`
    FdPwrite,
    /// `fd_filestat_get(fd: i32, buf: ptr) -> errno`
    FdFilestatGet,
    /// `fd_filestat_set_size(fd: i32, size: i64) -> errno`
    FdFilestatSetSize,
    /// `fd_fdstat_get(fd: i32, buf: ptr) -> errno`
    FdFdstatGet,
    /// `path_open(fd, dirflags, path: ptr, path_len, oflags, rights_base: i64, rights_inheriting: i64, fdflags, opened_fd: ptr) -> errno`
    PathOpen,
    /// `path_filestat_get(fd, flags, path: ptr, path_len, buf: ptr) -> errno`
    PathFilestatGet,
    /// `path_create_directory(fd, path: ptr, path_len) -> errno`
    PathCreateDirectory,
    /// `path_rename(old_fd, old_path: ptr, old_len, new_fd, new_path: ptr, new_len) -> errno`
    PathRename,
    /// `proc_exit(code: i32)`, does not return
    ProcExit,
    /// `debug_print(ptr, len)`, writes raw bytes to host stderr
    DebugPrint,
    /// `debug_value(value: i64)`, writes the value to host stderr
    DebugValue,
}

impl HostCall {
    /// Resolve a (module-name, function-name) import pair.
    #[must_use]
    pub fn resolve(module: &str, name: &str) -> Option<Self> {
        match module {
            WASI_MODULE => match name {
                "args_get" => Some(Self::ArgsGet),
                "args_sizes_get" => Some(Self::ArgsSizesGet),
                "environ_get" => Some(Self::EnvironGet),
                "environ_sizes_get" => Some(Self::EnvironSizesGet),
                "clock_time_get" => Some(Self::ClockTimeGet),
                "random_get" => Some(Self::RandomGet),
                "fd_prestat_get" => Some(Self::FdPrestatGet),
                "fd_prestat_dir_name" => Some(Self::FdPrestatDirName),
                "fd_close" => Some(Self::FdClose),
                "fd_read" => Some(Self::FdRead),
                "fd_write" => Some(Self::FdWrite),
                "fd_pwrite" => Some(Self::FdPwrite),
                "fd_filestat_get" => Some(Self::FdFilestatGet),
                "fd_filestat_set_size" => Some(Self::FdFilestatSetSize),
                "fd_fdstat_get" => Some(Self::FdFdstatGet),
                "path_open" => Some(Self::PathOpen),
                "path_filestat_get" => Some(Self::PathFilestatGet),
                "path_create_directory" => Some(Self::PathCreateDirectory),
                "path_rename" => Some(Self::PathRename),
                "proc_exit" => Some(Self::ProcExit),
                _ => None,
            },
            ENV_MODULE => match name {
                "debug_print" => Some(Self::DebugPrint),
                "debug_value" => Some(Self::DebugValue),
                _ => None,
            },
            _ => None,
        }
    }
}
