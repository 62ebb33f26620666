// WVM - wvm-wasi
// Module: WASI Errno Values
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WASI preview1 errno values and the mapping from host I/O errors.

pub const SUCCESS: u16 = 0;
pub const ACCES: u16 = 2;
pub const BADF: u16 = 8;
pub const EXIST: u16 = 20;
pub const INVAL: u16 = 28;
pub const IO: u16 = 29;
pub const ISDIR: u16 = 31;
pub const NOENT: u16 = 44;
pub const NOSYS: u16 = 52;
pub const NOTDIR: u16 = 54;
pub const SPIPE: u16 = 70;
pub const NOTCAPABLE: u16 = 76;

/// Map a host I/O error to the closest WASI errno.
#[must_use]
pub fn from_io(err: &std::io::Error) -> u16 {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::NotFound => NOENT,
        ErrorKind::PermissionDenied => ACCES,
        ErrorKind::AlreadyExists => EXIST,
        ErrorKind::InvalidInput => INVAL,
        _ => IO,
    }
}
