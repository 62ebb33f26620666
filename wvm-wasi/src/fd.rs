// WVM - wvm-wasi
// Module: File Descriptor Table
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The guest's file descriptor table.
//!
//! Fds 0-2 are the host's stdio streams, preopened directories follow
//! from fd 3, and files opened at runtime fill the first free slot.

use std::fs::File;
use std::path::PathBuf;

/// WASI filetype codes (the subset the host reports).
pub const FILETYPE_UNKNOWN: u8 = 0;
pub const FILETYPE_CHARACTER_DEVICE: u8 = 2;
pub const FILETYPE_DIRECTORY: u8 = 3;
pub const FILETYPE_REGULAR_FILE: u8 = 4;
pub const FILETYPE_SYMBOLIC_LINK: u8 = 7;

/// One open descriptor.
#[derive(Debug)]
pub enum FdEntry {
    Stdin,
    Stdout,
    Stderr,
    /// A directory; `preopen` marks entries the guest may enumerate
    /// through `fd_prestat_get`
    Dir { path: PathBuf, preopen: bool },
    File(File),
}

impl FdEntry {
    /// WASI filetype code for this entry.
    #[must_use]
    pub fn filetype(&self) -> u8 {
        match self {
            Self::Stdin | Self::Stdout | Self::Stderr => FILETYPE_CHARACTER_DEVICE,
            Self::Dir { .. } => FILETYPE_DIRECTORY,
            Self::File(_) => FILETYPE_REGULAR_FILE,
        }
    }
}

/// Slot-reusing descriptor table.
#[derive(Debug)]
pub struct FdTable {
    entries: Vec<Option<FdEntry>>,
}

impl FdTable {
    /// Stdio plus one preopened directory entry per path, in order.
    #[must_use]
    pub fn new(preopens: Vec<PathBuf>) -> Self {
        let mut entries = vec![
            Some(FdEntry::Stdin),
            Some(FdEntry::Stdout),
            Some(FdEntry::Stderr),
        ];
        for path in preopens {
            entries.push(Some(FdEntry::Dir {
                path,
                preopen: true,
            }));
        }
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, fd: u32) -> Option<&FdEntry> {
        self.entries.get(fd as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, fd: u32) -> Option<&mut FdEntry> {
        self.entries.get_mut(fd as usize)?.as_mut()
    }

    /// Insert into the first free slot and return its fd.
    pub fn insert(&mut self, entry: FdEntry) -> u32 {
        for (fd, slot) in self.entries.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(entry);
                return fd as u32;
            }
        }
        self.entries.push(Some(entry));
        (self.entries.len() - 1) as u32
    }

    /// Close a descriptor. Returns false if it was not open.
    pub fn close(&mut self, fd: u32) -> bool {
        match self.entries.get_mut(fd as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }
}
