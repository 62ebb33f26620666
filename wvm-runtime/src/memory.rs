// WVM - wvm-runtime
// Module: Linear Memory
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Guest linear memory.
//!
//! Plain loads and stores index the byte buffer directly: the module
//! producer is trusted, so an out-of-range access panics (the fatal tier)
//! instead of trapping. The operations a guest can use to probe limits
//! (`memory.grow`, `memory.copy`, `memory.fill`) and every access made on
//! behalf of the host bridge are bounds-checked and return errors.

use wvm_error::{codes, Error, ErrorCategory, Result};
use wvm_loader::PAGE_SIZE;

pub use wvm_loader::MAX_PAGES;

/// Growable, page-capped guest memory.
#[derive(Debug)]
pub struct LinearMemory {
    bytes: Vec<u8>,
    max_pages: u32,
}

impl LinearMemory {
    /// Wrap the loader's initial memory image.
    #[must_use]
    pub fn new(image: Vec<u8>, declared_max: Option<u32>) -> Self {
        let max_pages = declared_max.map_or(MAX_PAGES, |m| m.min(MAX_PAGES));
        Self {
            bytes: image,
            max_pages,
        }
    }

    /// Current size in pages.
    #[must_use]
    pub fn pages(&self) -> u32 {
        (self.bytes.len() / PAGE_SIZE) as u32
    }

    /// Current size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the memory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Grow by `delta` pages. Returns the previous page count, or -1 if
    /// the request would exceed the cap. Memory is unchanged on failure.
    pub fn grow(&mut self, delta: u32) -> i32 {
        let old_pages = self.pages();
        let Some(new_pages) = old_pages.checked_add(delta) else {
            return -1;
        };
        if new_pages > self.max_pages {
            return -1;
        }
        self.bytes.resize(new_pages as usize * PAGE_SIZE, 0);
        old_pages as i32
    }

    /// Unchecked little-endian load of `width` bytes (1, 2, 4, or 8).
    #[must_use]
    pub fn load(&self, addr: usize, width: usize) -> u64 {
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(&self.bytes[addr..addr + width]);
        u64::from_le_bytes(buf)
    }

    /// Unchecked little-endian store of the low `width` bytes of `value`.
    pub fn store(&mut self, addr: usize, width: usize, value: u64) {
        self.bytes[addr..addr + width].copy_from_slice(&value.to_le_bytes()[..width]);
    }

    /// Checked read-only view for the host bridge.
    pub fn range(&self, addr: u32, len: u32) -> Result<&[u8]> {
        let start = addr as usize;
        let end = start + len as usize;
        self.bytes.get(start..end).ok_or(Error::new(
            ErrorCategory::Wasi,
            codes::WASI_INVALID_POINTER,
            "Host call argument outside guest memory",
        ))
    }

    /// Checked mutable view for the host bridge.
    pub fn range_mut(&mut self, addr: u32, len: u32) -> Result<&mut [u8]> {
        let start = addr as usize;
        let end = start + len as usize;
        self.bytes.get_mut(start..end).ok_or(Error::new(
            ErrorCategory::Wasi,
            codes::WASI_INVALID_POINTER,
            "Host call argument outside guest memory",
        ))
    }

    /// Checked `memory.copy`.
    pub fn copy(&mut self, dst: u32, src: u32, len: u32) -> Result<()> {
        let (dst, src, len) = (dst as usize, src as usize, len as usize);
        if src + len > self.bytes.len() || dst + len > self.bytes.len() {
            return Err(Error::new(
                ErrorCategory::Runtime,
                codes::MEMORY_OUT_OF_BOUNDS,
                "memory.copy outside linear memory",
            ));
        }
        self.bytes.copy_within(src..src + len, dst);
        Ok(())
    }

    /// Checked `memory.fill`.
    pub fn fill(&mut self, dst: u32, value: u8, len: u32) -> Result<()> {
        let (dst, len) = (dst as usize, len as usize);
        if dst + len > self.bytes.len() {
            return Err(Error::new(
                ErrorCategory::Runtime,
                codes::MEMORY_OUT_OF_BOUNDS,
                "memory.fill outside linear memory",
            ));
        }
        self.bytes[dst..dst + len].fill(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_within_cap_returns_old_pages() {
        let mut memory = LinearMemory::new(vec![0; PAGE_SIZE], None);
        assert_eq!(memory.pages(), 1);
        assert_eq!(memory.grow(2), 1);
        assert_eq!(memory.pages(), 3);
        assert_eq!(memory.len(), 3 * PAGE_SIZE);
    }

    #[test]
    fn grow_past_cap_fails_without_change() {
        let mut memory = LinearMemory::new(vec![0; PAGE_SIZE], Some(2));
        assert_eq!(memory.grow(5), -1);
        assert_eq!(memory.pages(), 1);
        assert_eq!(memory.grow(1), 1);
        assert_eq!(memory.grow(1), -1);
        assert_eq!(memory.pages(), 2);
    }

    #[test]
    fn declared_max_clamped_to_hard_cap() {
        let mut memory = LinearMemory::new(Vec::new(), Some(u32::MAX));
        assert_eq!(memory.grow(MAX_PAGES), 0);
        assert_eq!(memory.grow(1), -1);
    }

    #[test]
    fn load_store_round_trip() {
        let mut memory = LinearMemory::new(vec![0; PAGE_SIZE], None);
        memory.store(8, 4, 0xDEAD_BEEF);
        assert_eq!(memory.load(8, 4), 0xDEAD_BEEF);
        memory.store(16, 8, u64::MAX - 1);
        assert_eq!(memory.load(16, 8), u64::MAX - 1);
        assert_eq!(memory.load(16, 2), 0xFFFE);
    }

    #[test]
    fn checked_ranges() {
        let mut memory = LinearMemory::new(vec![0; 64], None);
        assert!(memory.range(0, 64).is_ok());
        assert!(memory.range(60, 8).is_err());
        memory.range_mut(4, 4).unwrap().copy_from_slice(b"wasm");
        assert_eq!(memory.range(4, 4).unwrap(), b"wasm");
    }

    #[test]
    fn copy_and_fill_bounds() {
        let mut memory = LinearMemory::new(vec![0; 32], None);
        memory.fill(0, 0xAB, 8).unwrap();
        memory.copy(16, 0, 8).unwrap();
        assert_eq!(memory.range(16, 8).unwrap(), &[0xAB; 8]);
        assert!(memory.copy(28, 0, 8).is_err());
        assert!(memory.fill(30, 0, 4).is_err());
    }
}
