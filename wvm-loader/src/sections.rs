// WVM - wvm-loader
// Module: Section Indexing
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Module header verification and section indexing.
//!
//! One linear pass over the binary records the content byte range of each
//! known section id. At most one occurrence of each non-custom section is
//! supported; custom sections are skipped without inspection.

use wvm_error::{codes, Error, ErrorCategory, Result};
use wvm_format::binary;

/// Byte ranges of every known section, indexed by section id.
#[derive(Debug, Default)]
pub struct SectionIndex {
    ranges: [Option<(usize, usize)>; binary::SECTION_COUNT],
}

impl SectionIndex {
    /// Verify the magic/version header and index all section ranges.
    pub fn scan(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 || bytes[0..4] != binary::WASM_MAGIC {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::INVALID_MAGIC,
                "Invalid module magic bytes",
            ));
        }
        if bytes[4..8] != binary::WASM_VERSION {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::INVALID_VERSION,
                "Unsupported module version",
            ));
        }

        let mut index = Self::default();
        let mut pos = 8;

        while pos < bytes.len() {
            let (id, size, header_len) = binary::read_section_header(bytes, pos)?;
            let start = pos + header_len;
            let end = start + size as usize;
            if end > bytes.len() {
                return Err(Error::truncated("Section extends past end of module"));
            }

            if id == binary::CUSTOM_SECTION_ID {
                // Custom sections carry tooling metadata; skip without parsing.
                pos = end;
                continue;
            }

            let slot = index
                .ranges
                .get_mut(id as usize)
                .ok_or(Error::new(
                    ErrorCategory::Parse,
                    codes::UNKNOWN_SECTION,
                    "Unknown section id",
                ))?;
            if slot.is_some() {
                return Err(Error::new(
                    ErrorCategory::Parse,
                    codes::DUPLICATE_SECTION,
                    "Section id seen more than once",
                ));
            }
            *slot = Some((start, end));

            log::debug!("section {id:#04x}: {size} bytes at offset {start}");
            pos = end;
        }

        Ok(index)
    }

    /// Content bytes of the given section, or `None` if absent.
    #[must_use]
    pub fn get<'a>(&self, bytes: &'a [u8], id: u8) -> Option<&'a [u8]> {
        self.ranges
            .get(id as usize)
            .copied()
            .flatten()
            .map(|(start, end)| &bytes[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<u8> {
        let mut bytes = binary::WASM_MAGIC.to_vec();
        bytes.extend_from_slice(&binary::WASM_VERSION);
        bytes
    }

    #[test]
    fn empty_module() {
        let index = SectionIndex::scan(&header()).unwrap();
        assert!(index.get(&header(), binary::TYPE_SECTION_ID).is_none());
    }

    #[test]
    fn rejects_bad_magic() {
        let err = SectionIndex::scan(b"\x01asm\x01\x00\x00\x00").unwrap_err();
        assert_eq!(err.code, codes::INVALID_MAGIC);
    }

    #[test]
    fn rejects_bad_version() {
        let mut bytes = binary::WASM_MAGIC.to_vec();
        bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]);
        let err = SectionIndex::scan(&bytes).unwrap_err();
        assert_eq!(err.code, codes::INVALID_VERSION);
    }

    #[test]
    fn indexes_section_content() {
        let mut bytes = header();
        bytes.extend_from_slice(&[binary::TYPE_SECTION_ID, 3, 0xAA, 0xBB, 0xCC]);
        let index = SectionIndex::scan(&bytes).unwrap();
        assert_eq!(
            index.get(&bytes, binary::TYPE_SECTION_ID).unwrap(),
            &[0xAA, 0xBB, 0xCC]
        );
    }

    #[test]
    fn skips_custom_sections() {
        let mut bytes = header();
        // custom section: size 5, name "abc" (len 3), one payload byte
        bytes.extend_from_slice(&[binary::CUSTOM_SECTION_ID, 5, 3, b'a', b'b', b'c', 0x00]);
        bytes.extend_from_slice(&[binary::CODE_SECTION_ID, 1, 0x00]);
        let index = SectionIndex::scan(&bytes).unwrap();
        assert_eq!(index.get(&bytes, binary::CODE_SECTION_ID).unwrap(), &[0x00]);
    }

    #[test]
    fn rejects_duplicate_section() {
        let mut bytes = header();
        bytes.extend_from_slice(&[binary::TYPE_SECTION_ID, 1, 0x00]);
        bytes.extend_from_slice(&[binary::TYPE_SECTION_ID, 1, 0x00]);
        let err = SectionIndex::scan(&bytes).unwrap_err();
        assert_eq!(err.code, codes::DUPLICATE_SECTION);
    }

    #[test]
    fn rejects_truncated_section() {
        let mut bytes = header();
        bytes.extend_from_slice(&[binary::TYPE_SECTION_ID, 9, 0x00]);
        let err = SectionIndex::scan(&bytes).unwrap_err();
        assert_eq!(err.code, codes::TRUNCATED_INPUT);
    }
}
