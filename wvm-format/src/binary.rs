// WVM - wvm-format
// Module: Binary Format Constants and Readers
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly binary format constants and primitive readers.
//!
//! All readers take `(bytes, pos)` and return the decoded value together
//! with the number of bytes consumed, so callers advance their own cursor.

use wvm_error::{codes, Error, ErrorCategory, Result};

/// Magic bytes for WebAssembly modules: \0asm
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// WebAssembly binary format version
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// WebAssembly section IDs
pub const CUSTOM_SECTION_ID: u8 = 0x00;
pub const TYPE_SECTION_ID: u8 = 0x01;
pub const IMPORT_SECTION_ID: u8 = 0x02;
pub const FUNCTION_SECTION_ID: u8 = 0x03;
pub const TABLE_SECTION_ID: u8 = 0x04;
pub const MEMORY_SECTION_ID: u8 = 0x05;
pub const GLOBAL_SECTION_ID: u8 = 0x06;
pub const EXPORT_SECTION_ID: u8 = 0x07;
pub const START_SECTION_ID: u8 = 0x08;
pub const ELEMENT_SECTION_ID: u8 = 0x09;
pub const CODE_SECTION_ID: u8 = 0x0A;
pub const DATA_SECTION_ID: u8 = 0x0B;
pub const DATA_COUNT_SECTION_ID: u8 = 0x0C;

/// Number of distinct known section ids (0x00..=0x0C)
pub const SECTION_COUNT: usize = 13;

/// WebAssembly value types
pub const I32_TYPE: u8 = 0x7F;
pub const I64_TYPE: u8 = 0x7E;
pub const F32_TYPE: u8 = 0x7D;
pub const F64_TYPE: u8 = 0x7C;
pub const FUNCREF_TYPE: u8 = 0x70;

/// Block type encoding for an empty (no-result) block
pub const BLOCK_TYPE_EMPTY: u8 = 0x40;

/// WebAssembly control instructions
pub const UNREACHABLE: u8 = 0x00;
pub const NOP: u8 = 0x01;
pub const BLOCK: u8 = 0x02;
pub const LOOP: u8 = 0x03;
pub const IF: u8 = 0x04;
pub const ELSE: u8 = 0x05;
pub const END: u8 = 0x0B;
pub const BR: u8 = 0x0C;
pub const BR_IF: u8 = 0x0D;
pub const BR_TABLE: u8 = 0x0E;
pub const RETURN: u8 = 0x0F;
pub const CALL: u8 = 0x10;
pub const CALL_INDIRECT: u8 = 0x11;

/// WebAssembly parametric instructions
pub const DROP: u8 = 0x1A;
pub const SELECT: u8 = 0x1B;

/// WebAssembly variable instructions
pub const LOCAL_GET: u8 = 0x20;
pub const LOCAL_SET: u8 = 0x21;
pub const LOCAL_TEE: u8 = 0x22;
pub const GLOBAL_GET: u8 = 0x23;
pub const GLOBAL_SET: u8 = 0x24;

/// WebAssembly memory instructions (loads 0x28..=0x35, stores 0x36..=0x3E)
pub const I32_LOAD: u8 = 0x28;
pub const I64_LOAD: u8 = 0x29;
pub const F32_LOAD: u8 = 0x2A;
pub const F64_LOAD: u8 = 0x2B;
pub const I64_LOAD32_U: u8 = 0x35;
pub const I32_STORE: u8 = 0x36;
pub const I64_STORE: u8 = 0x37;
pub const F32_STORE: u8 = 0x38;
pub const F64_STORE: u8 = 0x39;
pub const I64_STORE32: u8 = 0x3E;
pub const MEMORY_SIZE: u8 = 0x3F;
pub const MEMORY_GROW: u8 = 0x40;

/// WebAssembly constant instructions
pub const I32_CONST: u8 = 0x41;
pub const I64_CONST: u8 = 0x42;
pub const F32_CONST: u8 = 0x43;
pub const F64_CONST: u8 = 0x44;

/// Hot integer comparison/arithmetic opcodes the compiler specializes
pub const I32_EQZ: u8 = 0x45;
pub const I32_EQ: u8 = 0x46;
pub const I32_NE: u8 = 0x47;
pub const I32_ADD: u8 = 0x6A;
pub const I32_SUB: u8 = 0x6B;
pub const I32_AND: u8 = 0x71;

/// Sign-extension instructions (0xC0..=0xC4)
pub const I32_EXTEND8_S: u8 = 0xC0;
pub const I64_EXTEND32_S: u8 = 0xC4;

/// Prefix byte for the extended (saturating truncation / bulk memory) ops
pub const FC_PREFIX: u8 = 0xFC;

/// 0xFC sub-opcodes
pub const FC_MEMORY_COPY: u32 = 10;
pub const FC_MEMORY_FILL: u32 = 11;

/// Import/export kind bytes
pub const KIND_FUNCTION: u8 = 0x00;
pub const KIND_TABLE: u8 = 0x01;
pub const KIND_MEMORY: u8 = 0x02;
pub const KIND_GLOBAL: u8 = 0x03;

/// Read a single byte from a byte array
pub fn read_u8(bytes: &[u8], pos: usize) -> Result<(u8, usize)> {
    if pos >= bytes.len() {
        return Err(Error::truncated("Unexpected end of input reading byte"));
    }
    Ok((bytes[pos], 1))
}

/// Read a LEB128 unsigned 32-bit integer from a byte array
pub fn read_leb128_u32(bytes: &[u8], pos: usize) -> Result<(u32, usize)> {
    let mut result = 0u32;
    let mut shift = 0;
    let mut offset = 0;

    loop {
        if pos + offset >= bytes.len() {
            return Err(Error::truncated("Truncated LEB128 integer"));
        }

        let byte = bytes[pos + offset];
        offset += 1;

        // Apply 7 bits from this byte
        result |= u32::from(byte & 0x7F) << shift;
        shift += 7;

        // Check for continuation bit
        if byte & 0x80 == 0 {
            break;
        }

        // Guard against malformed LEB128
        if shift >= 32 {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::LEB_OVERFLOW,
                "LEB128 integer too large",
            ));
        }
    }

    Ok((result, offset))
}

/// Read a LEB128 unsigned 64-bit integer from a byte array
pub fn read_leb128_u64(bytes: &[u8], pos: usize) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;
    let mut offset = 0;

    loop {
        if pos + offset >= bytes.len() {
            return Err(Error::truncated("Truncated LEB128 integer"));
        }

        let byte = bytes[pos + offset];
        offset += 1;

        result |= u64::from(byte & 0x7F) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            break;
        }

        if shift >= 64 {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::LEB_OVERFLOW,
                "LEB128 integer too large",
            ));
        }
    }

    Ok((result, offset))
}

/// Read a LEB128 signed 32-bit integer from a byte array
pub fn read_leb128_i32(bytes: &[u8], pos: usize) -> Result<(i32, usize)> {
    let mut result = 0i32;
    let mut shift = 0;
    let mut offset = 0;
    let mut byte;

    loop {
        if pos + offset >= bytes.len() {
            return Err(Error::truncated("Truncated LEB128 integer"));
        }

        byte = bytes[pos + offset];
        offset += 1;

        result |= i32::from(byte & 0x7F) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            break;
        }

        if shift >= 32 {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::LEB_OVERFLOW,
                "LEB128 integer too large",
            ));
        }
    }

    // Sign extend if needed
    if shift < 32 && (byte & 0x40) != 0 {
        result |= !0 << shift;
    }

    Ok((result, offset))
}

/// Read a LEB128 signed 64-bit integer from a byte array
pub fn read_leb128_i64(bytes: &[u8], pos: usize) -> Result<(i64, usize)> {
    let mut result = 0i64;
    let mut shift = 0;
    let mut offset = 0;
    let mut byte;

    loop {
        if pos + offset >= bytes.len() {
            return Err(Error::truncated("Truncated LEB128 integer"));
        }

        byte = bytes[pos + offset];
        offset += 1;

        result |= i64::from(byte & 0x7F) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            break;
        }

        if shift >= 64 {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::LEB_OVERFLOW,
                "LEB128 integer too large",
            ));
        }
    }

    if shift < 64 && (byte & 0x40) != 0 {
        result |= !0 << shift;
    }

    Ok((result, offset))
}

/// Read a 32-bit IEEE 754 float from a byte array (little-endian)
pub fn read_f32(bytes: &[u8], pos: usize) -> Result<(f32, usize)> {
    if pos + 4 > bytes.len() {
        return Err(Error::truncated("Not enough bytes to read f32"));
    }

    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[pos..pos + 4]);
    Ok((f32::from_le_bytes(buf), 4))
}

/// Read a 64-bit IEEE 754 float from a byte array (little-endian)
pub fn read_f64(bytes: &[u8], pos: usize) -> Result<(f64, usize)> {
    if pos + 8 > bytes.len() {
        return Err(Error::truncated("Not enough bytes to read f64"));
    }

    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[pos..pos + 8]);
    Ok((f64::from_le_bytes(buf), 8))
}

/// Read a length-prefixed UTF-8 string from a byte array
pub fn read_string(bytes: &[u8], pos: usize) -> Result<(&str, usize)> {
    let (str_len, len_size) = read_leb128_u32(bytes, pos)?;
    let str_start = pos + len_size;
    let str_end = str_start + str_len as usize;

    if str_end > bytes.len() {
        return Err(Error::truncated("String exceeds buffer bounds"));
    }

    match core::str::from_utf8(&bytes[str_start..str_end]) {
        Ok(s) => Ok((s, len_size + str_len as usize)),
        Err(_) => Err(Error::new(
            ErrorCategory::Parse,
            codes::INVALID_NAME,
            "Invalid UTF-8 in string",
        )),
    }
}

/// Read a section header (id byte + LEB128 content size)
///
/// Returns `(section_id, content_size, header_size)`.
pub fn read_section_header(bytes: &[u8], pos: usize) -> Result<(u8, u32, usize)> {
    let (id, _) = read_u8(bytes, pos)?;
    let (size, size_len) = read_leb128_u32(bytes, pos + 1)?;
    Ok((id, size, 1 + size_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leb128_u32_single_byte() {
        let (value, len) = read_leb128_u32(&[0x2A], 0).unwrap();
        assert_eq!(value, 42);
        assert_eq!(len, 1);
    }

    #[test]
    fn leb128_u32_multi_byte() {
        // 624485 = 0xE5 0x8E 0x26
        let (value, len) = read_leb128_u32(&[0xE5, 0x8E, 0x26], 0).unwrap();
        assert_eq!(value, 624_485);
        assert_eq!(len, 3);
    }

    #[test]
    fn leb128_u32_truncated() {
        let err = read_leb128_u32(&[0x80], 0).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn leb128_i32_negative() {
        // -1 encodes as 0x7F
        let (value, len) = read_leb128_i32(&[0x7F], 0).unwrap();
        assert_eq!(value, -1);
        assert_eq!(len, 1);

        // -123456 = 0xC0 0xBB 0x78
        let (value, _) = read_leb128_i32(&[0xC0, 0xBB, 0x78], 0).unwrap();
        assert_eq!(value, -123_456);
    }

    #[test]
    fn leb128_i64_round_values() {
        let (value, _) = read_leb128_i64(&[0x7E], 0).unwrap();
        assert_eq!(value, -2);

        // nine payload groups of all-ones: the final byte's bit 6 is set,
        // so the value sign-extends to -1
        let encoded = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let (value, len) = read_leb128_i64(&encoded, 0).unwrap();
        assert_eq!(value, -1);
        assert_eq!(len, 9);

        // i64::MAX needs the full ten bytes, ending in a clear sign bit
        let encoded = [
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
        ];
        let (value, len) = read_leb128_i64(&encoded, 0).unwrap();
        assert_eq!(value, i64::MAX);
        assert_eq!(len, 10);
    }

    #[test]
    fn floats_little_endian() {
        let bytes = 1.5f32.to_le_bytes();
        let (value, len) = read_f32(&bytes, 0).unwrap();
        assert_eq!(value, 1.5);
        assert_eq!(len, 4);

        let bytes = (-2.25f64).to_le_bytes();
        let (value, len) = read_f64(&bytes, 0).unwrap();
        assert_eq!(value, -2.25);
        assert_eq!(len, 8);
    }

    #[test]
    fn string_with_offset() {
        let mut bytes = vec![0xFF, 0xFF];
        bytes.push(5);
        bytes.extend_from_slice(b"_start");
        let (s, consumed) = read_string(&bytes, 2).unwrap();
        assert_eq!(s, "_star");
        assert_eq!(consumed, 6);
    }

    #[test]
    fn section_header() {
        let bytes = [TYPE_SECTION_ID, 0x85, 0x01];
        let (id, size, header) = read_section_header(&bytes, 0).unwrap();
        assert_eq!(id, TYPE_SECTION_ID);
        assert_eq!(size, 133);
        assert_eq!(header, 3);
    }
}
