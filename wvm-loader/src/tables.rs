// WVM - wvm-loader
// Module: Type and Import Table Building
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Type, import, function, and export table construction.

use wvm_error::{codes, Error, ErrorCategory, Result};
use wvm_format::{binary, width_of_value_type, Width};

use crate::hostcall::HostCall;

/// A function signature reduced to counts and width bitsets.
///
/// Bit `i` of a width bitset is set when entry `i` is a 64-bit slot.
/// Counts are capped at 32 by the bitset capacity; the builder rejects
/// anything wider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeInfo {
    /// Number of parameters
    pub param_count: u32,
    /// Width bitset for parameters
    pub param_widths: u32,
    /// Number of results (0 or 1)
    pub result_count: u32,
    /// Width bitset for results
    pub result_widths: u32,
}

impl TypeInfo {
    /// Width of parameter `i`.
    #[must_use]
    pub fn param_width(&self, i: u32) -> Width {
        Width::from_bit((self.param_widths >> i) & 1)
    }

    /// Width of the single result, if the signature has one.
    #[must_use]
    pub fn result_width(&self) -> Option<Width> {
        if self.result_count == 0 {
            None
        } else {
            Some(Width::from_bit(self.result_widths & 1))
        }
    }
}

/// A resolved function import.
#[derive(Debug, Clone, Copy)]
pub struct Import {
    /// The host call this import is bound to
    pub host_call: HostCall,
    /// Signature index into the type table
    pub type_idx: u32,
}

/// An internal (non-imported) function.
///
/// `entry_pc` and `local_widths` start empty and are filled in by the
/// bytecode compiler as it walks the code section.
#[derive(Debug, Clone, Default)]
pub struct Function {
    /// Signature index into the type table
    pub type_idx: u32,
    /// Compiled entry point as an (opcode_offset, operand_offset) pair
    pub entry_pc: Option<(u32, u32)>,
    /// Parameter widths followed by declared local widths
    pub local_widths: Vec<Width>,
}

/// An entry of the export section.
#[derive(Debug, Clone)]
pub struct Export {
    /// Export name
    pub name: String,
    /// Export kind byte (function/table/memory/global)
    pub kind: u8,
    /// Index in the kind's namespace
    pub index: u32,
}

fn read_width_list(bytes: &[u8], mut offset: usize) -> Result<(u32, u32, usize)> {
    let (count, len) = binary::read_leb128_u32(bytes, offset)?;
    offset += len;

    if count > 32 {
        return Err(Error::new(
            ErrorCategory::Type,
            codes::SIGNATURE_TOO_WIDE,
            "Signature exceeds 32-entry width bitset capacity",
        ));
    }

    let mut widths = 0u32;
    for i in 0..count {
        let (byte, len) = binary::read_u8(bytes, offset)?;
        offset += len;
        widths |= width_of_value_type(byte)?.bit() << i;
    }

    Ok((count, widths, offset))
}

/// Consume the type section into the signature table.
pub fn build_types(bytes: &[u8]) -> Result<Vec<TypeInfo>> {
    let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
    let mut types = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let (form, len) = binary::read_u8(bytes, offset)?;
        offset += len;
        if form != 0x60 {
            return Err(Error::parse_error("Expected function type form (0x60)"));
        }

        let (param_count, param_widths, next) = read_width_list(bytes, offset)?;
        let (result_count, result_widths, next) = read_width_list(bytes, next)?;
        offset = next;

        if result_count > 1 {
            return Err(Error::new(
                ErrorCategory::Type,
                codes::MULTI_VALUE_RESULT,
                "Multi-value results are not supported",
            ));
        }

        types.push(TypeInfo {
            param_count,
            param_widths,
            result_count,
            result_widths,
        });
    }

    Ok(types)
}

/// Consume the import section, resolving each entry against the closed
/// host call set.
pub fn build_imports(bytes: &[u8], type_count: u32) -> Result<Vec<Import>> {
    let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
    let mut imports = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let (module, len) = binary::read_string(bytes, offset)?;
        offset += len;
        let (name, len) = binary::read_string(bytes, offset)?;
        offset += len;
        let (kind, len) = binary::read_u8(bytes, offset)?;
        offset += len;

        if kind != binary::KIND_FUNCTION {
            return Err(Error::new(
                ErrorCategory::Import,
                codes::UNSUPPORTED_IMPORT_KIND,
                "Only function imports are supported",
            ));
        }

        let host_call = HostCall::resolve(module, name).ok_or(Error::new(
            ErrorCategory::Import,
            codes::UNKNOWN_HOST_CALL,
            "Import does not name a known host call",
        ))?;

        let (type_idx, len) = binary::read_leb128_u32(bytes, offset)?;
        offset += len;
        if type_idx >= type_count {
            return Err(Error::new(
                ErrorCategory::Type,
                codes::INVALID_TYPE_INDEX,
                "Import type index out of range",
            ));
        }

        log::debug!("import {module}.{name} -> {host_call:?} (type {type_idx})");
        imports.push(Import {
            host_call,
            type_idx,
        });
    }

    Ok(imports)
}

/// Consume the function section, assigning each internal function its
/// type index.
pub fn build_functions(bytes: &[u8], type_count: u32) -> Result<Vec<Function>> {
    let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
    let mut functions = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let (type_idx, len) = binary::read_leb128_u32(bytes, offset)?;
        offset += len;
        if type_idx >= type_count {
            return Err(Error::new(
                ErrorCategory::Type,
                codes::INVALID_TYPE_INDEX,
                "Function type index out of range",
            ));
        }
        functions.push(Function {
            type_idx,
            entry_pc: None,
            local_widths: Vec::new(),
        });
    }

    Ok(functions)
}

/// Consume the export section.
pub fn build_exports(bytes: &[u8]) -> Result<Vec<Export>> {
    let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
    let mut exports = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let (name, len) = binary::read_string(bytes, offset)?;
        offset += len;
        let (kind, len) = binary::read_u8(bytes, offset)?;
        offset += len;
        let (index, len) = binary::read_leb128_u32(bytes, offset)?;
        offset += len;
        exports.push(Export {
            name: name.to_owned(),
            kind,
            index,
        });
    }

    Ok(exports)
}
