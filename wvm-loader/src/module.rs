// WVM - wvm-loader
// Module: Loaded Module Assembly
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The loaded [`Module`]: all tables built, segments applied.

use wvm_error::{codes, Error, ErrorCategory, Result};
use wvm_format::{binary, Width};

use crate::sections::SectionIndex;
use crate::tables::{self, Export, Function, Import, TypeInfo};

/// WebAssembly linear memory page size in bytes.
pub const PAGE_SIZE: usize = 0x10000;

/// Hard cap on linear memory in pages (256 MiB), applied on top of the
/// module's declared limits. The declared minimum must fit under it;
/// the declared maximum is clamped to it at instantiation.
pub const MAX_PAGES: u32 = 4096;

/// Sentinel for an uninitialized indirect-call table slot.
pub const NO_FUNC: u32 = u32::MAX;

/// A fully loaded module.
///
/// Built once at load time; immutable afterwards except through the
/// compiler filling in function entry points and local widths.
#[derive(Debug, Default)]
pub struct Module {
    /// Signature table
    pub types: Vec<TypeInfo>,
    /// Resolved function imports; the array length partitions the
    /// function-index space (ids below it are imports)
    pub imports: Vec<Import>,
    /// Internal functions
    pub functions: Vec<Function>,
    /// Initial global values, one 64-bit slot each
    pub globals: Vec<u64>,
    /// Width of each global (always 32-bit with the current loader)
    pub global_widths: Vec<Width>,
    /// Indirect-call table with element segments applied
    pub table: Vec<u32>,
    /// Declared minimum memory size in pages
    pub memory_min_pages: u32,
    /// Declared maximum memory size in pages, if any
    pub memory_max_pages: Option<u32>,
    /// Initial linear memory image with data segments applied
    pub memory_image: Vec<u8>,
    /// Export section entries
    pub exports: Vec<Export>,
    /// Raw code section bytes for the compiler
    pub code: Vec<u8>,
}

impl Module {
    /// Load a module from raw bytes: index sections, build every table,
    /// and apply element and data segments.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let index = SectionIndex::scan(bytes)?;
        let mut module = Self::default();

        if let Some(section) = index.get(bytes, binary::TYPE_SECTION_ID) {
            module.types = tables::build_types(section)?;
        }
        let type_count = module.types.len() as u32;

        if let Some(section) = index.get(bytes, binary::IMPORT_SECTION_ID) {
            module.imports = tables::build_imports(section, type_count)?;
        }
        if let Some(section) = index.get(bytes, binary::FUNCTION_SECTION_ID) {
            module.functions = tables::build_functions(section, type_count)?;
        }
        if let Some(section) = index.get(bytes, binary::GLOBAL_SECTION_ID) {
            module.build_globals(section)?;
        }
        if let Some(section) = index.get(bytes, binary::TABLE_SECTION_ID) {
            module.build_table(section)?;
        }
        if let Some(section) = index.get(bytes, binary::MEMORY_SECTION_ID) {
            module.build_memory(section)?;
        }
        if let Some(section) = index.get(bytes, binary::ELEMENT_SECTION_ID) {
            module.apply_elements(section)?;
        }
        if let Some(section) = index.get(bytes, binary::DATA_SECTION_ID) {
            module.apply_data(section)?;
        }
        if let Some(section) = index.get(bytes, binary::EXPORT_SECTION_ID) {
            module.exports = tables::build_exports(section)?;
        }
        if let Some(section) = index.get(bytes, binary::CODE_SECTION_ID) {
            module.code = section.to_vec();
        }

        log::info!(
            "loaded module: {} types, {} imports, {} functions, {} globals, table[{}], memory {} pages",
            module.types.len(),
            module.imports.len(),
            module.functions.len(),
            module.globals.len(),
            module.table.len(),
            module.memory_min_pages,
        );
        Ok(module)
    }

    /// Total function-id space size (imports plus internal functions).
    #[must_use]
    pub fn function_count(&self) -> u32 {
        (self.imports.len() + self.functions.len()) as u32
    }

    /// Signature of an absolute function id (import or internal).
    pub fn type_of_function(&self, func_id: u32) -> Result<TypeInfo> {
        let import_count = self.imports.len() as u32;
        let type_idx = if func_id < import_count {
            self.imports[func_id as usize].type_idx
        } else {
            let internal = (func_id - import_count) as usize;
            self.functions
                .get(internal)
                .ok_or(Error::new(
                    ErrorCategory::Compile,
                    codes::INVALID_FUNCTION_INDEX,
                    "Function id out of range",
                ))?
                .type_idx
        };
        Ok(self.types[type_idx as usize])
    }

    /// Resolve the designated start function by export name.
    ///
    /// The start function must be an exported internal function; host
    /// imports cannot be a program entry point.
    pub fn find_start(&self, name: &str) -> Result<u32> {
        let import_count = self.imports.len() as u32;
        for export in &self.exports {
            if export.kind == binary::KIND_FUNCTION && export.name == name {
                if export.index < import_count {
                    return Err(Error::new(
                        ErrorCategory::Runtime,
                        codes::NO_START_FUNCTION,
                        "Start export names an imported function",
                    ));
                }
                return Ok(export.index);
            }
        }
        Err(Error::new(
            ErrorCategory::Runtime,
            codes::NO_START_FUNCTION,
            "Start export not found",
        ))
    }

    fn build_globals(&mut self, bytes: &[u8]) -> Result<()> {
        let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
        for _ in 0..count {
            let (value_type, len) = binary::read_u8(bytes, offset)?;
            offset += len;
            // mutability flag is irrelevant at runtime; all slots are writable
            let (_mutable, len) = binary::read_u8(bytes, offset)?;
            offset += len;

            if value_type != binary::I32_TYPE {
                return Err(Error::new(
                    ErrorCategory::Runtime,
                    codes::UNSUPPORTED_GLOBAL,
                    "Only 32-bit integer globals are supported",
                ));
            }

            let (value, len) = read_i32_const_expr(bytes, offset)?;
            offset += len;
            self.globals.push(value as u32 as u64);
            self.global_widths.push(Width::W32);
        }
        Ok(())
    }

    fn build_table(&mut self, bytes: &[u8]) -> Result<()> {
        let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
        if count > 1 {
            return Err(Error::parse_error("At most one table is supported"));
        }
        if count == 0 {
            return Ok(());
        }

        let (elem_type, len) = binary::read_u8(bytes, offset)?;
        offset += len;
        if elem_type != binary::FUNCREF_TYPE {
            return Err(Error::parse_error("Table element type must be funcref"));
        }

        let (min, _max, _) = read_limits(bytes, offset)?;
        self.table = vec![NO_FUNC; min as usize];
        Ok(())
    }

    fn build_memory(&mut self, bytes: &[u8]) -> Result<()> {
        let (count, offset) = binary::read_leb128_u32(bytes, 0)?;
        if count > 1 {
            return Err(Error::parse_error("At most one memory is supported"));
        }
        if count == 0 {
            return Ok(());
        }

        let (min, max, _) = read_limits(bytes, offset)?;
        if min > MAX_PAGES {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::MEMORY_OUT_OF_BOUNDS,
                "Declared memory minimum exceeds the page cap",
            ));
        }
        self.memory_min_pages = min;
        self.memory_max_pages = max;
        self.memory_image = vec![0; min as usize * PAGE_SIZE];
        Ok(())
    }

    fn apply_elements(&mut self, bytes: &[u8]) -> Result<()> {
        let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
        for _ in 0..count {
            let (flags, len) = binary::read_leb128_u32(bytes, offset)?;
            offset += len;
            if flags != 0 {
                return Err(Error::parse_error(
                    "Only active zero-flag element segments are supported",
                ));
            }

            let (base, len) = read_i32_const_expr(bytes, offset)?;
            offset += len;
            let (entries, len) = binary::read_leb128_u32(bytes, offset)?;
            offset += len;

            for i in 0..entries {
                let (func_id, len) = binary::read_leb128_u32(bytes, offset)?;
                offset += len;
                let slot = base as u32 + i;
                let slot_ref = self.table.get_mut(slot as usize).ok_or(Error::new(
                    ErrorCategory::Parse,
                    codes::TABLE_OUT_OF_BOUNDS,
                    "Element segment writes past the table",
                ))?;
                *slot_ref = func_id;
            }
        }
        Ok(())
    }

    fn apply_data(&mut self, bytes: &[u8]) -> Result<()> {
        let (count, mut offset) = binary::read_leb128_u32(bytes, 0)?;
        for _ in 0..count {
            let (flags, len) = binary::read_leb128_u32(bytes, offset)?;
            offset += len;
            if flags != 0 {
                return Err(Error::parse_error(
                    "Only active zero-flag data segments are supported",
                ));
            }

            let (base, len) = read_i32_const_expr(bytes, offset)?;
            offset += len;
            let (size, len) = binary::read_leb128_u32(bytes, offset)?;
            offset += len;

            let start = base as u32 as usize;
            let end = start + size as usize;
            if offset + size as usize > bytes.len() {
                return Err(Error::truncated("Data segment payload truncated"));
            }
            if end > self.memory_image.len() {
                return Err(Error::new(
                    ErrorCategory::Parse,
                    codes::MEMORY_OUT_OF_BOUNDS,
                    "Data segment writes past initial memory",
                ));
            }
            self.memory_image[start..end].copy_from_slice(&bytes[offset..offset + size as usize]);
            offset += size as usize;
        }
        Ok(())
    }
}

/// Read a `(flag, min, max?)` limits encoding.
fn read_limits(bytes: &[u8], mut offset: usize) -> Result<(u32, Option<u32>, usize)> {
    let (flag, len) = binary::read_u8(bytes, offset)?;
    offset += len;
    let (min, len) = binary::read_leb128_u32(bytes, offset)?;
    offset += len;
    let max = if flag & 1 != 0 {
        let (max, len) = binary::read_leb128_u32(bytes, offset)?;
        offset += len;
        Some(max)
    } else {
        None
    };
    Ok((min, max, offset))
}

/// Read an `i32.const N; end` initializer expression.
fn read_i32_const_expr(bytes: &[u8], mut offset: usize) -> Result<(i32, usize)> {
    let start = offset;
    let (opcode, len) = binary::read_u8(bytes, offset)?;
    offset += len;
    if opcode != binary::I32_CONST {
        return Err(Error::parse_error(
            "Initializer must be a single i32.const",
        ));
    }
    let (value, len) = binary::read_leb128_i32(bytes, offset)?;
    offset += len;
    let (end, len) = binary::read_u8(bytes, offset)?;
    offset += len;
    if end != binary::END {
        return Err(Error::parse_error("Initializer missing end opcode"));
    }
    Ok((value, offset - start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_wat(wat: &str) -> Module {
        let bytes = wat::parse_str(wat).unwrap();
        Module::load(&bytes).unwrap()
    }

    #[test]
    fn loads_globals_table_memory() {
        let module = load_wat(
            r#"(module
                (global (mut i32) (i32.const 7))
                (table 4 funcref)
                (memory 2 8)
                (func $f)
                (elem (i32.const 1) $f)
            )"#,
        );
        assert_eq!(module.globals, vec![7]);
        assert_eq!(module.global_widths, vec![Width::W32]);
        assert_eq!(module.table.len(), 4);
        assert_eq!(module.table[0], NO_FUNC);
        assert_eq!(module.table[1], 0);
        assert_eq!(module.memory_min_pages, 2);
        assert_eq!(module.memory_max_pages, Some(8));
        assert_eq!(module.memory_image.len(), 2 * PAGE_SIZE);
    }

    #[test]
    fn rejects_memory_minimum_above_cap() {
        let bytes = wat::parse_str(r#"(module (memory 4097))"#).unwrap();
        let err = Module::load(&bytes).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn applies_data_segments() {
        let module = load_wat(
            r#"(module
                (memory 1)
                (data (i32.const 16) "hello")
            )"#,
        );
        assert_eq!(&module.memory_image[16..21], b"hello");
        assert_eq!(module.memory_image[21], 0);
    }

    #[test]
    fn rejects_i64_global() {
        let bytes = wat::parse_str(
            r#"(module (global (mut i64) (i64.const 1)))"#,
        )
        .unwrap();
        let err = Module::load(&bytes).unwrap_err();
        assert_eq!(err.code, codes::UNSUPPORTED_GLOBAL);
    }

    #[test]
    fn finds_start_export() {
        let module = load_wat(
            r#"(module
                (import "wasi_snapshot_preview1" "proc_exit" (func (param i32)))
                (func (export "_start"))
            )"#,
        );
        // absolute id 1: one import before it
        assert_eq!(module.find_start("_start").unwrap(), 1);
        assert!(module.find_start("main").is_err());
    }

    #[test]
    fn type_lookup_spans_imports_and_functions() {
        let module = load_wat(
            r#"(module
                (import "wasi_snapshot_preview1" "proc_exit" (func (param i32)))
                (func (param i64) (result i64) local.get 0)
            )"#,
        );
        assert_eq!(module.type_of_function(0).unwrap().param_count, 1);
        let internal = module.type_of_function(1).unwrap();
        assert_eq!(internal.result_width(), Some(Width::W64));
    }
}
