// WVM - wvm-runtime
// Module: Internal Opcode Set
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The flattened internal bytecode vocabulary.
//!
//! The compiler emits two parallel arrays: one of [`Op`] tags and one of
//! `u32` operand words. Each tag consumes a fixed number of operand words
//! (except `BrTable`, whose first word gives its entry count), so the two
//! cursors of a [`Pc`] always advance in lockstep.

/// Program counter: offsets into the opcode and operand arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pc {
    /// Offset into the opcode array
    pub op: u32,
    /// Offset into the operand array
    pub arg: u32,
}

/// Branch/return result-kind operand values.
pub const RESULT_NONE: u32 = 0;
/// 32-bit result word (re-pushed masked)
pub const RESULT_W32: u32 = 1;
/// 64-bit result word
pub const RESULT_W64: u32 = 2;

/// Internal opcodes.
///
/// The hot subset of source instructions gets a dedicated tag; everything
/// else passes through the `Mem`/`Num` escape tags carrying the original
/// wasm opcode byte (for `0xFC`-prefixed instructions the operand word is
/// `0xFC00 | subopcode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Explicit trap; operands: none
    Unreachable,
    /// Push a 32-bit constant; operands: `[bits]`
    Const32,
    /// Push a 64-bit constant; operands: `[lo, hi]`
    Const64,
    /// Copy a local to the top of stack; operands: `[rel]`
    ///
    /// `rel` is the compile-time distance from the stack top to the
    /// local's slot, so no frame pointer exists at runtime.
    LocalGet,
    /// Pop into a 32-bit local; operands: `[rel]`
    LocalSet32,
    /// Pop into a 64-bit local; operands: `[rel]`
    LocalSet64,
    /// Store top of stack into a 32-bit local without popping; operands: `[rel]`
    LocalTee32,
    /// Store top of stack into a 64-bit local without popping; operands: `[rel]`
    LocalTee64,
    /// Push a global; operands: `[index]`
    GlobalGet,
    /// Pop into a 32-bit global; operands: `[index]`
    GlobalSet32,
    /// Pop into a 64-bit global; operands: `[index]`
    GlobalSet64,
    /// Pop one slot; operands: none
    Drop,
    /// Pop condition and two values, push one; operands: none
    Select,
    /// Unconditional branch; operands: `[target_op, target_arg, adjust, result_kind]`
    Br,
    /// Branch if the popped condition is nonzero; same operands as `Br`
    BrIf,
    /// Branch if the popped condition is zero (the `if` skip); same operands as `Br`
    BrIfZ,
    /// Table branch; operands: `[n, result_kind]` then `n + 1` target triples
    /// `[target_op, target_arg, adjust]` (the last is the default)
    BrTable,
    /// Call by absolute function id; operands: `[func_id]`
    Call,
    /// Call through the indirect table; operands: `[type_idx]`
    CallIndirect,
    /// Return to the saved pc; operands: `[pc_rel, frame_rel, result_kind]`
    Return,
    /// `i32.add` fast path; operands: none
    I32Add,
    /// `i32.sub` fast path; operands: none
    I32Sub,
    /// `i32.and` fast path; operands: none
    I32And,
    /// `i32.eqz` fast path; operands: none
    I32Eqz,
    /// `i32.eq` fast path; operands: none
    I32Eq,
    /// `i32.ne` fast path; operands: none
    I32Ne,
    /// Memory load/store escape; operands: `[wasm_opcode, offset]`
    Mem,
    /// Numeric/miscellaneous escape; operands: `[wasm_opcode]`
    Num,
}
