// WVM - wvm-runtime
// Module: Single-Pass Bytecode Compiler
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Single-pass translation of raw function bodies into the flattened
//! internal bytecode.
//!
//! For each instruction the compiler (a) updates its static model of the
//! operand stack (a width per live slot) and (b) emits zero, one, or
//! two internal opcodes with their operand words. Branch targets inside
//! still-open `block`/`if` constructs are recorded as patch sites on the
//! owning label and rewritten in one pass when the matching `end` (or
//! `else`) is reached. Code after `unreachable`/`br`/`br_table`/`return`
//! is parsed only far enough to keep nesting counters correct and is not
//! emitted.
//!
//! The compiler trusts the producer: it never type-checks beyond the
//! width bookkeeping it needs, and a malformed body surfaces as a
//! compile error, never as a recoverable condition.

use wvm_error::{codes, Error, ErrorCategory, Result};
use wvm_format::{binary, width_of_value_type, Width};
use wvm_loader::Module;

use crate::opcode::{Op, Pc, RESULT_NONE, RESULT_W32, RESULT_W64};

/// The compiled program: two parallel arrays shared by every function.
#[derive(Debug, Default)]
pub struct CompiledProgram {
    /// Opcode tags
    pub ops: Vec<Op>,
    /// Operand words
    pub args: Vec<u32>,
}

/// Compile every function body in the module's code section, recording
/// entry pcs and local widths back into the function table.
pub fn compile_module(module: &mut Module) -> Result<CompiledProgram> {
    let code = std::mem::take(&mut module.code);
    let mut program = CompiledProgram::default();

    let (body_count, mut pos) = binary::read_leb128_u32(&code, 0)?;
    if body_count as usize != module.functions.len() {
        return Err(Error::compile_error(
            "Code section body count does not match the function section",
        ));
    }

    for func_idx in 0..body_count as usize {
        let (body_size, len) = binary::read_leb128_u32(&code, pos)?;
        pos += len;
        let body_end = pos + body_size as usize;
        if body_end > code.len() {
            return Err(Error::truncated("Function body extends past code section"));
        }

        let type_info = module.types[module.functions[func_idx].type_idx as usize];

        // Locals: parameter widths first, then the declared runs.
        let mut locals: Vec<Width> = (0..type_info.param_count)
            .map(|i| type_info.param_width(i))
            .collect();
        let (decl_count, len) = binary::read_leb128_u32(&code, pos)?;
        pos += len;
        for _ in 0..decl_count {
            let (run, len) = binary::read_leb128_u32(&code, pos)?;
            pos += len;
            let (value_type, len) = binary::read_u8(&code, pos)?;
            pos += len;
            let width = width_of_value_type(value_type)?;
            locals.extend(std::iter::repeat(width).take(run as usize));
        }

        let entry = Pc {
            op: program.ops.len() as u32,
            arg: program.args.len() as u32,
        };
        log::trace!("compiling function {func_idx} at pc ({}, {})", entry.op, entry.arg);

        let mut fc = FunctionCompiler {
            module,
            program: &mut program,
            bytes: &code[..body_end],
            pos,
            locals: &locals,
            type_info,
            widths: Vec::new(),
            labels: Vec::new(),
            dead: None,
        };
        fc.compile()?;
        pos = body_end;

        let function = &mut module.functions[func_idx];
        function.entry_pc = Some((entry.op, entry.arg));
        function.local_widths = locals;
    }

    Ok(program)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Func,
    Block,
    Loop,
    If,
}

/// One open structured control construct.
struct Label {
    kind: LabelKind,
    base_depth: usize,
    result: Option<Width>,
    /// Operand-slot indices awaiting this label's end pc
    patch_sites: Vec<usize>,
    /// Pending `if` conditional-skip slot
    else_site: Option<usize>,
    /// Backward target for `loop`
    loop_target: Option<Pc>,
}

struct FunctionCompiler<'a> {
    module: &'a Module,
    program: &'a mut CompiledProgram,
    bytes: &'a [u8],
    pos: usize,
    locals: &'a [Width],
    type_info: wvm_loader::TypeInfo,
    /// Width of every currently-live operand slot; its length is the
    /// stack depth
    widths: Vec<Width>,
    labels: Vec<Label>,
    /// `Some(nesting)` while skipping dead code
    dead: Option<u32>,
}

fn result_kind(width: Option<Width>) -> u32 {
    match width {
        None => RESULT_NONE,
        Some(Width::W32) => RESULT_W32,
        Some(Width::W64) => RESULT_W64,
    }
}

impl FunctionCompiler<'_> {
    fn compile(&mut self) -> Result<()> {
        self.labels.push(Label {
            kind: LabelKind::Func,
            base_depth: 0,
            result: self.type_info.result_width(),
            patch_sites: Vec::new(),
            else_site: None,
            loop_target: None,
        });

        while !self.labels.is_empty() {
            if self.pos >= self.bytes.len() {
                return Err(Error::new(
                    ErrorCategory::Compile,
                    codes::UNTERMINATED_FUNCTION,
                    "Function body ended inside an open label",
                ));
            }
            let opcode = self.bytes[self.pos];
            self.pos += 1;
            self.step(opcode)?;
        }
        Ok(())
    }

    fn step(&mut self, opcode: u8) -> Result<()> {
        match opcode {
            binary::UNREACHABLE => {
                if self.alive() {
                    self.emit(Op::Unreachable, &[]);
                    self.dead = Some(0);
                }
            }
            binary::NOP => {}
            binary::BLOCK | binary::LOOP | binary::IF => self.open_label(opcode)?,
            binary::ELSE => self.handle_else()?,
            binary::END => self.handle_end()?,
            binary::BR => {
                let rel = self.read_u32()?;
                if self.alive() {
                    self.emit_branch(Op::Br, rel)?;
                    self.dead = Some(0);
                }
            }
            binary::BR_IF => {
                let rel = self.read_u32()?;
                if self.alive() {
                    self.pop_width()?; // condition
                    self.emit_branch(Op::BrIf, rel)?;
                }
            }
            binary::BR_TABLE => self.handle_br_table()?,
            binary::RETURN => {
                if self.alive() {
                    self.emit_return(self.widths.len());
                    self.dead = Some(0);
                }
            }
            binary::CALL => {
                let func_id = self.read_u32()?;
                if self.alive() {
                    let callee = self.module.type_of_function(func_id)?;
                    self.apply_call_effect(callee)?;
                    self.emit(Op::Call, &[func_id]);
                }
            }
            binary::CALL_INDIRECT => {
                let type_idx = self.read_u32()?;
                let _table = self.read_u32()?;
                if self.alive() {
                    let callee = *self.module.types.get(type_idx as usize).ok_or(Error::new(
                        ErrorCategory::Type,
                        codes::INVALID_TYPE_INDEX,
                        "call_indirect type index out of range",
                    ))?;
                    self.pop_width()?; // table index
                    self.apply_call_effect(callee)?;
                    self.emit(Op::CallIndirect, &[type_idx]);
                }
            }
            binary::DROP => {
                if self.alive() {
                    self.pop_width()?;
                    self.emit(Op::Drop, &[]);
                }
            }
            binary::SELECT => {
                if self.alive() {
                    self.pop_width()?; // condition
                    self.pop_width()?;
                    let width = self.pop_width()?;
                    self.widths.push(width);
                    self.emit(Op::Select, &[]);
                }
            }
            binary::LOCAL_GET => {
                let idx = self.read_u32()?;
                if self.alive() {
                    let width = self.local_width(idx)?;
                    let rel = self.local_rel(idx);
                    self.widths.push(width);
                    self.emit(Op::LocalGet, &[rel]);
                }
            }
            binary::LOCAL_SET => {
                let idx = self.read_u32()?;
                if self.alive() {
                    let width = self.local_width(idx)?;
                    let rel = self.local_rel(idx);
                    self.pop_width()?;
                    let op = match width {
                        Width::W32 => Op::LocalSet32,
                        Width::W64 => Op::LocalSet64,
                    };
                    self.emit(op, &[rel]);
                }
            }
            binary::LOCAL_TEE => {
                let idx = self.read_u32()?;
                if self.alive() {
                    let width = self.local_width(idx)?;
                    let rel = self.local_rel(idx);
                    let op = match width {
                        Width::W32 => Op::LocalTee32,
                        Width::W64 => Op::LocalTee64,
                    };
                    self.emit(op, &[rel]);
                }
            }
            binary::GLOBAL_GET => {
                let idx = self.read_u32()?;
                if self.alive() {
                    let width = self.global_width(idx)?;
                    self.widths.push(width);
                    self.emit(Op::GlobalGet, &[idx]);
                }
            }
            binary::GLOBAL_SET => {
                let idx = self.read_u32()?;
                if self.alive() {
                    let width = self.global_width(idx)?;
                    self.pop_width()?;
                    let op = match width {
                        Width::W32 => Op::GlobalSet32,
                        Width::W64 => Op::GlobalSet64,
                    };
                    self.emit(op, &[idx]);
                }
            }
            binary::I32_CONST => {
                let (value, len) = binary::read_leb128_i32(self.bytes, self.pos)?;
                self.pos += len;
                if self.alive() {
                    self.widths.push(Width::W32);
                    self.emit(Op::Const32, &[value as u32]);
                }
            }
            binary::I64_CONST => {
                let (value, len) = binary::read_leb128_i64(self.bytes, self.pos)?;
                self.pos += len;
                if self.alive() {
                    self.widths.push(Width::W64);
                    let bits = value as u64;
                    self.emit(Op::Const64, &[bits as u32, (bits >> 32) as u32]);
                }
            }
            binary::F32_CONST => {
                let (value, len) = binary::read_f32(self.bytes, self.pos)?;
                self.pos += len;
                if self.alive() {
                    self.widths.push(Width::W32);
                    self.emit(Op::Const32, &[value.to_bits()]);
                }
            }
            binary::F64_CONST => {
                let (value, len) = binary::read_f64(self.bytes, self.pos)?;
                self.pos += len;
                if self.alive() {
                    self.widths.push(Width::W64);
                    let bits = value.to_bits();
                    self.emit(Op::Const64, &[bits as u32, (bits >> 32) as u32]);
                }
            }
            binary::FC_PREFIX => self.handle_fc()?,
            _ => self.handle_escape(opcode)?,
        }
        Ok(())
    }

    // ----- control flow -----

    fn open_label(&mut self, opcode: u8) -> Result<()> {
        let result = self.read_block_type()?;
        if self.dead.is_some() {
            // inside dead code only the nesting counter matters
            self.dead = self.dead.map(|n| n + 1);
            return Ok(());
        }

        if opcode == binary::IF {
            self.pop_width()?; // condition
        }

        let kind = match opcode {
            binary::BLOCK => LabelKind::Block,
            binary::LOOP => LabelKind::Loop,
            _ => LabelKind::If,
        };
        let mut label = Label {
            kind,
            base_depth: self.widths.len(),
            result,
            patch_sites: Vec::new(),
            else_site: None,
            loop_target: None,
        };

        match kind {
            LabelKind::Loop => {
                // backward target is the loop's own start, known immediately
                label.loop_target = Some(self.here());
            }
            LabelKind::If => {
                // conditional skip to else/end, patched when that pc is known
                self.emit(Op::BrIfZ, &[0, 0, 0, RESULT_NONE]);
                label.else_site = Some(self.program.args.len() - 4);
            }
            LabelKind::Block | LabelKind::Func => {}
        }

        self.labels.push(label);
        Ok(())
    }

    fn handle_else(&mut self) -> Result<()> {
        if let Some(nesting) = self.dead {
            if nesting > 0 {
                return Ok(()); // else of an inner dead if
            }
            self.dead = None;
        } else {
            // jump over the else arm, carrying the then-arm's result
            let rel = 0;
            self.emit_branch(Op::Br, rel)?;
        }

        let label = self.labels.last_mut().ok_or(label_underflow())?;
        if label.kind != LabelKind::If {
            return Err(Error::compile_error("else outside of if"));
        }
        let else_site = label.else_site.take().ok_or(Error::compile_error(
            "if construct has no pending else target",
        ))?;
        let base = label.base_depth;

        let here = self.here();
        self.patch(else_site, here);
        self.widths.truncate(base);
        Ok(())
    }

    fn handle_end(&mut self) -> Result<()> {
        if let Some(nesting) = self.dead {
            if nesting > 0 {
                self.dead = Some(nesting - 1);
                return Ok(());
            }
        }
        let was_alive = self.dead.is_none();
        self.dead = None;

        let label = self.labels.pop().ok_or(label_underflow())?;

        if label.kind == LabelKind::Func {
            let result_count = self.type_info.result_count as usize;
            if was_alive && self.widths.len() != result_count {
                return Err(Error::new(
                    ErrorCategory::Compile,
                    codes::STACK_IMBALANCE,
                    "Stack depth at function end does not match result arity",
                ));
            }
            // forward branches to the function label land on the return op
            let here = self.here();
            for site in &label.patch_sites {
                self.program.args[*site] = here.op;
                self.program.args[*site + 1] = here.arg;
            }
            self.emit_return(result_count);
            return Ok(());
        }

        let here = self.here();
        for site in &label.patch_sites {
            self.program.args[*site] = here.op;
            self.program.args[*site + 1] = here.arg;
        }
        if let Some(site) = label.else_site {
            // if without else: the skip lands here
            self.patch(site, here);
        }

        self.widths.truncate(label.base_depth);
        if let Some(width) = label.result {
            self.widths.push(width);
        }
        Ok(())
    }

    fn handle_br_table(&mut self) -> Result<()> {
        let count = self.read_u32()?;
        let mut targets = Vec::with_capacity(count as usize + 1);
        for _ in 0..=count {
            targets.push(self.read_u32()?);
        }
        if !self.alive() {
            return Ok(());
        }

        self.pop_width()?; // table index

        // all targets share one arity under the producer's typing rules
        let first = self.label_at(targets[0])?;
        let result = if first.kind == LabelKind::Loop {
            None
        } else {
            first.result
        };
        let kind = result_kind(result);
        if result.is_some() {
            self.pop_width()?;
        }
        let depth = self.widths.len();

        self.emit(Op::BrTable, &[count, kind]);
        for rel in targets {
            let idx = self.label_index(rel)?;
            let (target, adjust) = {
                let label = &self.labels[idx];
                let adjust = (depth - label.base_depth) as u32;
                (label.loop_target, adjust)
            };
            match target {
                Some(pc) => self.program.args.extend([pc.op, pc.arg, adjust]),
                None => {
                    let site = self.program.args.len();
                    self.program.args.extend([0, 0, adjust]);
                    self.labels[idx].patch_sites.push(site);
                }
            }
        }

        self.dead = Some(0);
        Ok(())
    }

    /// Emit a branch op targeting the label `rel` levels out.
    ///
    /// For `br_if` the caller pops the condition first; the result word
    /// (if the target carries one) is accounted for here.
    fn emit_branch(&mut self, op: Op, rel: u32) -> Result<()> {
        let idx = self.label_index(rel)?;
        let (kind, adjust, target) = {
            let label = &self.labels[idx];
            let result = if label.kind == LabelKind::Loop {
                None
            } else {
                label.result
            };
            let carried = usize::from(result.is_some());
            let depth = self.widths.len() - carried;
            (
                result_kind(result),
                (depth - label.base_depth) as u32,
                label.loop_target,
            )
        };

        match target {
            Some(pc) => self.emit(op, &[pc.op, pc.arg, adjust, kind]),
            None => {
                self.emit(op, &[0, 0, adjust, kind]);
                let site = self.program.args.len() - 4;
                self.labels[idx].patch_sites.push(site);
            }
        }
        Ok(())
    }

    fn emit_return(&mut self, depth: usize) {
        let kind = result_kind(self.type_info.result_width());
        let pc_rel = (depth + 2) as u32;
        let frame_rel = (self.locals.len() + 2 + depth) as u32;
        self.emit(Op::Return, &[pc_rel, frame_rel, kind]);
    }

    // ----- escape ops -----

    fn handle_escape(&mut self, opcode: u8) -> Result<()> {
        if (binary::I32_LOAD..=binary::I64_STORE32).contains(&opcode) {
            let _align = self.read_u32()?;
            let offset = self.read_u32()?;
            if self.alive() {
                self.apply_effect(memory_effect(opcode))?;
                self.emit(Op::Mem, &[u32::from(opcode), offset]);
            }
            return Ok(());
        }
        if opcode == binary::MEMORY_SIZE || opcode == binary::MEMORY_GROW {
            let _reserved = self.read_u32()?;
            if self.alive() {
                let pops = u32::from(opcode == binary::MEMORY_GROW);
                self.apply_effect((pops, Some(Width::W32)))?;
                self.emit(Op::Num, &[u32::from(opcode)]);
            }
            return Ok(());
        }

        let effect = numeric_effect(opcode).ok_or(Error::new(
            ErrorCategory::Compile,
            codes::UNSUPPORTED_OPCODE,
            "Unknown or unsupported opcode byte",
        ))?;
        if self.alive() {
            self.apply_effect(effect)?;
            match opcode {
                binary::I32_ADD => self.emit(Op::I32Add, &[]),
                binary::I32_SUB => self.emit(Op::I32Sub, &[]),
                binary::I32_AND => self.emit(Op::I32And, &[]),
                binary::I32_EQZ => self.emit(Op::I32Eqz, &[]),
                binary::I32_EQ => self.emit(Op::I32Eq, &[]),
                binary::I32_NE => self.emit(Op::I32Ne, &[]),
                _ => self.emit(Op::Num, &[u32::from(opcode)]),
            }
        }
        Ok(())
    }

    fn handle_fc(&mut self) -> Result<()> {
        let sub = self.read_u32()?;
        let effect = match sub {
            // saturating truncations
            0..=3 => (1, Some(Width::W32)),
            4..=7 => (1, Some(Width::W64)),
            binary::FC_MEMORY_COPY => {
                let _dst_mem = self.read_u32()?;
                let _src_mem = self.read_u32()?;
                (3, None)
            }
            binary::FC_MEMORY_FILL => {
                let _mem = self.read_u32()?;
                (3, None)
            }
            _ => {
                return Err(Error::new(
                    ErrorCategory::Compile,
                    codes::UNSUPPORTED_OPCODE,
                    "Unsupported 0xFC sub-opcode",
                ))
            }
        };
        if self.alive() {
            self.apply_effect(effect)?;
            self.emit(Op::Num, &[0xFC00 | sub]);
        }
        Ok(())
    }

    // ----- bookkeeping helpers -----

    fn alive(&self) -> bool {
        self.dead.is_none()
    }

    fn here(&self) -> Pc {
        Pc {
            op: self.program.ops.len() as u32,
            arg: self.program.args.len() as u32,
        }
    }

    fn emit(&mut self, op: Op, args: &[u32]) {
        self.program.ops.push(op);
        self.program.args.extend_from_slice(args);
    }

    fn patch(&mut self, site: usize, pc: Pc) {
        self.program.args[site] = pc.op;
        self.program.args[site + 1] = pc.arg;
    }

    fn read_u32(&mut self) -> Result<u32> {
        let (value, len) = binary::read_leb128_u32(self.bytes, self.pos)?;
        self.pos += len;
        Ok(value)
    }

    fn read_block_type(&mut self) -> Result<Option<Width>> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(Error::truncated("Missing block type"))?;
        match byte {
            binary::BLOCK_TYPE_EMPTY => {
                self.pos += 1;
                Ok(None)
            }
            binary::I32_TYPE | binary::I64_TYPE | binary::F32_TYPE | binary::F64_TYPE => {
                self.pos += 1;
                Ok(Some(width_of_value_type(byte)?))
            }
            _ => {
                // s33 type index into the signature table; negative values
                // are reserved value types this VM does not support
                let (value, len) = binary::read_leb128_i32(self.bytes, self.pos)?;
                self.pos += len;
                if value < 0 {
                    return Err(Error::new(
                        ErrorCategory::Type,
                        codes::INVALID_TYPE_INDEX,
                        "Unsupported block value type",
                    ));
                }
                let info = self
                    .module
                    .types
                    .get(value as usize)
                    .ok_or(Error::new(
                        ErrorCategory::Type,
                        codes::INVALID_TYPE_INDEX,
                        "Block type index out of range",
                    ))?;
                if info.param_count != 0 {
                    return Err(Error::compile_error(
                        "Block parameters are not supported",
                    ));
                }
                Ok(info.result_width())
            }
        }
    }

    fn label_index(&self, rel: u32) -> Result<usize> {
        self.labels
            .len()
            .checked_sub(1 + rel as usize)
            .ok_or(label_underflow())
    }

    fn label_at(&self, rel: u32) -> Result<&Label> {
        Ok(&self.labels[self.label_index(rel)?])
    }

    fn local_width(&self, idx: u32) -> Result<Width> {
        self.locals.get(idx as usize).copied().ok_or(Error::new(
            ErrorCategory::Compile,
            codes::INVALID_FUNCTION_INDEX,
            "Local index out of range",
        ))
    }

    /// Distance from the runtime stack top to local `idx`, computed from
    /// the frame layout [locals, saved pc (2 words), operands].
    fn local_rel(&self, idx: u32) -> u32 {
        (self.widths.len() + 2 + self.locals.len()) as u32 - idx
    }

    fn global_width(&self, idx: u32) -> Result<Width> {
        self.module
            .global_widths
            .get(idx as usize)
            .copied()
            .ok_or(Error::new(
                ErrorCategory::Runtime,
                codes::INVALID_GLOBAL_INDEX,
                "Global index out of range",
            ))
    }

    fn pop_width(&mut self) -> Result<Width> {
        self.widths.pop().ok_or(Error::new(
            ErrorCategory::Compile,
            codes::OPERAND_UNDERFLOW,
            "Operand stack underflow in compiled code",
        ))
    }

    fn apply_effect(&mut self, (pops, push): (u32, Option<Width>)) -> Result<()> {
        for _ in 0..pops {
            self.pop_width()?;
        }
        if let Some(width) = push {
            self.widths.push(width);
        }
        Ok(())
    }

    fn apply_call_effect(&mut self, callee: wvm_loader::TypeInfo) -> Result<()> {
        for _ in 0..callee.param_count {
            self.pop_width()?;
        }
        if let Some(width) = callee.result_width() {
            self.widths.push(width);
        }
        Ok(())
    }
}

fn label_underflow() -> Error {
    Error::new(
        ErrorCategory::Compile,
        codes::LABEL_UNDERFLOW,
        "Branch label index exceeds the open-label stack",
    )
}

/// Static stack effect of a memory load/store opcode.
fn memory_effect(opcode: u8) -> (u32, Option<Width>) {
    match opcode {
        // loads pop the base address and push the value
        binary::I32_LOAD | binary::F32_LOAD => (1, Some(Width::W32)),
        binary::I64_LOAD | binary::F64_LOAD => (1, Some(Width::W64)),
        0x2C..=0x2F => (1, Some(Width::W32)), // narrow i32 loads
        0x30..=0x35 => (1, Some(Width::W64)), // narrow i64 loads
        // stores pop value and base address
        _ => (2, None),
    }
}

/// Static stack effect of a numeric/parametric opcode, or `None` when the
/// byte is not a supported instruction.
fn numeric_effect(opcode: u8) -> Option<(u32, Option<Width>)> {
    let effect = match opcode {
        binary::I32_EQZ => (1, Some(Width::W32)),
        0x46..=0x4F => (2, Some(Width::W32)), // i32 comparisons
        0x50 => (1, Some(Width::W32)),        // i64.eqz
        0x51..=0x5A => (2, Some(Width::W32)), // i64 comparisons
        0x5B..=0x60 => (2, Some(Width::W32)), // f32 comparisons
        0x61..=0x66 => (2, Some(Width::W32)), // f64 comparisons
        0x67..=0x69 => (1, Some(Width::W32)), // i32 clz/ctz/popcnt
        0x6A..=0x78 => (2, Some(Width::W32)), // i32 binary ops
        0x79..=0x7B => (1, Some(Width::W64)), // i64 clz/ctz/popcnt
        0x7C..=0x8A => (2, Some(Width::W64)), // i64 binary ops
        0x8B..=0x91 => (1, Some(Width::W32)), // f32 unary ops
        0x92..=0x98 => (2, Some(Width::W32)), // f32 binary ops
        0x99..=0x9F => (1, Some(Width::W64)), // f64 unary ops
        0xA0..=0xA6 => (2, Some(Width::W64)), // f64 binary ops
        0xA7 => (1, Some(Width::W32)),        // i32.wrap_i64
        0xA8..=0xAB => (1, Some(Width::W32)), // truncations to i32
        0xAC..=0xB1 => (1, Some(Width::W64)), // extensions/truncations to i64
        0xB2..=0xB6 => (1, Some(Width::W32)), // conversions to f32
        0xB7..=0xBB => (1, Some(Width::W64)), // conversions to f64
        0xBC => (1, Some(Width::W32)),        // i32.reinterpret_f32
        0xBD => (1, Some(Width::W64)),        // i64.reinterpret_f64
        0xBE => (1, Some(Width::W32)),        // f32.reinterpret_i32
        0xBF => (1, Some(Width::W64)),        // f64.reinterpret_i64
        0xC0 | 0xC1 => (1, Some(Width::W32)), // i32 sign extensions
        0xC2..=0xC4 => (1, Some(Width::W64)), // i64 sign extensions
        _ => return None,
    };
    Some(effect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_wat(wat: &str) -> (Module, CompiledProgram) {
        let bytes = wat::parse_str(wat).unwrap();
        let mut module = Module::load(&bytes).unwrap();
        let program = compile_module(&mut module).unwrap();
        (module, program)
    }

    #[test]
    fn straight_line_function() {
        let (module, program) = compile_wat(
            r#"(module (func (result i32)
                i32.const 2
                i32.const 3
                i32.add
            ))"#,
        );
        assert_eq!(module.functions[0].entry_pc, Some((0, 0)));
        assert_eq!(
            program.ops,
            vec![Op::Const32, Op::Const32, Op::I32Add, Op::Return]
        );
        // return encoding: pc_rel = result(1) + 2, frame_rel = locals(0) + 2 + 1
        assert_eq!(program.args, vec![2, 3, 3, 3, RESULT_W32]);
    }

    #[test]
    fn entry_pcs_advance_across_functions() {
        let (module, _) = compile_wat(
            r#"(module
                (func (result i32) i32.const 1)
                (func (param i64) (local f64))
            )"#,
        );
        let first = module.functions[0].entry_pc.unwrap();
        let second = module.functions[1].entry_pc.unwrap();
        assert_eq!(first, (0, 0));
        assert!(second.0 > first.0);
        assert_eq!(
            module.functions[1].local_widths,
            vec![Width::W64, Width::W64]
        );
    }

    #[test]
    fn block_branch_targets_resolve_forward() {
        let (_, program) = compile_wat(
            r#"(module (func (param i32)
                block
                    local.get 0
                    br_if 0
                    i32.const 7
                    drop
                end
            ))"#,
        );
        assert_eq!(
            program.ops,
            vec![Op::LocalGet, Op::BrIf, Op::Const32, Op::Drop, Op::Return]
        );
        // the branch target must be the pc immediately after the block's end
        let (target_op, target_arg) = (program.args[1], program.args[2]);
        assert_eq!(target_op, 4);
        assert_eq!(program.ops[target_op as usize], Op::Return);
        assert_eq!(target_arg, 6); // LocalGet's word, BrIf's 4, Const32's 1
    }

    #[test]
    fn loop_branches_point_backward() {
        let (_, program) = compile_wat(
            r#"(module (func (local i32)
                loop
                    local.get 0
                    br_if 0
                end
            ))"#,
        );
        assert_eq!(program.ops, vec![Op::LocalGet, Op::BrIf, Op::Return]);
        // br_if target is the loop start: pc (0, 0)
        assert_eq!(program.args[1], 0);
        assert_eq!(program.args[2], 0);
    }

    #[test]
    fn if_else_skip_sites_are_patched() {
        let (_, program) = compile_wat(
            r#"(module (func (param i32) (result i32)
                local.get 0
                if (result i32)
                    i32.const 1
                else
                    i32.const 2
                end
            ))"#,
        );
        // ops: LocalGet, BrIfZ, Const32, Br, Const32, Return
        assert_eq!(
            program.ops,
            vec![Op::LocalGet, Op::BrIfZ, Op::Const32, Op::Br, Op::Const32, Op::Return]
        );
        // BrIfZ (args at 1..5) jumps to the else arm's Const32 (op 4)
        assert_eq!(program.args[1], 4);
        // Br (args at 6..10) jumps past the else arm to Return (op 5)
        assert_eq!(program.args[6], 5);
    }

    #[test]
    fn dead_code_is_not_emitted() {
        let (_, program) = compile_wat(
            r#"(module (func (result i32)
                i32.const 1
                return
                i32.const 2
                drop
                i32.const 3
            ))"#,
        );
        assert_eq!(program.ops, vec![Op::Const32, Op::Return, Op::Return]);
    }

    #[test]
    fn dead_code_keeps_nesting_counters() {
        let (_, program) = compile_wat(
            r#"(module (func
                return
                block
                    loop
                        br 0
                    end
                end
            ))"#,
        );
        assert_eq!(program.ops, vec![Op::Return, Op::Return]);
    }

    #[test]
    fn rejects_unbalanced_function() {
        let bytes = wat::parse_str(r#"(module (func (result i32) i32.const 1))"#).unwrap();
        let mut module = Module::load(&bytes).unwrap();
        // corrupt the declared result arity so the body no longer balances
        module.types[0].result_count = 0;
        module.types[0].result_widths = 0;
        let err = compile_module(&mut module).unwrap_err();
        assert_eq!(err.code, codes::STACK_IMBALANCE);
    }

    #[test]
    fn width_variants_follow_locals() {
        let (_, program) = compile_wat(
            r#"(module (func (local i32) (local i64)
                i32.const 1
                local.set 0
                i64.const 1
                local.set 1
            ))"#,
        );
        assert_eq!(
            program.ops,
            vec![
                Op::Const32,
                Op::LocalSet32,
                Op::Const64,
                Op::LocalSet64,
                Op::Return
            ]
        );
    }

    #[test]
    fn narrow_i64_loads_produce_wide_slots() {
        let (_, program) = compile_wat(
            r#"(module (memory 1) (func (result i64)
                i32.const 0
                i64.load8_u
            ))"#,
        );
        assert_eq!(program.ops, vec![Op::Const32, Op::Mem, Op::Return]);
        // the loaded slot is 64-bit wide, so the return must keep the
        // full word rather than masking it
        assert_eq!(&program.args[3..], &[3, 3, RESULT_W64]);
    }

    #[test]
    fn rejects_reserved_block_value_type() {
        let bytes = wat::parse_str(
            r#"(module (func
                block (result i32)
                    i32.const 1
                end
                drop
            ))"#,
        )
        .unwrap();
        let mut module = Module::load(&bytes).unwrap();
        // corrupt the block type into a reserved value type (0x7B)
        let pos = module
            .code
            .windows(2)
            .position(|w| w == [binary::BLOCK, binary::I32_TYPE])
            .unwrap();
        module.code[pos + 1] = 0x7B;
        let err = compile_module(&mut module).unwrap_err();
        assert_eq!(err.category, ErrorCategory::Type);
        assert_eq!(err.code, codes::INVALID_TYPE_INDEX);
    }

    #[test]
    fn call_adjusts_depth_by_callee_signature() {
        let (_, program) = compile_wat(
            r#"(module
                (func $f (param i32 i32) (result i32) i32.const 0)
                (func (result i32)
                    i32.const 1
                    i32.const 2
                    call $f
                )
            )"#,
        );
        // second function: Const32, Const32, Call, Return; the call pops
        // two words and pushes one, so the final return balances
        let call_pos = program.ops.iter().rposition(|op| *op == Op::Call).unwrap();
        assert_eq!(program.ops[call_pos + 1], Op::Return);
    }

    #[test]
    fn br_table_emits_triples() {
        let (_, program) = compile_wat(
            r#"(module (func (param i32)
                block
                    block
                        local.get 0
                        br_table 0 1 0
                    end
                end
            ))"#,
        );
        let pos = program.ops.iter().position(|op| *op == Op::BrTable).unwrap();
        assert_eq!(program.ops[pos], Op::BrTable);
        // LocalGet consumed one arg word; BrTable args follow
        assert_eq!(program.args[1], 2); // n = 2 non-default entries
        assert_eq!(program.args[2], RESULT_NONE);
        // three triples, all landing on the Return op
        let ret = (program.ops.len() - 1) as u32;
        assert_eq!(program.args[3], ret);
        assert_eq!(program.args[6], ret);
        assert_eq!(program.args[9], ret);
    }
}
