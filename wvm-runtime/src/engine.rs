// WVM - wvm-runtime
// Module: Execution Engine
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The interpreter loop.
//!
//! All state lives in one [`ValueStack`]: each frame is the callee's
//! locals (parameters first), the caller's saved program counter in two
//! slots, then the frame's operands. Locals are reached through the
//! compile-time relative offsets baked into `LocalGet`/`LocalSet`, so the
//! engine carries no frame pointer. The start frame saves a sentinel pc;
//! returning through it ends the run with exit code 0.
//!
//! Guest-visible traps (division by zero, unreachable, stale indirect
//! slots) surface as errors from [`Engine::run`]. Host calls go through
//! the [`HostBridge`]; `proc_exit` short-circuits the loop with the
//! guest's exit code.

use wvm_error::{codes, Error, ErrorCategory, Result};
use wvm_loader::{Module, NO_FUNC};

use crate::compiler::CompiledProgram;
use crate::host::{HostBridge, HostOutcome};
use crate::memory::LinearMemory;
use crate::opcode::{Op, Pc, RESULT_NONE, RESULT_W32};
use crate::stack::ValueStack;

/// Saved-pc sentinel marking the bottom frame.
const SENTINEL_PC: u64 = u32::MAX as u64;

enum CallFlow {
    /// Continue dispatch at this pc
    At(Pc),
    /// `proc_exit` was called
    Exit(u32),
}

/// One instantiated module ready to run.
pub struct Engine<'m> {
    module: &'m Module,
    program: &'m CompiledProgram,
    stack: ValueStack,
    memory: LinearMemory,
    globals: Vec<u64>,
    executed: u64,
}

impl<'m> Engine<'m> {
    /// Instantiate: fresh memory from the module's initial image, globals
    /// at their initializer values, empty stack.
    #[must_use]
    pub fn new(module: &'m Module, program: &'m CompiledProgram) -> Self {
        Self {
            module,
            program,
            stack: ValueStack::new(),
            memory: LinearMemory::new(module.memory_image.clone(), module.memory_max_pages),
            globals: module.globals.clone(),
            executed: 0,
        }
    }

    /// Instructions dispatched so far.
    #[must_use]
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Run the function with absolute id `start` to completion.
    ///
    /// Returns the guest's `proc_exit` code, or 0 if the start function
    /// returns normally.
    pub fn run(&mut self, host: &mut dyn HostBridge, start: u32) -> Result<u32> {
        let import_count = self.module.imports.len() as u32;
        if start < import_count {
            return Err(Error::new(
                ErrorCategory::Runtime,
                codes::NO_START_FUNCTION,
                "Start function resolves to a host import",
            ));
        }
        let function = &self.module.functions[(start - import_count) as usize];
        self.stack.push_zeroed(function.local_widths.len());
        self.stack.push(SENTINEL_PC);
        self.stack.push(SENTINEL_PC);
        let (entry_op, entry_arg) = function.entry_pc.ok_or(no_body())?;
        let mut pc = Pc {
            op: entry_op,
            arg: entry_arg,
        };
        log::debug!("entering start function {start} at pc ({entry_op}, {entry_arg})");

        loop {
            let op = self.program.ops[pc.op as usize];
            self.executed += 1;
            match op {
                Op::Unreachable => {
                    return Err(Error::new(
                        ErrorCategory::Runtime,
                        codes::UNREACHABLE_EXECUTED,
                        "unreachable instruction executed",
                    ))
                }
                Op::Const32 => {
                    self.stack.push(u64::from(self.arg(pc, 0)));
                    pc = pc.next(1);
                }
                Op::Const64 => {
                    let lo = u64::from(self.arg(pc, 0));
                    let hi = u64::from(self.arg(pc, 1));
                    self.stack.push(lo | (hi << 32));
                    pc = pc.next(2);
                }
                Op::LocalGet => {
                    let value = self.stack.from_top(self.arg(pc, 0));
                    self.stack.push(value);
                    pc = pc.next(1);
                }
                Op::LocalSet32 => {
                    let rel = self.arg(pc, 0);
                    let value = self.stack.pop() & 0xFFFF_FFFF;
                    self.stack.set_from_top(rel - 1, value);
                    pc = pc.next(1);
                }
                Op::LocalSet64 => {
                    let rel = self.arg(pc, 0);
                    let value = self.stack.pop();
                    self.stack.set_from_top(rel - 1, value);
                    pc = pc.next(1);
                }
                Op::LocalTee32 => {
                    let rel = self.arg(pc, 0);
                    let value = self.stack.top() & 0xFFFF_FFFF;
                    self.stack.set_from_top(rel, value);
                    pc = pc.next(1);
                }
                Op::LocalTee64 => {
                    let rel = self.arg(pc, 0);
                    let value = self.stack.top();
                    self.stack.set_from_top(rel, value);
                    pc = pc.next(1);
                }
                Op::GlobalGet => {
                    self.stack.push(self.globals[self.arg(pc, 0) as usize]);
                    pc = pc.next(1);
                }
                Op::GlobalSet32 => {
                    let idx = self.arg(pc, 0) as usize;
                    self.globals[idx] = self.stack.pop() & 0xFFFF_FFFF;
                    pc = pc.next(1);
                }
                Op::GlobalSet64 => {
                    let idx = self.arg(pc, 0) as usize;
                    self.globals[idx] = self.stack.pop();
                    pc = pc.next(1);
                }
                Op::Drop => {
                    self.stack.pop();
                    pc = pc.next(0);
                }
                Op::Select => {
                    let cond = self.stack.pop();
                    let on_zero = self.stack.pop();
                    let on_nonzero = self.stack.pop();
                    self.stack
                        .push(if cond != 0 { on_nonzero } else { on_zero });
                    pc = pc.next(0);
                }
                Op::Br => {
                    pc = self.take_branch(
                        Pc {
                            op: self.arg(pc, 0),
                            arg: self.arg(pc, 1),
                        },
                        self.arg(pc, 2),
                        self.arg(pc, 3),
                    );
                }
                Op::BrIf => {
                    if self.stack.pop() != 0 {
                        pc = self.take_branch(
                            Pc {
                                op: self.arg(pc, 0),
                                arg: self.arg(pc, 1),
                            },
                            self.arg(pc, 2),
                            self.arg(pc, 3),
                        );
                    } else {
                        pc = pc.next(4);
                    }
                }
                Op::BrIfZ => {
                    if self.stack.pop() == 0 {
                        pc = self.take_branch(
                            Pc {
                                op: self.arg(pc, 0),
                                arg: self.arg(pc, 1),
                            },
                            self.arg(pc, 2),
                            self.arg(pc, 3),
                        );
                    } else {
                        pc = pc.next(4);
                    }
                }
                Op::BrTable => {
                    let n = self.arg(pc, 0);
                    let kind = self.arg(pc, 1);
                    let idx = (self.stack.pop() as u32).min(n);
                    let entry = 2 + idx * 3;
                    pc = self.take_branch(
                        Pc {
                            op: self.arg(pc, entry),
                            arg: self.arg(pc, entry + 1),
                        },
                        self.arg(pc, entry + 2),
                        kind,
                    );
                }
                Op::Call => {
                    let func_id = self.arg(pc, 0);
                    match self.invoke(func_id, pc.next(1), host)? {
                        CallFlow::At(next) => pc = next,
                        CallFlow::Exit(code) => return Ok(code),
                    }
                }
                Op::CallIndirect => {
                    let type_idx = self.arg(pc, 0);
                    let idx = self.stack.pop() as u32;
                    let func_id = *self.module.table.get(idx as usize).ok_or(Error::new(
                        ErrorCategory::Runtime,
                        codes::TABLE_OUT_OF_BOUNDS,
                        "call_indirect index past the table",
                    ))?;
                    if func_id == NO_FUNC {
                        return Err(Error::new(
                            ErrorCategory::Runtime,
                            codes::STALE_TABLE_SLOT,
                            "call_indirect through an uninitialized table slot",
                        ));
                    }
                    if self.module.type_of_function(func_id)?
                        != self.module.types[type_idx as usize]
                    {
                        return Err(Error::new(
                            ErrorCategory::Runtime,
                            codes::EXECUTION_ERROR,
                            "call_indirect signature mismatch",
                        ));
                    }
                    match self.invoke(func_id, pc.next(1), host)? {
                        CallFlow::At(next) => pc = next,
                        CallFlow::Exit(code) => return Ok(code),
                    }
                }
                Op::Return => {
                    let pc_rel = self.arg(pc, 0);
                    let frame_rel = self.arg(pc, 1);
                    let kind = self.arg(pc, 2);
                    let ret_op = self.stack.from_top(pc_rel);
                    let ret_arg = self.stack.from_top(pc_rel - 1);
                    let result = (kind != RESULT_NONE).then(|| self.stack.top());
                    let base = self.stack.len() - frame_rel as usize;
                    self.stack.truncate(base);
                    if let Some(value) = result {
                        self.stack.push(if kind == RESULT_W32 {
                            value & 0xFFFF_FFFF
                        } else {
                            value
                        });
                    }
                    if ret_op == SENTINEL_PC {
                        return Ok(0);
                    }
                    pc = Pc {
                        op: ret_op as u32,
                        arg: ret_arg as u32,
                    };
                }
                Op::I32Add => {
                    let b = self.pop_u32();
                    let a = self.pop_u32();
                    self.push_u32(a.wrapping_add(b));
                    pc = pc.next(0);
                }
                Op::I32Sub => {
                    let b = self.pop_u32();
                    let a = self.pop_u32();
                    self.push_u32(a.wrapping_sub(b));
                    pc = pc.next(0);
                }
                Op::I32And => {
                    let b = self.pop_u32();
                    let a = self.pop_u32();
                    self.push_u32(a & b);
                    pc = pc.next(0);
                }
                Op::I32Eqz => {
                    let a = self.pop_u32();
                    self.push_bool(a == 0);
                    pc = pc.next(0);
                }
                Op::I32Eq => {
                    let b = self.pop_u32();
                    let a = self.pop_u32();
                    self.push_bool(a == b);
                    pc = pc.next(0);
                }
                Op::I32Ne => {
                    let b = self.pop_u32();
                    let a = self.pop_u32();
                    self.push_bool(a != b);
                    pc = pc.next(0);
                }
                Op::Mem => {
                    let opcode = self.arg(pc, 0) as u8;
                    let offset = self.arg(pc, 1);
                    self.exec_mem(opcode, offset);
                    pc = pc.next(2);
                }
                Op::Num => {
                    let word = self.arg(pc, 0);
                    self.exec_num(word)?;
                    pc = pc.next(1);
                }
            }
        }
    }

    fn arg(&self, pc: Pc, i: u32) -> u32 {
        self.program.args[(pc.arg + i) as usize]
    }

    /// Discard `adjust` slots (carrying the branch result over them) and
    /// land at `target`.
    fn take_branch(&mut self, target: Pc, adjust: u32, kind: u32) -> Pc {
        let result = (kind != RESULT_NONE).then(|| self.stack.pop());
        let len = self.stack.len();
        self.stack.truncate(len - adjust as usize);
        if let Some(value) = result {
            self.stack.push(if kind == RESULT_W32 {
                value & 0xFFFF_FFFF
            } else {
                value
            });
        }
        target
    }

    /// Dispatch a call: host imports go to the bridge, internal functions
    /// get a new frame pushed over their arguments.
    fn invoke(&mut self, func_id: u32, ret: Pc, host: &mut dyn HostBridge) -> Result<CallFlow> {
        let import_count = self.module.imports.len() as u32;
        if func_id < import_count {
            let call = self.module.imports[func_id as usize].host_call;
            return match host.dispatch(call, &mut self.stack, &mut self.memory)? {
                HostOutcome::Continue => Ok(CallFlow::At(ret)),
                HostOutcome::Exit(code) => Ok(CallFlow::Exit(code)),
            };
        }

        let function = &self.module.functions[(func_id - import_count) as usize];
        let info = self.module.types[function.type_idx as usize];
        let declared = function.local_widths.len() - info.param_count as usize;
        self.stack.push_zeroed(declared);
        self.stack.push(u64::from(ret.op));
        self.stack.push(u64::from(ret.arg));
        let (op, arg) = function.entry_pc.ok_or(no_body())?;
        Ok(CallFlow::At(Pc { op, arg }))
    }

    // ----- memory escape -----

    fn exec_mem(&mut self, opcode: u8, offset: u32) {
        match opcode {
            0x28 | 0x2A => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 4);
                self.stack.push(value);
            }
            0x29 | 0x2B => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 8);
                self.stack.push(value);
            }
            0x2C => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 1) as i8;
                self.push_i32(i32::from(value));
            }
            0x2D => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 1);
                self.stack.push(value);
            }
            0x2E => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 2) as i16;
                self.push_i32(i32::from(value));
            }
            0x2F => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 2);
                self.stack.push(value);
            }
            0x30 => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 1) as i8;
                self.push_i64(i64::from(value));
            }
            0x31 => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 1);
                self.stack.push(value);
            }
            0x32 => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 2) as i16;
                self.push_i64(i64::from(value));
            }
            0x33 => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 2);
                self.stack.push(value);
            }
            0x34 => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 4) as u32 as i32;
                self.push_i64(i64::from(value));
            }
            0x35 => {
                let addr = self.addr(offset);
                let value = self.memory.load(addr, 4);
                self.stack.push(value);
            }
            0x36 | 0x38 => {
                let value = self.stack.pop();
                let addr = self.addr(offset);
                self.memory.store(addr, 4, value);
            }
            0x37 | 0x39 => {
                let value = self.stack.pop();
                let addr = self.addr(offset);
                self.memory.store(addr, 8, value);
            }
            0x3A | 0x3C => {
                let value = self.stack.pop();
                let addr = self.addr(offset);
                self.memory.store(addr, 1, value);
            }
            0x3B | 0x3D => {
                let value = self.stack.pop();
                let addr = self.addr(offset);
                self.memory.store(addr, 2, value);
            }
            0x3E => {
                let value = self.stack.pop();
                let addr = self.addr(offset);
                self.memory.store(addr, 4, value);
            }
            _ => unreachable!("non-memory opcode behind Mem tag"),
        }
    }

    fn addr(&mut self, offset: u32) -> usize {
        let base = self.stack.pop() as u32;
        base as usize + offset as usize
    }

    // ----- numeric escape -----

    #[allow(clippy::too_many_lines)]
    fn exec_num(&mut self, word: u32) -> Result<()> {
        if word & 0xFF00 == 0xFC00 {
            return self.exec_misc(word & 0xFF);
        }
        let opcode = word as u8;
        match opcode {
            0x3F => {
                let pages = self.memory.pages();
                self.push_u32(pages);
            }
            0x40 => {
                let delta = self.pop_u32();
                let result = self.memory.grow(delta);
                self.push_i32(result);
            }
            0x45 => {
                let a = self.pop_u32();
                self.push_bool(a == 0);
            }
            0x46..=0x4F => {
                let (a, b) = self.pop2_i32();
                self.push_bool(match opcode {
                    0x46 => a == b,
                    0x47 => a != b,
                    0x48 => a < b,
                    0x49 => (a as u32) < (b as u32),
                    0x4A => a > b,
                    0x4B => (a as u32) > (b as u32),
                    0x4C => a <= b,
                    0x4D => (a as u32) <= (b as u32),
                    0x4E => a >= b,
                    _ => (a as u32) >= (b as u32),
                });
            }
            0x50 => {
                let a = self.stack.pop();
                self.push_bool(a == 0);
            }
            0x51..=0x5A => {
                let (a, b) = self.pop2_i64();
                self.push_bool(match opcode {
                    0x51 => a == b,
                    0x52 => a != b,
                    0x53 => a < b,
                    0x54 => (a as u64) < (b as u64),
                    0x55 => a > b,
                    0x56 => (a as u64) > (b as u64),
                    0x57 => a <= b,
                    0x58 => (a as u64) <= (b as u64),
                    0x59 => a >= b,
                    _ => (a as u64) >= (b as u64),
                });
            }
            0x5B..=0x60 => {
                let (a, b) = self.pop2_f32();
                self.push_bool(match opcode {
                    0x5B => a == b,
                    0x5C => a != b,
                    0x5D => a < b,
                    0x5E => a > b,
                    0x5F => a <= b,
                    _ => a >= b,
                });
            }
            0x61..=0x66 => {
                let (a, b) = self.pop2_f64();
                self.push_bool(match opcode {
                    0x61 => a == b,
                    0x62 => a != b,
                    0x63 => a < b,
                    0x64 => a > b,
                    0x65 => a <= b,
                    _ => a >= b,
                });
            }
            0x67 => {
                let a = self.pop_u32();
                self.push_u32(a.leading_zeros());
            }
            0x68 => {
                let a = self.pop_u32();
                self.push_u32(a.trailing_zeros());
            }
            0x69 => {
                let a = self.pop_u32();
                self.push_u32(a.count_ones());
            }
            0x6A..=0x78 => {
                let (a, b) = self.pop2_i32();
                let result = match opcode {
                    0x6A => a.wrapping_add(b),
                    0x6B => a.wrapping_sub(b),
                    0x6C => a.wrapping_mul(b),
                    0x6D => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        if a == i32::MIN && b == -1 {
                            return Err(int_overflow());
                        }
                        a / b
                    }
                    0x6E => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        ((a as u32) / (b as u32)) as i32
                    }
                    0x6F => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        a.wrapping_rem(b)
                    }
                    0x70 => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        ((a as u32) % (b as u32)) as i32
                    }
                    0x71 => a & b,
                    0x72 => a | b,
                    0x73 => a ^ b,
                    0x74 => a.wrapping_shl(b as u32),
                    0x75 => a.wrapping_shr(b as u32),
                    0x76 => ((a as u32).wrapping_shr(b as u32)) as i32,
                    0x77 => a.rotate_left(b as u32 & 31),
                    _ => a.rotate_right(b as u32 & 31),
                };
                self.push_i32(result);
            }
            0x79 => {
                let a = self.stack.pop();
                self.push_u64(u64::from(a.leading_zeros()));
            }
            0x7A => {
                let a = self.stack.pop();
                self.push_u64(u64::from(a.trailing_zeros()));
            }
            0x7B => {
                let a = self.stack.pop();
                self.push_u64(u64::from(a.count_ones()));
            }
            0x7C..=0x8A => {
                let (a, b) = self.pop2_i64();
                let result = match opcode {
                    0x7C => a.wrapping_add(b),
                    0x7D => a.wrapping_sub(b),
                    0x7E => a.wrapping_mul(b),
                    0x7F => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        if a == i64::MIN && b == -1 {
                            return Err(int_overflow());
                        }
                        a / b
                    }
                    0x80 => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        ((a as u64) / (b as u64)) as i64
                    }
                    0x81 => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        a.wrapping_rem(b)
                    }
                    0x82 => {
                        if b == 0 {
                            return Err(div_by_zero());
                        }
                        ((a as u64) % (b as u64)) as i64
                    }
                    0x83 => a & b,
                    0x84 => a | b,
                    0x85 => a ^ b,
                    0x86 => a.wrapping_shl(b as u32),
                    0x87 => a.wrapping_shr(b as u32),
                    0x88 => ((a as u64).wrapping_shr(b as u32)) as i64,
                    0x89 => a.rotate_left(b as u32 & 63),
                    _ => a.rotate_right(b as u32 & 63),
                };
                self.push_i64(result);
            }
            0x8B..=0x91 => {
                let a = self.pop_f32();
                self.push_f32(match opcode {
                    0x8B => a.abs(),
                    0x8C => -a,
                    0x8D => a.ceil(),
                    0x8E => a.floor(),
                    0x8F => a.trunc(),
                    0x90 => a.round_ties_even(),
                    _ => a.sqrt(),
                });
            }
            0x92..=0x98 => {
                let (a, b) = self.pop2_f32();
                self.push_f32(match opcode {
                    0x92 => a + b,
                    0x93 => a - b,
                    0x94 => a * b,
                    0x95 => a / b,
                    0x96 => fmin32(a, b),
                    0x97 => fmax32(a, b),
                    _ => a.copysign(b),
                });
            }
            0x99..=0x9F => {
                let a = self.pop_f64();
                self.push_f64(match opcode {
                    0x99 => a.abs(),
                    0x9A => -a,
                    0x9B => a.ceil(),
                    0x9C => a.floor(),
                    0x9D => a.trunc(),
                    0x9E => a.round_ties_even(),
                    _ => a.sqrt(),
                });
            }
            0xA0..=0xA6 => {
                let (a, b) = self.pop2_f64();
                self.push_f64(match opcode {
                    0xA0 => a + b,
                    0xA1 => a - b,
                    0xA2 => a * b,
                    0xA3 => a / b,
                    0xA4 => fmin64(a, b),
                    0xA5 => fmax64(a, b),
                    _ => a.copysign(b),
                });
            }
            0xA7 => {
                let a = self.stack.pop();
                self.push_u32(a as u32);
            }
            0xA8 => {
                let a = self.pop_f32();
                self.push_i32(a as i32);
            }
            0xA9 => {
                let a = self.pop_f32();
                self.push_u32(a as u32);
            }
            0xAA => {
                let a = self.pop_f64();
                self.push_i32(a as i32);
            }
            0xAB => {
                let a = self.pop_f64();
                self.push_u32(a as u32);
            }
            0xAC => {
                let a = self.pop_i32();
                self.push_i64(i64::from(a));
            }
            0xAD => {
                let a = self.pop_u32();
                self.push_u64(u64::from(a));
            }
            0xAE => {
                let a = self.pop_f32();
                self.push_i64(a as i64);
            }
            0xAF => {
                let a = self.pop_f32();
                self.push_u64(a as u64);
            }
            0xB0 => {
                let a = self.pop_f64();
                self.push_i64(a as i64);
            }
            0xB1 => {
                let a = self.pop_f64();
                self.push_u64(a as u64);
            }
            0xB2 => {
                let a = self.pop_i32();
                self.push_f32(a as f32);
            }
            0xB3 => {
                let a = self.pop_u32();
                self.push_f32(a as f32);
            }
            0xB4 => {
                let a = self.pop_i64();
                self.push_f32(a as f32);
            }
            0xB5 => {
                let a = self.stack.pop();
                self.push_f32(a as f32);
            }
            0xB6 => {
                let a = self.pop_f64();
                self.push_f32(a as f32);
            }
            0xB7 => {
                let a = self.pop_i32();
                self.push_f64(f64::from(a));
            }
            0xB8 => {
                let a = self.pop_u32();
                self.push_f64(f64::from(a));
            }
            0xB9 => {
                let a = self.pop_i64();
                self.push_f64(a as f64);
            }
            0xBA => {
                let a = self.stack.pop();
                self.push_f64(a as f64);
            }
            0xBB => {
                let a = self.pop_f32();
                self.push_f64(f64::from(a));
            }
            // reinterpretations are identities on 64-bit slots
            0xBC..=0xBF => {}
            0xC0 => {
                let a = self.pop_u32();
                self.push_i32(i32::from(a as i8));
            }
            0xC1 => {
                let a = self.pop_u32();
                self.push_i32(i32::from(a as i16));
            }
            0xC2 => {
                let a = self.stack.pop();
                self.push_i64(i64::from(a as i8));
            }
            0xC3 => {
                let a = self.stack.pop();
                self.push_i64(i64::from(a as i16));
            }
            0xC4 => {
                let a = self.stack.pop();
                self.push_i64(i64::from(a as i32));
            }
            _ => unreachable!("non-numeric opcode behind Num tag"),
        }
        Ok(())
    }

    fn exec_misc(&mut self, sub: u32) -> Result<()> {
        match sub {
            0 => {
                let a = self.pop_f32();
                self.push_i32(a as i32);
            }
            1 => {
                let a = self.pop_f32();
                self.push_u32(a as u32);
            }
            2 => {
                let a = self.pop_f64();
                self.push_i32(a as i32);
            }
            3 => {
                let a = self.pop_f64();
                self.push_u32(a as u32);
            }
            4 => {
                let a = self.pop_f32();
                self.push_i64(a as i64);
            }
            5 => {
                let a = self.pop_f32();
                self.push_u64(a as u64);
            }
            6 => {
                let a = self.pop_f64();
                self.push_i64(a as i64);
            }
            7 => {
                let a = self.pop_f64();
                self.push_u64(a as u64);
            }
            10 => {
                let len = self.pop_u32();
                let src = self.pop_u32();
                let dst = self.pop_u32();
                self.memory.copy(dst, src, len)?;
            }
            11 => {
                let len = self.pop_u32();
                let value = self.pop_u32();
                let dst = self.pop_u32();
                self.memory.fill(dst, value as u8, len)?;
            }
            _ => unreachable!("unknown 0xFC sub-opcode behind Num tag"),
        }
        Ok(())
    }

    // ----- value helpers -----

    fn pop_u32(&mut self) -> u32 {
        self.stack.pop() as u32
    }

    fn pop_i32(&mut self) -> i32 {
        self.stack.pop() as u32 as i32
    }

    fn pop_i64(&mut self) -> i64 {
        self.stack.pop() as i64
    }

    fn pop_f32(&mut self) -> f32 {
        f32::from_bits(self.stack.pop() as u32)
    }

    fn pop_f64(&mut self) -> f64 {
        f64::from_bits(self.stack.pop())
    }

    fn pop2_i32(&mut self) -> (i32, i32) {
        let b = self.pop_i32();
        (self.pop_i32(), b)
    }

    fn pop2_i64(&mut self) -> (i64, i64) {
        let b = self.pop_i64();
        (self.pop_i64(), b)
    }

    fn pop2_f32(&mut self) -> (f32, f32) {
        let b = self.pop_f32();
        (self.pop_f32(), b)
    }

    fn pop2_f64(&mut self) -> (f64, f64) {
        let b = self.pop_f64();
        (self.pop_f64(), b)
    }

    fn push_u32(&mut self, value: u32) {
        self.stack.push(u64::from(value));
    }

    fn push_i32(&mut self, value: i32) {
        self.stack.push(u64::from(value as u32));
    }

    fn push_u64(&mut self, value: u64) {
        self.stack.push(value);
    }

    fn push_i64(&mut self, value: i64) {
        self.stack.push(value as u64);
    }

    fn push_f32(&mut self, value: f32) {
        self.stack.push(u64::from(value.to_bits()));
    }

    fn push_f64(&mut self, value: f64) {
        self.stack.push(value.to_bits());
    }

    fn push_bool(&mut self, value: bool) {
        self.stack.push(u64::from(value));
    }
}

fn div_by_zero() -> Error {
    Error::new(
        ErrorCategory::Runtime,
        codes::DIVISION_BY_ZERO,
        "integer division by zero",
    )
}

fn int_overflow() -> Error {
    Error::new(
        ErrorCategory::Runtime,
        codes::INTEGER_OVERFLOW,
        "integer division overflow",
    )
}

fn no_body() -> Error {
    Error::new(
        ErrorCategory::Runtime,
        codes::INVALID_FUNCTION_INDEX,
        "Call target has no compiled body",
    )
}

impl Pc {
    fn next(self, words: u32) -> Self {
        Self {
            op: self.op + 1,
            arg: self.arg + words,
        }
    }
}

// IEEE min/max propagate NaN and order -0.0 below +0.0.

fn fmin32(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        f32::NAN
    } else if a == b {
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else {
        a.min(b)
    }
}

fn fmax32(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        f32::NAN
    } else if a == b {
        if a.is_sign_positive() {
            a
        } else {
            b
        }
    } else {
        a.max(b)
    }
}

fn fmin64(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a == b {
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else {
        a.min(b)
    }
}

fn fmax64(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a == b {
        if a.is_sign_positive() {
            a
        } else {
            b
        }
    } else {
        a.max(b)
    }
}
