// WVM - wvm-error
// Module: WVM Error Codes
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for WVM

// Parse errors (1000+)

/// General parse error
pub const PARSE_ERROR: u16 = 1000;
/// Invalid module magic bytes
pub const INVALID_MAGIC: u16 = 1001;
/// Unsupported module version
pub const INVALID_VERSION: u16 = 1002;
/// Truncated LEB128 or fixed-width field
pub const TRUNCATED_INPUT: u16 = 1003;
/// LEB128 value does not fit its declared width
pub const LEB_OVERFLOW: u16 = 1004;
/// Unknown section id
pub const UNKNOWN_SECTION: u16 = 1005;
/// Section id seen more than once
pub const DUPLICATE_SECTION: u16 = 1006;
/// Malformed UTF-8 in a name field
pub const INVALID_NAME: u16 = 1007;

// Type errors (2000+)

/// Invalid value type byte
pub const INVALID_VALUE_TYPE: u16 = 2000;
/// Signature exceeds the 32-entry width-bitset capacity
pub const SIGNATURE_TOO_WIDE: u16 = 2001;
/// Multi-value results are not supported
pub const MULTI_VALUE_RESULT: u16 = 2002;
/// Type index out of range
pub const INVALID_TYPE_INDEX: u16 = 2003;

// Import errors (3000+)

/// Import kind other than function
pub const UNSUPPORTED_IMPORT_KIND: u16 = 3000;
/// Import name does not resolve to a known host call
pub const UNKNOWN_HOST_CALL: u16 = 3001;

// Compile errors (4000+)

/// General compile error
pub const COMPILE_ERROR: u16 = 4000;
/// Branch label index exceeds the open-label stack
pub const LABEL_UNDERFLOW: u16 = 4001;
/// Unknown or unsupported opcode byte
pub const UNSUPPORTED_OPCODE: u16 = 4002;
/// Operand stack would underflow
pub const OPERAND_UNDERFLOW: u16 = 4003;
/// Stack depth at function end does not match the result arity
pub const STACK_IMBALANCE: u16 = 4004;
/// Function or local index out of range
pub const INVALID_FUNCTION_INDEX: u16 = 4005;
/// Code body ended without closing the outermost label
pub const UNTERMINATED_FUNCTION: u16 = 4006;

// Runtime errors (5000+)

/// General execution error
pub const EXECUTION_ERROR: u16 = 5000;
/// Indirect call through an uninitialized table slot
pub const STALE_TABLE_SLOT: u16 = 5001;
/// Indirect call index outside the table
pub const TABLE_OUT_OF_BOUNDS: u16 = 5002;
/// Memory operation outside the linear memory bounds
pub const MEMORY_OUT_OF_BOUNDS: u16 = 5003;
/// Global index out of range
pub const INVALID_GLOBAL_INDEX: u16 = 5004;
/// Unsupported global shape (only 32-bit integer globals are supported)
pub const UNSUPPORTED_GLOBAL: u16 = 5005;
/// Start export missing or not an internal function
pub const NO_START_FUNCTION: u16 = 5006;
/// Integer division by zero
pub const DIVISION_BY_ZERO: u16 = 5007;
/// Integer overflow in division or conversion
pub const INTEGER_OVERFLOW: u16 = 5008;
/// Explicit unreachable instruction executed
pub const UNREACHABLE_EXECUTED: u16 = 5009;

// WASI errors (6000+)

/// Host bridge failure with no errno mapping
pub const WASI_ERROR: u16 = 6000;
/// Host call argument does not describe valid guest memory
pub const WASI_INVALID_POINTER: u16 = 6001;
