//! Width classification of WebAssembly value types.

use wvm_error::{codes, Error, ErrorCategory, Result};

use crate::binary;

/// Operand slot width.
///
/// The compiler tracks every stack slot, local, and global as one of two
/// widths; sign and float behavior are resolved by the runtime opcode, not
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 32-bit slot (i32, f32)
    W32,
    /// 64-bit slot (i64, f64)
    W64,
}

impl Width {
    /// Bitset encoding: 0 for 32-bit, 1 for 64-bit.
    #[must_use]
    pub fn bit(self) -> u32 {
        match self {
            Width::W32 => 0,
            Width::W64 => 1,
        }
    }

    /// Decode from a bitset bit.
    #[must_use]
    pub fn from_bit(bit: u32) -> Self {
        if bit == 0 {
            Width::W32
        } else {
            Width::W64
        }
    }
}

/// Reduce a value-type byte to its width classification.
pub fn width_of_value_type(byte: u8) -> Result<Width> {
    match byte {
        binary::I32_TYPE | binary::F32_TYPE => Ok(Width::W32),
        binary::I64_TYPE | binary::F64_TYPE => Ok(Width::W64),
        _ => Err(Error::new(
            ErrorCategory::Type,
            codes::INVALID_VALUE_TYPE,
            "Invalid value type byte",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(width_of_value_type(binary::I32_TYPE).unwrap(), Width::W32);
        assert_eq!(width_of_value_type(binary::F32_TYPE).unwrap(), Width::W32);
        assert_eq!(width_of_value_type(binary::I64_TYPE).unwrap(), Width::W64);
        assert_eq!(width_of_value_type(binary::F64_TYPE).unwrap(), Width::W64);
        assert!(width_of_value_type(binary::FUNCREF_TYPE).is_err());
    }

    #[test]
    fn bit_round_trip() {
        assert_eq!(Width::from_bit(Width::W32.bit()), Width::W32);
        assert_eq!(Width::from_bit(Width::W64.bit()), Width::W64);
    }
}
