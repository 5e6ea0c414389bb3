//! Opcode definitions for the stackvm instruction set.
//!
//! The numeric tags form the ABI shared with hosts. They are versioned
//! through [`ABI_VERSION`]: a tag is never reused for a different meaning,
//! and any change to this table bumps the version.

use std::fmt;

use crate::error::DecodeError;

/// Version of the opcode numbering and result layout.
///
/// Version 1 predates PACK and CONCAT and numbered the ordered comparisons
/// differently; it is not accepted.
pub const ABI_VERSION: u32 = 2;

/// Identifies the operation to perform.
///
/// The `#[repr(u8)]` attribute gives each variant its stable tag byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Stop execution. Top of stack is the program result.
    Halt = 0,

    // Literals
    /// Push the immediate as Int32.
    PushInt = 1,
    /// Push the immediate as Float32.
    PushFloat = 2,
    /// Push the immediate as Byte.
    PushByte = 3,
    /// Pop `count` bytes, push them as one ByteArray in push order.
    Pack = 4,
    /// Discard the top of stack.
    Pop = 5,

    // Arithmetic
    /// Pop rhs, pop lhs, push lhs + rhs.
    Add = 6,
    /// Pop rhs, pop lhs, push lhs - rhs.
    Sub = 7,
    /// Pop rhs, pop lhs, push lhs * rhs.
    Mul = 8,
    /// Pop rhs, pop lhs, push lhs / rhs. Zero divisor is a fault.
    Div = 9,

    // Comparison
    /// Push BOOL (lhs == rhs).
    Eq = 10,
    /// Push BOOL (lhs < rhs).
    Lt = 11,
    /// Push BOOL (lhs <= rhs).
    Lte = 12,
    /// Push BOOL (lhs > rhs).
    Gt = 13,
    /// Push BOOL (lhs >= rhs).
    Gte = 14,

    // Byte arrays
    /// Pop rhs, pop lhs, push lhs bytes followed by rhs bytes.
    Concat = 15,
}

/// All valid opcodes, in tag order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 16] = [
    Opcode::Halt,
    Opcode::PushInt,
    Opcode::PushFloat,
    Opcode::PushByte,
    Opcode::Pack,
    Opcode::Pop,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Eq,
    Opcode::Lt,
    Opcode::Lte,
    Opcode::Gt,
    Opcode::Gte,
    Opcode::Concat,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ALL_OPCODES
            .get(value as usize)
            .copied()
            .ok_or(DecodeError::InvalidOpcode(value))
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Halt => "HALT",
            Opcode::PushInt => "PUSHINT",
            Opcode::PushFloat => "PUSHFLOAT",
            Opcode::PushByte => "PUSHBYTE",
            Opcode::Pack => "PACK",
            Opcode::Pop => "POP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Eq => "EQ",
            Opcode::Lt => "LT",
            Opcode::Lte => "LTE",
            Opcode::Gt => "GT",
            Opcode::Gte => "GTE",
            Opcode::Concat => "CONCAT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_opcodes_are_in_tag_order() {
        for (i, &opcode) in ALL_OPCODES.iter().enumerate() {
            assert_eq!(opcode as usize, i, "{opcode:?} is out of place");
        }
    }

    #[test]
    fn roundtrip_all_valid_opcodes() {
        for &opcode in &ALL_OPCODES {
            let byte = opcode as u8;
            assert_eq!(Opcode::try_from(byte), Ok(opcode));
        }
    }

    #[test]
    fn tags_past_the_table_are_invalid() {
        for byte in 16..=u8::MAX {
            assert_eq!(
                Opcode::try_from(byte),
                Err(DecodeError::InvalidOpcode(byte)),
                "byte {byte} should be rejected"
            );
        }
    }

    #[test]
    fn ordered_comparisons_keep_their_tags() {
        assert_eq!(Opcode::Lt as u8, 11);
        assert_eq!(Opcode::Lte as u8, 12);
        assert_eq!(Opcode::Gt as u8, 13);
        assert_eq!(Opcode::Gte as u8, 14);
    }

    #[test]
    fn mnemonics_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for opcode in ALL_OPCODES {
            assert!(seen.insert(opcode.mnemonic()), "duplicate {}", opcode);
        }
    }
}
