//! Instruction representation and the fixed-size wire record.
//!
//! Hosts hand the interpreter an array of [`RawInstruction`] records, laid
//! out exactly like the C declaration:
//! ```text
//! typedef union { int32_t int_val; float float_val; uint8_t byte_val; uint32_t count; } OperationValue;
//! typedef struct { uint8_t kind; OperationValue val; } Operation;   // 8 bytes, align 4
//! ```
//! Inside Rust every record is decoded into an [`Instruction`], which carries
//! its immediate as a typed payload.

use std::fmt;

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// Immediate operand slot of a raw record. Which member is meaningful
/// depends on the record's opcode; opcodes without an immediate ignore it.
#[repr(C)]
#[derive(Clone, Copy)]
pub union OperandValue {
    pub int_val: i32,
    pub float_val: f32,
    pub byte_val: u8,
    /// PACK arity.
    pub count: u32,
}

impl OperandValue {
    /// An all-zero operand.
    pub const ZERO: OperandValue = OperandValue { count: 0 };

    fn from_byte(byte: u8) -> Self {
        // Start from ZERO so the upper bytes are initialized.
        let mut val = Self::ZERO;
        val.byte_val = byte;
        val
    }
}

/// One fixed-size instruction record as supplied across the C boundary.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawInstruction {
    /// Opcode tag, see [`Opcode`].
    pub kind: u8,
    /// Immediate operand.
    pub val: OperandValue,
}

impl RawInstruction {
    /// Build a record from a tag and an operand.
    pub fn new(kind: u8, val: OperandValue) -> Self {
        Self { kind, val }
    }
}

impl fmt::Debug for RawInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SAFETY: every member is plain data valid for any bit pattern and
        // `count` spans the whole 4-byte slot.
        let bits = unsafe { self.val.count };
        f.debug_struct("RawInstruction")
            .field("kind", &self.kind)
            .field("val", &format_args!("{bits:#010x}"))
            .finish()
    }
}

/// A decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Halt,
    PushInt(i32),
    PushFloat(f32),
    PushByte(u8),
    /// Pack the given number of bytes into one byte array.
    Pack(u32),
    Pop,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    Concat,
}

impl Instruction {
    /// The opcode this instruction executes.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Halt => Opcode::Halt,
            Instruction::PushInt(_) => Opcode::PushInt,
            Instruction::PushFloat(_) => Opcode::PushFloat,
            Instruction::PushByte(_) => Opcode::PushByte,
            Instruction::Pack(_) => Opcode::Pack,
            Instruction::Pop => Opcode::Pop,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Eq => Opcode::Eq,
            Instruction::Lt => Opcode::Lt,
            Instruction::Lte => Opcode::Lte,
            Instruction::Gt => Opcode::Gt,
            Instruction::Gte => Opcode::Gte,
            Instruction::Concat => Opcode::Concat,
        }
    }

    /// Decode a raw record, reading only the operand member its opcode uses.
    pub fn decode(raw: &RawInstruction) -> Result<Self, DecodeError> {
        let opcode = Opcode::try_from(raw.kind)?;

        // SAFETY: all union members are plain integers or floats, valid for
        // any bit pattern, and each read stays inside the 4-byte slot.
        let instr = unsafe {
            match opcode {
                Opcode::Halt => Instruction::Halt,
                Opcode::PushInt => Instruction::PushInt(raw.val.int_val),
                Opcode::PushFloat => Instruction::PushFloat(raw.val.float_val),
                Opcode::PushByte => Instruction::PushByte(raw.val.byte_val),
                Opcode::Pack => Instruction::Pack(raw.val.count),
                Opcode::Pop => Instruction::Pop,
                Opcode::Add => Instruction::Add,
                Opcode::Sub => Instruction::Sub,
                Opcode::Mul => Instruction::Mul,
                Opcode::Div => Instruction::Div,
                Opcode::Eq => Instruction::Eq,
                Opcode::Lt => Instruction::Lt,
                Opcode::Lte => Instruction::Lte,
                Opcode::Gt => Instruction::Gt,
                Opcode::Gte => Instruction::Gte,
                Opcode::Concat => Instruction::Concat,
            }
        };

        Ok(instr)
    }

    /// Encode into a raw record. Unused operand bytes are zero.
    pub fn encode(&self) -> RawInstruction {
        let val = match *self {
            Instruction::PushInt(v) => OperandValue { int_val: v },
            Instruction::PushFloat(v) => OperandValue { float_val: v },
            Instruction::PushByte(v) => OperandValue::from_byte(v),
            Instruction::Pack(n) => OperandValue { count: n },
            _ => OperandValue::ZERO,
        };
        RawInstruction::new(self.opcode() as u8, val)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.opcode().mnemonic();
        match self {
            Instruction::PushInt(v) => write!(f, "{mnemonic} {v}"),
            Instruction::PushFloat(v) => write!(f, "{mnemonic} {v:?}"),
            Instruction::PushByte(v) => write!(f, "{mnemonic} {v}"),
            Instruction::Pack(n) => write!(f, "{mnemonic} {n}"),
            _ => f.write_str(mnemonic),
        }
    }
}
