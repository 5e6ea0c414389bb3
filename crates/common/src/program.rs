//! Program representation: an ordered, read-only instruction sequence.

use crate::error::DecodeError;
use crate::instruction::{Instruction, RawInstruction};

/// A stackvm program: a sequence of instructions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new program from a vector of instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Decode a slice of raw records into a program.
    ///
    /// Fails on the first record with an unknown opcode tag, reporting its
    /// index.
    pub fn decode(records: &[RawInstruction]) -> Result<Self, DecodeError> {
        let instructions = records
            .iter()
            .enumerate()
            .map(|(at, raw)| {
                Instruction::decode(raw).map_err(|_| DecodeError::InvalidInstruction {
                    at,
                    opcode: raw.kind,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { instructions })
    }

    /// Encode every instruction back into raw records.
    pub fn encode(&self) -> Vec<RawInstruction> {
        self.instructions.iter().map(Instruction::encode).collect()
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction at `pc`, if any.
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
