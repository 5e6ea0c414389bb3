//! Decode errors for raw instruction records.

use thiserror::Error;

/// Errors that occur while decoding raw instruction records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The opcode tag is not part of the current opcode set.
    #[error("invalid opcode: {0}")]
    InvalidOpcode(u8),

    /// A record inside a program carries an unknown opcode tag.
    #[error("invalid opcode {opcode} at instruction {at}")]
    InvalidInstruction { at: usize, opcode: u8 },
}
