//! stackvm common types and instruction encoding.
//!
//! This crate provides the data structures shared by the interpreter and
//! the C boundary:
//!
//! - [`Opcode`]: the versioned opcode set ([`ABI_VERSION`])
//! - [`Instruction`]: a decoded instruction with its typed immediate
//! - [`RawInstruction`]: the fixed-size `#[repr(C)]` record hosts supply
//! - [`Value`] and [`TypeTag`]: runtime values on the operand stack
//! - [`Program`]: a read-only sequence of instructions
//! - [`DecodeError`]: errors from decoding raw records

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod type_tag;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::{Instruction, OperandValue, RawInstruction};
pub use opcode::{Opcode, ABI_VERSION};
pub use program::Program;
pub use type_tag::TypeTag;
pub use value::Value;
