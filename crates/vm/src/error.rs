//! Faults raised by the interpreter.
//!
//! Every fault is terminal: the run stops at the instruction that raised it
//! and the fault becomes the run's result. Variants carry the instruction
//! index (`at`) where one applies.

use stackvm_common::{Opcode, TypeTag};
use thiserror::Error;

use crate::stack::StackError;

/// Errors that end a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// A push would exceed the configured stack capacity.
    #[error("stack overflow (capacity {capacity}) at instruction {at}")]
    StackOverflow { at: usize, capacity: usize },

    /// A pop needed more values than the stack holds.
    #[error("stack underflow at instruction {at}")]
    StackUnderflow { at: usize },

    /// An operand is not of a variant the opcode accepts.
    #[error("{opcode} cannot take a {found} operand at instruction {at}")]
    TypeMismatch {
        at: usize,
        opcode: Opcode,
        found: TypeTag,
    },

    /// DIV with a zero divisor.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// The program halted with nothing on the stack to report.
    #[error("halted with an empty stack")]
    EmptyResult,
}

impl Fault {
    /// Attach an instruction index to a stack error.
    pub(crate) fn from_stack(err: StackError, at: usize) -> Self {
        match err {
            StackError::Overflow { capacity } => Fault::StackOverflow { at, capacity },
            StackError::Underflow => Fault::StackUnderflow { at },
            StackError::Empty => Fault::EmptyResult,
        }
    }

    /// Index of the faulting instruction, if the fault has one.
    pub fn at(&self) -> Option<usize> {
        match *self {
            Fault::StackOverflow { at, .. }
            | Fault::StackUnderflow { at }
            | Fault::TypeMismatch { at, .. }
            | Fault::DivisionByZero { at } => Some(at),
            Fault::EmptyResult => None,
        }
    }
}
