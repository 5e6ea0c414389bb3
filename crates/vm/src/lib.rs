//! stackvm virtual machine: executes instruction sequences on a bounded
//! operand stack.
//!
//! The machine has no registers, no branches and no heap beyond the byte
//! arrays built by PACK and CONCAT. A run ends in exactly one of two ways:
//! a HALT (explicit, or by running off the end of the program) that yields
//! the top of the stack, or a [`Fault`].
//!
//! # Usage
//!
//! ```
//! use stackvm_common::{Instruction, Program, Value};
//! use stackvm_vm::run;
//!
//! let program = Program::new(vec![
//!     Instruction::PushInt(5),
//!     Instruction::PushInt(3),
//!     Instruction::Sub,
//!     Instruction::Halt,
//! ]);
//!
//! assert_eq!(run(&program), Ok(Value::Int32(2)));
//! ```

pub mod error;
pub mod execute;
pub mod machine;
pub mod stack;

pub use error::Fault;
pub use machine::{DEFAULT_STACK_CAPACITY, VM};
pub use stack::{OperandStack, StackError};

use stackvm_common::{Program, Value};

/// Execute a program with [`DEFAULT_STACK_CAPACITY`] and return its result.
///
/// # Errors
///
/// Returns the [`Fault`] that stopped the run.
pub fn run(program: &Program) -> Result<Value, Fault> {
    run_with_capacity(program, DEFAULT_STACK_CAPACITY)
}

/// Execute a program on a stack holding at most `stack_capacity` values.
pub fn run_with_capacity(program: &Program, stack_capacity: usize) -> Result<Value, Fault> {
    let mut vm = VM::new(program, stack_capacity);
    vm.execute()
}
