//! VM state: borrowed program, owned operand stack, program counter.

use stackvm_common::{Program, Value};

use crate::error::Fault;
use crate::stack::OperandStack;

/// Stack capacity used by [`run`](crate::run).
pub const DEFAULT_STACK_CAPACITY: usize = 1024;

/// The stackvm virtual machine.
///
/// The program is only borrowed; several VMs may execute the same program
/// at once from different threads.
#[derive(Debug)]
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Operand stack.
    pub(crate) stack: OperandStack,
    /// Index of the next instruction to fetch.
    pub(crate) pc: usize,
}

impl<'a> VM<'a> {
    /// Create a VM whose stack holds at most `stack_capacity` values.
    pub fn new(program: &'a Program, stack_capacity: usize) -> Self {
        Self::with_stack(program, OperandStack::new(stack_capacity))
    }

    /// Create a VM around an existing stack, reusing its allocation.
    /// The stack is cleared first.
    pub fn with_stack(program: &'a Program, mut stack: OperandStack) -> Self {
        stack.clear();
        Self {
            program,
            stack,
            pc: 0,
        }
    }

    /// Give the stack back, e.g. to reuse it for the next run.
    pub fn into_stack(self) -> OperandStack {
        self.stack
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Program counter. After a run it points just past the last executed
    /// instruction.
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    /// Return to the initial state: pc 0, empty stack.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.stack.clear();
    }

    /// Index of the instruction currently being executed.
    pub(crate) fn current(&self) -> usize {
        self.pc.saturating_sub(1)
    }

    /// Push a value onto the stack, checking for overflow.
    pub(crate) fn push(&mut self, value: Value) -> Result<(), Fault> {
        let at = self.current();
        self.stack.push(value).map_err(|e| Fault::from_stack(e, at))
    }

    /// Pop a value from the stack.
    pub(crate) fn pop(&mut self) -> Result<Value, Fault> {
        let at = self.current();
        self.stack.pop().map_err(|e| Fault::from_stack(e, at))
    }
}
