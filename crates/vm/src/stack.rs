//! Bounded operand stack.
//!
//! Capacity is fixed at construction and acts as a hard ceiling on the
//! number of live values, never as a growth hint.

use std::collections::TryReserveError;

use stackvm_common::Value;
use thiserror::Error;

/// Errors raised by stack operations. The interpreter attaches the
/// instruction index when turning these into faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackError {
    /// Push attempted on a full stack.
    #[error("stack overflow (capacity {capacity})")]
    Overflow { capacity: usize },

    /// Pop attempted with too few values on the stack.
    #[error("stack underflow")]
    Underflow,

    /// Read of the top of an empty stack.
    #[error("stack is empty")]
    Empty,
}

/// Values reserved eagerly by [`OperandStack::new`].
pub const PREALLOCATED: usize = 1024;

/// A last-in-first-out stack of [`Value`]s with a fixed capacity.
#[derive(Debug, Clone, Default)]
pub struct OperandStack {
    values: Vec<Value>,
    capacity: usize,
}

impl OperandStack {
    /// Create a stack holding at most `capacity` values.
    ///
    /// Storage for up to [`PREALLOCATED`] values is reserved up front; a
    /// larger stack grows on demand.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity.min(PREALLOCATED)),
            capacity,
        }
    }

    /// Like [`OperandStack::new`], but reports allocation failure instead of
    /// aborting the process.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut values = Vec::new();
        values.try_reserve_exact(capacity)?;
        Ok(Self { values, capacity })
    }

    /// Push a value. Fails if the stack already holds `capacity` values.
    pub fn push(&mut self, value: Value) -> Result<(), StackError> {
        if self.values.len() >= self.capacity {
            return Err(StackError::Overflow {
                capacity: self.capacity,
            });
        }
        self.values.push(value);
        Ok(())
    }

    /// Pop the top value.
    pub fn pop(&mut self) -> Result<Value, StackError> {
        self.values.pop().ok_or(StackError::Underflow)
    }

    /// Pop the top `n` values, returned in push order (earliest first).
    ///
    /// Nothing is removed if fewer than `n` values are present.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, StackError> {
        if n > self.values.len() {
            return Err(StackError::Underflow);
        }
        let start = self.values.len() - n;
        Ok(self.values.split_off(start))
    }

    /// Non-mutating read of the top value, used to report the result of a
    /// halted program.
    pub fn peek_top_for_result(&self) -> Result<&Value, StackError> {
        self.values.last().ok_or(StackError::Empty)
    }

    /// Number of values currently on the stack.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maximum number of values the stack may hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every value, keeping the capacity and the allocation.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterate from the bottom of the stack to the top.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}
