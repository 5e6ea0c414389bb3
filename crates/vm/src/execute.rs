//! Main execution loop and opcode dispatch.

use log::{debug, trace};
use stackvm_common::{Instruction, Opcode, TypeTag, Value};

use crate::error::Fault;
use crate::machine::VM;

impl<'a> VM<'a> {
    /// Execute the program from the first instruction until it halts or
    /// faults.
    ///
    /// The VM is reset first, so calling this again reruns the program from
    /// scratch and yields the same result.
    pub fn execute(&mut self) -> Result<Value, Fault> {
        self.reset();
        debug!(
            "executing {} instructions (stack capacity {})",
            self.program.len(),
            self.stack.capacity()
        );

        let outcome = self.dispatch_loop();
        match &outcome {
            Ok(value) => debug!("halted at pc {} with {} result", self.pc, value.type_tag()),
            Err(fault) => debug!("run faulted: {fault}"),
        }
        outcome
    }

    fn dispatch_loop(&mut self) -> Result<Value, Fault> {
        let program = self.program;

        while let Some(&instr) = program.get(self.pc) {
            trace!("{:>4}: {instr} (depth {})", self.pc, self.stack.len());
            self.pc += 1;

            match instr {
                Instruction::Halt => return self.exec_halt(),

                // Literals
                Instruction::PushInt(v) => self.push(Value::Int32(v))?,
                Instruction::PushFloat(v) => self.push(Value::Float32(v))?,
                Instruction::PushByte(v) => self.push(Value::Byte(v))?,
                Instruction::Pack(count) => self.exec_pack(count)?,
                Instruction::Pop => {
                    self.pop()?;
                }

                // Arithmetic
                Instruction::Add => {
                    self.exec_binary_arith(Opcode::Add, |a, b| a.wrapping_add(b), |a, b| a + b)?
                }
                Instruction::Sub => {
                    self.exec_binary_arith(Opcode::Sub, |a, b| a.wrapping_sub(b), |a, b| a - b)?
                }
                Instruction::Mul => {
                    self.exec_binary_arith(Opcode::Mul, |a, b| a.wrapping_mul(b), |a, b| a * b)?
                }
                Instruction::Div => self.exec_div()?,

                // Comparison
                Instruction::Eq => {
                    self.exec_comparison(Opcode::Eq, |a, b| a == b, |a, b| a == b, |a, b| a == b)?
                }
                Instruction::Lt => {
                    self.exec_comparison(Opcode::Lt, |a, b| a < b, |a, b| a < b, |a, b| a < b)?
                }
                Instruction::Lte => {
                    self.exec_comparison(Opcode::Lte, |a, b| a <= b, |a, b| a <= b, |a, b| a <= b)?
                }
                Instruction::Gt => {
                    self.exec_comparison(Opcode::Gt, |a, b| a > b, |a, b| a > b, |a, b| a > b)?
                }
                Instruction::Gte => {
                    self.exec_comparison(Opcode::Gte, |a, b| a >= b, |a, b| a >= b, |a, b| a >= b)?
                }

                // Byte arrays
                Instruction::Concat => self.exec_concat()?,
            }
        }

        // Running off the end is an implicit HALT.
        self.exec_halt()
    }

    fn exec_halt(&mut self) -> Result<Value, Fault> {
        let at = self.current();
        let top = self
            .stack
            .peek_top_for_result()
            .map_err(|e| Fault::from_stack(e, at))?;
        trace!("result {top} with {} values left behind", self.stack.len() - 1);

        // Move the value out so the stack no longer owns a byte array result.
        self.pop()
    }

    fn exec_pack(&mut self, count: u32) -> Result<(), Fault> {
        let at = self.current();
        let values = self
            .stack
            .pop_n(count as usize)
            .map_err(|e| Fault::from_stack(e, at))?;

        let bytes = values
            .into_iter()
            .map(|value| match value {
                Value::Byte(b) => Ok(b),
                other => Err(other.type_tag()),
            })
            .collect::<Result<Vec<u8>, TypeTag>>()
            .map_err(|found| Fault::TypeMismatch {
                at,
                opcode: Opcode::Pack,
                found,
            })?;

        self.push(Value::ByteArray(bytes))
    }

    /// Binary arithmetic: pop rhs then lhs, both Int32 or both Float32.
    fn exec_binary_arith(
        &mut self,
        opcode: Opcode,
        i32_op: fn(i32, i32) -> i32,
        f32_op: fn(f32, f32) -> f32,
    ) -> Result<(), Fault> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;

        let result = match (lhs, rhs) {
            (Value::Int32(a), Value::Int32(b)) => Value::Int32(i32_op(a, b)),
            (Value::Float32(a), Value::Float32(b)) => Value::Float32(f32_op(a, b)),
            (lhs, rhs) => return Err(self.mismatch(opcode, &lhs, &rhs, TypeTag::is_numeric)),
        };

        self.push(result)
    }

    fn exec_div(&mut self) -> Result<(), Fault> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        let at = self.current();

        let result = match (lhs, rhs) {
            (Value::Int32(_), Value::Int32(0)) => return Err(Fault::DivisionByZero { at }),
            // Truncates toward zero; i32::MIN / -1 wraps to i32::MIN.
            (Value::Int32(a), Value::Int32(b)) => Value::Int32(a.wrapping_div(b)),
            // Matches both +0.0 and -0.0.
            (Value::Float32(_), Value::Float32(b)) if b == 0.0 => {
                return Err(Fault::DivisionByZero { at })
            }
            (Value::Float32(a), Value::Float32(b)) => Value::Float32(a / b),
            (lhs, rhs) => return Err(self.mismatch(Opcode::Div, &lhs, &rhs, TypeTag::is_numeric)),
        };

        self.push(result)
    }

    /// Binary comparison: pop rhs then lhs of the same comparable variant,
    /// push `lhs OP rhs`.
    fn exec_comparison(
        &mut self,
        opcode: Opcode,
        i32_op: fn(i32, i32) -> bool,
        f32_op: fn(f32, f32) -> bool,
        u8_op: fn(u8, u8) -> bool,
    ) -> Result<(), Fault> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;

        let result = match (lhs, rhs) {
            (Value::Int32(a), Value::Int32(b)) => i32_op(a, b),
            (Value::Float32(a), Value::Float32(b)) => f32_op(a, b),
            (Value::Byte(a), Value::Byte(b)) => u8_op(a, b),
            (lhs, rhs) => return Err(self.mismatch(opcode, &lhs, &rhs, TypeTag::is_comparable)),
        };

        self.push(Value::Bool(result))
    }

    fn exec_concat(&mut self) -> Result<(), Fault> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;

        match (lhs, rhs) {
            (Value::ByteArray(mut head), Value::ByteArray(tail)) => {
                head.extend_from_slice(&tail);
                self.push(Value::ByteArray(head))
            }
            (lhs, rhs) => Err(self.mismatch(Opcode::Concat, &lhs, &rhs, |tag: &TypeTag| {
                *tag == TypeTag::ByteArray
            })),
        }
    }

    /// Build a TypeMismatch naming the first operand the opcode rejects:
    /// lhs if its variant is never accepted, otherwise rhs.
    fn mismatch(
        &self,
        opcode: Opcode,
        lhs: &Value,
        rhs: &Value,
        accepts: fn(&TypeTag) -> bool,
    ) -> Fault {
        let lhs_tag = lhs.type_tag();
        let found = if accepts(&lhs_tag) {
            rhs.type_tag()
        } else {
            lhs_tag
        };
        Fault::TypeMismatch {
            at: self.current(),
            opcode,
            found,
        }
    }
}
