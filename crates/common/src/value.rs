//! Runtime value representation for the stackvm interpreter.
//!
//! Values are what live on the operand stack during execution.

use std::fmt;

use crate::type_tag::TypeTag;

/// Runtime value representation.
///
/// Exactly one variant is active at a time. The stack never converts
/// between variants; any coercion policy belongs to the opcodes.
#[derive(Debug, Clone)]
pub enum Value {
    /// Signed 32-bit integer.
    Int32(i32),
    /// IEEE 754 32-bit float.
    Float32(f32),
    /// Unsigned 8-bit byte.
    Byte(u8),
    /// Boolean result of a comparison.
    Bool(bool),
    /// Owned, variable-length byte sequence.
    ByteArray(Vec<u8>),
}

// Float32 compares by bit pattern so that Value is Eq and two runs of the
// same program can be checked for identical output, NaN payloads included.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::ByteArray(a), Value::ByteArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Returns the type tag for this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int32(_) => TypeTag::Int32,
            Value::Float32(_) => TypeTag::Float32,
            Value::Byte(_) => TypeTag::Byte,
            Value::Bool(_) => TypeTag::Bool,
            Value::ByteArray(_) => TypeTag::ByteArray,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v:?}"),
            Value::Byte(v) => write!(f, "{v:#04x}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::ByteArray(bytes) => {
                f.write_str("[")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{b:02x}")?;
                }
                f.write_str("]")
            }
        }
    }
}
