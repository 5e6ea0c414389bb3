//! Type tags for runtime values.

use std::fmt;

/// Identifies the variant of a [`Value`](crate::Value).
///
/// Tags are used in fault reports and log output; they are never part of
/// the instruction encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Signed 32-bit integer.
    Int32,
    /// IEEE 754 32-bit float.
    Float32,
    /// Unsigned 8-bit byte.
    Byte,
    /// Boolean, produced only by comparisons.
    Bool,
    /// Owned sequence of bytes, produced by PACK and CONCAT.
    ByteArray,
}

/// All type tags, in definition order.
pub const ALL_TYPE_TAGS: [TypeTag; 5] = [
    TypeTag::Int32,
    TypeTag::Float32,
    TypeTag::Byte,
    TypeTag::Bool,
    TypeTag::ByteArray,
];

impl TypeTag {
    /// Returns the lowercase name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int32 => "int32",
            TypeTag::Float32 => "float32",
            TypeTag::Byte => "byte",
            TypeTag::Bool => "bool",
            TypeTag::ByteArray => "byte array",
        }
    }

    /// True for the variants ADD, SUB, MUL and DIV accept.
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeTag::Int32 | TypeTag::Float32)
    }

    /// True for the variants the comparison opcodes accept.
    pub fn is_comparable(&self) -> bool {
        matches!(self, TypeTag::Int32 | TypeTag::Float32 | TypeTag::Byte)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
