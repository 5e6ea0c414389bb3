//! Fixed-layout types exchanged across the C boundary, and the adapter that
//! flattens an interpreter outcome into them.
//!
//! The layouts mirror `include/stack_vm.h`; any change here is an ABI change
//! and goes together with a bump of [`ABI_VERSION`](stackvm_common::ABI_VERSION).

use std::fmt;
use std::slice;

use stackvm_common::Value;
use stackvm_vm::Fault;

use crate::buffer::ByteBuffer;

/// Fault codes carried by an `ERROR` result.
///
/// Codes 0-3 keep their historical values.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCode {
    StackUnderflow = 0,
    StackOverflow = 1,
    TypeMismatch = 2,
    DivisionByZero = 3,
    EmptyResult = 4,
    /// The instance was created from a record with an unknown opcode tag.
    InvalidOpcode = 5,
    /// The handle does not name a live instance.
    InvalidHandle = 6,
}

impl From<&Fault> for FaultCode {
    fn from(fault: &Fault) -> Self {
        match fault {
            Fault::StackUnderflow { .. } => FaultCode::StackUnderflow,
            Fault::StackOverflow { .. } => FaultCode::StackOverflow,
            Fault::TypeMismatch { .. } => FaultCode::TypeMismatch,
            Fault::DivisionByZero { .. } => FaultCode::DivisionByZero,
            Fault::EmptyResult => FaultCode::EmptyResult,
        }
    }
}

/// Discriminant of a [`VmResult`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmResultTag {
    Integer = 0,
    Float = 1,
    Byte = 2,
    ByteArray = 3,
    Bool = 4,
    Error = 5,
}

/// Pointer/length/capacity triple of a byte array handed to the caller.
///
/// The three fields together describe the original allocation so that
/// [`free_byte_array`](crate::free_byte_array) can rebuild and free it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteArrayPtr {
    pub ptr: *mut u8,
    pub len: usize,
    pub capacity: usize,
}

impl ByteArrayPtr {
    /// Borrow the bytes without taking ownership.
    ///
    /// # Safety
    ///
    /// The triple must come from a `BYTE_ARRAY` result that has not been
    /// released, and must not be released while the slice is alive.
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.ptr.is_null() {
            return &[];
        }
        unsafe { slice::from_raw_parts(self.ptr, self.len) }
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
union VmResultValue {
    int_val: i32,
    float_val: f32,
    byte_val: u8,
    byte_array_val: ByteArrayPtr,
    bool_val: bool,
    error_code: FaultCode,
}

/// The single tagged result of a run, returned by value.
///
/// Fields are private: every `VmResult` is built here, so the tag always
/// names the union member that was written. A `BYTE_ARRAY` result owns its
/// buffer until it is passed to [`free_byte_array`](crate::free_byte_array)
/// or reclaimed with [`VmResult::into_buffer`]; dropping it otherwise leaks.
#[repr(C)]
#[must_use]
pub struct VmResult {
    tag: VmResultTag,
    value: VmResultValue,
}

/// Safe, decoded view of a [`VmResult`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultView {
    Integer(i32),
    Float(f32),
    Byte(u8),
    ByteArray(ByteArrayPtr),
    Bool(bool),
    Error(FaultCode),
}

impl VmResult {
    /// Flatten the outcome of a run. A byte array is moved out of the
    /// value and its ownership passes to the result.
    pub fn from_outcome(outcome: Result<Value, Fault>) -> Self {
        match outcome {
            Ok(Value::Int32(v)) => Self::new(VmResultTag::Integer, VmResultValue { int_val: v }),
            Ok(Value::Float32(v)) => Self::new(VmResultTag::Float, VmResultValue { float_val: v }),
            Ok(Value::Byte(v)) => Self::new(VmResultTag::Byte, VmResultValue { byte_val: v }),
            Ok(Value::Bool(v)) => Self::new(VmResultTag::Bool, VmResultValue { bool_val: v }),
            Ok(Value::ByteArray(bytes)) => Self::new(
                VmResultTag::ByteArray,
                VmResultValue {
                    byte_array_val: ByteBuffer::from_vec(bytes).into_raw(),
                },
            ),
            Err(fault) => Self::fault(FaultCode::from(&fault)),
        }
    }

    /// An `ERROR` result.
    pub fn fault(code: FaultCode) -> Self {
        Self::new(VmResultTag::Error, VmResultValue { error_code: code })
    }

    fn new(tag: VmResultTag, value: VmResultValue) -> Self {
        Self { tag, value }
    }

    pub fn tag(&self) -> VmResultTag {
        self.tag
    }

    pub fn is_error(&self) -> bool {
        self.tag == VmResultTag::Error
    }

    /// Decode the tagged union.
    pub fn view(&self) -> ResultView {
        // SAFETY: the constructors above always write the member named by
        // the tag, and the fields cannot be modified from outside.
        unsafe {
            match self.tag {
                VmResultTag::Integer => ResultView::Integer(self.value.int_val),
                VmResultTag::Float => ResultView::Float(self.value.float_val),
                VmResultTag::Byte => ResultView::Byte(self.value.byte_val),
                VmResultTag::ByteArray => ResultView::ByteArray(self.value.byte_array_val),
                VmResultTag::Bool => ResultView::Bool(self.value.bool_val),
                VmResultTag::Error => ResultView::Error(self.value.error_code),
            }
        }
    }

    /// Take back ownership of a byte array payload, if there is one.
    ///
    /// Must not be combined with [`free_byte_array`](crate::free_byte_array)
    /// on the same payload.
    pub fn into_buffer(self) -> Option<ByteBuffer> {
        match self.view() {
            // SAFETY: the triple was produced by `ByteBuffer::into_raw` in
            // `from_outcome` and `self` is consumed here.
            ResultView::ByteArray(raw) => Some(unsafe { ByteBuffer::from_raw(raw) }),
            _ => None,
        }
    }
}

impl fmt::Debug for VmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VmResult").field(&self.view()).finish()
    }
}
