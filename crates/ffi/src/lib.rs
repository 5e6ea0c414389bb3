//! C ABI for the stackvm interpreter.
//!
//! A host creates an instance from an array of fixed-layout instruction
//! records, runs it any number of times, and destroys it. Instances are
//! named by opaque [`VmHandle`]s; no pointer into VM state crosses the
//! boundary. A run returns a single tagged [`VmResult`]. When that result
//! is a byte array, its buffer belongs to the caller and must be handed
//! back exactly once through [`free_byte_array`].
//!
//! The matching declarations live in `include/stack_vm.h`.

pub mod abi;
pub mod buffer;
pub mod registry;

pub use abi::{ByteArrayPtr, FaultCode, ResultView, VmResult, VmResultTag};
pub use buffer::ByteBuffer;
pub use registry::{VmHandle, INVALID_HANDLE};
pub use stackvm_common::{OperandValue, RawInstruction, ABI_VERSION};

use std::slice;

use log::{debug, warn};
use stackvm_common::Program;
use stackvm_vm::OperandStack;

use crate::registry::Instance;

/// Create a VM instance.
///
/// The records are copied and decoded here, so the caller's array only has
/// to live for the duration of the call. A record with an unknown opcode
/// does not fail creation; every run of the instance reports
/// [`FaultCode::InvalidOpcode`] instead.
///
/// Returns [`INVALID_HANDLE`] if the stack cannot be allocated, or if
/// `instructions` is null while `instruction_len` is non-zero.
///
/// # Safety
///
/// Unless `instruction_len` is 0, `instructions` must point to
/// `instruction_len` initialized records.
#[no_mangle]
pub unsafe extern "C" fn create_vm(
    stack_size: usize,
    instructions: *const RawInstruction,
    instruction_len: usize,
) -> VmHandle {
    let records: &[RawInstruction] = if instruction_len == 0 {
        &[]
    } else if instructions.is_null() {
        warn!("create_vm: null instruction pointer with length {instruction_len}");
        return INVALID_HANDLE;
    } else {
        unsafe { slice::from_raw_parts(instructions, instruction_len) }
    };

    let stack = match OperandStack::try_with_capacity(stack_size) {
        Ok(stack) => stack,
        Err(err) => {
            warn!("create_vm: cannot allocate a stack of {stack_size} values: {err}");
            return INVALID_HANDLE;
        }
    };

    let program = Program::decode(records);
    if let Err(err) = &program {
        warn!("create_vm: {err}; runs will fault");
    }

    let handle = registry::insert(Instance::new(program, stack));
    debug!("created vm {handle} ({instruction_len} instructions, stack {stack_size})");
    handle
}

/// Run the instance from a fresh state and return its result.
///
/// An unknown or destroyed handle yields [`FaultCode::InvalidHandle`].
#[no_mangle]
pub extern "C" fn run_vm(vm: VmHandle) -> VmResult {
    registry::run(vm)
}

/// Free the buffer of a `BYTE_ARRAY` result. A null `ptr` is ignored.
///
/// # Safety
///
/// The three arguments must be the `ptr`, `len` and `capacity` of a
/// `BYTE_ARRAY` result returned by [`run_vm`], and each such buffer may be
/// freed only once.
#[no_mangle]
pub unsafe extern "C" fn free_byte_array(ptr: *mut u8, len: usize, capacity: usize) {
    if ptr.is_null() {
        return;
    }
    let raw = ByteArrayPtr { ptr, len, capacity };
    unsafe { ByteBuffer::from_raw(raw) }.release();
}

/// Destroy an instance. Unknown handles are ignored.
#[no_mangle]
pub extern "C" fn free_vm(vm: VmHandle) {
    if registry::remove(vm) {
        debug!("freed vm {vm}");
    } else {
        warn!("free_vm: unknown handle {vm}");
    }
}

/// Version of the opcode numbering and result layout.
#[no_mangle]
pub extern "C" fn vm_abi_version() -> u32 {
    ABI_VERSION
}
