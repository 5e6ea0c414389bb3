//! End-to-end tests through the exported C functions.

use std::ptr;
use std::thread;

use proptest::prelude::*;
use stackvm_common::{Instruction, Opcode, Program};
use stackvm_ffi::{
    create_vm, free_byte_array, free_vm, run_vm, vm_abi_version, FaultCode, OperandValue,
    RawInstruction, ResultView, VmHandle, INVALID_HANDLE,
};

use Instruction::*;

// ============================================================
// Helpers
// ============================================================

fn records(instructions: &[Instruction]) -> Vec<RawInstruction> {
    instructions.iter().map(Instruction::encode).collect()
}

fn create(stack_size: usize, records: &[RawInstruction]) -> VmHandle {
    let handle = unsafe { create_vm(stack_size, records.as_ptr(), records.len()) };
    assert_ne!(handle, INVALID_HANDLE);
    handle
}

/// Create, run once, destroy.
fn run_once(stack_size: usize, instructions: &[Instruction]) -> ResultView {
    let handle = create(stack_size, &records(instructions));
    let view = run_vm(handle).view();
    free_vm(handle);
    view
}

/// Copy out and free a byte array result.
fn take_bytes(view: ResultView) -> Vec<u8> {
    let ResultView::ByteArray(raw) = view else {
        panic!("expected a byte array, got {view:?}");
    };
    let bytes = unsafe { raw.as_slice() }.to_vec();
    unsafe { free_byte_array(raw.ptr, raw.len, raw.capacity) };
    bytes
}

// ============================================================
// Results
// ============================================================

#[test]
fn abi_version() {
    assert_eq!(vm_abi_version(), 2);
}

#[test]
fn literal_results() {
    assert_eq!(run_once(4, &[PushInt(5), Halt]), ResultView::Integer(5));
    assert_eq!(run_once(4, &[PushFloat(1.5), Halt]), ResultView::Float(1.5));
    assert_eq!(run_once(4, &[PushByte(0xfe), Halt]), ResultView::Byte(0xfe));
}

#[test]
fn arithmetic_results() {
    assert_eq!(
        run_once(4, &[PushInt(2), PushInt(3), Add, Halt]),
        ResultView::Integer(5)
    );
    assert_eq!(
        run_once(4, &[PushInt(5), PushInt(3), Sub, Halt]),
        ResultView::Integer(2)
    );
}

#[test]
fn comparison_result_is_bool() {
    assert_eq!(
        run_once(4, &[PushInt(3), PushInt(5), Lt, Halt]),
        ResultView::Bool(true)
    );
}

#[test]
fn hand_built_records() {
    let raw = [
        RawInstruction::new(Opcode::PushInt as u8, OperandValue { int_val: 40 }),
        RawInstruction::new(Opcode::PushInt as u8, OperandValue { int_val: 2 }),
        RawInstruction::new(Opcode::Add as u8, OperandValue::ZERO),
        RawInstruction::new(Opcode::Halt as u8, OperandValue::ZERO),
    ];
    let handle = create(8, &raw);
    assert_eq!(run_vm(handle).view(), ResultView::Integer(42));
    free_vm(handle);
}

#[test]
fn packed_bytes_come_back_in_push_order() {
    let view = run_once(8, &[PushByte(1), PushByte(2), PushByte(3), Pack(3), Halt]);
    assert_eq!(take_bytes(view), vec![1, 2, 3]);
}

#[test]
fn concatenated_bytes() {
    let view = run_once(
        8,
        &[
            PushByte(b'a'),
            Pack(1),
            PushByte(b'b'),
            PushByte(b'c'),
            Pack(2),
            Concat,
            Halt,
        ],
    );
    assert_eq!(take_bytes(view), b"abc".to_vec());
}

#[test]
fn empty_pack_is_an_empty_array() {
    let view = run_once(2, &[Pack(0), Halt]);
    assert!(take_bytes(view).is_empty());
}

#[test]
fn free_byte_array_ignores_null() {
    unsafe { free_byte_array(ptr::null_mut(), 0, 0) };
    unsafe { free_byte_array(ptr::null_mut(), 5, 5) };
}

// ============================================================
// Faults
// ============================================================

#[test]
fn faults_surface_as_codes() {
    let cases: [(&[Instruction], usize, FaultCode); 5] = [
        (&[PushInt(1), PushInt(0), Div, Halt], 4, FaultCode::DivisionByZero),
        (&[Pop, Halt], 4, FaultCode::StackUnderflow),
        (&[PushInt(1), PushInt(2), Halt], 1, FaultCode::StackOverflow),
        (&[PushInt(1), PushByte(2), Add, Halt], 4, FaultCode::TypeMismatch),
        (&[Halt], 4, FaultCode::EmptyResult),
    ];
    for (program, stack_size, code) in cases {
        assert_eq!(
            run_once(stack_size, program),
            ResultView::Error(code),
            "program {program:?}"
        );
    }
}

#[test]
fn empty_program_is_an_empty_result() {
    let handle = unsafe { create_vm(4, ptr::null(), 0) };
    assert_ne!(handle, INVALID_HANDLE);
    assert_eq!(run_vm(handle).view(), ResultView::Error(FaultCode::EmptyResult));
    free_vm(handle);
}

#[test]
fn null_instructions_with_length_is_rejected() {
    let handle = unsafe { create_vm(4, ptr::null(), 3) };
    assert_eq!(handle, INVALID_HANDLE);
}

#[test]
fn unallocatable_stack_is_rejected() {
    let raw = records(&[PushInt(1), Halt]);
    let handle = unsafe { create_vm(usize::MAX, raw.as_ptr(), raw.len()) };
    assert_eq!(handle, INVALID_HANDLE);
    assert_eq!(run_vm(handle).view(), ResultView::Error(FaultCode::InvalidHandle));
}

#[test]
fn unknown_opcode_faults_on_every_run() {
    let raw = [
        RawInstruction::new(Opcode::PushInt as u8, OperandValue { int_val: 1 }),
        RawInstruction::new(200, OperandValue::ZERO),
    ];
    let handle = create(4, &raw);
    assert_eq!(run_vm(handle).view(), ResultView::Error(FaultCode::InvalidOpcode));
    assert_eq!(run_vm(handle).view(), ResultView::Error(FaultCode::InvalidOpcode));
    free_vm(handle);
}

#[test]
fn unknown_handles() {
    assert_eq!(
        run_vm(INVALID_HANDLE).view(),
        ResultView::Error(FaultCode::InvalidHandle)
    );
    // Ignored, not fatal.
    free_vm(INVALID_HANDLE);
    free_vm(u64::MAX);
}

#[test]
fn destroyed_handle_is_invalid() {
    let handle = create(4, &records(&[PushInt(1), Halt]));
    free_vm(handle);
    assert_eq!(run_vm(handle).view(), ResultView::Error(FaultCode::InvalidHandle));
    free_vm(handle);
}

// ============================================================
// Lifecycle
// ============================================================

#[test]
fn caller_records_only_need_to_live_for_create() {
    let handle = {
        let raw = records(&[PushInt(6), PushInt(7), Mul, Halt]);
        create(4, &raw)
    };
    assert_eq!(run_vm(handle).view(), ResultView::Integer(42));
    free_vm(handle);
}

#[test]
fn repeated_runs_are_identical() {
    let handle = create(8, &records(&[PushInt(9), PushInt(4), Div, Pop, PushByte(1), Halt]));
    let first = run_vm(handle).view();
    for _ in 0..5 {
        assert_eq!(run_vm(handle).view(), first);
    }
    free_vm(handle);
}

#[test]
fn repeated_byte_array_runs_return_fresh_buffers() {
    let handle = create(4, &records(&[PushByte(7), Pack(1), Halt]));
    let a = run_vm(handle).view();
    let b = run_vm(handle).view();
    assert_eq!(take_bytes(a), vec![7]);
    assert_eq!(take_bytes(b), vec![7]);
    free_vm(handle);
}

#[test]
fn handles_run_in_parallel() {
    let handles: Vec<(i32, VmHandle)> = (0..8)
        .map(|i| (i, create(4, &records(&[PushInt(i), PushInt(i), Mul, Halt]))))
        .collect();

    thread::scope(|scope| {
        for &(i, handle) in &handles {
            scope.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(run_vm(handle).view(), ResultView::Integer(i * i));
                }
            });
        }
    });

    for (_, handle) in handles {
        free_vm(handle);
    }
}

#[test]
fn one_handle_shared_across_threads() {
    let handle = create(4, &records(&[PushFloat(2.0), PushFloat(8.0), Div, Halt]));

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    assert_eq!(run_vm(handle).view(), ResultView::Float(0.25));
                }
            });
        }
    });

    free_vm(handle);
}

// ============================================================
// Properties
// ============================================================

fn arb_instruction() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        any::<i32>().prop_map(PushInt),
        (-10.0f32..10.0).prop_map(PushFloat),
        any::<u8>().prop_map(PushByte),
        (0u32..4).prop_map(Pack),
        prop::sample::select(vec![Halt, Pop, Add, Sub, Mul, Div, Eq, Lt, Gt, Concat]),
    ]
}

proptest! {
    #[test]
    fn boundary_agrees_with_interpreter(
        instructions in prop::collection::vec(arb_instruction(), 0..24),
        stack_size in 0usize..8,
    ) {
        let program = Program::new(instructions.clone());
        let expected = stackvm_vm::run_with_capacity(&program, stack_size);

        let handle = create(stack_size, &program.encode());
        let result = run_vm(handle);
        free_vm(handle);

        match (expected, result.view()) {
            (Ok(stackvm_common::Value::ByteArray(bytes)), view @ ResultView::ByteArray(_)) => {
                prop_assert_eq!(take_bytes(view), bytes);
            }
            (Ok(value), view) => {
                let expected_view = stackvm_ffi::VmResult::from_outcome(Ok(value)).view();
                prop_assert_eq!(view, expected_view);
            }
            (Err(fault), view) => {
                prop_assert_eq!(view, ResultView::Error(FaultCode::from(&fault)));
            }
        }
    }
}
