//! A run that unwinds part-way leaves its instance usable.
//!
//! The installed logger panics on the first record it sees, which happens
//! inside the interpreter after the instance has handed out its stack.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{LevelFilter, Log, Metadata, Record};
use stackvm_common::Instruction::{self, *};
use stackvm_ffi::{create_vm, free_vm, registry, run_vm, RawInstruction, ResultView};

struct PanicOnce {
    armed: AtomicBool,
}

impl Log for PanicOnce {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, _: &Record) {
        if self.armed.swap(false, Ordering::SeqCst) {
            panic!("logger failure");
        }
    }

    fn flush(&self) {}
}

static LOGGER: PanicOnce = PanicOnce {
    armed: AtomicBool::new(false),
};

#[test]
fn instance_recovers_after_a_run_unwinds() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Debug);

    let records: Vec<RawInstruction> = [PushInt(4), Halt]
        .iter()
        .map(Instruction::encode)
        .collect();
    let handle = unsafe { create_vm(8, records.as_ptr(), records.len()) };
    assert_ne!(handle, 0);

    LOGGER.armed.store(true, Ordering::SeqCst);
    let first = panic::catch_unwind(|| registry::run(handle));
    assert!(first.is_err());

    for _ in 0..3 {
        assert_eq!(run_vm(handle).view(), ResultView::Integer(4));
    }

    free_vm(handle);
}
