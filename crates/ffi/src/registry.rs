//! Process-wide table of live VM instances, keyed by opaque handle.
//!
//! The table lock is only held to look up, insert or remove an entry. Each
//! instance sits behind its own lock, so runs on different handles proceed
//! in parallel while two runs on the same handle are serialized.

use std::collections::BTreeMap;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use log::warn;
use stackvm_common::{DecodeError, Program};
use stackvm_vm::{OperandStack, VM};

use crate::abi::{FaultCode, VmResult};

/// Opaque instance handle. Never reused within a process.
pub type VmHandle = u64;

/// Returned by `create_vm` when no instance could be created.
pub const INVALID_HANDLE: VmHandle = 0;

type Table = BTreeMap<VmHandle, Arc<Mutex<Instance>>>;

static INSTANCES: OnceLock<Mutex<Table>> = OnceLock::new();
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// A created VM: its decoded program and a stack allocation that is
/// reused by every run.
#[derive(Debug)]
pub struct Instance {
    program: Result<Program, DecodeError>,
    stack: OperandStack,
    stack_capacity: usize,
}

impl Instance {
    /// A program that failed to decode is kept as its error and reported
    /// on every run.
    pub fn new(program: Result<Program, DecodeError>, stack: OperandStack) -> Self {
        let stack_capacity = stack.capacity();
        Self {
            program,
            stack,
            stack_capacity,
        }
    }

    pub fn stack_capacity(&self) -> usize {
        self.stack_capacity
    }

    /// Execute the program from a fresh state.
    pub fn run(&mut self) -> VmResult {
        let program = match &self.program {
            Ok(program) => program,
            Err(err) => {
                warn!("refusing to run: {err}");
                return VmResult::fault(FaultCode::InvalidOpcode);
            }
        };

        // A run that unwound never handed its stack back.
        if self.stack.capacity() != self.stack_capacity {
            warn!("rebuilding a stack lost by an interrupted run");
            self.stack = OperandStack::new(self.stack_capacity);
        }

        let mut vm = VM::with_stack(program, mem::take(&mut self.stack));
        let outcome = vm.execute();
        self.stack = vm.into_stack();

        VmResult::from_outcome(outcome)
    }
}

fn table() -> MutexGuard<'static, Table> {
    // A poisoned table is still structurally sound; the lock only guards
    // plain inserts and removals.
    INSTANCES
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Register an instance and return its new handle.
pub fn insert(instance: Instance) -> VmHandle {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    table().insert(handle, Arc::new(Mutex::new(instance)));
    handle
}

/// Look up a live instance.
pub fn get(handle: VmHandle) -> Option<Arc<Mutex<Instance>>> {
    table().get(&handle).cloned()
}

/// Drop an instance. Returns `false` if the handle was not live.
///
/// A run in progress on another thread keeps the instance alive until it
/// finishes.
pub fn remove(handle: VmHandle) -> bool {
    table().remove(&handle).is_some()
}

/// Run the instance behind `handle`.
pub fn run(handle: VmHandle) -> VmResult {
    let Some(instance) = get(handle) else {
        warn!("run on unknown handle {handle}");
        return VmResult::fault(FaultCode::InvalidHandle);
    };
    let mut instance = instance.lock().unwrap_or_else(PoisonError::into_inner);
    instance.run()
}
