//! Owned byte buffers whose ownership crosses the boundary.

use std::mem::ManuallyDrop;

use crate::abi::ByteArrayPtr;

/// A byte array produced by a run.
///
/// `into_raw` hands the allocation out as a [`ByteArrayPtr`]; `from_raw`
/// takes it back. Each buffer handed out must come back exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Leak the allocation as a pointer/length/capacity triple.
    pub fn into_raw(self) -> ByteArrayPtr {
        let mut bytes = ManuallyDrop::new(self.bytes);
        ByteArrayPtr {
            ptr: bytes.as_mut_ptr(),
            len: bytes.len(),
            capacity: bytes.capacity(),
        }
    }

    /// Rebuild a buffer from a triple returned by [`ByteBuffer::into_raw`].
    ///
    /// # Safety
    ///
    /// `raw` must be exactly the triple `into_raw` produced, and the buffer
    /// must not already have been rebuilt or released.
    pub unsafe fn from_raw(raw: ByteArrayPtr) -> Self {
        Self {
            bytes: unsafe { Vec::from_raw_parts(raw.ptr, raw.len, raw.capacity) },
        }
    }

    /// Free the allocation.
    pub fn release(self) {
        drop(self.bytes);
    }
}
