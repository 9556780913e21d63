//! Workgroup-local ("shared") memory for simulated work items.
//!
//! Each workgroup of a simulated dispatch gets its own [`WorkgroupShared`],
//! visible to all of its work items and to no other workgroup.
//!
//! Slots are 32-bit atomics accessed with `Relaxed` ordering. Ordering
//! between work items comes only from [`GroupBarrier`](super::GroupBarrier):
//! a value stored before `sync_threads()` is visible to every work item of
//! the group after it. Reading a slot another work item writes in the same
//! barrier interval may observe either value, as on hardware, but is never
//! undefined behavior in Rust.

use std::sync::atomic::{AtomicU32, Ordering};

/// Fixed-size array of 32-bit workgroup-shared slots.
#[derive(Debug)]
pub struct WorkgroupShared {
    slots: Box<[AtomicU32]>,
}

impl WorkgroupShared {
    /// Allocates `len` zeroed slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` if there are no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reads slot `index`.
    ///
    /// ## Panics
    /// If `index >= len()`, like an out-of-bounds slice access.
    #[inline]
    pub fn load(&self, index: usize) -> u32 {
        self.slots[index].load(Ordering::Relaxed)
    }

    /// Writes slot `index`.
    ///
    /// ## Panics
    /// If `index >= len()`.
    #[inline]
    pub fn store(&self, index: usize, value: u32) {
        self.slots[index].store(value, Ordering::Relaxed)
    }

    /// Reads slot `index` as an `f32` bit pattern.
    #[inline]
    pub fn load_f32(&self, index: usize) -> f32 {
        f32::from_bits(self.load(index))
    }

    /// Writes an `f32` into slot `index`.
    #[inline]
    pub fn store_f32(&self, index: usize, value: f32) {
        self.store(index, value.to_bits())
    }

    /// Atomically adds `value` to slot `index`, returning the previous value.
    #[inline]
    pub fn fetch_add(&self, index: usize, value: u32) -> u32 {
        self.slots[index].fetch_add(value, Ordering::Relaxed)
    }

    /// Copies all slots out. Intended for use after the dispatch finished.
    pub fn snapshot(&self) -> Vec<u32> {
        self.slots.iter().map(|s| s.load(Ordering::Relaxed)).collect()
    }
}
