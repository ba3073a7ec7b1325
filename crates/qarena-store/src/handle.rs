//! Queue handles.
//!
//! A [`QueueHandle`] names a directory slot plus the generation of the queue
//! that owned the slot when the handle was issued. Destroying a queue bumps
//! its slot's generation, so handles that outlive their queue are rejected
//! in O(1) without a lookup table.

use std::fmt;

/// Opaque reference to a live queue.
///
/// Returned by [`QueueArena::create_queue`](crate::QueueArena::create_queue)
/// and consumed by every other queue operation. Handles are plain values:
/// copying one does not duplicate the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct QueueHandle {
    /// Directory slot index.
    pub(crate) slot: u16,
    /// Slot generation when the handle was issued.
    pub(crate) generation: u32,
}

impl QueueHandle {
    pub(crate) fn new(slot: u16, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// The directory slot this handle points at.
    ///
    /// Slot indices are stable for the queue's whole lifetime.
    pub fn slot(&self) -> u16 {
        self.slot
    }

    /// The slot generation this handle was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueueHandle(slot={}, gen={})", self.slot, self.generation)
    }
}
