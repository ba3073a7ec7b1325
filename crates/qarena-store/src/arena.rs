//! The queue arena: lifecycle and FIFO operations over the byte store.
//!
//! Every mutating operation follows the same three steps:
//!
//! 1. Validate the handle and check capacity. Nothing is mutated yet.
//! 2. Locate the queue's region by summing earlier slot lengths, then open
//!    or close a gap there with the compactor in [`crate::shift`].
//! 3. Update the slot length and the used-byte counter.
//!
//! Because step 1 completes before step 2 begins, a failed call leaves the
//! arena byte-for-byte unchanged.

use std::fmt;

use crate::config::{ArenaConfig, ConfigError};
use crate::directory::SlotEntry;
use crate::error::{ArenaError, IllegalOperation};
use crate::handle::QueueHandle;
use crate::hook::{self, FailureHook, Operation};
use crate::shift::{close_gap, open_gap};
use crate::store::{ByteStore, LayoutViolation};

/// Point-in-time occupancy figures for a [`QueueArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaStats {
    /// Total buffer size in bytes.
    pub capacity: usize,
    /// Bytes occupied by the header and all live queue regions.
    pub used_bytes: usize,
    /// Bytes still available.
    pub free_bytes: usize,
    /// Number of live queues.
    pub live_queues: usize,
    /// Number of free directory slots.
    pub free_slots: usize,
}

/// A fixed-capacity arena of FIFO byte queues.
///
/// All queues share one buffer allocated at construction. Live queue data is
/// kept packed in slot order directly after the header, so every growth,
/// shrink or destruction slides the bytes of later queues to keep the
/// payload region gap-free.
///
/// The arena has no internal locking. Mutating operations take `&mut self`;
/// share it across threads by wrapping it in a mutex.
pub struct QueueArena {
    config: ArenaConfig,
    store: ByteStore,
    /// Per-slot generation, bumped whenever the slot's queue goes away.
    generations: Box<[u32]>,
    hook: Option<Box<dyn FailureHook>>,
}

impl QueueArena {
    /// Create an arena with the given configuration.
    ///
    /// The backing buffer and generation table are allocated here and never
    /// again.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: ArenaConfig) -> Self {
        let store = ByteStore::new(&config);
        let generations = vec![0u32; config.max_queues as usize].into_boxed_slice();
        Self {
            config,
            store,
            generations,
            hook: None,
        }
    }

    /// Builder-style variant of [`set_failure_hook`](Self::set_failure_hook).
    pub fn with_failure_hook(mut self, hook: impl FailureHook + 'static) -> Self {
        self.set_failure_hook(hook);
        self
    }

    /// Install a hook that observes every failed operation.
    ///
    /// Replaces any previously installed hook.
    pub fn set_failure_hook(&mut self, hook: impl FailureHook + 'static) {
        self.hook = Some(Box::new(hook));
    }

    /// Remove the installed hook, if any.
    pub fn clear_failure_hook(&mut self) {
        self.hook = None;
    }

    /// Destroy every queue and return the arena to its freshly built state.
    ///
    /// Handles issued before the reset are rejected afterwards. Calling
    /// `reset` on an empty arena changes nothing observable.
    pub fn reset(&mut self) {
        for slot in 0..self.store.max_queues() {
            if self.store.slot(slot) != SlotEntry::Free {
                self.bump_generation(slot);
            }
        }
        self.store.init();
        tracing::debug!(capacity = self.store.capacity(), "queue arena reset");
    }

    // ── Queue lifecycle ─────────────────────────────────────────────

    /// Create an empty queue in the lowest free directory slot.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::OutOfMemory`] if the configured per-queue reserve
    ///   does not fit in the free space.
    /// - [`IllegalOperation::DirectoryFull`] if every slot is live.
    pub fn create_queue(&mut self) -> Result<QueueHandle, ArenaError> {
        let reserve = self.config.queue_reserve as usize;
        let free = self.store.free();
        if reserve > free {
            let err = ArenaError::OutOfMemory {
                requested: reserve,
                available: free,
            };
            return Err(self.fail(Operation::Create, err));
        }
        let Some(slot) = self.store.first_free() else {
            let err = IllegalOperation::DirectoryFull {
                max_queues: self.store.max_queues(),
            };
            return Err(self.fail(Operation::Create, err.into()));
        };

        let at = self.store.region_start(slot);
        self.grow_at(at, reserve);
        self.store.bytes_mut()[at..at + reserve].fill(0);
        self.store.set_slot(slot, SlotEntry::Live(reserve as u16));

        let handle = QueueHandle::new(slot, self.generations[slot as usize]);
        tracing::debug!(
            slot,
            generation = handle.generation,
            used = self.store.used(),
            "queue created"
        );
        Ok(handle)
    }

    /// Destroy a queue, discarding its bytes and freeing its slot.
    ///
    /// Every later queue slides down to close the gap, and the handle (and
    /// any copy of it) becomes invalid.
    pub fn destroy_queue(&mut self, handle: QueueHandle) -> Result<(), ArenaError> {
        let len = self.resolve(Operation::Destroy, handle)?;
        let at = self.store.region_start(handle.slot);
        self.shrink_at(at, len);
        self.store.set_slot(handle.slot, SlotEntry::Free);
        self.bump_generation(handle.slot);
        tracing::debug!(
            slot = handle.slot,
            reclaimed = len,
            used = self.store.used(),
            "queue destroyed"
        );
        Ok(())
    }

    // ── FIFO operations ─────────────────────────────────────────────

    /// Append one byte to the tail of a queue.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::IllegalOperation`] if the handle is not live.
    /// - [`ArenaError::OutOfMemory`] if the arena is full.
    pub fn enqueue_byte(&mut self, handle: QueueHandle, value: u8) -> Result<(), ArenaError> {
        self.enqueue_slice(handle, &[value])
    }

    /// Append `bytes` to the tail of a queue, oldest first.
    ///
    /// All-or-nothing: if the whole slice does not fit, nothing is appended.
    pub fn enqueue_slice(&mut self, handle: QueueHandle, bytes: &[u8]) -> Result<(), ArenaError> {
        let len = self.resolve(Operation::Enqueue, handle)?;
        let free = self.store.free();
        if bytes.len() > free {
            let err = ArenaError::OutOfMemory {
                requested: bytes.len(),
                available: free,
            };
            return Err(self.fail(Operation::Enqueue, err));
        }
        if bytes.is_empty() {
            return Ok(());
        }

        let tail = self.store.region_start(handle.slot) + len;
        self.grow_at(tail, bytes.len());
        self.store.bytes_mut()[tail..tail + bytes.len()].copy_from_slice(bytes);
        self.store
            .set_slot(handle.slot, SlotEntry::Live((len + bytes.len()) as u16));
        Ok(())
    }

    /// Remove and return the oldest byte of a queue.
    ///
    /// # Errors
    ///
    /// [`ArenaError::IllegalOperation`] if the handle is not live or the
    /// queue is empty.
    pub fn dequeue_byte(&mut self, handle: QueueHandle) -> Result<u8, ArenaError> {
        let len = self.resolve(Operation::Dequeue, handle)?;
        let reserve = self.config.queue_reserve as usize;
        if len <= reserve {
            let err = IllegalOperation::QueueEmpty { slot: handle.slot };
            return Err(self.fail(Operation::Dequeue, err.into()));
        }

        let head = self.store.region_start(handle.slot) + reserve;
        let value = self.store.byte(head);
        self.shrink_at(head, 1);
        self.store.set_slot(handle.slot, SlotEntry::Live((len - 1) as u16));
        Ok(value)
    }

    /// Remove up to `out.len()` of the oldest bytes of a queue into `out`.
    ///
    /// Returns the number of bytes moved, which is 0 for an empty queue.
    pub fn dequeue_into(&mut self, handle: QueueHandle, out: &mut [u8]) -> Result<usize, ArenaError> {
        let len = self.resolve(Operation::Dequeue, handle)?;
        let reserve = self.config.queue_reserve as usize;
        let n = out.len().min(len - reserve);
        if n == 0 {
            return Ok(0);
        }

        let head = self.store.region_start(handle.slot) + reserve;
        out[..n].copy_from_slice(&self.store.bytes()[head..head + n]);
        self.shrink_at(head, n);
        self.store.set_slot(handle.slot, SlotEntry::Live((len - n) as u16));
        Ok(n)
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Number of bytes waiting in a queue.
    pub fn queue_len(&mut self, handle: QueueHandle) -> Result<usize, ArenaError> {
        let len = self.resolve(Operation::Inspect, handle)?;
        Ok(len - self.config.queue_reserve as usize)
    }

    /// Whether a queue holds no bytes.
    pub fn is_queue_empty(&mut self, handle: QueueHandle) -> Result<bool, ArenaError> {
        Ok(self.queue_len(handle)? == 0)
    }

    /// Whether `handle` refers to a live queue in this arena.
    pub fn contains(&self, handle: QueueHandle) -> bool {
        self.lookup(handle).is_ok()
    }

    /// Bytes occupied by the header and every live queue region.
    pub fn used_bytes(&self) -> usize {
        self.store.used()
    }

    /// Bytes still available for reserves and payloads.
    pub fn free_bytes(&self) -> usize {
        self.store.free()
    }

    /// Total buffer size in bytes.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Number of live queues.
    pub fn live_queues(&self) -> usize {
        self.store.live_count()
    }

    /// Snapshot of the occupancy figures.
    pub fn stats(&self) -> ArenaStats {
        let live_queues = self.live_queues();
        ArenaStats {
            capacity: self.capacity(),
            used_bytes: self.used_bytes(),
            free_bytes: self.free_bytes(),
            live_queues,
            free_slots: self.store.max_queues() as usize - live_queues,
        }
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Re-derive the used-byte counter from the directory and compare.
    ///
    /// Always `Ok` unless the arena has a bug.
    pub fn check_layout(&self) -> Result<(), LayoutViolation> {
        self.store.check()
    }

    // ── Internals ───────────────────────────────────────────────────

    fn lookup(&self, handle: QueueHandle) -> Result<usize, IllegalOperation> {
        let max_queues = self.store.max_queues();
        if handle.slot >= max_queues {
            return Err(IllegalOperation::UnknownSlot {
                slot: handle.slot,
                max_queues,
            });
        }
        let slot_generation = self.generations[handle.slot as usize];
        match self.store.slot(handle.slot) {
            SlotEntry::Free => Err(IllegalOperation::QueueDestroyed { slot: handle.slot }),
            SlotEntry::Live(len) if slot_generation == handle.generation => Ok(len as usize),
            SlotEntry::Live(_) => Err(IllegalOperation::StaleHandle {
                slot: handle.slot,
                handle_generation: handle.generation,
                slot_generation,
            }),
        }
    }

    /// Region length of the queue behind `handle`, reporting failures.
    fn resolve(&mut self, op: Operation, handle: QueueHandle) -> Result<usize, ArenaError> {
        self.lookup(handle)
            .map_err(|illegal| self.fail(op, illegal.into()))
    }

    fn fail(&mut self, op: Operation, err: ArenaError) -> ArenaError {
        if let Some(hook) = self.hook.as_deref_mut() {
            hook::dispatch(hook, op, &err);
        }
        err
    }

    fn bump_generation(&mut self, slot: u16) {
        let generation = &mut self.generations[slot as usize];
        *generation = generation.wrapping_add(1);
    }

    /// Open `width` bytes at `at`, sliding `[at, used)` right.
    ///
    /// Capacity must already be checked.
    fn grow_at(&mut self, at: usize, width: usize) {
        let used = self.store.used();
        open_gap(self.store.bytes_mut(), at, used, width);
        self.store.set_used(used + width);
    }

    /// Remove `width` bytes at `at`, sliding `[at + width, used)` left and
    /// zeroing the vacated tail.
    fn shrink_at(&mut self, at: usize, width: usize) {
        let used = self.store.used();
        let buf = self.store.bytes_mut();
        close_gap(buf, at, used, width);
        buf[used - width..used].fill(0);
        self.store.set_used(used - width);
    }

    #[cfg(test)]
    fn region(&self, handle: QueueHandle) -> &[u8] {
        let start = self.store.region_start(handle.slot);
        let len = self.store.slot(handle.slot).len();
        &self.store.bytes()[start..start + len]
    }
}

impl Default for QueueArena {
    fn default() -> Self {
        Self::from_validated(ArenaConfig::default())
    }
}

impl fmt::Debug for QueueArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueArena")
            .field("config", &self.config)
            .field("used_bytes", &self.used_bytes())
            .field("live_queues", &self.live_queues())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::ErrorKind;

    fn arena(capacity: u16, max_queues: u16) -> QueueArena {
        QueueArena::new(ArenaConfig::new(capacity, max_queues)).unwrap()
    }

    fn drain(arena: &mut QueueArena, q: QueueHandle) -> Vec<u8> {
        let mut out = Vec::new();
        while !arena.is_queue_empty(q).unwrap() {
            out.push(arena.dequeue_byte(q).unwrap());
        }
        out
    }

    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<Vec<(Operation, ErrorKind)>>>);

    impl FailureHook for SharedLog {
        fn on_out_of_memory(&mut self, op: Operation, err: &ArenaError) {
            self.0.lock().unwrap().push((op, err.kind()));
        }

        fn on_illegal_operation(&mut self, op: Operation, err: &ArenaError) {
            self.0.lock().unwrap().push((op, err.kind()));
        }
    }

    #[test]
    fn reference_trace() {
        let mut a = QueueArena::default();
        let q0 = a.create_queue().unwrap();
        a.enqueue_byte(q0, 0).unwrap();
        a.enqueue_byte(q0, 1).unwrap();
        let q1 = a.create_queue().unwrap();
        a.enqueue_byte(q1, 3).unwrap();
        a.enqueue_byte(q0, 2).unwrap();
        a.enqueue_byte(q1, 4).unwrap();
        assert_eq!(a.dequeue_byte(q0).unwrap(), 0);
        assert_eq!(a.dequeue_byte(q0).unwrap(), 1);
        a.enqueue_byte(q0, 5).unwrap();
        a.enqueue_byte(q1, 6).unwrap();
        assert_eq!(a.dequeue_byte(q0).unwrap(), 2);
        assert_eq!(a.dequeue_byte(q0).unwrap(), 5);
        a.destroy_queue(q0).unwrap();
        assert_eq!(a.dequeue_byte(q1).unwrap(), 3);
        assert_eq!(a.dequeue_byte(q1).unwrap(), 4);
        assert_eq!(a.dequeue_byte(q1).unwrap(), 6);
        a.destroy_queue(q1).unwrap();
        assert_eq!(a.used_bytes(), 130);
        assert_eq!(a.live_queues(), 0);
        assert!(a.check_layout().is_ok());
    }

    #[test]
    fn payloads_are_packed_in_slot_order() {
        let mut a = arena(128, 4);
        let q0 = a.create_queue().unwrap();
        let q1 = a.create_queue().unwrap();
        let q2 = a.create_queue().unwrap();
        a.enqueue_slice(q2, &[20, 21]).unwrap();
        a.enqueue_slice(q0, &[1, 2, 3]).unwrap();
        a.enqueue_byte(q1, 10).unwrap();
        a.enqueue_byte(q0, 4).unwrap();

        let start = a.config().payload_start();
        assert_eq!(
            &a.store.bytes()[start..a.used_bytes()],
            &[1, 2, 3, 4, 10, 20, 21]
        );
        assert_eq!(a.region(q1), &[10]);
        assert!(a.store.bytes()[a.used_bytes()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn fifo_order_single_queue() {
        let mut a = arena(256, 2);
        let q = a.create_queue().unwrap();
        for b in 0..50u8 {
            a.enqueue_byte(q, b).unwrap();
        }
        assert_eq!(drain(&mut a, q), (0..50u8).collect::<Vec<_>>());
    }

    #[test]
    fn operations_on_one_queue_leave_others_intact() {
        let mut a = arena(256, 4);
        let qa = a.create_queue().unwrap();
        let qb = a.create_queue().unwrap();
        let qc = a.create_queue().unwrap();
        a.enqueue_slice(qa, b"aaaa").unwrap();
        a.enqueue_slice(qb, b"bbbb").unwrap();
        a.enqueue_slice(qc, b"cccc").unwrap();

        a.enqueue_slice(qb, b"XYZ").unwrap();
        a.dequeue_byte(qb).unwrap();
        a.destroy_queue(qb).unwrap();

        assert_eq!(a.region(qa), b"aaaa");
        assert_eq!(a.region(qc), b"cccc");
        assert_eq!(drain(&mut a, qc), b"cccc");
        assert_eq!(drain(&mut a, qa), b"aaaa");
    }

    #[test]
    fn destroy_reclaims_exactly_the_queue_length() {
        let mut a = arena(256, 4);
        let keep = a.create_queue().unwrap();
        let doomed = a.create_queue().unwrap();
        a.enqueue_slice(keep, &[1, 2]).unwrap();
        a.enqueue_slice(doomed, &[9; 17]).unwrap();
        let before = a.used_bytes();
        a.destroy_queue(doomed).unwrap();
        assert_eq!(a.used_bytes(), before - 17);
        assert!(a.check_layout().is_ok());
    }

    #[test]
    fn freed_space_and_slot_are_reused() {
        let mut a = arena(64, 2);
        // 2 slots * 2 + 2 = 6 byte header, 58 payload bytes.
        let q0 = a.create_queue().unwrap();
        a.enqueue_slice(q0, &[7; 58]).unwrap();
        assert_eq!(a.free_bytes(), 0);
        a.destroy_queue(q0).unwrap();

        let q1 = a.create_queue().unwrap();
        assert_eq!(q1.slot(), 0);
        assert_ne!(q1.generation(), q0.generation());
        a.enqueue_slice(q1, &[8; 58]).unwrap();
        assert_eq!(a.free_bytes(), 0);
    }

    #[test]
    fn round_trip_restores_used_bytes() {
        let mut a = arena(512, 8);
        let other = a.create_queue().unwrap();
        a.enqueue_slice(other, &[1, 2, 3]).unwrap();
        let before = a.used_bytes();

        let q = a.create_queue().unwrap();
        for b in 0..40u8 {
            a.enqueue_byte(q, b).unwrap();
        }
        for _ in 0..40 {
            a.dequeue_byte(q).unwrap();
        }
        a.destroy_queue(q).unwrap();
        assert_eq!(a.used_bytes(), before);
    }

    #[test]
    fn directory_exhaustion_fails_on_next_create_only() {
        let mut a = arena(256, 3);
        for _ in 0..3 {
            let _ = a.create_queue().unwrap();
        }
        let err = a.create_queue().unwrap_err();
        assert_eq!(
            err,
            ArenaError::IllegalOperation(IllegalOperation::DirectoryFull { max_queues: 3 })
        );
    }

    #[test]
    fn byte_exhaustion_fails_on_next_enqueue_only() {
        let mut a = arena(16, 1);
        // 1 slot * 2 + 2 = 4 byte header.
        let q = a.create_queue().unwrap();
        for b in 0..12u8 {
            a.enqueue_byte(q, b).unwrap();
        }
        assert_eq!(a.used_bytes(), 16);
        let err = a.enqueue_byte(q, 99).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OutOfMemory {
                requested: 1,
                available: 0
            }
        );
        assert_eq!(drain(&mut a, q), (0..12u8).collect::<Vec<_>>());
    }

    #[test]
    fn oversized_slice_is_rejected_whole() {
        let mut a = arena(16, 1);
        let q = a.create_queue().unwrap();
        a.enqueue_slice(q, &[1, 2]).unwrap();
        let err = a.enqueue_slice(q, &[0; 11]).unwrap_err();
        assert!(err.is_out_of_memory());
        assert_eq!(a.queue_len(q).unwrap(), 2);
    }

    #[test]
    fn dequeue_from_empty_queue_is_illegal() {
        let mut a = arena(64, 2);
        let q = a.create_queue().unwrap();
        assert_eq!(
            a.dequeue_byte(q).unwrap_err(),
            ArenaError::IllegalOperation(IllegalOperation::QueueEmpty { slot: 0 })
        );
        a.enqueue_byte(q, 1).unwrap();
        a.dequeue_byte(q).unwrap();
        assert!(a.dequeue_byte(q).unwrap_err().is_illegal_operation());
    }

    #[test]
    fn destroyed_handle_is_rejected_everywhere() {
        let mut a = arena(64, 2);
        let q = a.create_queue().unwrap();
        a.destroy_queue(q).unwrap();
        let destroyed = ArenaError::IllegalOperation(IllegalOperation::QueueDestroyed { slot: 0 });
        assert_eq!(a.destroy_queue(q).unwrap_err(), destroyed);
        assert_eq!(a.enqueue_byte(q, 1).unwrap_err(), destroyed);
        assert_eq!(a.dequeue_byte(q).unwrap_err(), destroyed);
        assert_eq!(a.queue_len(q).unwrap_err(), destroyed);
        assert!(!a.contains(q));
    }

    #[test]
    fn stale_handle_cannot_touch_new_queue() {
        let mut a = arena(64, 2);
        let old = a.create_queue().unwrap();
        a.destroy_queue(old).unwrap();
        let new = a.create_queue().unwrap();
        a.enqueue_byte(new, 42).unwrap();

        let err = a.dequeue_byte(old).unwrap_err();
        assert_eq!(
            err,
            ArenaError::IllegalOperation(IllegalOperation::StaleHandle {
                slot: 0,
                handle_generation: 0,
                slot_generation: 1,
            })
        );
        assert_eq!(a.dequeue_byte(new).unwrap(), 42);
    }

    #[test]
    fn handle_from_larger_arena_is_unknown() {
        let mut big = arena(256, 8);
        let mut small = arena(64, 2);
        let handles: Vec<_> = (0..5).map(|_| big.create_queue().unwrap()).collect();
        assert_eq!(
            small.enqueue_byte(handles[4], 1).unwrap_err(),
            ArenaError::IllegalOperation(IllegalOperation::UnknownSlot {
                slot: 4,
                max_queues: 2
            })
        );
    }

    #[test]
    fn failed_operations_do_not_mutate() {
        let mut a = arena(24, 2);
        let q0 = a.create_queue().unwrap();
        let q1 = a.create_queue().unwrap();
        a.enqueue_slice(q0, &[1, 2, 3]).unwrap();
        a.enqueue_slice(q1, &[4; 15]).unwrap();
        assert_eq!(a.free_bytes(), 0);
        let snapshot = a.store.bytes().to_vec();

        assert!(a.enqueue_byte(q0, 9).is_err());
        assert!(a.create_queue().is_err());
        assert_eq!(a.store.bytes(), &snapshot[..]);

        a.destroy_queue(q1).unwrap();
        let after_destroy = a.store.bytes().to_vec();
        assert!(a.destroy_queue(q1).is_err());
        assert!(a.dequeue_byte(q1).is_err());
        assert!(a.enqueue_slice(q1, &[0]).is_err());
        assert_eq!(a.store.bytes(), &after_destroy[..]);
        assert_eq!(drain(&mut a, q0), vec![1, 2, 3]);
    }

    #[test]
    fn hook_observes_each_failure_once() {
        let log = SharedLog::default();
        let mut a = arena(16, 1).with_failure_hook(log.clone());
        let q = a.create_queue().unwrap();
        assert!(a.dequeue_byte(q).is_err());
        a.enqueue_slice(q, &[0; 12]).unwrap();
        assert!(a.enqueue_byte(q, 0).is_err());
        assert!(a.create_queue().is_err());

        let events = log.0.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                (Operation::Dequeue, ErrorKind::IllegalOperation),
                (Operation::Enqueue, ErrorKind::OutOfMemory),
                (Operation::Create, ErrorKind::IllegalOperation),
            ]
        );
    }

    #[test]
    fn cleared_hook_is_not_called() {
        let log = SharedLog::default();
        let mut a = arena(16, 1);
        a.set_failure_hook(log.clone());
        a.clear_failure_hook();
        let q = a.create_queue().unwrap();
        assert!(a.dequeue_byte(q).is_err());
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[test]
    fn reset_invalidates_handles_and_is_idempotent() {
        let mut a = arena(128, 4);
        let q = a.create_queue().unwrap();
        a.enqueue_slice(q, &[1, 2, 3]).unwrap();
        a.reset();
        let once = a.store.bytes().to_vec();
        a.reset();
        assert_eq!(a.store.bytes(), &once[..]);
        assert_eq!(a.used_bytes(), a.config().header_bytes());
        assert!(!a.contains(q));

        let fresh = a.create_queue().unwrap();
        assert_eq!(fresh.slot(), q.slot());
        assert!(a.enqueue_byte(q, 0).is_err());
    }

    #[test]
    fn dequeue_into_takes_at_most_buffer_len() {
        let mut a = arena(128, 2);
        let q = a.create_queue().unwrap();
        a.enqueue_slice(q, &[1, 2, 3, 4, 5]).unwrap();
        let mut buf = [0u8; 3];
        assert_eq!(a.dequeue_into(q, &mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(a.dequeue_into(q, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(a.dequeue_into(q, &mut buf).unwrap(), 0);
    }

    #[test]
    fn stats_reflect_occupancy() {
        let mut a = arena(128, 4);
        let q = a.create_queue().unwrap();
        a.enqueue_slice(q, &[0; 8]).unwrap();
        assert_eq!(
            a.stats(),
            ArenaStats {
                capacity: 128,
                used_bytes: 10 + 8,
                free_bytes: 128 - 18,
                live_queues: 1,
                free_slots: 3,
            }
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert_eq!(
            QueueArena::new(ArenaConfig::new(128, 0)).unwrap_err(),
            ConfigError::NoQueues
        );
    }

    mod reserve {
        use super::*;

        fn reserved(capacity: u16, max_queues: u16, reserve: u16) -> QueueArena {
            QueueArena::new(ArenaConfig::new(capacity, max_queues).with_queue_reserve(reserve))
                .unwrap()
        }

        #[test]
        fn create_charges_the_reserve() {
            let mut a = reserved(64, 4, 3);
            let q = a.create_queue().unwrap();
            assert_eq!(a.used_bytes(), 10 + 3);
            assert_eq!(a.queue_len(q).unwrap(), 0);
            assert!(a.dequeue_byte(q).unwrap_err().is_illegal_operation());
        }

        #[test]
        fn reserve_sits_before_the_payload() {
            let mut a = reserved(64, 4, 3);
            let q0 = a.create_queue().unwrap();
            let q1 = a.create_queue().unwrap();
            a.enqueue_slice(q0, &[7, 8]).unwrap();
            a.enqueue_byte(q1, 9).unwrap();
            assert_eq!(a.region(q0), &[0, 0, 0, 7, 8]);
            assert_eq!(a.region(q1), &[0, 0, 0, 9]);
            assert_eq!(a.dequeue_byte(q0).unwrap(), 7);
            assert_eq!(a.dequeue_byte(q1).unwrap(), 9);
        }

        #[test]
        fn reserve_does_not_leak() {
            let mut a = reserved(128, 8, 3);
            let baseline = a.used_bytes();
            for round in 0..20u8 {
                let q = a.create_queue().unwrap();
                a.enqueue_slice(q, &[round; 5]).unwrap();
                assert_eq!(drain(&mut a, q), vec![round; 5]);
                a.destroy_queue(q).unwrap();
                assert_eq!(a.used_bytes(), baseline);
            }
        }

        #[test]
        fn create_fails_with_oom_when_reserve_does_not_fit() {
            // 1 slot header = 4 bytes, 2 free bytes left for a 3 byte reserve.
            let mut a = reserved(6, 1, 3);
            let err = a.create_queue().unwrap_err();
            assert_eq!(
                err,
                ArenaError::OutOfMemory {
                    requested: 3,
                    available: 2
                }
            );
            assert_eq!(a.used_bytes(), 4);
        }

        #[test]
        fn creation_stops_at_byte_capacity() {
            // 8 slots: 18 byte header, 12 free bytes fit four 3 byte reserves.
            let mut a = reserved(30, 8, 3);
            for _ in 0..4 {
                let _ = a.create_queue().unwrap();
            }
            assert!(a.create_queue().unwrap_err().is_out_of_memory());
        }
    }
}
