//! Test utilities and reference models for qarena development.
//!
//! Provides a [`ModelArena`] that mirrors the observable behaviour of
//! [`QueueArena`](qarena_store::QueueArena) with one `VecDeque` per slot,
//! a [`RecordingHook`] that captures failure callbacks, and the scripted
//! scenarios in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use qarena_store::{ArenaConfig, ArenaError, ErrorKind, FailureHook, Operation};

/// Identity of a queue in a [`ModelArena`]: slot plus generation.
///
/// Matches `QueueHandle::slot()` / `QueueHandle::generation()` of the real
/// arena when both are driven by the same operation sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle {
    pub slot: u16,
    pub generation: u32,
}

/// Reference model of the queue arena.
///
/// Tracks byte accounting arithmetically and queue contents in ordinary
/// `VecDeque`s, so it can be trusted as an oracle for property tests.
pub struct ModelArena {
    capacity: usize,
    header: usize,
    reserve: usize,
    slots: Vec<Option<VecDeque<u8>>>,
    generations: Vec<u32>,
}

impl ModelArena {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            capacity: config.capacity as usize,
            header: config.header_bytes(),
            reserve: config.queue_reserve as usize,
            slots: vec![None; config.max_queues as usize],
            generations: vec![0; config.max_queues as usize],
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.header
            + self
                .slots
                .iter()
                .flatten()
                .map(|q| self.reserve + q.len())
                .sum::<usize>()
    }

    pub fn free_bytes(&self) -> usize {
        self.capacity - self.used_bytes()
    }

    pub fn live_queues(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn create(&mut self) -> Result<ModelHandle, ErrorKind> {
        if self.reserve > self.free_bytes() {
            return Err(ErrorKind::OutOfMemory);
        }
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(ErrorKind::IllegalOperation)?;
        self.slots[slot] = Some(VecDeque::new());
        Ok(ModelHandle {
            slot: slot as u16,
            generation: self.generations[slot],
        })
    }

    pub fn destroy(&mut self, h: ModelHandle) -> Result<(), ErrorKind> {
        self.live(h)?;
        self.slots[h.slot as usize] = None;
        self.generations[h.slot as usize] = self.generations[h.slot as usize].wrapping_add(1);
        Ok(())
    }

    pub fn enqueue(&mut self, h: ModelHandle, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.live(h)?;
        if bytes.len() > self.free_bytes() {
            return Err(ErrorKind::OutOfMemory);
        }
        self.live(h)?.extend(bytes.iter().copied());
        Ok(())
    }

    pub fn dequeue(&mut self, h: ModelHandle) -> Result<u8, ErrorKind> {
        self.live(h)?.pop_front().ok_or(ErrorKind::IllegalOperation)
    }

    pub fn len(&mut self, h: ModelHandle) -> Result<usize, ErrorKind> {
        Ok(self.live(h)?.len())
    }

    /// Contents of a live queue, oldest first.
    pub fn contents(&mut self, h: ModelHandle) -> Result<Vec<u8>, ErrorKind> {
        Ok(self.live(h)?.iter().copied().collect())
    }

    fn live(&mut self, h: ModelHandle) -> Result<&mut VecDeque<u8>, ErrorKind> {
        let slot = h.slot as usize;
        if slot >= self.slots.len() || self.generations[slot] != h.generation {
            return Err(ErrorKind::IllegalOperation);
        }
        self.slots[slot].as_mut().ok_or(ErrorKind::IllegalOperation)
    }
}

/// One failure observed by a [`RecordingHook`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureEvent {
    pub op: Operation,
    pub error: ArenaError,
}

impl FailureEvent {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Failure hook that appends every callback to a shared log.
///
/// Clone it before installing; the clone kept by the test reads the same
/// log the arena writes.
#[derive(Clone, Default)]
pub struct RecordingHook {
    events: Arc<Mutex<Vec<FailureEvent>>>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<FailureEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.events().iter().filter(|e| e.kind() == kind).count()
    }

    fn record(&self, op: Operation, err: &ArenaError) {
        if let Ok(mut events) = self.events.lock() {
            events.push(FailureEvent {
                op,
                error: err.clone(),
            });
        }
    }
}

impl FailureHook for RecordingHook {
    fn on_out_of_memory(&mut self, op: Operation, err: &ArenaError) {
        self.record(op, err);
    }

    fn on_illegal_operation(&mut self, op: Operation, err: &ArenaError) {
        self.record(op, err);
    }
}
