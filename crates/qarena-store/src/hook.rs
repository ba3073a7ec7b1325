//! Pluggable failure diagnostics.
//!
//! A [`FailureHook`] observes every failed operation just before the error
//! is returned to the caller. Hooks are purely diagnostic: the returned
//! [`ArenaError`] is always the authoritative failure signal.

use std::fmt;

use crate::error::ArenaError;

/// The arena operation that produced a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`QueueArena::create_queue`](crate::QueueArena::create_queue).
    Create,
    /// [`QueueArena::destroy_queue`](crate::QueueArena::destroy_queue).
    Destroy,
    /// [`QueueArena::enqueue_byte`](crate::QueueArena::enqueue_byte) and
    /// [`QueueArena::enqueue_slice`](crate::QueueArena::enqueue_slice).
    Enqueue,
    /// [`QueueArena::dequeue_byte`](crate::QueueArena::dequeue_byte) and
    /// [`QueueArena::dequeue_into`](crate::QueueArena::dequeue_into).
    Dequeue,
    /// Length queries on a handle.
    Inspect,
}

impl Operation {
    /// Short lowercase name, used as a structured log field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Destroy => "destroy",
            Self::Enqueue => "enqueue",
            Self::Dequeue => "dequeue",
            Self::Inspect => "inspect",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observer for failed arena operations.
///
/// Both callbacks default to doing nothing, so implementors override only
/// the class they care about. Hooks must be `Send` so the owning arena can
/// move between threads.
pub trait FailureHook: Send {
    /// Called when an operation fails with [`ArenaError::OutOfMemory`].
    fn on_out_of_memory(&mut self, op: Operation, err: &ArenaError) {
        let _ = (op, err);
    }

    /// Called when an operation fails with [`ArenaError::IllegalOperation`].
    fn on_illegal_operation(&mut self, op: Operation, err: &ArenaError) {
        let _ = (op, err);
    }
}

/// Hook that reports failures through `tracing` at `warn` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHook;

impl FailureHook for TracingHook {
    fn on_out_of_memory(&mut self, op: Operation, err: &ArenaError) {
        tracing::warn!(op = op.name(), error = %err, "queue arena out of memory");
    }

    fn on_illegal_operation(&mut self, op: Operation, err: &ArenaError) {
        tracing::warn!(op = op.name(), error = %err, "illegal queue arena operation");
    }
}

/// Route `err` to the matching callback of `hook`.
pub(crate) fn dispatch(hook: &mut dyn FailureHook, op: Operation, err: &ArenaError) {
    match err {
        ArenaError::OutOfMemory { .. } => hook.on_out_of_memory(op, err),
        ArenaError::IllegalOperation(_) => hook.on_illegal_operation(op, err),
    }
}
