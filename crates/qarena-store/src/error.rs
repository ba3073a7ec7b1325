//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// The two failure classes an arena operation can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request needs more bytes than the arena has free.
    OutOfMemory,
    /// The request is invalid for the current arena state.
    IllegalOperation,
}

/// Errors that can occur during queue operations.
///
/// Every check runs before the arena is mutated, so an `Err` always means
/// the arena is exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Not enough free bytes to complete the request.
    OutOfMemory {
        /// Number of bytes the operation needed.
        requested: usize,
        /// Number of bytes still free in the arena.
        available: usize,
    },
    /// Misuse of the arena API.
    IllegalOperation(IllegalOperation),
}

impl ArenaError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::IllegalOperation(_) => ErrorKind::IllegalOperation,
        }
    }

    /// Whether this error is [`ErrorKind::OutOfMemory`].
    pub fn is_out_of_memory(&self) -> bool {
        self.kind() == ErrorKind::OutOfMemory
    }

    /// Whether this error is [`ErrorKind::IllegalOperation`].
    pub fn is_illegal_operation(&self) -> bool {
        self.kind() == ErrorKind::IllegalOperation
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                available,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, {available} bytes free"
                )
            }
            Self::IllegalOperation(op) => write!(f, "illegal operation: {op}"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IllegalOperation(op) => Some(op),
            Self::OutOfMemory { .. } => None,
        }
    }
}

impl From<IllegalOperation> for ArenaError {
    fn from(op: IllegalOperation) -> Self {
        Self::IllegalOperation(op)
    }
}

/// Reasons an operation is rejected as illegal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IllegalOperation {
    /// Every directory slot is already in use.
    DirectoryFull {
        /// Number of slots in the directory.
        max_queues: u16,
    },
    /// The handle names a slot outside this arena's directory.
    UnknownSlot {
        /// The slot index encoded in the handle.
        slot: u16,
        /// Number of slots in the directory.
        max_queues: u16,
    },
    /// The handle's queue has been destroyed and the slot is free.
    QueueDestroyed {
        /// The freed slot.
        slot: u16,
    },
    /// The handle's queue was destroyed and the slot now holds a newer queue.
    StaleHandle {
        /// The reused slot.
        slot: u16,
        /// Generation encoded in the handle.
        handle_generation: u32,
        /// Generation of the queue currently in the slot.
        slot_generation: u32,
    },
    /// Dequeue from a queue holding no bytes.
    QueueEmpty {
        /// The empty queue's slot.
        slot: u16,
    },
}

impl fmt::Display for IllegalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryFull { max_queues } => {
                write!(f, "queue directory full ({max_queues} slots in use)")
            }
            Self::UnknownSlot { slot, max_queues } => {
                write!(f, "slot {slot} is outside a directory of {max_queues} slots")
            }
            Self::QueueDestroyed { slot } => write!(f, "queue in slot {slot} was destroyed"),
            Self::StaleHandle {
                slot,
                handle_generation,
                slot_generation,
            } => {
                write!(
                    f,
                    "stale handle for slot {slot}: generation {handle_generation}, current {slot_generation}"
                )
            }
            Self::QueueEmpty { slot } => write!(f, "queue in slot {slot} is empty"),
        }
    }
}

impl Error for IllegalOperation {}
