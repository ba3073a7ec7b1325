//! qarena: many FIFO byte queues packed into one fixed-capacity buffer.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the qarena sub-crates. For most users, adding `qarena` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use qarena::prelude::*;
//!
//! // 1 KiB arena with room for 16 queues.
//! let mut arena = QueueArena::new(ArenaConfig::new(1024, 16)).unwrap();
//!
//! let inbox = arena.create_queue().unwrap();
//! let outbox = arena.create_queue().unwrap();
//! arena.enqueue_slice(inbox, b"hello").unwrap();
//! arena.enqueue_byte(outbox, b'!').unwrap();
//!
//! assert_eq!(arena.dequeue_byte(inbox).unwrap(), b'h');
//! assert_eq!(arena.queue_len(inbox).unwrap(), 4);
//!
//! // Destroying a queue compacts the arena immediately.
//! let before = arena.used_bytes();
//! arena.destroy_queue(inbox).unwrap();
//! assert_eq!(arena.used_bytes(), before - 4);
//!
//! // Stale handles are rejected, never silently reused.
//! let err = arena.enqueue_byte(inbox, 0).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::IllegalOperation);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`store`] | `qarena-store` | `QueueArena`, configuration, errors, hooks, the shift primitive |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Queue arena, configuration, errors and failure hooks (`qarena-store`).
///
/// Most users only need the types in the [`prelude`]. The
/// [`store::shift`] module exposes the overlap-safe range move used by the
/// arena's compactor.
pub use qarena_store as store;

/// Common imports for typical qarena usage.
///
/// ```rust
/// use qarena::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use qarena_store::{ArenaConfig, ArenaStats, QueueArena, QueueHandle};

    // Errors
    pub use qarena_store::{ArenaError, ConfigError, ErrorKind, IllegalOperation};

    // Diagnostics
    pub use qarena_store::{FailureHook, Operation, TracingHook};
}
