//! Fixed-capacity byte arena hosting many compacted FIFO queues.
//!
//! A [`QueueArena`] owns one buffer, sized at construction, that holds a
//! directory of queue lengths, a used-byte counter, and every live queue's
//! bytes packed back to back. There is no per-queue allocation: creating,
//! growing, shrinking or destroying a queue slides the bytes of later
//! queues so the payload region never contains a gap.
//!
//! # Architecture
//!
//! ```text
//! QueueArena (lifecycle + FIFO operations, handle validation)
//! ├── ByteStore (Box<[u8]>, allocated once)
//! │   ├── directory: [i16; max_queues]   -1 = free, else region length
//! │   ├── used: u16                      header + all region lengths
//! │   └── payload: q0 | q1 | ... | free tail
//! ├── generations: Box<[u32]> (stale-handle detection)
//! ├── shift (overlap-safe range moves, the compactor)
//! └── Option<Box<dyn FailureHook>> (diagnostics only)
//! ```
//!
//! # Errors
//!
//! Every operation returns a `Result`. Failures fall into two classes,
//! [`ErrorKind::OutOfMemory`] and [`ErrorKind::IllegalOperation`], and are
//! detected before any byte moves, so a failed call leaves the arena
//! untouched.
//!
//! # Example
//!
//! ```
//! use qarena_store::{ArenaConfig, QueueArena};
//!
//! let mut arena = QueueArena::new(ArenaConfig::default()).unwrap();
//! let q = arena.create_queue().unwrap();
//! arena.enqueue_byte(q, 1).unwrap();
//! arena.enqueue_byte(q, 2).unwrap();
//! assert_eq!(arena.dequeue_byte(q).unwrap(), 1);
//! arena.destroy_queue(q).unwrap();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
mod directory;
pub mod error;
pub mod handle;
pub mod hook;
pub mod shift;
mod store;

// Public re-exports for the primary API surface.
pub use arena::{ArenaStats, QueueArena};
pub use config::{ArenaConfig, ConfigError};
pub use error::{ArenaError, ErrorKind, IllegalOperation};
pub use handle::QueueHandle;
pub use hook::{FailureHook, Operation, TracingHook};
pub use store::LayoutViolation;
