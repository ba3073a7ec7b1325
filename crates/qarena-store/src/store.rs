//! The fixed-size byte store backing a [`QueueArena`](crate::QueueArena).
//!
//! A [`ByteStore`] is one contiguous, heap-allocated `[u8]` sized once at
//! construction and never resized. Everything the arena knows lives inside
//! it, little-endian:
//!
//! ```text
//! 0                      dir_bytes     header_bytes              used      capacity
//! ├── slot[0..max_queues] ──┼── used:u16 ──┼── q0 | q1 | ... | qN ──┼── free ──┤
//!     i16 each, -1 = free
//! ```
//!
//! Directory access lives in [`crate::directory`]; this module owns the
//! buffer, the used-byte counter and the layout checker.

use std::error::Error;
use std::fmt;

use crate::config::{ArenaConfig, COUNTER_BYTES};
use crate::directory::SlotEntry;

/// Fixed-capacity buffer holding the directory, counter and payloads.
pub(crate) struct ByteStore {
    /// Backing storage. Allocated to full capacity at creation.
    bytes: Box<[u8]>,
    /// Number of directory slots.
    max_queues: u16,
}

impl ByteStore {
    /// Allocate and initialise a store for `config`.
    ///
    /// `config` must already be validated.
    pub(crate) fn new(config: &ArenaConfig) -> Self {
        let mut store = Self {
            bytes: vec![0u8; config.capacity as usize].into_boxed_slice(),
            max_queues: config.max_queues,
        };
        store.init();
        store
    }

    /// Mark every slot free, zero the payload region and set the counter
    /// to the header size. Idempotent.
    pub(crate) fn init(&mut self) {
        for slot in 0..self.max_queues {
            self.set_slot(slot, SlotEntry::Free);
        }
        let header = self.header_bytes();
        self.bytes[header..].fill(0);
        self.set_used(header);
    }

    /// Total buffer size in bytes.
    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Number of directory slots.
    pub(crate) fn max_queues(&self) -> u16 {
        self.max_queues
    }

    pub(crate) fn directory_bytes(&self) -> usize {
        self.max_queues as usize * crate::config::SLOT_BYTES
    }

    pub(crate) fn header_bytes(&self) -> usize {
        self.directory_bytes() + COUNTER_BYTES
    }

    /// Offset of the first payload byte.
    pub(crate) fn payload_start(&self) -> usize {
        self.header_bytes()
    }

    /// Bytes currently occupied by header and payloads.
    pub(crate) fn used(&self) -> usize {
        let at = self.directory_bytes();
        u16::from_le_bytes([self.bytes[at], self.bytes[at + 1]]) as usize
    }

    /// Store a new used-byte count.
    ///
    /// # Panics
    ///
    /// Panics if `used` exceeds the buffer capacity.
    pub(crate) fn set_used(&mut self, used: usize) {
        assert!(
            used <= self.capacity(),
            "used bytes {used} exceed capacity {}",
            self.capacity()
        );
        let at = self.directory_bytes();
        self.bytes[at..at + COUNTER_BYTES].copy_from_slice(&(used as u16).to_le_bytes());
    }

    /// Bytes not yet occupied.
    pub(crate) fn free(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Read one byte.
    ///
    /// # Panics
    ///
    /// Panics if `at` lies outside the used region.
    pub(crate) fn byte(&self, at: usize) -> u8 {
        assert!(at < self.used(), "read at {at} past used end {}", self.used());
        self.bytes[at]
    }

    /// Shared view of the raw buffer.
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable view of the raw buffer.
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Verify the header against the directory contents.
    ///
    /// Checks that every negative slot is the free marker, that the counter
    /// equals header size plus the sum of live lengths, and that the counter
    /// fits in the buffer.
    pub(crate) fn check(&self) -> Result<(), LayoutViolation> {
        let mut live_total = 0usize;
        for slot in 0..self.max_queues {
            let raw = self.raw_slot(slot);
            match raw {
                SlotEntry::FREE_MARKER => {}
                len if len >= 0 => live_total += len as usize,
                _ => return Err(LayoutViolation::BadSlot { slot, raw }),
            }
        }
        let used = self.used();
        let expected = self.header_bytes() + live_total;
        if used != expected {
            return Err(LayoutViolation::CounterMismatch { used, expected });
        }
        if used > self.capacity() {
            return Err(LayoutViolation::OverCapacity {
                used,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }
}

/// Inconsistency found by [`QueueArena::check_layout`](crate::QueueArena::check_layout).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutViolation {
    /// A slot holds a negative value other than the free marker.
    BadSlot {
        /// The offending slot.
        slot: u16,
        /// Its stored value.
        raw: i16,
    },
    /// The counter disagrees with the directory.
    CounterMismatch {
        /// Value stored in the counter.
        used: usize,
        /// Header size plus the sum of live slot lengths.
        expected: usize,
    },
    /// The counter claims more bytes than the buffer holds.
    OverCapacity {
        /// Value stored in the counter.
        used: usize,
        /// Buffer size.
        capacity: usize,
    },
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSlot { slot, raw } => write!(f, "slot {slot} holds invalid value {raw}"),
            Self::CounterMismatch { used, expected } => {
                write!(f, "used-byte counter is {used}, directory implies {expected}")
            }
            Self::OverCapacity { used, capacity } => {
                write!(f, "used-byte counter {used} exceeds capacity {capacity}")
            }
        }
    }
}

impl Error for LayoutViolation {}
