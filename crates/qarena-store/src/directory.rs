//! Queue directory: the slot table at the front of the byte store.
//!
//! Each slot is an `i16`. [`SlotEntry::FREE_MARKER`] (`-1`) marks a free
//! slot; any non-negative value is the byte length of a live queue's
//! region. A queue's region starts at the payload start plus the lengths
//! of every live slot before it, so slot order is payload order.

use crate::config::SLOT_BYTES;
use crate::store::ByteStore;

/// Decoded state of one directory slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SlotEntry {
    /// No queue in this slot.
    Free,
    /// A live queue whose region is this many bytes long.
    Live(u16),
}

impl SlotEntry {
    /// Raw encoding of [`SlotEntry::Free`].
    pub(crate) const FREE_MARKER: i16 = -1;

    fn decode(raw: i16) -> Self {
        if raw < 0 {
            Self::Free
        } else {
            Self::Live(raw as u16)
        }
    }

    fn encode(self) -> i16 {
        match self {
            Self::Free => Self::FREE_MARKER,
            // Capacity <= i16::MAX is enforced by config validation.
            Self::Live(len) => len as i16,
        }
    }

    /// Region length, or 0 for a free slot.
    pub(crate) fn len(self) -> usize {
        match self {
            Self::Free => 0,
            Self::Live(len) => len as usize,
        }
    }
}

impl ByteStore {
    fn slot_at(slot: u16) -> usize {
        slot as usize * SLOT_BYTES
    }

    /// Stored value of a slot, undecoded.
    pub(crate) fn raw_slot(&self, slot: u16) -> i16 {
        let at = Self::slot_at(slot);
        let bytes = self.bytes();
        i16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    /// Decoded value of a slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the directory.
    pub(crate) fn slot(&self, slot: u16) -> SlotEntry {
        assert!(
            slot < self.max_queues(),
            "slot {slot} outside directory of {}",
            self.max_queues()
        );
        SlotEntry::decode(self.raw_slot(slot))
    }

    /// Overwrite a slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the directory.
    pub(crate) fn set_slot(&mut self, slot: u16, entry: SlotEntry) {
        assert!(
            slot < self.max_queues(),
            "slot {slot} outside directory of {}",
            self.max_queues()
        );
        let at = Self::slot_at(slot);
        self.bytes_mut()[at..at + SLOT_BYTES].copy_from_slice(&entry.encode().to_le_bytes());
    }

    /// Lowest-index free slot, if any.
    pub(crate) fn first_free(&self) -> Option<u16> {
        (0..self.max_queues()).find(|&s| self.slot(s) == SlotEntry::Free)
    }

    /// Byte offset where `slot`'s region begins.
    ///
    /// Free slots contribute nothing, so this is also where a queue created
    /// in a free `slot` would start.
    pub(crate) fn region_start(&self, slot: u16) -> usize {
        self.payload_start() + (0..slot).map(|s| self.slot(s).len()).sum::<usize>()
    }

    /// Number of live slots.
    pub(crate) fn live_count(&self) -> usize {
        (0..self.max_queues())
            .filter(|&s| self.slot(s) != SlotEntry::Free)
            .count()
    }
}
