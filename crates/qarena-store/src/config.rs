//! Arena configuration parameters.

use std::error::Error;
use std::fmt;

/// Width of one directory slot in bytes (an `i16` length).
pub const SLOT_BYTES: usize = std::mem::size_of::<i16>();

/// Width of the used-byte counter in bytes (a `u16`).
pub const COUNTER_BYTES: usize = std::mem::size_of::<u16>();

/// Configuration for a [`QueueArena`](crate::QueueArena).
///
/// Controls the byte capacity of the backing buffer, the directory size,
/// and how many bytes each queue reserves on creation. Validated at
/// construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Total size of the backing buffer in bytes, header included.
    ///
    /// Default: 2048. Must not exceed `i16::MAX` because slot lengths are
    /// stored as signed 16-bit integers.
    pub capacity: u16,

    /// Number of directory slots, i.e. the maximum number of live queues.
    ///
    /// Default: 64. Must be at least 1.
    pub max_queues: u16,

    /// Bytes reserved at the head of every queue's region on creation.
    ///
    /// Reserved bytes are zeroed, never readable, and count towards the
    /// queue's slot length and the arena's used bytes until the queue is
    /// destroyed. Default: 0.
    pub queue_reserve: u16,
}

impl ArenaConfig {
    /// Default buffer capacity in bytes.
    pub const DEFAULT_CAPACITY: u16 = 2048;

    /// Default number of directory slots.
    pub const DEFAULT_MAX_QUEUES: u16 = 64;

    /// Default per-queue reserve.
    pub const DEFAULT_QUEUE_RESERVE: u16 = 0;

    /// Largest capacity representable by the slot encoding.
    pub const MAX_CAPACITY: u16 = i16::MAX as u16;

    /// Create a config with the given capacity and directory size.
    ///
    /// Uses the default queue reserve.
    pub fn new(capacity: u16, max_queues: u16) -> Self {
        Self {
            capacity,
            max_queues,
            queue_reserve: Self::DEFAULT_QUEUE_RESERVE,
        }
    }

    /// Builder-style setter for [`capacity`](Self::capacity).
    pub fn with_capacity(mut self, capacity: u16) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style setter for [`max_queues`](Self::max_queues).
    pub fn with_max_queues(mut self, max_queues: u16) -> Self {
        self.max_queues = max_queues;
        self
    }

    /// Builder-style setter for [`queue_reserve`](Self::queue_reserve).
    pub fn with_queue_reserve(mut self, queue_reserve: u16) -> Self {
        self.queue_reserve = queue_reserve;
        self
    }

    /// Bytes occupied by the directory alone.
    pub fn directory_bytes(&self) -> usize {
        self.max_queues as usize * SLOT_BYTES
    }

    /// Bytes occupied by the directory plus the used-byte counter.
    ///
    /// This is the `used_bytes` value of an arena with no live queues.
    pub fn header_bytes(&self) -> usize {
        self.directory_bytes() + COUNTER_BYTES
    }

    /// Offset of the first payload byte.
    pub fn payload_start(&self) -> usize {
        self.header_bytes()
    }

    /// Bytes available for queue payloads (and reserves) in an empty arena.
    pub fn payload_capacity(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.header_bytes())
    }

    /// Check every structural constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queues == 0 {
            return Err(ConfigError::NoQueues);
        }
        if self.capacity > Self::MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                configured: self.capacity,
                max: Self::MAX_CAPACITY,
            });
        }
        if self.header_bytes() > self.capacity as usize {
            return Err(ConfigError::HeaderExceedsCapacity {
                header: self.header_bytes(),
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_MAX_QUEUES)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`ArenaConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The directory has zero slots.
    NoQueues,
    /// Capacity cannot be described by the `i16` slot encoding.
    CapacityTooLarge {
        /// The configured capacity.
        configured: u16,
        /// The largest supported capacity.
        max: u16,
    },
    /// The directory and counter alone do not fit in the buffer.
    HeaderExceedsCapacity {
        /// Bytes needed by the directory plus the counter.
        header: usize,
        /// The configured capacity.
        capacity: u16,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoQueues => write!(f, "max_queues must be at least 1"),
            Self::CapacityTooLarge { configured, max } => {
                write!(f, "capacity {configured} exceeds maximum of {max} bytes")
            }
            Self::HeaderExceedsCapacity { header, capacity } => {
                write!(
                    f,
                    "header needs {header} bytes but capacity is {capacity} bytes"
                )
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_reference_arena() {
        let config = ArenaConfig::default();
        assert_eq!(config.capacity, 2048);
        assert_eq!(config.max_queues, 64);
        assert_eq!(config.directory_bytes(), 128);
        assert_eq!(config.header_bytes(), 130);
        assert_eq!(config.payload_capacity(), 2048 - 130);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_queues_rejected() {
        let config = ArenaConfig::new(256, 0);
        assert_eq!(config.validate(), Err(ConfigError::NoQueues));
    }

    #[test]
    fn oversized_capacity_rejected() {
        let config = ArenaConfig::new(u16::MAX, 4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapacityTooLarge { .. })
        ));
    }

    #[test]
    fn header_must_fit() {
        // 16 slots * 2 bytes + 2 byte counter = 34 bytes.
        let config = ArenaConfig::new(33, 16);
        assert_eq!(
            config.validate(),
            Err(ConfigError::HeaderExceedsCapacity {
                header: 34,
                capacity: 33
            })
        );
        assert!(ArenaConfig::new(34, 16).validate().is_ok());
    }

    #[test]
    fn builder_setters_chain() {
        let config = ArenaConfig::default()
            .with_capacity(512)
            .with_max_queues(8)
            .with_queue_reserve(3);
        assert_eq!(config, ArenaConfig {
            capacity: 512,
            max_queues: 8,
            queue_reserve: 3,
        });
    }
}
