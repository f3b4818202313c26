//! Broker type definitions.
//!
//! ## Types Overview
//!
//! ### GroupInfo
//! One consumer group on a stream: its name, how many entries have been
//! delivered but not acknowledged (pending), and how many consumers are
//! registered.
//!
//! ### ConsumerInfo
//! One member of a consumer group: its name, its share of the group's
//! pending entries, and how long it has been idle.
//!
//! ### PendingEntry
//! One delivered-but-unacknowledged entry: its ID, its owning consumer,
//! how long ago it was delivered, and how many delivery attempts it has
//! seen.
//!
//! ### EntryId
//! A parsed `millis-seq` stream entry ID. IDs order first by the
//! millisecond part, then by the sequence part, which makes `EntryId`
//! usable as a resume cursor when paging through a pending-entries range.
//!
//! ## Design Decisions
//!
//! - Idle durations are u64 milliseconds, matching what the server
//!   reports.
//! - Entry IDs are parsed eagerly at the broker boundary; a malformed ID
//!   in a reply is a reply error, not something callers must handle per
//!   field.

use std::fmt;
use std::str::FromStr;

use crate::error::BrokerError;

/// A consumer group as reported by the stream server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Group name.
    pub name: String,
    /// Entries delivered to the group but not yet acknowledged.
    pub pending: u64,
    /// Number of registered consumers.
    pub consumers: u64,
}

/// A member consumer of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerInfo {
    /// Consumer name.
    pub name: String,
    /// Entries currently assigned to this consumer.
    pub pending: u64,
    /// Milliseconds since the consumer last interacted with the group.
    pub idle_ms: u64,
}

/// A delivered-but-unacknowledged entry in a group's pending list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    /// Entry ID.
    pub id: EntryId,
    /// Name of the consumer the entry is currently assigned to.
    pub consumer: String,
    /// Milliseconds since the entry was last delivered.
    pub idle_ms: u64,
    /// Number of times the entry has been delivered.
    pub delivery_count: u64,
}

/// A stream entry ID in `millis-seq` form, e.g. `1526985054069-0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    /// Millisecond timestamp part.
    pub ms: u64,
    /// Sequence part, disambiguating entries within one millisecond.
    pub seq: u64,
}

impl EntryId {
    /// Smallest possible ID, the inclusive lower bound of a full range
    /// scan.
    pub const MIN: EntryId = EntryId { ms: 0, seq: 0 };

    /// Largest possible ID, the inclusive upper bound of a full range
    /// scan.
    pub const MAX: EntryId = EntryId {
        ms: u64::MAX,
        seq: u64::MAX,
    };

    pub const fn new(ms: u64, seq: u64) -> Self {
        EntryId { ms, seq }
    }

    /// The smallest ID strictly greater than `self`.
    ///
    /// Used to resume a range scan exclusively after the last entry of the
    /// previous page (stream range bounds are inclusive).
    pub fn next(self) -> EntryId {
        match self.seq.checked_add(1) {
            Some(seq) => EntryId { ms: self.ms, seq },
            None => EntryId {
                ms: self.ms + 1,
                seq: 0,
            },
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

impl FromStr for EntryId {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BrokerError::InvalidEntryId(s.to_string());
        let (ms, seq) = s.split_once('-').ok_or_else(invalid)?;
        Ok(EntryId {
            ms: ms.parse().map_err(|_| invalid())?,
            seq: seq.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_parse_and_display() {
        let id: EntryId = "1526985054069-3".parse().unwrap();
        assert_eq!(id, EntryId::new(1526985054069, 3));
        assert_eq!(id.to_string(), "1526985054069-3");
    }

    #[test]
    fn test_entry_id_bounds_display() {
        assert_eq!(EntryId::MIN.to_string(), "0-0");
        assert_eq!(
            EntryId::MAX.to_string(),
            "18446744073709551615-18446744073709551615"
        );
    }

    #[test]
    fn test_entry_id_rejects_malformed() {
        assert!("".parse::<EntryId>().is_err());
        assert!("1234".parse::<EntryId>().is_err());
        assert!("1234-".parse::<EntryId>().is_err());
        assert!("-5".parse::<EntryId>().is_err());
        assert!("abc-0".parse::<EntryId>().is_err());
        assert!("12-0-7".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_entry_id_ordering() {
        let a = EntryId::new(100, 5);
        let b = EntryId::new(100, 6);
        let c = EntryId::new(101, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(EntryId::MIN < a);
        assert!(c < EntryId::MAX);
    }

    #[test]
    fn test_entry_id_next() {
        assert_eq!(EntryId::new(100, 5).next(), EntryId::new(100, 6));
        // Sequence overflow rolls into the next millisecond
        assert_eq!(
            EntryId::new(100, u64::MAX).next(),
            EntryId::new(101, 0)
        );
    }
}
