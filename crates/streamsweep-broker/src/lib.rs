//! Streamsweep Broker
//!
//! This crate abstracts the stream-server protocol surface the sweep needs:
//! enumerating consumer groups and their members, listing pending entries,
//! transferring entry ownership, and removing consumer registrations.
//!
//! ## Why a trait?
//!
//! The sweep itself is pure policy (who is dead, what to reclaim). Putting
//! the wire protocol behind [`StreamBroker`] keeps that policy testable
//! against an in-memory broker and keeps the Redis specifics in one place.
//!
//! ## Implementations
//!
//! - [`RedisStreamBroker`]: talks to a live Redis server over a multiplexed
//!   async connection, using the stream commands (`XINFO`, `XPENDING`,
//!   `XCLAIM`, `XGROUP DELCONSUMER`).
//!
//! ## Thread Safety
//!
//! All implementations must be Send + Sync, allowing safe sharing across
//! async tasks via Arc<dyn StreamBroker>.
//!
//! ## Error Handling
//!
//! All methods return `Result<T>` which is `Result<T, BrokerError>`.
//! Server/connection failures surface as `BrokerError::Redis`; replies the
//! parser cannot make sense of surface as `BrokerError::InvalidReply`
//! rather than panicking.

pub mod client;
pub mod error;
pub mod reply;
pub mod types;

pub use client::RedisStreamBroker;
pub use error::{BrokerError, Result};
pub use types::{ConsumerInfo, EntryId, GroupInfo, PendingEntry};

use async_trait::async_trait;

/// Protocol surface consumed by the sweep.
///
/// One instance corresponds to one connection to a stream server. Methods
/// take the stream key explicitly so a single broker can serve sweeps over
/// different streams.
#[async_trait]
pub trait StreamBroker: Send + Sync {
    /// List the consumer groups registered on `stream`.
    async fn list_groups(&self, stream: &str) -> Result<Vec<GroupInfo>>;

    /// List the member consumers of `group`, with their pending counts and
    /// idle durations.
    async fn list_consumers(&self, stream: &str, group: &str) -> Result<Vec<ConsumerInfo>>;

    /// List up to `count` pending entries of `group` with IDs in
    /// `[start, end]`, in ID order. Entries from every consumer are
    /// returned; callers filter by owner.
    async fn pending_entries(
        &self,
        stream: &str,
        group: &str,
        start: EntryId,
        end: EntryId,
        count: usize,
    ) -> Result<Vec<PendingEntry>>;

    /// Transfer ownership of the pending entry `id` to `new_owner`,
    /// provided the entry has been idle for at least `min_idle_ms`.
    ///
    /// Returns `Ok(false)` when the server declines the transfer because
    /// the entry is no longer pending or not idle long enough. For an
    /// overlapping sweep that is the expected no-op, not an error.
    async fn claim_entry(
        &self,
        stream: &str,
        group: &str,
        new_owner: &str,
        min_idle_ms: u64,
        id: EntryId,
    ) -> Result<bool>;

    /// Remove `consumer` from `group`.
    ///
    /// Returns the number of pending entries the consumer still owned at
    /// removal time. The server discards those entries' delivery state, so
    /// callers reclaim first and treat a non-zero return as lost work.
    async fn delete_consumer(&self, stream: &str, group: &str, consumer: &str) -> Result<u64>;
}
