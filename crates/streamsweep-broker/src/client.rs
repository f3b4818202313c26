//! Redis-backed [`StreamBroker`] implementation.
//!
//! Uses a single multiplexed async connection. The stream introspection
//! commands are issued raw (`redis::cmd`) and their replies decoded by the
//! [`crate::reply`] parsers, which keeps this implementation independent of
//! which optional reply fields the connected server version emits.
//!
//! The connection is closed when the broker is dropped, on every exit
//! path.

use redis::Value;
use tracing::debug;

use crate::error::Result;
use crate::reply;
use crate::types::{ConsumerInfo, EntryId, GroupInfo, PendingEntry};
use crate::StreamBroker;

/// [`StreamBroker`] over a live Redis connection.
pub struct RedisStreamBroker {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisStreamBroker {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379/`).
    ///
    /// Fails fast: both an unparseable URL and an unreachable server are
    /// reported here, before any sweep work starts.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        debug!("Connected to Redis at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl StreamBroker for RedisStreamBroker {
    async fn list_groups(&self, stream: &str) -> Result<Vec<GroupInfo>> {
        let mut conn = self.conn.clone();
        let value: Value = redis::cmd("XINFO")
            .arg("GROUPS")
            .arg(stream)
            .query_async(&mut conn)
            .await?;
        reply::parse_info_groups(&value)
    }

    async fn list_consumers(&self, stream: &str, group: &str) -> Result<Vec<ConsumerInfo>> {
        let mut conn = self.conn.clone();
        let value: Value = redis::cmd("XINFO")
            .arg("CONSUMERS")
            .arg(stream)
            .arg(group)
            .query_async(&mut conn)
            .await?;
        reply::parse_info_consumers(&value)
    }

    async fn pending_entries(
        &self,
        stream: &str,
        group: &str,
        start: EntryId,
        end: EntryId,
        count: usize,
    ) -> Result<Vec<PendingEntry>> {
        let mut conn = self.conn.clone();
        let value: Value = redis::cmd("XPENDING")
            .arg(stream)
            .arg(group)
            .arg(start.to_string())
            .arg(end.to_string())
            .arg(count)
            .query_async(&mut conn)
            .await?;
        reply::parse_pending_entries(&value)
    }

    async fn claim_entry(
        &self,
        stream: &str,
        group: &str,
        new_owner: &str,
        min_idle_ms: u64,
        id: EntryId,
    ) -> Result<bool> {
        let mut conn = self.conn.clone();
        // JUSTID: ownership transfer only, without refetching the entry
        // body or bumping its delivery counter.
        let value: Value = redis::cmd("XCLAIM")
            .arg(stream)
            .arg(group)
            .arg(new_owner)
            .arg(min_idle_ms)
            .arg(id.to_string())
            .arg("JUSTID")
            .query_async(&mut conn)
            .await?;
        let claimed = reply::parse_claimed_ids(&value)?;
        debug!(
            "XCLAIM {} -> {}: {}",
            id,
            new_owner,
            if claimed.is_empty() { "declined" } else { "ok" }
        );
        Ok(!claimed.is_empty())
    }

    async fn delete_consumer(&self, stream: &str, group: &str, consumer: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let dropped: u64 = redis::cmd("XGROUP")
            .arg("DELCONSUMER")
            .arg(stream)
            .arg(group)
            .arg(consumer)
            .query_async(&mut conn)
            .await?;
        Ok(dropped)
    }
}
