//! Parsers for the raw stream-command replies.
//!
//! The stream introspection commands answer with nested arrays of
//! field/value pairs rather than a fixed struct shape, and newer server
//! versions append fields older ones do not have (`entries-read`, `lag`,
//! `inactive`). These parsers pick out the fields the sweep needs and
//! ignore the rest; a reply whose overall shape is wrong is rejected as
//! [`BrokerError::InvalidReply`].

use redis::Value;

use crate::error::{BrokerError, Result};
use crate::types::{ConsumerInfo, EntryId, GroupInfo, PendingEntry};

/// Parse an `XINFO GROUPS` reply: one field/value map per group.
pub fn parse_info_groups(value: &Value) -> Result<Vec<GroupInfo>> {
    as_items(value, "XINFO GROUPS")?
        .iter()
        .map(parse_group)
        .collect()
}

fn parse_group(value: &Value) -> Result<GroupInfo> {
    let mut name = None;
    let mut pending = None;
    let mut consumers = None;
    for (key, val) in field_pairs(value, "XINFO GROUPS")? {
        match key {
            "name" => name = as_string(val),
            "pending" => pending = as_u64(val),
            "consumers" => consumers = as_u64(val),
            // last-delivered-id, entries-read, lag
            _ => {}
        }
    }
    Ok(GroupInfo {
        name: name.ok_or_else(|| invalid("XINFO GROUPS: group without a name"))?,
        pending: pending.unwrap_or(0),
        consumers: consumers.unwrap_or(0),
    })
}

/// Parse an `XINFO CONSUMERS` reply: one field/value map per consumer.
pub fn parse_info_consumers(value: &Value) -> Result<Vec<ConsumerInfo>> {
    as_items(value, "XINFO CONSUMERS")?
        .iter()
        .map(parse_consumer)
        .collect()
}

fn parse_consumer(value: &Value) -> Result<ConsumerInfo> {
    let mut name = None;
    let mut pending = None;
    let mut idle = None;
    for (key, val) in field_pairs(value, "XINFO CONSUMERS")? {
        match key {
            "name" => name = as_string(val),
            "pending" => pending = as_u64(val),
            "idle" => idle = as_u64(val),
            // inactive (7.2+)
            _ => {}
        }
    }
    Ok(ConsumerInfo {
        name: name.ok_or_else(|| invalid("XINFO CONSUMERS: consumer without a name"))?,
        pending: pending.unwrap_or(0),
        idle_ms: idle.unwrap_or(0),
    })
}

/// Parse an extended `XPENDING` reply: `[id, consumer, idle, deliveries]`
/// per entry.
pub fn parse_pending_entries(value: &Value) -> Result<Vec<PendingEntry>> {
    as_items(value, "XPENDING")?
        .iter()
        .map(parse_pending_entry)
        .collect()
}

fn parse_pending_entry(value: &Value) -> Result<PendingEntry> {
    let Value::Bulk(parts) = value else {
        return Err(invalid("XPENDING: expected an array per entry"));
    };
    if parts.len() < 4 {
        return Err(invalid("XPENDING: entry with fewer than 4 fields"));
    }
    let id = as_string(&parts[0])
        .ok_or_else(|| invalid("XPENDING: entry id is not a string"))?
        .parse::<EntryId>()?;
    let consumer = as_string(&parts[1])
        .ok_or_else(|| invalid("XPENDING: consumer name is not a string"))?;
    let idle_ms = as_u64(&parts[2]).ok_or_else(|| invalid("XPENDING: idle is not an integer"))?;
    let delivery_count =
        as_u64(&parts[3]).ok_or_else(|| invalid("XPENDING: deliveries is not an integer"))?;
    Ok(PendingEntry {
        id,
        consumer,
        idle_ms,
        delivery_count,
    })
}

/// Parse an `XCLAIM ... JUSTID` reply: the IDs that changed owner.
pub fn parse_claimed_ids(value: &Value) -> Result<Vec<EntryId>> {
    as_items(value, "XCLAIM")?
        .iter()
        .map(|item| {
            as_string(item)
                .ok_or_else(|| invalid("XCLAIM: entry id is not a string"))?
                .parse::<EntryId>()
        })
        .collect()
}

/// Top-level reply array. A nil reply (no entries) is an empty list.
fn as_items<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    match value {
        Value::Bulk(items) => Ok(items),
        Value::Nil => Ok(&[]),
        other => Err(invalid(&format!("{what}: expected an array, got {other:?}"))),
    }
}

/// Iterate a flat `field, value, field, value, ...` map reply.
fn field_pairs<'a>(
    value: &'a Value,
    what: &str,
) -> Result<impl Iterator<Item = (&'a str, &'a Value)>> {
    let Value::Bulk(items) = value else {
        return Err(invalid(&format!("{what}: expected a field/value array")));
    };
    if items.len() % 2 != 0 {
        return Err(invalid(&format!("{what}: odd field/value array length")));
    }
    Ok(items.chunks_exact(2).filter_map(|pair| {
        let key = match &pair[0] {
            Value::Data(bytes) => std::str::from_utf8(bytes).ok()?,
            Value::Status(s) => s.as_str(),
            _ => return None,
        };
        Some((key, &pair[1]))
    }))
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::Data(bytes) => String::from_utf8(bytes.clone()).ok(),
        Value::Status(s) => Some(s.clone()),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Int(n) => u64::try_from(*n).ok(),
        Value::Data(bytes) => std::str::from_utf8(bytes).ok()?.parse().ok(),
        _ => None,
    }
}

fn invalid(msg: &str) -> BrokerError {
    BrokerError::InvalidReply(msg.to_string())
}
