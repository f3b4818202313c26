//! Fuzz the stream-reply parsers with arbitrary RESP payloads.
//!
//! Whatever shape the server hands back, the parsers must return an error
//! rather than panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use streamsweep_broker::reply;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = redis::parse_redis_value(data) {
        let _ = reply::parse_info_groups(&value);
        let _ = reply::parse_info_consumers(&value);
        let _ = reply::parse_pending_entries(&value);
        let _ = reply::parse_claimed_ids(&value);
    }
});
