//! Consumer reclaim sweep for the credit-events stream.
//!
//! Consumers of the `credit-events` stream sometimes die without
//! deregistering: their group registration stays behind, and the entries
//! that were delivered to them sit in the group's pending list forever,
//! invisible to the remaining live consumers. This crate implements the
//! maintenance sweep that cleans that up: it finds consumers idle beyond a
//! threshold, transfers their pending entries to a reclaiming identity,
//! and removes the dead registrations.
//!
//! The sweep is a single pass, meant to be run from cron or by hand; it
//! keeps no state between runs and re-running it is always safe.

pub mod sweep;

pub use sweep::{SweepConfig, SweepStats, SweepTask, CREDIT_EVENTS_STREAM};
