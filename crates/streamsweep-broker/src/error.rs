//! Broker error types.
//!
//! All broker operations return `Result<T>` which is aliased to
//! `Result<T, BrokerError>`, allowing clean propagation with `?`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrokerError>;

#[derive(Debug, Error)]
pub enum BrokerError {
    /// Connection or command failure reported by the Redis client.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The server answered, but with a reply shape the parser does not
    /// recognize.
    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    /// A stream entry ID that does not match the `millis-seq` form.
    #[error("Invalid stream entry id: {0}")]
    InvalidEntryId(String),
}
