use std::io;

use thiserror::Error;

/// Errors that can occur when records travel between processes.
///
/// Failures of the code being timed are never wrapped in this type. They reach the caller
/// exactly as the timed code produced them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The listener could not be started, or a worker could not reach it or talk to it.
    #[error("remote record transport failed: {0}")]
    Io(#[from] io::Error),

    /// A frame received from a worker process did not decode to a record.
    #[error("malformed record frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// A frame received from a worker process exceeded the maximum frame length.
    #[error("record frame exceeds {limit} bytes")]
    OversizedFrame {
        /// The maximum frame length in bytes, newline included.
        limit: u64,
    },

    /// The owning process closed the connection before confirming receipt of a record.
    ///
    /// The record may or may not have been enqueued.
    #[error("owning process did not acknowledge the record")]
    MissingAcknowledgement,

    /// The caller provided a supposed remote handle string but it did not match the expected
    /// format.
    #[error("invalid remote handle: '{invalid_value}' is invalid: {problem}")]
    InvalidHandle {
        /// The string that failed to parse.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },
}

/// A specialized `Result` type for remote timer operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
