//! The `error` module defines the error types surfaced by the `popbus` API.
//!
//! Only caller mistakes are errors. Conditions that are normal in a dynamic
//! pub/sub system (unknown topic, repeated subscribe, empty queue) are
//! reported as plain `bool` results instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// An argument was rejected at the API boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The operating system refused to start a subscriber's worker thread.
    #[error("failed to spawn subscriber worker: {0}")]
    WorkerSpawn(String),
}

pub type Result<T> = std::result::Result<T, BusError>;
