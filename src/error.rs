//! Error types and handling for decorated streams
//!
//! Every failure of a wrapped function, whether it happens while the function
//! runs or later through its completion path, surfaces as a single terminal
//! [`StreamError`] item on the stream.

use std::convert::Infallible;
use std::fmt;
use std::time::Duration;

use futures::channel::oneshot::Canceled;
use thiserror::Error;

/// Main error type for decorated stream operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The wrapped function failed
    #[error("{0}")]
    Failed(String),
    /// A completion callback was dropped without ever being called
    #[error("completion callback dropped before it was called")]
    CallbackDropped,
    /// A recurring timer was asked for a period it cannot honour
    #[error("invalid timer period {period:?}: periods must be at least {minimum:?}")]
    InvalidPeriod { period: Duration, minimum: Duration },
    /// A timer was requested outside of a tokio runtime
    #[error("no timer runtime available: {0}")]
    NoRuntime(String),
    /// I/O related errors
    #[error("IO error: {0}")]
    IO(String),
}

impl StreamError {
    /// Wrap any displayable failure of a wrapped function
    pub fn failed(err: impl fmt::Display) -> Self {
        StreamError::Failed(err.to_string())
    }
}

impl From<String> for StreamError {
    fn from(msg: String) -> Self {
        StreamError::Failed(msg)
    }
}

impl From<&str> for StreamError {
    fn from(msg: &str) -> Self {
        StreamError::Failed(msg.to_owned())
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::IO(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for StreamError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        StreamError::Failed(err.to_string())
    }
}

impl From<Canceled> for StreamError {
    fn from(_: Canceled) -> Self {
        StreamError::CallbackDropped
    }
}

impl From<Infallible> for StreamError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Result type carried by every decorated stream
pub type StreamResult<T> = Result<T, StreamError>;
