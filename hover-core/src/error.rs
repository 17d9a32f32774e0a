use thiserror::Error;

/// Failures reported by queue operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Malformed input to a mutating call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Index outside the current queue bounds
    #[error("index {index} out of range for queue of length {len}")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, QueueError>;
