/// Errors produced by the notification stream subsystem.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The stream could not be reached or read.
    #[error("notification stream unavailable: {0}")]
    Unavailable(String),

    /// A transport delivered a notification that could not be decoded.
    #[error("malformed notification: {0}")]
    Malformed(String),
}

/// Convenience alias used throughout the stream crate.
pub type Result<T> = std::result::Result<T, StreamError>;
