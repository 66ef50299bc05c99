//! Error types for repl-playground.

use thiserror::Error;

/// Main error type for playground operations.
#[derive(Error, Debug)]
pub enum PlaygroundError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// The peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// Read or write failure on a live connection.
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer sent something the protocol does not allow at this point.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A URL carried more than one query separator.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    /// The evaluation task panicked or was aborted.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// A snippet token that is not a valid identifier.
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Convenience Result type for playground operations.
pub type Result<T> = std::result::Result<T, PlaygroundError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlaygroundError = io_err.into();
        assert!(matches!(err, PlaygroundError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_malformed_url_display() {
        let err = PlaygroundError::MalformedUrl("http://a/?x?y".into());
        assert!(err.to_string().contains("malformed URL"));
        assert!(err.to_string().contains("?x?y"));
    }

    #[test]
    fn test_connection_closed_display() {
        assert_eq!(PlaygroundError::ConnectionClosed.to_string(), "connection closed");
    }
}
