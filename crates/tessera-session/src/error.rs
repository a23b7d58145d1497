//! Error types shared by sessions, codecs, and storage backends.

/// Error type for session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The codec could not serialize the value mapping.
    #[error("failed to encode session values: {0}")]
    Encoding(String),

    /// The stored payload could not be deserialized. The session's local
    /// mapping is left untouched when this is returned.
    #[error("failed to decode session payload: {0}")]
    Decoding(String),

    /// The encoded payload exceeds the store's configured size limit.
    /// Returned before any backend call is made.
    #[error("session payload is {len} bytes, limit is {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Dialing, authenticating, or borrowing a backend connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend rejected or failed a command.
    #[error("backend command failed: {0}")]
    Backend(String),
}

/// Result type for session storage operations.
pub type Result<T> = std::result::Result<T, Error>;
