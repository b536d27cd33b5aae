use std::path::PathBuf;

use thiserror::Error;

/// Errors from the length-prefixed frame transport
#[derive(Debug, Error)]
pub enum FrameError {
    /// Short read, reset, EOF mid-frame, or a failed write
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Declared or outgoing payload exceeds the allowed frame length
    #[error("Frame too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

/// Errors from decoding a request record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Input ended in the middle of a field
    #[error("Truncated message: {context}")]
    Truncated { context: &'static str },

    /// Varint longer than 10 bytes
    #[error("Varint overflow")]
    VarintOverflow,

    /// Wire type that this codec does not accept (groups, or reserved values)
    #[error("Unsupported wire type {wire_type} for field {field}")]
    UnsupportedWireType { field: u32, wire_type: u8 },

    /// Field number 0 is reserved
    #[error("Invalid field number: {0}")]
    InvalidFieldNumber(u64),

    /// Scale must be a positive pixel count
    #[error("Invalid scale: {0} (must be greater than 0)")]
    InvalidScale(u32),
}

/// Errors from producing a thumbnail out of a decoded image
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// JPEG encoding failed
    #[error("Encode error: {message}")]
    Encode { message: String },
}

/// Failure of a single connection. Never escapes the connection's own task.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Transport error: {0}")]
    Frame(#[from] FrameError),

    #[error("Invalid request: {0}")]
    Message(#[from] MessageError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),

    /// The blocking transform task panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Process-fatal errors raised by the acceptor
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be created
    #[error("Failed to bind {}: {source}", path.display())]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Accept failed while the server was not shutting down
    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),
}
