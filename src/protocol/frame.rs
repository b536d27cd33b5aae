//! Length-prefixed frame transport.
//!
//! Every message on the wire is a 4-byte little-endian length followed by
//! exactly that many payload bytes:
//!
//! ```text
//! ┌──────────────────────┬───────────────────────────────┐
//! │ length (u32, LE)     │ payload (length bytes)        │
//! └──────────────────────┴───────────────────────────────┘
//! ```
//!
//! A frame is either read completely or the read fails. There is no
//! partial-message recovery: a short read, a reset or EOF in the middle of a
//! frame is reported as [`FrameError::Io`] and the connection is abandoned.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::FrameError;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default upper bound on a received frame (128 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 128 * 1024 * 1024;

// =============================================================================
// Frame Functions
// =============================================================================

/// Read one frame from `reader`.
///
/// Blocks until the declared number of payload bytes has arrived. A declared
/// length above `max_frame_size` is rejected before any payload is buffered.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> Result<Bytes, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).await?;

    let len = u32::from_le_bytes(prefix) as usize;
    if len > max_frame_size {
        return Err(FrameError::TooLarge {
            size: len as u64,
            limit: max_frame_size as u64,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    Ok(Bytes::from(payload))
}

/// Write one frame to `writer`: the length prefix, then the payload.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge {
        size: payload.len() as u64,
        limit: u32::MAX as u64,
    })?;

    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;

    Ok(())
}

// =============================================================================
// FramedStream
// =============================================================================

/// A byte stream that exchanges length-prefixed frames.
///
/// Wraps one connection for its whole lifetime. Dropping the wrapper drops
/// (and therefore closes) the underlying stream.
#[derive(Debug)]
pub struct FramedStream<S> {
    inner: S,
    max_frame_size: usize,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a stream using [`DEFAULT_MAX_FRAME_SIZE`].
    pub fn new(inner: S) -> Self {
        Self::with_max_frame_size(inner, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Wrap a stream with a custom receive limit.
    pub fn with_max_frame_size(inner: S, max_frame_size: usize) -> Self {
        Self {
            inner,
            max_frame_size,
        }
    }

    /// Receive exactly one frame.
    pub async fn receive(&mut self) -> Result<Bytes, FrameError> {
        read_frame(&mut self.inner, self.max_frame_size).await
    }

    /// Send one frame. Zero-length payloads are valid.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), FrameError> {
        write_frame(&mut self.inner, payload).await
    }

    /// The configured receive limit.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

// =============================================================================
// Tests
// =============================================================================
