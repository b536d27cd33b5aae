//! # thumq
//!
//! A thumbnailing service that listens on a Unix domain socket.
//!
//! Each connection carries exactly one exchange of four length-prefixed
//! frames: a request record and a source image from the client, then a
//! response record and a JPEG thumbnail from the server.
//!
//! ## Features
//!
//! - **Format detection**: JPEG, PNG, GIF and BMP, tried in that order
//! - **EXIF orientation**: JPEG sources are rotated/flipped upright first
//! - **Top-square crop**: optional square crop anchored at the top edge
//! - **Bounded scaling**: Lanczos downscale so the longer side fits the request
//! - **Graceful shutdown**: in-flight connections finish before exit
//!
//! ## Architecture
//!
//! - [`protocol`] - Frame transport and request/response records
//! - [`thumbnail`] - Detection, orientation, crop, scale and JPEG encoding
//! - [`server`] - Socket acceptor and per-connection workers
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use thumq::{ConnectionHandler, Server, ThumbnailService};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = ConnectionHandler::new(ThumbnailService::new());
//!     let server = Server::bind("/tmp/thumq.sock", handler).unwrap();
//!
//!     let shutdown = CancellationToken::new();
//!     server.run(shutdown).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod thumbnail;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConnectionError, FrameError, MessageError, ServerError, ThumbnailError};
pub use protocol::{
    read_frame, write_frame, CropMode, FramedStream, Request, Response, DEFAULT_MAX_FRAME_SIZE,
    LENGTH_PREFIX_SIZE,
};
pub use server::{ConnectionHandler, Server};
pub use thumbnail::{
    detect_and_decode, detect_format, parse_jpeg_orientation, sniff_mime_type, Detection,
    JpegThumbnailEncoder, Orientation, SourceFormat, Thumbnail, ThumbnailService,
    DEFAULT_JPEG_QUALITY,
};
