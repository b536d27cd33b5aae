//! Wire protocol for thumbnail connections.
//!
//! Each connection carries exactly one exchange:
//!
//! ```text
//! client                                server
//!   │ ── frame: Request record ──────────▶ │
//!   │ ── frame: raw image bytes ─────────▶ │
//!   │ ◀────────── frame: Response record ─ │
//!   │ ◀──── frame: thumbnail (may be 0 B) ─ │
//! ```
//!
//! - [`frame`] - length-prefixed framing over any async byte stream
//! - [`message`] - encoding of the Request and Response records

pub mod frame;
pub mod message;

pub use frame::{read_frame, write_frame, FramedStream, DEFAULT_MAX_FRAME_SIZE, LENGTH_PREFIX_SIZE};
pub use message::{CropMode, Request, Response};
