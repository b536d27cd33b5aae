//! Thumbnail generation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ThumbnailService                     │
//! │  ┌────────────┐  ┌────────────┐  ┌───────────────────┐  │
//! │  │  detect    │  │ transform  │  │ JpegThumbnail     │  │
//! │  │  + exif    │─▶│ orient/crop│─▶│ Encoder           │  │
//! │  │            │  │ /scale     │  │                   │  │
//! │  └────────────┘  └────────────┘  └───────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`detect`]: signature-ordered codec selection, decoding, MIME sniffing
//! - [`exif`](self::exif): orientation tag extraction from JPEG APP1 segments
//! - [`transform`]: orientation correction, top-square crop, bounded scaling
//! - [`encoder`]: JPEG output
//! - [`service`]: the pipeline tying them together

pub mod detect;
pub mod encoder;
pub mod exif;
pub mod service;
pub mod transform;

pub use detect::{
    detect_and_decode, detect_format, sniff_mime_type, DecodedImage, Detection, SourceFormat,
    PLAIN_TEXT_MIME_TYPE,
};
pub use encoder::{
    clamp_quality, is_valid_quality, JpegThumbnailEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY,
    MIN_JPEG_QUALITY,
};
pub use self::exif::{parse_jpeg_orientation, Orientation};
pub use service::{convert, Thumbnail, ThumbnailService};
pub use transform::{
    apply_orientation, crop_top_square, fit_dimensions, scale_to_fit, top_square_rect, CropRect,
    Croppable, RESIZE_FILTER,
};
