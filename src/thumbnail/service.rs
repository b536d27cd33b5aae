//! Thumbnail pipeline.
//!
//! ```text
//! source bytes
//!     │
//!     ▼
//! detect_and_decode ──(undecodable)──▶ Response { sniffed type, 0, 0 } + empty payload
//!     │
//!     ▼
//! apply_orientation ─▶ crop_top_square? ─▶ scale_to_fit ─▶ JPEG encode
//!     │
//!     ▼
//! Response { source type, final width, final height } + JPEG payload
//! ```

use bytes::Bytes;
use image::DynamicImage;
use tracing::debug;

use crate::error::ThumbnailError;
use crate::protocol::{CropMode, Request, Response};

use super::detect::{detect_and_decode, Detection};
use super::encoder::JpegThumbnailEncoder;
use super::exif::Orientation;
use super::transform::{apply_orientation, crop_top_square, scale_to_fit};

/// Result of processing one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thumbnail {
    /// Metadata sent ahead of the payload
    pub response: Response,

    /// JPEG bytes, or empty when the source could not be decoded
    pub data: Bytes,
}

/// Produces thumbnails from raw source images.
///
/// Stateless apart from encoder settings; every call owns its buffers.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailService {
    encoder: JpegThumbnailEncoder,
}

impl ThumbnailService {
    /// Create a service with the default JPEG quality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with a specific encoder.
    pub fn with_encoder(encoder: JpegThumbnailEncoder) -> Self {
        Self { encoder }
    }

    /// The encoder used for output.
    pub fn encoder(&self) -> &JpegThumbnailEncoder {
        &self.encoder
    }

    /// Run the full pipeline for one request.
    ///
    /// Undecodable input is not an error: it yields a response carrying the
    /// sniffed MIME type (possibly empty), zero dimensions and no payload.
    ///
    /// # Errors
    ///
    /// Only JPEG encoding of an already decoded image can fail.
    pub fn process(&self, request: &Request, source: &[u8]) -> Result<Thumbnail, ThumbnailError> {
        let decoded = match detect_and_decode(source) {
            Detection::Decoded(decoded) => decoded,
            Detection::Undecodable { source_type } => {
                debug!(
                    "Source not decodable ({} bytes, sniffed type {:?})",
                    source.len(),
                    source_type
                );
                return Ok(Thumbnail {
                    response: Response {
                        source_type,
                        ..Response::default()
                    },
                    data: Bytes::new(),
                });
            }
        };

        let source_type = decoded.format.mime_type().to_string();
        debug!(
            "Decoded {} {}x{} orientation={:?}",
            source_type,
            decoded.image.width(),
            decoded.image.height(),
            decoded.orientation
        );

        let image = convert(decoded.image, decoded.orientation, request);
        let data = self.encoder.encode(&image)?;

        Ok(Thumbnail {
            response: Response {
                source_type,
                nail_width: image.width(),
                nail_height: image.height(),
            },
            data,
        })
    }
}

/// Orient, crop and scale a decoded image.
pub fn convert(image: DynamicImage, orientation: Orientation, request: &Request) -> DynamicImage {
    let mut image = apply_orientation(image, orientation);

    if request.crop == CropMode::TopSquare {
        image = crop_top_square(&image);
    }

    scale_to_fit(image, request.scale)
}

// =============================================================================
// Tests
// =============================================================================
