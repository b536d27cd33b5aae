//! JPEG thumbnail encoder.
//!
//! Every thumbnail is JPEG regardless of the source format. JPEG has no alpha
//! channel, so alpha is dropped; grayscale sources stay single-channel.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::ThumbnailError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// JPEG Encoder
// =============================================================================

/// Encodes finished thumbnails as JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegThumbnailEncoder {
    quality: u8,
}

impl Default for JpegThumbnailEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JpegThumbnailEncoder {
    /// Create an encoder at [`DEFAULT_JPEG_QUALITY`].
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Create an encoder at the given quality, clamped to 1-100.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: clamp_quality(quality),
        }
    }

    /// The quality this encoder uses.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode `image` into an in-memory JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::Encode`] if the codec rejects the image,
    /// e.g. when a side exceeds the 65535 pixel JPEG limit.
    pub fn encode(&self, image: &DynamicImage) -> Result<Bytes, ThumbnailError> {
        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);

        let result = match image {
            DynamicImage::ImageLuma8(buf) => encoder.encode_image(buf),
            DynamicImage::ImageRgb8(buf) => encoder.encode_image(buf),
            _ if !image.color().has_color() => encoder.encode_image(&image.to_luma8()),
            _ => encoder.encode_image(&image.to_rgb8()),
        };

        result.map_err(|e| ThumbnailError::Encode {
            message: e.to_string(),
        })?;

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
