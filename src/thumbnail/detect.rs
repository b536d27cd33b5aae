//! Source format detection and decoding.
//!
//! Only four codecs are decoded: JPEG, PNG, GIF and BMP. They are tried in
//! that order, each gated by its leading signature, and the first match is
//! decoded with its own codec. Everything else (including data that matches a
//! signature but fails to decode) falls through to MIME sniffing and produces
//! no pixels.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

use super::exif::{parse_jpeg_orientation, Orientation};

// =============================================================================
// SourceFormat
// =============================================================================

/// A decodable source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
}

impl SourceFormat {
    /// Supported formats in detection priority order.
    pub const PRIORITY: [SourceFormat; 4] = [
        SourceFormat::Jpeg,
        SourceFormat::Png,
        SourceFormat::Gif,
        SourceFormat::Bmp,
    ];

    /// Canonical MIME type.
    pub const fn mime_type(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::Gif => "image/gif",
            SourceFormat::Bmp => "image/bmp",
        }
    }

    /// Whether `data` starts with this format's signature.
    pub fn matches(self, data: &[u8]) -> bool {
        match self {
            SourceFormat::Jpeg => data.starts_with(&[0xFF, 0xD8, 0xFF]),
            SourceFormat::Png => data.starts_with(b"\x89PNG\r\n\x1a\n"),
            SourceFormat::Gif => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
            SourceFormat::Bmp => data.starts_with(b"BM"),
        }
    }

    const fn image_format(self) -> ImageFormat {
        match self {
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Png => ImageFormat::Png,
            SourceFormat::Gif => ImageFormat::Gif,
            SourceFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Find the first supported format whose signature matches.
pub fn detect_format(data: &[u8]) -> Option<SourceFormat> {
    SourceFormat::PRIORITY
        .into_iter()
        .find(|format| format.matches(data))
}

// =============================================================================
// Decoding
// =============================================================================

/// A successfully decoded source image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: SourceFormat,
    pub orientation: Orientation,
}

/// Outcome of examining a source blob.
#[derive(Debug, Clone)]
pub enum Detection {
    /// Pixels are available for thumbnailing.
    Decoded(DecodedImage),

    /// No pixels. Carries the sniffed MIME type, or an empty string.
    Undecodable { source_type: String },
}

impl Detection {
    /// MIME type reported to the client.
    pub fn source_type(&self) -> &str {
        match self {
            Detection::Decoded(decoded) => decoded.format.mime_type(),
            Detection::Undecodable { source_type } => source_type,
        }
    }
}

/// Decode `data` if it is one of the supported formats.
///
/// Never fails: undecodable input is a normal [`Detection::Undecodable`].
pub fn detect_and_decode(data: &[u8]) -> Detection {
    let Some(format) = detect_format(data) else {
        return Detection::Undecodable {
            source_type: sniff_mime_type(data),
        };
    };

    let reader = ImageReader::with_format(Cursor::new(data), format.image_format());
    match reader.decode() {
        Ok(image) => {
            let orientation = match format {
                SourceFormat::Jpeg => parse_jpeg_orientation(data),
                _ => Orientation::TopLeft,
            };
            Detection::Decoded(DecodedImage {
                image,
                format,
                orientation,
            })
        }
        Err(e) => {
            debug!("Failed to decode {} source: {}", format.mime_type(), e);
            Detection::Undecodable {
                source_type: sniff_mime_type(data),
            }
        }
    }
}

/// Type reported for input without a known signature and without binary bytes.
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain; charset=utf-8";

/// Number of leading bytes inspected when deciding whether input is text.
const TEXT_SNIFF_LEN: usize = 512;

/// Guess a MIME type from leading bytes.
///
/// Known signatures win. Otherwise non-empty input whose first 512 bytes
/// contain no binary control bytes is plain text.
/// Returns an empty string when nothing concrete is recognized.
pub fn sniff_mime_type(data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if looks_like_text(data) {
        return PLAIN_TEXT_MIME_TYPE.to_string();
    }

    String::new()
}

fn looks_like_text(data: &[u8]) -> bool {
    !data.is_empty() && !data.iter().take(TEXT_SNIFF_LEN).any(|&b| is_binary_byte(b))
}

/// Control bytes that never appear in text (tab, newlines, form feed and
/// escape are allowed).
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

// =============================================================================
// Tests
// =============================================================================
