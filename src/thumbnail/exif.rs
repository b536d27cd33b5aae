//! EXIF orientation extraction for JPEG sources.
//!
//! Camera JPEGs store their orientation in an APP1 `Exif` segment. The
//! segment is read with `kamadak-exif`; the first orientation field found
//! (IFD0 before the thumbnail IFD) decides, and only SHORT values count.
//!
//! Parsing is best effort. Anything unexpected yields [`Orientation::TopLeft`].

use std::io::Cursor;

use exif::{Tag, Value};
use tracing::debug;

// =============================================================================
// Orientation
// =============================================================================

/// EXIF orientation: where row 0 and column 0 of the stored image sit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// 1: stored upright
    #[default]
    TopLeft,
    /// 2: mirrored horizontally
    TopRight,
    /// 3: rotated 180°
    BottomRight,
    /// 4: mirrored vertically
    BottomLeft,
    /// 5: transposed
    LeftTop,
    /// 6: needs a quarter turn clockwise
    RightTop,
    /// 7: transversed
    RightBottom,
    /// 8: needs a quarter turn counter-clockwise
    LeftBottom,
}

impl Orientation {
    /// Map an EXIF orientation code. Codes outside 1..=8 are treated as upright.
    pub fn from_exif(code: u16) -> Self {
        match code {
            2 => Orientation::TopRight,
            3 => Orientation::BottomRight,
            4 => Orientation::BottomLeft,
            5 => Orientation::LeftTop,
            6 => Orientation::RightTop,
            7 => Orientation::RightBottom,
            8 => Orientation::LeftBottom,
            _ => Orientation::TopLeft,
        }
    }
}

// =============================================================================
// JPEG Parsing
// =============================================================================

/// Read the orientation embedded in a JPEG stream.
///
/// Returns [`Orientation::TopLeft`] when the data has no EXIF segment, no
/// orientation tag, a tag without SHORT values, or is malformed in any way.
pub fn parse_jpeg_orientation(data: &[u8]) -> Orientation {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No usable EXIF data: {}", e);
            return Orientation::TopLeft;
        }
    };

    let Some(field) = exif.fields().find(|f| f.tag == Tag::Orientation) else {
        return Orientation::TopLeft;
    };

    match &field.value {
        Value::Short(values) => values
            .first()
            .map(|&code| Orientation::from_exif(code))
            .unwrap_or_default(),
        _ => Orientation::TopLeft,
    }
}

// =============================================================================
// Tests
// =============================================================================
