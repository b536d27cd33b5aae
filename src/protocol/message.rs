//! Request and response records.
//!
//! Both records use the protocol buffers wire format so existing thumq
//! clients keep working:
//!
//! ```text
//! message Request {
//!   enum Crop { NO_CROP = 0; TOP_SQUARE = 1; }
//!   uint32 scale = 1;
//!   Crop   crop  = 2;
//! }
//!
//! message Response {
//!   string source_type = 1;
//!   uint32 nail_width  = 2;
//!   uint32 nail_height = 3;
//! }
//! ```
//!
//! Only the subset of the format these two messages need is implemented:
//! varint and length-delimited fields, with fixed-width fields skipped when
//! they show up as unknown fields.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::MessageError;

/// Longest valid varint encoding of a u64.
const MAX_VARINT_LEN: usize = 10;

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

const REQUEST_SCALE: u32 = 1;
const REQUEST_CROP: u32 = 2;

const RESPONSE_SOURCE_TYPE: u32 = 1;
const RESPONSE_NAIL_WIDTH: u32 = 2;
const RESPONSE_NAIL_HEIGHT: u32 = 3;

// =============================================================================
// Request
// =============================================================================

/// Cropping applied before scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CropMode {
    /// Keep the whole image.
    #[default]
    None,

    /// Crop to the largest square touching the top edge, horizontally centered.
    TopSquare,
}

impl CropMode {
    /// Map a wire value to a crop mode. Unknown values mean no crop.
    pub fn from_wire(value: u64) -> Self {
        match value {
            1 => CropMode::TopSquare,
            _ => CropMode::None,
        }
    }

    /// Wire value of this crop mode.
    pub const fn to_wire(self) -> u64 {
        match self {
            CropMode::None => 0,
            CropMode::TopSquare => 1,
        }
    }
}

/// A thumbnail request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Maximum output width and height in pixels
    pub scale: u32,

    /// Crop mode
    pub crop: CropMode,
}

impl Request {
    /// Create a request for a thumbnail bounded by `scale` pixels.
    pub fn new(scale: u32, crop: CropMode) -> Self {
        Self { scale, crop }
    }

    /// Decode a request record.
    ///
    /// Unknown fields are skipped. A missing or zero scale is rejected.
    pub fn decode(data: &[u8]) -> Result<Self, MessageError> {
        let mut scale = 0u32;
        let mut crop = CropMode::None;

        for field in FieldIter::new(data) {
            let (number, value) = field?;
            match (number, value) {
                (REQUEST_SCALE, FieldValue::Varint(v)) => {
                    // uint32 fields keep the low 32 bits of an oversized varint
                    scale = v as u32;
                }
                (REQUEST_CROP, FieldValue::Varint(v)) => {
                    crop = CropMode::from_wire(v);
                }
                _ => {}
            }
        }

        if scale == 0 {
            return Err(MessageError::InvalidScale(scale));
        }

        Ok(Self { scale, crop })
    }

    /// Encode the request record.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(16);
        put_varint_field(&mut buf, REQUEST_SCALE, self.scale as u64);
        put_varint_field(&mut buf, REQUEST_CROP, self.crop.to_wire());
        buf.freeze()
    }
}

// =============================================================================
// Response
// =============================================================================

/// Metadata returned ahead of the thumbnail bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// MIME type of the source image, or empty when it could not be determined
    pub source_type: String,

    /// Width of the thumbnail, zero when none was produced
    pub nail_width: u32,

    /// Height of the thumbnail, zero when none was produced
    pub nail_height: u32,
}

impl Response {
    /// Encode the response record. Zero-valued fields are omitted.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.source_type.len() + 16);
        if !self.source_type.is_empty() {
            put_tag(&mut buf, RESPONSE_SOURCE_TYPE, WIRE_LEN);
            put_varint(&mut buf, self.source_type.len() as u64);
            buf.put_slice(self.source_type.as_bytes());
        }
        put_varint_field(&mut buf, RESPONSE_NAIL_WIDTH, self.nail_width as u64);
        put_varint_field(&mut buf, RESPONSE_NAIL_HEIGHT, self.nail_height as u64);
        buf.freeze()
    }

    /// Decode a response record.
    ///
    /// A source type that is not valid UTF-8 is decoded lossily.
    pub fn decode(data: &[u8]) -> Result<Self, MessageError> {
        let mut response = Response::default();

        for field in FieldIter::new(data) {
            let (number, value) = field?;
            match (number, value) {
                (RESPONSE_SOURCE_TYPE, FieldValue::Bytes(b)) => {
                    response.source_type = String::from_utf8_lossy(b).into_owned();
                }
                (RESPONSE_NAIL_WIDTH, FieldValue::Varint(v)) => {
                    response.nail_width = v as u32;
                }
                (RESPONSE_NAIL_HEIGHT, FieldValue::Varint(v)) => {
                    response.nail_height = v as u32;
                }
                _ => {}
            }
        }

        Ok(response)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldValue<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
    Fixed,
}

/// Iterates over the fields of an encoded message.
///
/// Yields a single error and then stops when the input is malformed.
struct FieldIter<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> FieldIter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }

    fn next_field(&mut self) -> Result<(u32, FieldValue<'a>), MessageError> {
        let key = read_varint(self.data, &mut self.pos)?;
        let wire_type = (key & 0x7) as u8;
        let number = key >> 3;

        if number == 0 {
            return Err(MessageError::InvalidFieldNumber(number));
        }
        let number = u32::try_from(number).map_err(|_| MessageError::InvalidFieldNumber(number))?;

        let value = match wire_type {
            WIRE_VARINT => FieldValue::Varint(read_varint(self.data, &mut self.pos)?),
            WIRE_LEN => {
                let len = read_varint(self.data, &mut self.pos)?;
                let remaining = (self.data.len() - self.pos) as u64;
                if len > remaining {
                    return Err(MessageError::Truncated {
                        context: "length-delimited field",
                    });
                }
                let start = self.pos;
                self.pos += len as usize;
                FieldValue::Bytes(&self.data[start..self.pos])
            }
            WIRE_FIXED64 => {
                self.skip(8)?;
                FieldValue::Fixed
            }
            WIRE_FIXED32 => {
                self.skip(4)?;
                FieldValue::Fixed
            }
            other => {
                return Err(MessageError::UnsupportedWireType {
                    field: number,
                    wire_type: other,
                })
            }
        };

        Ok((number, value))
    }

    fn skip(&mut self, n: usize) -> Result<(), MessageError> {
        if self.data.len() - self.pos < n {
            return Err(MessageError::Truncated {
                context: "fixed-width field",
            });
        }
        self.pos += n;
        Ok(())
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<(u32, FieldValue<'a>), MessageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let field = self.next_field();
        self.failed = field.is_err();
        Some(field)
    }
}

fn read_varint(data: &[u8], pos: &mut usize) -> Result<u64, MessageError> {
    let mut value = 0u64;

    for i in 0..MAX_VARINT_LEN {
        let byte = *data.get(*pos).ok_or(MessageError::Truncated { context: "varint" })?;
        *pos += 1;

        value |= ((byte & 0x7F) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }

    Err(MessageError::VarintOverflow)
}

fn put_varint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

fn put_tag(buf: &mut BytesMut, number: u32, wire_type: u8) {
    put_varint(buf, ((number as u64) << 3) | wire_type as u64);
}

fn put_varint_field(buf: &mut BytesMut, number: u32, value: u64) {
    if value != 0 {
        put_tag(buf, number, WIRE_VARINT);
        put_varint(buf, value);
    }
}

// =============================================================================
// Tests
// =============================================================================
