//! Geometric transforms applied to a decoded source image.
//!
//! The pipeline order is fixed: orientation correction, optional top-square
//! crop, then bounded downscale. Dimension arithmetic lives in plain
//! functions so it can be tested without pixels.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel};

use super::exif::Orientation;

/// Resampling filter used for downscaling.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

// =============================================================================
// Orientation
// =============================================================================

/// Turn the stored pixels upright according to `orientation`.
///
/// Rotation angles in the table are counter-clockwise:
///
/// | Orientation | Transform                         |
/// |-------------|-----------------------------------|
/// | TopLeft     | none                              |
/// | TopRight    | flip horizontal                   |
/// | BottomRight | rotate 180°                       |
/// | BottomLeft  | flip vertical                     |
/// | LeftTop     | flip vertical, then rotate 270°   |
/// | RightTop    | rotate 270°                       |
/// | RightBottom | flip vertical, then rotate 90°    |
/// | LeftBottom  | rotate 90°                        |
pub fn apply_orientation(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    // `image` rotates clockwise: rotate90() is 270° counter-clockwise.
    match orientation {
        Orientation::TopLeft => image,
        Orientation::TopRight => image.fliph(),
        Orientation::BottomRight => image.rotate180(),
        Orientation::BottomLeft => image.flipv(),
        Orientation::LeftTop => image.flipv().rotate90(),
        Orientation::RightTop => image.rotate90(),
        Orientation::RightBottom => image.flipv().rotate270(),
        Orientation::LeftBottom => image.rotate270(),
    }
}

// =============================================================================
// Cropping
// =============================================================================

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Image buffers that can produce an owned sub-rectangle of themselves.
pub trait Croppable: GenericImageView + Sized {
    /// Copy out `rect`. The rectangle must lie within the image bounds.
    fn crop_to(&self, rect: CropRect) -> Self;
}

impl Croppable for DynamicImage {
    fn crop_to(&self, rect: CropRect) -> Self {
        self.crop_imm(rect.x, rect.y, rect.width, rect.height)
    }
}

impl<P> Croppable for ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    fn crop_to(&self, rect: CropRect) -> Self {
        imageops::crop_imm(self, rect.x, rect.y, rect.width, rect.height).to_image()
    }
}

/// The largest square touching the top edge, horizontally centered.
///
/// Tall images keep rows `[0, width)`. Wide (or square) images keep the full
/// height and a window starting at `(width - height) / 2`.
pub fn top_square_rect(width: u32, height: u32) -> CropRect {
    if width < height {
        CropRect {
            x: 0,
            y: 0,
            width,
            height: width,
        }
    } else {
        CropRect {
            x: (width - height) / 2,
            y: 0,
            width: height,
            height,
        }
    }
}

/// Crop `image` to its top square.
pub fn crop_top_square<I: Croppable>(image: &I) -> I {
    let (width, height) = image.dimensions();
    image.crop_to(top_square_rect(width, height))
}

// =============================================================================
// Scaling
// =============================================================================

/// Target dimensions for fitting `(width, height)` inside a `scale` box.
///
/// Returns `None` when the image already fits; images are never upscaled.
/// Otherwise the longer side becomes `scale` and the shorter side is
/// `scale * shorter / longer`, truncated and kept at least one pixel.
pub fn fit_dimensions(width: u32, height: u32, scale: u32) -> Option<(u32, u32)> {
    if width <= scale && height <= scale {
        return None;
    }

    let shorten = |shorter: u32, longer: u32| -> u32 {
        let value = scale as u64 * shorter as u64 / longer as u64;
        (value as u32).max(1)
    };

    if width < height {
        Some((shorten(width, height), scale))
    } else {
        Some((scale, shorten(height, width)))
    }
}

/// Downscale `image` to fit inside a `scale` box, preserving aspect ratio.
pub fn scale_to_fit(image: DynamicImage, scale: u32) -> DynamicImage {
    match fit_dimensions(image.width(), image.height(), scale) {
        Some((width, height)) => image.resize_exact(width, height, RESIZE_FILTER),
        None => image,
    }
}

// =============================================================================
// Tests
// =============================================================================
