//! Parameter types for photo normalization.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which plans the geometry) and the [`backend`](super::backend) (which does
//! the actual pixel work). This separation allows swapping backends (e.g. for
//! testing with a mock) without changing the planning logic.
//!
//! ## Types
//!
//! - [`CanvasSpec`]: Output frame size. Both sides non-zero, checked on construction.
//! - [`Rotation`]: Quarter-turn correction derived from an EXIF orientation tag.
//! - [`ColorMode`]: Channel layout of a decoded source image.
//! - [`Placement`]: Where the resized photo lands on the canvas.
//! - [`NormalizeParams`]: Everything needed for one normalization.

use image::ColorType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("canvas dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
}

/// Fixed output frame for normalized photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    width: u32,
    height: u32,
}

impl CanvasSpec {
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::ZeroDimension { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }
}

impl Default for CanvasSpec {
    /// Portrait 3:4 directory card.
    fn default() -> Self {
        Self {
            width: 120,
            height: 160,
        }
    }
}

/// Orientation correction, expressed as clockwise quarter turns.
///
/// Only three EXIF orientation values trigger a correction:
///
/// | Tag | Meaning | Correction |
/// |---|---|---|
/// | 3 | upside down | [`Rotation::Half`] |
/// | 6 | sensor turned 90° counter-clockwise | [`Rotation::Clockwise`] |
/// | 8 | sensor turned 90° clockwise | [`Rotation::CounterClockwise`] |
///
/// The mirrored variants (2, 4, 5, 7) are left alone, as is `1` and anything
/// outside `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise,
    Half,
    CounterClockwise,
}

impl Rotation {
    pub fn from_orientation_tag(tag: Option<u16>) -> Self {
        match tag {
            Some(3) => Rotation::Half,
            Some(6) => Rotation::Clockwise,
            Some(8) => Rotation::CounterClockwise,
            _ => Rotation::None,
        }
    }

    /// Quarter turns swap width and height; the frame grows to fit.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Clockwise | Rotation::CounterClockwise)
    }
}

/// Channel layout of a decoded source image.
///
/// Decoders report many layouts (16-bit, float, luma+alpha); they collapse
/// onto the three modes the pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Luma,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn from_color_type(color: ColorType) -> Self {
        if color.has_alpha() {
            ColorMode::Rgba
        } else if color.has_color() {
            ColorMode::Rgb
        } else {
            ColorMode::Luma
        }
    }
}

/// Rectangle occupied by the resized photo on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Parameters for a single normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeParams {
    pub rotation: Rotation,
    pub canvas: CanvasSpec,
    /// Resized photo size and its offset on the canvas.
    pub placement: Placement,
}
