//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with guessed format |
//! | Orientation tag | `kamadak-exif` via [`read_orientation`](super::orientation::read_orientation) |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Compose | `image::imageops::replace` onto a zeroed `RgbaImage` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{Dimensions, ImageBackend, ImagingError};
use super::orientation::read_orientation;
use super::params::{ColorMode, NormalizeParams, Rotation};
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully decoded upload together with what its metadata says about it.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub color_mode: ColorMode,
    pub orientation: Option<u16>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, ImagingError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImagingError::Decode(format!("Failed to sniff format: {}", e)))
}

/// Decode upload bytes and read their orientation tag.
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, ImagingError> {
    let image = reader(data)?
        .decode()
        .map_err(|e| ImagingError::Decode(format!("Failed to decode upload: {}", e)))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ImagingError::Decode("Image has no pixels".into()));
    }
    Ok(DecodedImage {
        color_mode: ColorMode::from_color_type(image.color()),
        orientation: read_orientation(data),
        image,
    })
}

/// Apply an orientation correction, expanding the frame on quarter turns.
pub fn apply_rotation(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => image,
        Rotation::Clockwise => image.rotate90(),
        Rotation::Half => image.rotate180(),
        Rotation::CounterClockwise => image.rotate270(),
    }
}

/// Encode an RGBA canvas as PNG.
fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ImagingError::Encode(format!("PNG encode failed: {}", e)))?;
    if buf.is_empty() {
        return Err(ImagingError::Encode("PNG encoder produced no bytes".into()));
    }
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, ImagingError> {
        let (width, height) = reader(data)?
            .into_dimensions()
            .map_err(|e| ImagingError::Decode(format!("Failed to read dimensions: {}", e)))?;
        if width == 0 || height == 0 {
            return Err(ImagingError::Decode("Image has no pixels".into()));
        }
        Ok(Dimensions { width, height })
    }

    fn read_orientation(&self, data: &[u8]) -> Option<u16> {
        read_orientation(data)
    }

    fn render(&self, data: &[u8], params: &NormalizeParams) -> Result<Vec<u8>, ImagingError> {
        let decoded = decode_image(data)?;
        let rotated = apply_rotation(decoded.image, params.rotation).to_rgba8();

        let placement = params.placement;
        let resized = if rotated.dimensions() == (placement.width, placement.height) {
            rotated
        } else {
            image::imageops::resize(
                &rotated,
                placement.width,
                placement.height,
                FilterType::Lanczos3,
            )
        };

        // Zeroed RGBA pixels are fully transparent
        let mut canvas = RgbaImage::new(params.canvas.width(), params.canvas.height());
        image::imageops::replace(
            &mut canvas,
            &resized,
            placement.x as i64,
            placement.y as i64,
        );

        encode_png(&canvas)
    }
}
