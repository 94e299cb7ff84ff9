//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take the upload and canvas, compute parameters, and call the backend.

use super::backend::{ImageBackend, ImagingError};
use super::calculations::{
    calculate_center_offset, calculate_fit_dimensions, calculate_rotated_dimensions,
};
use super::params::{CanvasSpec, NormalizeParams, Placement, Rotation};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// A normalized photo, ready for the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhoto {
    /// PNG bytes, RGBA, exactly canvas-sized.
    pub bytes: Vec<u8>,
    pub canvas: CanvasSpec,
    /// Where the photo itself sits on the canvas; the rest is transparent.
    pub placement: Placement,
}

/// Plan a normalization without executing it.
///
/// `source` is the on-disk size, before orientation correction.
pub fn plan_normalize(
    source: (u32, u32),
    orientation: Option<u16>,
    canvas: CanvasSpec,
) -> NormalizeParams {
    let rotation = Rotation::from_orientation_tag(orientation);
    let upright = calculate_rotated_dimensions(source, rotation);
    let canvas_dims = (canvas.width(), canvas.height());
    let (width, height) = calculate_fit_dimensions(upright, canvas_dims);
    let (x, y) = calculate_center_offset(canvas_dims, (width, height));

    NormalizeParams {
        rotation,
        canvas,
        placement: Placement {
            x,
            y,
            width,
            height,
        },
    }
}

/// Normalize an uploaded photo onto a fixed transparent canvas.
///
/// Returns [`ImagingError::Decode`] when `data` is not an image. A missing
/// or unreadable orientation tag is not an error: the photo is used as stored.
pub fn normalize_photo(
    backend: &impl ImageBackend,
    data: &[u8],
    canvas: CanvasSpec,
) -> Result<NormalizedPhoto> {
    let dims = backend.identify(data)?;
    let orientation = backend.read_orientation(data);
    let params = plan_normalize((dims.width, dims.height), orientation, canvas);

    log::debug!(
        "normalizing {}x{} (orientation {:?}) → {}x{} at ({}, {}) on {}x{}",
        dims.width,
        dims.height,
        orientation,
        params.placement.width,
        params.placement.height,
        params.placement.x,
        params.placement.y,
        canvas.width(),
        canvas.height(),
    );

    let bytes = backend.render(data, &params)?;
    Ok(NormalizedPhoto {
        bytes,
        canvas,
        placement: params.placement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{
        decode_rgba, encode_jpeg, encode_png_rgb, gradient_rgb, jpeg_with_orientation,
        png_with_orientation,
    };
    use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

    fn card() -> CanvasSpec {
        CanvasSpec::new(120, 160).unwrap()
    }

    /// Copy the placement rectangle out of a decoded canvas.
    fn placed_region(canvas: &RgbaImage, placement: Placement) -> RgbaImage {
        canvas
            .view(placement.x, placement.y, placement.width, placement.height)
            .to_image()
    }

    /// Count pixels outside the placement rectangle that are not fully transparent.
    fn opaque_padding(canvas: &RgbaImage, placement: Placement) -> usize {
        canvas
            .enumerate_pixels()
            .filter(|(x, y, _)| {
                let inside = *x >= placement.x
                    && *x < placement.x + placement.width
                    && *y >= placement.y
                    && *y < placement.y + placement.height;
                !inside
            })
            .filter(|(_, _, p)| p[3] != 0)
            .count()
    }

    // =========================================================================
    // plan_normalize tests
    // =========================================================================

    #[test]
    fn plan_wide_banner() {
        let params = plan_normalize((800, 200), None, card());
        assert_eq!(params.rotation, Rotation::None);
        assert_eq!(
            params.placement,
            Placement {
                x: 0,
                y: 65,
                width: 120,
                height: 30
            }
        );
    }

    #[test]
    fn plan_rotates_before_fitting() {
        // 300x200 stored sideways with tag 6 → upright 200x300 → 107x160
        let params = plan_normalize((300, 200), Some(6), card());
        assert_eq!(params.rotation, Rotation::Clockwise);
        assert_eq!((params.placement.width, params.placement.height), (107, 160));
        assert_eq!((params.placement.x, params.placement.y), (6, 0));
    }

    #[test]
    fn plan_mirrored_tag_is_ignored() {
        let params = plan_normalize((300, 200), Some(5), card());
        assert_eq!(params.rotation, Rotation::None);
        assert_eq!((params.placement.width, params.placement.height), (120, 80));
    }

    #[test]
    fn normalize_calls_backend_in_order() {
        let backend = MockBackend::with_orientation(
            vec![Dimensions {
                width: 800,
                height: 200,
            }],
            3,
        );

        let photo = normalize_photo(&backend, b"upload", card()).unwrap();
        assert_eq!(photo.bytes, b"mock-png");

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0], RecordedOp::Identify(6));
        assert_eq!(ops[1], RecordedOp::ReadOrientation(6));
        assert!(matches!(
            &ops[2],
            RecordedOp::Render {
                rotation: Rotation::Half,
                canvas: (120, 160),
                ..
            }
        ));
    }

    #[test]
    fn normalize_stops_after_failed_identify() {
        let backend = MockBackend::new();
        let result = normalize_photo(&backend, b"junk", card());
        assert!(matches!(result, Err(ImagingError::Decode(_))));
        assert_eq!(backend.get_operations(), vec![RecordedOp::Identify(4)]);
    }

    // =========================================================================
    // normalize_photo against the real backend
    // =========================================================================

    #[test]
    fn output_always_matches_canvas() {
        let backend = RustBackend::new();
        for (w, h) in [(400, 400), (800, 200), (200, 800), (50, 50), (120, 160), (1, 1)] {
            let png = encode_png_rgb(&gradient_rgb(w, h));
            for (cw, ch) in [(120, 160), (100, 100), (200, 150), (50, 75), (1, 1)] {
                let canvas = CanvasSpec::new(cw, ch).unwrap();
                let photo = normalize_photo(&backend, &png, canvas).unwrap();
                let decoded = decode_rgba(&photo.bytes);
                assert_eq!(decoded.dimensions(), (cw, ch), "{w}x{h} into {cw}x{ch}");
            }
        }
    }

    #[test]
    fn undecodable_inputs_fail_without_bytes() {
        let backend = RustBackend::new();
        let png = encode_png_rgb(&gradient_rgb(64, 64));
        let inputs: [&[u8]; 6] = [
            b"",
            b"not an image",
            &[0x13, 0x37, 0xC0, 0xDE, 0x00, 0xFF, 0x42, 0x99, 0x01, 0x02],
            &png[..16],
            b"\x89PNG\r\n\x1a\n",
            &[0xFF, 0xD8, 0xFF],
        ];
        for input in inputs {
            let result = normalize_photo(&backend, input, card());
            assert!(
                matches!(result, Err(ImagingError::Decode(_))),
                "expected decode failure for {:?}",
                &input[..input.len().min(8)]
            );
        }
    }

    #[test]
    fn wide_banner_centered_with_transparent_bands() {
        let backend = RustBackend::new();
        let png = encode_png_rgb(&gradient_rgb(800, 200));
        let photo = normalize_photo(&backend, &png, card()).unwrap();

        assert_eq!(
            photo.placement,
            Placement {
                x: 0,
                y: 65,
                width: 120,
                height: 30
            }
        );
        let canvas = decode_rgba(&photo.bytes);
        assert_eq!(opaque_padding(&canvas, photo.placement), 0);
        assert_eq!(canvas.get_pixel(60, 64)[3], 0);
        assert_eq!(canvas.get_pixel(60, 65)[3], 255);
        assert_eq!(canvas.get_pixel(60, 94)[3], 255);
        assert_eq!(canvas.get_pixel(60, 95)[3], 0);
    }

    #[test]
    fn exact_size_is_pixel_identical() {
        let backend = RustBackend::new();
        let source = gradient_rgb(120, 160);
        let photo = normalize_photo(&backend, &encode_png_rgb(&source), card()).unwrap();

        let canvas = decode_rgba(&photo.bytes);
        let expected = DynamicImage::ImageRgb8(source).to_rgba8();
        assert_eq!(canvas, expected);
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let backend = RustBackend::new();
        let source = gradient_rgb(50, 50);
        let photo = normalize_photo(&backend, &encode_png_rgb(&source), card()).unwrap();

        assert_eq!(
            photo.placement,
            Placement {
                x: 35,
                y: 55,
                width: 50,
                height: 50
            }
        );
        let canvas = decode_rgba(&photo.bytes);
        let expected = DynamicImage::ImageRgb8(source).to_rgba8();
        assert_eq!(placed_region(&canvas, photo.placement), expected);
        assert_eq!(opaque_padding(&canvas, photo.placement), 0);
    }

    #[test]
    fn orientation_3_rotates_pixels_180() {
        let backend = RustBackend::new();
        let source = gradient_rgb(4, 2);
        let png = png_with_orientation(&source, 3);
        let canvas_spec = CanvasSpec::new(8, 8).unwrap();
        let photo = normalize_photo(&backend, &png, canvas_spec).unwrap();

        let canvas = decode_rgba(&photo.bytes);
        let region = placed_region(&canvas, photo.placement);
        let rotated = DynamicImage::ImageRgb8(source.clone()).rotate180().to_rgba8();
        let unrotated = DynamicImage::ImageRgb8(source).to_rgba8();
        assert_eq!(region, rotated);
        assert_ne!(region, unrotated);
    }

    #[test]
    fn orientation_6_turns_clockwise() {
        let backend = RustBackend::new();
        let source = gradient_rgb(4, 2);
        let png = png_with_orientation(&source, 6);
        let photo = normalize_photo(&backend, &png, CanvasSpec::new(8, 8).unwrap()).unwrap();

        assert_eq!((photo.placement.width, photo.placement.height), (2, 4));
        let region = placed_region(&decode_rgba(&photo.bytes), photo.placement);
        assert_eq!(region, DynamicImage::ImageRgb8(source).rotate90().to_rgba8());
    }

    #[test]
    fn orientation_8_turns_counter_clockwise() {
        let backend = RustBackend::new();
        let source = gradient_rgb(4, 2);
        let png = png_with_orientation(&source, 8);
        let photo = normalize_photo(&backend, &png, CanvasSpec::new(8, 8).unwrap()).unwrap();

        let region = placed_region(&decode_rgba(&photo.bytes), photo.placement);
        assert_eq!(region, DynamicImage::ImageRgb8(source).rotate270().to_rgba8());
    }

    #[test]
    fn mirrored_orientation_left_untouched() {
        let backend = RustBackend::new();
        let source = gradient_rgb(4, 2);
        let png = png_with_orientation(&source, 2);
        let photo = normalize_photo(&backend, &png, CanvasSpec::new(8, 8).unwrap()).unwrap();

        let region = placed_region(&decode_rgba(&photo.bytes), photo.placement);
        assert_eq!(region, DynamicImage::ImageRgb8(source).to_rgba8());
    }

    #[test]
    fn jpeg_orientation_swaps_frame() {
        let backend = RustBackend::new();
        // Stored landscape, tag 6 says it is really portrait
        let jpeg = jpeg_with_orientation(240, 160, 6);
        let photo = normalize_photo(&backend, &jpeg, card()).unwrap();
        assert_eq!(
            photo.placement,
            Placement {
                x: 6,
                y: 0,
                width: 107,
                height: 160
            }
        );
    }

    #[test]
    fn repeated_calls_are_pixel_identical() {
        let backend = RustBackend::new();
        let jpeg = encode_jpeg(&gradient_rgb(640, 480));
        let first = normalize_photo(&backend, &jpeg, card()).unwrap();
        let second = normalize_photo(&backend, &jpeg, card()).unwrap();

        assert_eq!(first.placement, second.placement);
        assert_eq!(decode_rgba(&first.bytes), decode_rgba(&second.bytes));
    }

    #[test]
    fn transparent_source_keeps_alpha() {
        let backend = RustBackend::new();
        let mut source = RgbaImage::from_pixel(10, 10, Rgba([200, 10, 10, 255]));
        source.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(source)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let photo = normalize_photo(&backend, &png, CanvasSpec::new(20, 20).unwrap()).unwrap();
        let canvas = decode_rgba(&photo.bytes);
        assert_eq!(canvas.get_pixel(5, 5)[3], 0);
        assert_eq!(*canvas.get_pixel(6, 6), Rgba([200, 10, 10, 255]));
    }
}
