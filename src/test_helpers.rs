//! Shared test utilities for the staffdir test suite.
//!
//! Builds small in-memory images, optionally carrying an EXIF orientation
//! tag, so imaging tests never depend on fixture files.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let png = png_with_orientation(&gradient_rgb(4, 2), 3);
//! let photo = normalize_photo(&RustBackend::new(), &png, canvas).unwrap();
//! let pixels = decode_rgba(&photo.bytes);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};

// =========================================================================
// Pixel sources
// =========================================================================

/// An RGB image where every pixel is distinct for small sizes.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 37 % 256) as u8,
            (y * 53 % 256) as u8,
            ((x + y) * 11 % 256) as u8,
        ])
    })
}

// =========================================================================
// Encoders
// =========================================================================

pub fn encode_png_rgb(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

pub fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

pub fn decode_rgba(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

// =========================================================================
// EXIF fixtures
// =========================================================================

/// A minimal TIFF-structured EXIF block: header, IFD0 with one Orientation
/// entry (SHORT), no next IFD.
pub fn exif_tiff_block(orientation: u16, big_endian: bool) -> Vec<u8> {
    let u16b = |v: u16| {
        if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };
    let u32b = |v: u32| {
        if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };

    let mut block = Vec::new();
    block.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    block.extend_from_slice(&u16b(42));
    block.extend_from_slice(&u32b(8));
    // IFD0: one entry
    block.extend_from_slice(&u16b(1));
    block.extend_from_slice(&u16b(0x0112));
    block.extend_from_slice(&u16b(3));
    block.extend_from_slice(&u32b(1));
    block.extend_from_slice(&u16b(orientation));
    block.extend_from_slice(&[0, 0]);
    // No next IFD
    block.extend_from_slice(&u32b(0));
    block
}

/// A JPEG with an `Exif` APP1 segment inserted right after SOI.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = encode_jpeg(&gradient_rgb(width, height));

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&exif_tiff_block(orientation, true));

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A lossless PNG with an `eXIf` chunk inserted right after IHDR.
pub fn png_with_orientation(img: &RgbImage, orientation: u16) -> Vec<u8> {
    let png = encode_png_rgb(img);
    // Signature (8) + IHDR chunk (4 len + 4 type + 13 body + 4 crc)
    let ihdr_end = 8 + 25;

    let body = exif_tiff_block(orientation, false);
    let mut chunk = Vec::new();
    chunk.extend_from_slice(&(body.len() as u32).to_be_bytes());
    chunk.extend_from_slice(b"eXIf");
    chunk.extend_from_slice(&body);
    let crc = crc32(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    let mut out = Vec::with_capacity(png.len() + chunk.len());
    out.extend_from_slice(&png[..ihdr_end]);
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[ihdr_end..]);
    out
}

/// PNG chunk CRC (ISO 3309, reflected, polynomial 0xEDB88320).
fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[test]
fn crc32_known_vector() {
    // CRC of the IEND chunk type, as found at the end of every PNG
    assert_eq!(crc32(b"IEND"), 0xAE42_6082);
}
