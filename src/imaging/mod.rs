//! Photo normalization, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Orientation** | `kamadak-exif` (JPEG APP1, TIFF, PNG `eXIf`, WebP `EXIF`) |
//! | **Rotate → fit → compose** | `rotate90/180/270`, Lanczos3, `imageops::replace` |
//! | **Encode** | PNG, RGBA8 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a normalization
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`normalize_photo`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, ImageBackend, ImagingError};
pub use calculations::calculate_fit_dimensions;
pub use operations::{NormalizedPhoto, normalize_photo, plan_normalize};
pub use orientation::read_orientation;
pub use params::{CanvasError, CanvasSpec, ColorMode, NormalizeParams, Placement, Rotation};
pub use rust_backend::{DecodedImage, RustBackend, decode_image};
