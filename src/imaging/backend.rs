//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: identify, read_orientation, and render.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Everything is statically linked into the binary.

use super::params::NormalizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    /// The input is not a decodable image (unknown format, truncated, empty).
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// All operations take the raw upload bytes; a backend never holds state
/// between calls, so one instance can serve concurrent requests.
pub trait ImageBackend: Sync {
    /// Get image dimensions as stored on disk, before orientation correction.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, ImagingError>;

    /// Read the raw EXIF orientation tag. `None` when absent or unreadable.
    fn read_orientation(&self, data: &[u8]) -> Option<u16>;

    /// Decode, rotate, resize, compose onto the canvas and encode as PNG.
    fn render(&self, data: &[u8], params: &NormalizeParams) -> Result<Vec<u8>, ImagingError>;
}
