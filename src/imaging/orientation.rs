//! EXIF orientation lookup.
//!
//! Reads tag 0x0112 from IFD0 with `kamadak-exif`, which finds the EXIF
//! block in JPEG APP1, TIFF, PNG `eXIf` and WebP `EXIF` containers. Any
//! failure (no EXIF, truncated data, unknown container) means "no tag".
//! Which values actually rotate is decided by
//! [`Rotation::from_orientation_tag`](super::params::Rotation::from_orientation_tag).

use std::io::Cursor;

/// The raw orientation value, SHORT or LONG. `None` when absent or unreadable.
pub fn read_orientation(data: &[u8]) -> Option<u16> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;
    let value = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)?;
    u16::try_from(value).ok()
}
