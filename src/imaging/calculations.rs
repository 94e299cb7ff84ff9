//! Pure calculation functions for photo geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::Rotation;

/// Dimensions of an image after an orientation correction.
///
/// Quarter turns swap the axes; the frame expands rather than cropping.
pub fn calculate_rotated_dimensions(source: (u32, u32), rotation: Rotation) -> (u32, u32) {
    let (w, h) = source;
    if rotation.swaps_axes() { (h, w) } else { (w, h) }
}

/// Uniform scale factor that fits `source` inside `canvas`.
///
/// Clamped to 1.0: photos smaller than the canvas on both axes keep their
/// size and get padded instead of enlarged.
pub fn calculate_fit_scale(source: (u32, u32), canvas: (u32, u32)) -> f64 {
    let (src_w, src_h) = source;
    let (can_w, can_h) = canvas;

    let scale_w = can_w as f64 / src_w as f64;
    let scale_h = can_h as f64 / src_h as f64;

    scale_w.min(scale_h).min(1.0)
}

/// Calculate the resized dimensions of `source` fitted inside `canvas`.
///
/// Both sides are scaled by [`calculate_fit_scale`] and rounded. A side never
/// drops below one pixel, so extreme panoramas stay visible as a sliver.
///
/// # Examples
/// ```
/// # use staffdir::imaging::calculate_fit_dimensions;
/// // 800x200 banner into a 120x160 card → 120x30
/// assert_eq!(calculate_fit_dimensions((800, 200), (120, 160)), (120, 30));
///
/// // 50x50 avatar into 120x160 → untouched
/// assert_eq!(calculate_fit_dimensions((50, 50), (120, 160)), (50, 50));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), canvas: (u32, u32)) -> (u32, u32) {
    let scale = calculate_fit_scale(source, canvas);
    if scale >= 1.0 {
        return source;
    }

    let (src_w, src_h) = source;
    let (can_w, can_h) = canvas;
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, can_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, can_h);
    (w, h)
}

/// Top-left offset that centers `placed` on `canvas`.
///
/// Integer division: an odd leftover pixel goes to the right/bottom margin.
pub fn calculate_center_offset(canvas: (u32, u32), placed: (u32, u32)) -> (u32, u32) {
    let (can_w, can_h) = canvas;
    let (w, h) = placed;
    (can_w.saturating_sub(w) / 2, can_h.saturating_sub(h) / 2)
}
