//! Canny edge detection.
//!
//! The line transform votes once per foreground pixel, so the edge map is
//! the accumulator's entire input: too dense and every bin fills with noise
//! votes, too sparse and real lines fall under the vote threshold. This
//! wrapper around [`imageproc::edges::canny`] normalizes the threshold pair
//! before the detector sees it.

use image::GrayImage;

/// Floor applied to both Canny thresholds.
///
/// At zero, hysteresis accepts any pixel with a nonzero gradient response
/// and the map degenerates into solid texture, drowning the accumulator in
/// votes.
pub const MIN_THRESHOLD: f32 = 1.0;

/// Normalize a `(low, high)` threshold pair: both floored at
/// [`MIN_THRESHOLD`], and `low` capped at `high`. Swapped pairs are
/// repaired rather than rejected.
fn clamp_thresholds(low: f32, high: f32) -> (f32, f32) {
    let high = high.max(MIN_THRESHOLD);
    (low.max(MIN_THRESHOLD).min(high), high)
}

/// Detect edges in a blurred grayscale image.
///
/// Returns a binary map, 255 for edge pixels and 0 for background, ready
/// to feed the line transform's accumulator. Gradient magnitudes above the
/// high threshold are definite edges; magnitudes between the two count
/// only when connected to a definite edge. The pair is normalized first,
/// so a degenerate or swapped pair still produces a usable map.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (low, high) = clamp_thresholds(low_threshold, high_threshold);
    imageproc::edges::canny(image, low, high)
}
