//! Pre-detection smoothing.
//!
//! Sensor noise and compression artifacts survive grayscale conversion and
//! show up in the Canny output as isolated specks. Each speck then casts a
//! full set of accumulator votes in the line transform, so a light Gaussian
//! blur ahead of edge detection pays off: specks are flattened while long
//! straight boundaries only soften into a shallow ramp that Canny still
//! localizes.

use image::GrayImage;

/// Smooth a grayscale image with a Gaussian kernel.
///
/// `sigma` sets the kernel spread; the pipeline default is
/// [`crate::types::PipelineConfig::DEFAULT_BLUR_SIGMA`]. Zero or negative
/// values disable the stage and return a copy of the input, since
/// `imageproc` does not accept them.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma)
}
