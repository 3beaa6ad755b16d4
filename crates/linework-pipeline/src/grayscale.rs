//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the decoded
//! RGBA image plus a single-channel grayscale image suitable for edge
//! detection.
//!
//! This is the first step in the pipeline: raw bytes in, rasters out. The
//! RGBA image is kept around so the annotation stage can draw onto an
//! unmodified copy of the source.

use image::GrayImage;

use crate::types::{PipelineError, RgbaImage};

/// Decode raw image bytes into an RGBA image.
///
/// Supports PNG, JPEG, BMP, and WebP formats (whatever the `image` crate
/// can decode).
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Convert an RGBA image to grayscale using the standard luminance
/// weighting of the red, green, and blue channels.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &RgbaImage) -> GrayImage {
    image::imageops::grayscale(image)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_decodes() {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();

        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0), &image::Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn grayscale_preserves_dimensions() {
        let img = RgbaImage::new(17, 31);
        let gray = to_grayscale(&img);
        assert_eq!(gray.width(), 17);
        assert_eq!(gray.height(), 31);
    }

    #[test]
    fn grayscale_of_white_is_white() {
        let img = RgbaImage::from_pixel(5, 5, image::Rgba([255, 255, 255, 255]));
        let gray = to_grayscale(&img);
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn grayscale_of_black_is_black() {
        let img = RgbaImage::from_pixel(5, 5, image::Rgba([0, 0, 0, 255]));
        let gray = to_grayscale(&img);
        assert!(gray.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn grayscale_weighs_green_heaviest() {
        // Standard luminance weights put green above red above blue.
        let red = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255])));
        let green = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([0, 255, 0, 255])));
        let blue = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 255, 255])));
        assert!(green.get_pixel(0, 0).0[0] > red.get_pixel(0, 0).0[0]);
        assert!(red.get_pixel(0, 0).0[0] > blue.get_pixel(0, 0).0[0]);
    }
}
