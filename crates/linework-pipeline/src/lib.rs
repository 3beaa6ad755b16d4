//! linework-pipeline: Pure line segment detection pipeline (sans-IO).
//!
//! Converts raster images into annotated line segments through:
//! grayscale -> blur -> Canny edge detection -> Hough line transform ->
//! duplicate segment elimination -> annotation.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. File reading, output naming,
//! and argument handling live in the `linework` binary.

pub mod annotate;
pub mod blur;
pub mod dedup;
pub mod diagnostics;
pub mod edge;
pub mod grayscale;
pub mod hough;
pub mod types;

pub use annotate::AnnotateOptions;
pub use hough::HoughParams;
pub use types::{
    Dimensions, PipelineConfig, PipelineError, Point, ProcessResult, Segment, StagedResult,
};

use diagnostics::{Clock, PipelineDiagnostics, PipelineSummary};

/// Run the full detection pipeline.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration, then
/// produces a [`ProcessResult`] containing the deduplicated segments and
/// the source image dimensions.
///
/// An image in which no lines are found is a valid input: the result
/// simply carries an empty segment list.
///
/// # Pipeline steps
///
/// 1. Decode image
/// 2. Grayscale conversion
/// 3. Gaussian blur (noise reduction)
/// 4. Canny edge detection
/// 5. Hough line-segment transform
/// 6. Duplicate segment elimination
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    config.validate()?;

    let original = grayscale::decode(image_bytes)?;
    let dimensions = Dimensions {
        width: original.width(),
        height: original.height(),
    };

    let gray = grayscale::to_grayscale(&original);
    let blurred = blur::gaussian_blur(&gray, config.blur_sigma);
    let edges = edge::canny(&blurred, config.canny_low, config.canny_high);
    let raw_segments = hough::detect_segments(&edges, &config.hough);
    let segments = dedup::cleanup(&raw_segments, config.dedup_threshold);

    Ok(ProcessResult {
        segments,
        dimensions,
    })
}

/// Run the pipeline keeping every intermediate stage output, with
/// per-stage diagnostics.
///
/// Returns the [`StagedResult`] (all intermediate rasters plus raw and
/// cleaned segments) together with [`PipelineDiagnostics`] covering stage
/// durations and summary counts. Rendering is left to the caller: pass
/// `original` and `segments` to [`annotate::annotate`] when an annotated
/// copy is wanted.
///
/// # Errors
///
/// Same conditions as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;

    let mut clock = Clock::start();

    let original = grayscale::decode(image_bytes)?;
    let dimensions = Dimensions {
        width: original.width(),
        height: original.height(),
    };
    let decode = clock.lap();

    let gray = grayscale::to_grayscale(&original);
    let grayscale_stage = clock.lap();

    let blurred = blur::gaussian_blur(&gray, config.blur_sigma);
    let blur_stage = clock.lap();

    let edges = edge::canny(&blurred, config.canny_low, config.canny_high);
    let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count();
    let edge_detection = clock.lap();

    let raw_segments = hough::detect_segments(&edges, &config.hough);
    let line_transform = clock.lap();

    let segments = dedup::cleanup(&raw_segments, config.dedup_threshold);
    let cleanup_stage = clock.lap();

    let diagnostics = PipelineDiagnostics {
        decode,
        grayscale: grayscale_stage,
        blur: blur_stage,
        edge_detection,
        line_transform,
        cleanup: cleanup_stage,
        total_duration: clock.total(),
        summary: PipelineSummary {
            edge_pixels,
            raw_segments: raw_segments.len(),
            segments: segments.len(),
            removed_duplicates: raw_segments.len() - segments.len(),
        },
    };

    let staged = StagedResult {
        original,
        grayscale: gray,
        blurred,
        edges,
        raw_segments,
        segments,
        dimensions,
    };

    Ok((staged, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &types::RgbaImage) -> Vec<u8> {
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
        buf
    }

    /// White 120x60 image with one thick black horizontal line.
    ///
    /// The line's contour is a long thin rectangle: two ~100px sides that
    /// the transform detects separately, plus two ~4px end-caps that fall
    /// below the minimum segment length.
    fn thick_line_png() -> Vec<u8> {
        let img = types::RgbaImage::from_fn(120, 60, |x, y| {
            if (10..110).contains(&x) && (28..=32).contains(&y) {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        encode_png(&img)
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn process_invalid_config_rejected_before_decode() {
        let config = PipelineConfig {
            dedup_threshold: f64::NAN,
            ..PipelineConfig::default()
        };
        let result = process(&thick_line_png(), &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn process_uniform_image_finds_no_segments() {
        let img = types::RgbaImage::from_pixel(40, 40, image::Rgba([128, 128, 128, 255]));
        let result = process(&encode_png(&img), &PipelineConfig::default()).unwrap();
        assert!(result.segments.is_empty());
        assert_eq!(
            result.dimensions,
            Dimensions {
                width: 40,
                height: 40
            },
        );
    }

    #[test]
    fn process_thick_line_yields_deduplicated_horizontal_segment() {
        let result = process(&thick_line_png(), &PipelineConfig::default()).unwrap();
        assert!(
            !result.segments.is_empty(),
            "expected at least one segment"
        );

        // Some survivor must span most of the drawn line horizontally.
        let long_horizontal = result.segments.iter().any(|s| {
            let dy = (s.start.y - s.end.y).abs();
            dy <= 3 && s.length() > 60.0
        });
        assert!(
            long_horizontal,
            "no long horizontal survivor in {:?}",
            result.segments,
        );

        // Fixed point: no two survivors are mutual duplicates.
        for (i, a) in result.segments.iter().enumerate() {
            for b in &result.segments[i + 1..] {
                assert!(
                    !dedup::too_close(*a, *b, PipelineConfig::DEFAULT_DEDUP_THRESHOLD),
                    "{a:?} and {b:?} survived as mutual duplicates",
                );
            }
        }
    }

    #[test]
    fn staged_result_is_consistent_with_process() {
        let bytes = thick_line_png();
        let config = PipelineConfig::default();
        let plain = process(&bytes, &config).unwrap();
        let (staged, diagnostics) = process_staged(&bytes, &config).unwrap();

        assert_eq!(staged.segments, plain.segments);
        assert_eq!(staged.dimensions, plain.dimensions);
        assert!(staged.raw_segments.len() >= staged.segments.len());
        assert_eq!(diagnostics.summary.segments, staged.segments.len());
        assert_eq!(diagnostics.summary.raw_segments, staged.raw_segments.len());
        assert_eq!(
            diagnostics.summary.removed_duplicates,
            staged.raw_segments.len() - staged.segments.len(),
        );
        assert!(diagnostics.summary.edge_pixels > 0);
    }

    #[test]
    fn annotating_staged_output_marks_detected_lines() {
        let config = PipelineConfig::default();
        let (staged, _diagnostics) = process_staged(&thick_line_png(), &config).unwrap();
        assert!(!staged.segments.is_empty(), "expected at least one segment");

        let annotated = annotate::annotate(&staged.original, &staged.segments, &config.annotate);
        assert_eq!(annotated.dimensions(), (120, 60));
        // The annotated copy differs from the original along the line.
        assert_ne!(annotated, staged.original, "annotation changed no pixels");
    }
}
