//! Shared types for the linework detection pipeline.

use serde::{Deserialize, Serialize};

use crate::annotate::AnnotateOptions;
use crate::hough::HoughParams;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference the
/// original decoded image without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in image coordinates.
///
/// Coordinates are integer pixel positions. Detected segments always land
/// on pixel centers, so the integer representation also rules out
/// non-finite coordinates by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A detected straight line segment, represented by its two endpoints.
///
/// Segments are undirected for comparison purposes: a segment and its
/// endpoint-reversed form describe the same physical line. The duplicate
/// elimination predicate in [`crate::dedup`] accounts for this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint, in detection order.
    pub start: Point,
    /// Second endpoint, in detection order.
    pub end: Point,
}

impl Segment {
    /// Create a new segment from two endpoints.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Create a segment directly from endpoint coordinates.
    #[must_use]
    pub const fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
        }
    }

    /// The same segment with its endpoints swapped.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    /// Euclidean length of the segment.
    #[must_use]
    pub fn length(self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the line detection pipeline.
///
/// All parameters have sensible defaults. [`PipelineConfig::validate`]
/// rejects non-finite or out-of-range values before any stage runs, so the
/// individual stages can assume well-formed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Gaussian blur kernel sigma. Higher values produce more smoothing
    /// before edge detection. Non-positive values skip the blur.
    pub blur_sigma: f32,

    /// Canny edge detector low threshold. Pixels with gradient magnitude
    /// between `canny_low` and `canny_high` are edges only if connected
    /// to a strong edge.
    ///
    /// Clamped to at least [`crate::edge::MIN_THRESHOLD`] and at most
    /// `canny_high`.
    pub canny_low: f32,

    /// Canny edge detector high threshold. Pixels with gradient magnitude
    /// above this value are definite edges.
    pub canny_high: f32,

    /// Hough transform parameters for the line-segment detection stage.
    pub hough: HoughParams,

    /// Maximum per-endpoint distance in pixels below which two detected
    /// segments are considered duplicates of the same physical line.
    pub dedup_threshold: f64,

    /// Options for drawing surviving segments onto the output image.
    pub annotate: AnnotateOptions,
}

impl PipelineConfig {
    /// Default Gaussian blur sigma.
    pub const DEFAULT_BLUR_SIGMA: f32 = 1.4;

    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 60.0;

    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 70.0;

    /// Default duplicate-segment proximity threshold in pixels.
    ///
    /// A drawn line of non-zero thickness produces a rectangular contour,
    /// so one physical line is detected up to four times; endpoints of
    /// those detections typically land within a few pixels of each other.
    pub const DEFAULT_DEDUP_THRESHOLD: f64 = 15.0;

    /// Check every parameter for finiteness and range.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the offending field
    /// when any value is non-finite or outside its valid range.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.blur_sigma.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "blur_sigma must be finite".to_string(),
            ));
        }
        if !self.canny_low.is_finite() || !self.canny_high.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "canny thresholds must be finite".to_string(),
            ));
        }
        if !self.hough.rho.is_finite() || self.hough.rho <= 0.0 {
            return Err(PipelineError::InvalidConfig(
                "hough.rho must be finite and positive".to_string(),
            ));
        }
        if !self.hough.theta.is_finite() || self.hough.theta <= 0.0 {
            return Err(PipelineError::InvalidConfig(
                "hough.theta must be finite and positive".to_string(),
            ));
        }
        if !self.hough.min_line_length.is_finite() || self.hough.min_line_length < 0.0 {
            return Err(PipelineError::InvalidConfig(
                "hough.min_line_length must be finite and non-negative".to_string(),
            ));
        }
        if !self.hough.max_line_gap.is_finite() || self.hough.max_line_gap < 0.0 {
            return Err(PipelineError::InvalidConfig(
                "hough.max_line_gap must be finite and non-negative".to_string(),
            ));
        }
        if !self.dedup_threshold.is_finite() || self.dedup_threshold < 0.0 {
            return Err(PipelineError::InvalidConfig(
                "dedup_threshold must be finite and non-negative".to_string(),
            ));
        }
        if !self.annotate.line_width.is_finite() || self.annotate.line_width <= 0.0 {
            return Err(PipelineError::InvalidConfig(
                "annotate.line_width must be finite and positive".to_string(),
            ));
        }
        if self.annotate.palette.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "annotate.palette must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            hough: HoughParams::default(),
            dedup_threshold: Self::DEFAULT_DEDUP_THRESHOLD,
            annotate: AnnotateOptions::default(),
        }
    }
}

/// Result of running the detection pipeline.
///
/// Contains the surviving segments and metadata about the source image
/// needed by downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Deduplicated line segments, in detection order.
    pub segments: Vec<Segment>,

    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved.
///
/// Each field captures the output of one logical pipeline stage, enabling
/// callers to save or inspect every step of the processing chain.
/// Annotation is not a detection stage; callers that want a rendered copy
/// pass `original` and `segments` to [`crate::annotate::annotate`].
///
/// Note: does not derive `PartialEq` or serde traits because the raster
/// fields (`GrayImage`, `RgbaImage`) implement neither; nothing crosses a
/// serialization boundary with intermediate rasters attached.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Stage 0: original decoded RGBA image (pre-processing).
    pub original: RgbaImage,
    /// Stage 1: grayscale conversion.
    pub grayscale: GrayImage,
    /// Stage 2: Gaussian-blurred image.
    pub blurred: GrayImage,
    /// Stage 3: Canny edge map.
    pub edges: GrayImage,
    /// Stage 4: raw segments from the Hough transform, before cleanup.
    pub raw_segments: Vec<Segment>,
    /// Stage 5: deduplicated segments.
    pub segments: Vec<Segment>,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
