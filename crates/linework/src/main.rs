//! linework: detect straight line segments in a raster image.
//!
//! Runs the detection pipeline on an image file, writes an annotated copy
//! next to the input (`photo.png` -> `photo-out.png` unless `--output` is
//! given), and optionally prints segments and per-stage diagnostics as
//! JSON.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use linework_pipeline::annotate;
use linework_pipeline::diagnostics::PipelineDiagnostics;
use linework_pipeline::{
    AnnotateOptions, Dimensions, HoughParams, PipelineConfig, Segment, process_staged,
};
use serde::Serialize;

/// Detect straight line segments in a raster image.
///
/// Decodes the input, runs Canny edge detection and a Hough line-segment
/// transform, removes duplicate detections of the same physical line, and
/// writes the surviving segments onto a copy of the source image.
#[derive(Parser)]
#[command(name = "linework", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Output path for the annotated image.
    ///
    /// Defaults to the input path with `-out` appended to the file stem.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Gaussian blur sigma (non-positive skips the blur).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Hough distance resolution in pixels.
    #[arg(long, default_value_t = HoughParams::DEFAULT_RHO)]
    rho: f32,

    /// Hough angle resolution in degrees.
    #[arg(long, default_value_t = HoughParams::DEFAULT_THETA.to_degrees())]
    theta_degrees: f32,

    /// Minimum accumulator votes for a candidate line.
    #[arg(long, default_value_t = HoughParams::DEFAULT_VOTE_THRESHOLD)]
    vote_threshold: u32,

    /// Minimum segment length in pixels.
    #[arg(long, default_value_t = HoughParams::DEFAULT_MIN_LINE_LENGTH)]
    min_line_length: f32,

    /// Maximum bridged gap between edge pixels in pixels.
    #[arg(long, default_value_t = HoughParams::DEFAULT_MAX_LINE_GAP)]
    max_line_gap: f32,

    /// Maximum per-endpoint distance for two detections to count as
    /// duplicates of the same line.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_DEDUP_THRESHOLD)]
    dedup_threshold: f64,

    /// Stroke width for drawn segments in pixels.
    #[arg(long, default_value_t = AnnotateOptions::DEFAULT_LINE_WIDTH)]
    line_width: f32,

    /// Skip rendering and writing the annotated image (useful with --json).
    #[arg(long)]
    no_annotate: bool,

    /// Write the Canny edge map to this path.
    #[arg(long)]
    edges_out: Option<PathBuf>,

    /// Print segments and diagnostics as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// JSON report printed by `--json`.
#[derive(Serialize)]
struct Report<'a> {
    dimensions: Dimensions,
    segments: &'a [Segment],
    raw_segment_count: usize,
    diagnostics: &'a PipelineDiagnostics,
}

/// Derive the default output path: `photo.png` -> `photo-out.png`.
fn output_name(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    name.push_str("-out");
    let mut path = input.with_file_name(name);
    if let Some(extension) = input.extension() {
        path.set_extension(extension);
    }
    path
}

/// Assemble the pipeline configuration from CLI flags or `--config-json`.
fn build_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn Error>> {
    if let Some(json) = &cli.config_json {
        let config: PipelineConfig = serde_json::from_str(json)?;
        return Ok(config);
    }

    Ok(PipelineConfig {
        blur_sigma: cli.blur_sigma,
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        hough: HoughParams {
            rho: cli.rho,
            theta: cli.theta_degrees.to_radians(),
            vote_threshold: cli.vote_threshold,
            min_line_length: cli.min_line_length,
            max_line_gap: cli.max_line_gap,
        },
        dedup_threshold: cli.dedup_threshold,
        annotate: AnnotateOptions {
            line_width: cli.line_width,
            palette: AnnotateOptions::DEFAULT_PALETTE.to_vec(),
        },
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    eprintln!("Reading image from {}", cli.input.display());
    let image_bytes = std::fs::read(&cli.input)?;

    eprintln!("Detecting line segments...");
    let (staged, diagnostics) = process_staged(&image_bytes, &config)?;

    eprintln!(
        "Found {} segments ({} raw detections, {} duplicates removed)",
        staged.segments.len(),
        staged.raw_segments.len(),
        diagnostics.summary.removed_duplicates,
    );

    if let Some(edges_path) = &cli.edges_out {
        eprintln!("Saving edge map to {}", edges_path.display());
        staged.edges.save(edges_path)?;
    }

    // Annotation only runs when its output is actually written.
    if !cli.no_annotate {
        let annotated = annotate::annotate(&staged.original, &staged.segments, &config.annotate);
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| output_name(&cli.input));
        eprintln!("Saving annotated image to {}", output.display());
        annotated.save(&output)?;
    }

    if cli.json {
        let report = Report {
            dimensions: staged.dimensions,
            segments: &staged.segments,
            raw_segment_count: staged.raw_segments.len(),
            diagnostics: &diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    eprintln!("Done.");
    Ok(())
}
