//! Pipeline diagnostics: timing and counts for each stage.
//!
//! These diagnostics are permanent instrumentation intended for parameter
//! tuning. Every call to [`process_staged`](crate::process_staged) collects
//! diagnostics alongside the pipeline results.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 0: image decoding.
    pub decode: StageDiagnostics,
    /// Stage 1: grayscale conversion.
    pub grayscale: StageDiagnostics,
    /// Stage 2: Gaussian blur.
    pub blur: StageDiagnostics,
    /// Stage 3: Canny edge detection.
    pub edge_detection: StageDiagnostics,
    /// Stage 4: Hough line-segment transform.
    pub line_transform: StageDiagnostics,
    /// Stage 5: duplicate segment elimination.
    pub cleanup: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Summary counts for a pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of foreground pixels in the Canny edge map.
    pub edge_pixels: usize,
    /// Raw segments produced by the Hough transform.
    pub raw_segments: usize,
    /// Segments surviving duplicate elimination.
    pub segments: usize,
    /// Raw detections removed as duplicates.
    pub removed_duplicates: usize,
}

/// Stopwatch for per-stage lap timing.
#[derive(Debug)]
pub struct Clock {
    started: Instant,
    last: Instant,
}

impl Clock {
    /// Start a new clock.
    #[must_use]
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last: now,
        }
    }

    /// Record the time since the previous lap (or since the start).
    pub fn lap(&mut self) -> StageDiagnostics {
        let now = Instant::now();
        let duration = now.duration_since(self.last);
        self.last = now;
        StageDiagnostics { duration }
    }

    /// Total elapsed time since the clock started.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.started.elapsed()
    }
}
