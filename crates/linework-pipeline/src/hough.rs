//! Line segment detection via the [Hough transform].
//!
//! Edge pixels vote in a quantized `(rho, theta)` parameter space where
//! straight lines appear as accumulator peaks. Each peak surviving
//! non-maximum suppression is then traced back across the edge map to
//! recover concrete endpoint segments: runs of edge pixels along the line
//! are kept when they are at least [`HoughParams::min_line_length`] long,
//! and interrupted runs are bridged across holes of up to
//! [`HoughParams::max_line_gap`] pixels.
//!
//! The voting stage is the classic accumulator formulation; the trace-back
//! stage gives the transform probabilistic-style output (finite segments
//! with endpoints rather than unbounded polar lines).
//!
//! [Hough transform]: https://en.wikipedia.org/wiki/Hough_transform

use std::f32::consts::PI;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::{Point, Segment};

/// Parameters of the Hough line-segment transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoughParams {
    /// Distance resolution of the accumulator in pixels.
    pub rho: f32,

    /// Angle resolution of the accumulator in radians.
    pub theta: f32,

    /// Minimum number of accumulator votes required to consider a line.
    pub vote_threshold: u32,

    /// Minimum length in pixels of an emitted segment. Shorter runs of
    /// edge pixels are discarded; in particular this drops the short
    /// end-caps of thick-line contours.
    pub min_line_length: f32,

    /// Maximum gap in pixels between edge pixels that are still joined
    /// into a single segment.
    pub max_line_gap: f32,
}

impl HoughParams {
    /// Default distance resolution (half a pixel).
    pub const DEFAULT_RHO: f32 = 0.5;

    /// Default angle resolution (one degree).
    pub const DEFAULT_THETA: f32 = PI / 180.0;

    /// Default accumulator vote threshold.
    pub const DEFAULT_VOTE_THRESHOLD: u32 = 20;

    /// Default minimum segment length in pixels.
    pub const DEFAULT_MIN_LINE_LENGTH: f32 = 30.0;

    /// Default maximum bridged gap in pixels.
    pub const DEFAULT_MAX_LINE_GAP: f32 = 5.0;
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: Self::DEFAULT_RHO,
            theta: Self::DEFAULT_THETA,
            vote_threshold: Self::DEFAULT_VOTE_THRESHOLD,
            min_line_length: Self::DEFAULT_MIN_LINE_LENGTH,
            max_line_gap: Self::DEFAULT_MAX_LINE_GAP,
        }
    }
}

/// Quantized accumulator over `(rho, theta)` space.
struct Accumulator {
    votes: Vec<u32>,
    num_rhos: usize,
    num_thetas: usize,
    max_rho: f32,
    rho_res: f32,
    cos_lut: Vec<f32>,
    sin_lut: Vec<f32>,
}

impl Accumulator {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn new(width: u32, height: u32, params: &HoughParams) -> Self {
        // The maximum possible distance is the image diagonal.
        let w = f64::from(width);
        let h = f64::from(height);
        let max_rho = w.mul_add(w, h * h).sqrt() as f32;
        let num_thetas = ((PI / params.theta).ceil() as usize).max(1);
        let num_rhos = ((2.0 * max_rho / params.rho).ceil() as usize).max(1) + 1;

        let thetas: Vec<f32> = (0..num_thetas).map(|i| i as f32 * params.theta).collect();
        let cos_lut: Vec<f32> = thetas.iter().map(|t| t.cos()).collect();
        let sin_lut: Vec<f32> = thetas.iter().map(|t| t.sin()).collect();

        Self {
            votes: vec![0; num_rhos * num_thetas],
            num_rhos,
            num_thetas,
            max_rho,
            rho_res: params.rho,
            cos_lut,
            sin_lut,
        }
    }

    /// Cast one vote per theta bin for the given edge pixel.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn vote(&mut self, x: u32, y: u32) {
        let fx = x as f32;
        let fy = y as f32;
        for t_idx in 0..self.num_thetas {
            let rho = fx.mul_add(self.cos_lut[t_idx], fy * self.sin_lut[t_idx]);
            let rho_idx = ((rho + self.max_rho) / self.rho_res).round();
            if rho_idx >= 0.0 && (rho_idx as usize) < self.num_rhos {
                self.votes[rho_idx as usize * self.num_thetas + t_idx] += 1;
            }
        }
    }

    fn votes_at(&self, rho_idx: usize, theta_idx: usize) -> u32 {
        self.votes[rho_idx * self.num_thetas + theta_idx]
    }

    /// True if the bin is a local maximum of its 3x3 neighborhood.
    ///
    /// Ties survive, so plateau bins can each produce a candidate line;
    /// the downstream duplicate cleanup collapses those.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn is_local_maximum(&self, rho_idx: usize, theta_idx: usize) -> bool {
        let center = self.votes_at(rho_idx, theta_idx);
        for dr in -1_i64..=1 {
            for dt in -1_i64..=1 {
                if dr == 0 && dt == 0 {
                    continue;
                }
                let r = rho_idx as i64 + dr;
                let t = theta_idx as i64 + dt;
                if r < 0 || t < 0 || r >= self.num_rhos as i64 || t >= self.num_thetas as i64 {
                    continue;
                }
                if self.votes_at(r as usize, t as usize) > center {
                    return false;
                }
            }
        }
        true
    }
}

/// Detect line segments in a binary edge map.
///
/// Pixels are considered to be in the foreground (and thus vote for lines)
/// if their intensity is non-zero. Returns segments with integer pixel
/// endpoints, in accumulator scan order.
///
/// An empty or feature-free edge map yields an empty vector; this is a
/// valid result, not an error.
///
/// Note: a single physical line commonly produces several near-identical
/// detections (adjacent accumulator bins, and both contour sides of a
/// thick line). Pass the output through [`crate::dedup::cleanup`] before
/// rendering.
#[must_use = "returns the detected segments"]
pub fn detect_segments(edges: &GrayImage, params: &HoughParams) -> Vec<Segment> {
    let (width, height) = edges.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut acc = Accumulator::new(width, height, params);
    for y in 0..height {
        for x in 0..width {
            if edges.get_pixel(x, y).0[0] > 0 {
                acc.vote(x, y);
            }
        }
    }

    let mut segments = Vec::new();
    for rho_idx in 0..acc.num_rhos {
        for theta_idx in 0..acc.num_thetas {
            let votes = acc.votes_at(rho_idx, theta_idx);
            if votes >= params.vote_threshold && acc.is_local_maximum(rho_idx, theta_idx) {
                #[allow(clippy::cast_precision_loss)]
                let rho = (rho_idx as f32).mul_add(acc.rho_res, -acc.max_rho);
                #[allow(clippy::cast_precision_loss)]
                let theta = theta_idx as f32 * params.theta;
                trace_line(edges, rho, theta, acc.max_rho, params, &mut segments);
            }
        }
    }

    segments
}

/// A run of edge pixels encountered while walking along a line.
#[derive(Clone, Copy)]
struct Run {
    first: Point,
    last: Point,
}

/// Walk the line `(rho, theta)` across the edge map and emit the edge-pixel
/// runs that satisfy the length and gap constraints.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn trace_line(
    edges: &GrayImage,
    rho: f32,
    theta: f32,
    max_rho: f32,
    params: &HoughParams,
    out: &mut Vec<Segment>,
) {
    let cos_t = theta.cos();
    let sin_t = theta.sin();

    // Foot of the perpendicular from the origin, and the unit direction
    // along the line.
    let base_x = rho * cos_t;
    let base_y = rho * sin_t;
    let dir_x = -sin_t;
    let dir_y = cos_t;

    let steps = (2.0 * max_rho).ceil() as i64;
    let mut run: Option<Run> = None;
    let mut gap = 0.0_f32;

    for i in 0..=steps {
        let t = i as f32 - max_rho;
        let x = dir_x.mul_add(t, base_x);
        let y = dir_y.mul_add(t, base_y);

        // Quantized rho can place the line up to half a bin off the true
        // pixel row, so probe a one-pixel band along the line normal.
        let hit = probe(edges, x, y)
            .or_else(|| probe(edges, x + cos_t, y + sin_t))
            .or_else(|| probe(edges, x - cos_t, y - sin_t));

        if let Some(p) = hit {
            run = Some(match run {
                Some(r) => Run {
                    first: r.first,
                    last: p,
                },
                None => Run { first: p, last: p },
            });
            gap = 0.0;
        } else if run.is_some() {
            gap += 1.0;
            if gap > params.max_line_gap {
                flush(run.take(), params.min_line_length, out);
                gap = 0.0;
            }
        }
    }

    flush(run, params.min_line_length, out);
}

/// Return the rounded pixel position if it lies in bounds and is an edge.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn probe(edges: &GrayImage, x: f32, y: f32) -> Option<Point> {
    let xi = x.round();
    let yi = y.round();
    if xi < 0.0 || yi < 0.0 {
        return None;
    }
    let (xu, yu) = (xi as u32, yi as u32);
    if xu >= edges.width() || yu >= edges.height() {
        return None;
    }
    (edges.get_pixel(xu, yu).0[0] > 0).then(|| Point::new(xi as i32, yi as i32))
}

/// Emit a finished run as a segment if it is long enough.
fn flush(run: Option<Run>, min_line_length: f32, out: &mut Vec<Segment>) {
    if let Some(r) = run {
        let segment = Segment::new(r.first, r.last);
        if segment.length() >= f64::from(min_line_length) {
            out.push(segment);
        }
    }
}
