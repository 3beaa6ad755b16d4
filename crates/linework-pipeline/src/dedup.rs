//! Duplicate segment elimination.
//!
//! A drawn line of non-zero thickness produces a rectangular contour in the
//! edge map, so one physical line yields two long parallel contour sides;
//! with detections from either scan direction, up to four near-identical
//! segments can describe a single line. This module reduces a raw detection
//! list to a set in which no two segments are mutual duplicates.

use crate::types::Segment;

/// Check whether two segments are duplicates of the same physical line.
///
/// Two segments are considered too close if, under either of the two
/// possible endpoint pairings (direct or crossed), the Euclidean distance
/// between each paired endpoint is strictly below `threshold`. Both
/// endpoint pairs of the chosen pairing must be close; a single close
/// endpoint is not sufficient.
///
/// Checking both pairings makes the predicate symmetric and
/// orientation-invariant: a segment detected in the opposite scan
/// direction is still recognized as the same line.
///
/// A NaN `threshold` makes every comparison false, so no segment is ever
/// considered a duplicate of another.
#[must_use]
pub fn too_close(a: Segment, b: Segment, threshold: f64) -> bool {
    let direct =
        a.start.distance(b.start) < threshold && a.end.distance(b.end) < threshold;
    let crossed =
        a.start.distance(b.end) < threshold && a.end.distance(b.start) < threshold;
    direct || crossed
}

/// Remove duplicate detections, keeping the earliest of each group.
///
/// A single forward pass keeps a segment iff it is not [`too_close`] to any
/// previously kept segment. This produces exactly the same output as the
/// classic formulation (scan all pairs, delete the higher-indexed member of
/// the first close pair found, restart until a full scan performs no
/// deletion): in both, the survivor of every duplicate group is the
/// lowest-indexed segment that is not close to an even earlier survivor.
/// The single pass just skips the redundant rescans, turning the worst case
/// from O(n³) into O(n²).
///
/// Postconditions:
///
/// - no two returned segments satisfy [`too_close`] under `threshold`;
/// - the result is an order-preserving subsequence of the input;
/// - applying `cleanup` to its own output returns it unchanged.
#[must_use = "returns the deduplicated segments"]
pub fn cleanup(segments: &[Segment], threshold: f64) -> Vec<Segment> {
    let mut kept: Vec<Segment> = Vec::with_capacity(segments.len());
    for &candidate in segments {
        if !kept.iter().any(|&k| too_close(k, candidate, threshold)) {
            kept.push(candidate);
        }
    }
    kept
}
