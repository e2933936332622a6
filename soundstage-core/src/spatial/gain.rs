//! Distance → gain model.
//!
//! One physically motivated law, used everywhere (playback and the max-gain
//! normalization constant alike): inverse-distance attenuation
//! `ref / (ref + d)`, strictly decreasing with distance and bounded in
//! (0, 1]. Closer is louder.

use crate::geometry::RoomBounds;
use crate::math::Point;

/// Distances below this are clamped before the gain law is applied.
pub const MIN_DISTANCE: f32 = 1e-4;

/// Euclidean distance from the listener to each speaker, written into `out`
/// in speaker-layout order. `out.len()` must equal `speakers.len()`.
pub fn speaker_distances(listener: Point, speakers: &[Point], out: &mut [f32]) {
    debug_assert_eq!(out.len(), speakers.len());
    for (d, speaker) in out.iter_mut().zip(speakers) {
        *d = listener.distance(*speaker);
    }
}

/// Un-normalized loudness contribution of a speaker at the given distance.
pub fn raw_gain(distance: f32, reference_distance: f32) -> f32 {
    let d = distance.max(MIN_DISTANCE);
    reference_distance / (reference_distance + d)
}

/// The normalization constant: the maximum raw gain achievable from any of
/// the four room corners to any speaker.
///
/// Must be recomputed whenever the bounds or any speaker position changes;
/// evaluating playback gains against a stale constant is a correctness bug.
pub fn max_corner_gain(room: &RoomBounds, speakers: &[Point], reference_distance: f32) -> f32 {
    let mut max_gain = 0.0f32;
    for corner in room.corners() {
        for speaker in speakers {
            let gain = raw_gain(corner.distance(*speaker), reference_distance);
            if gain > max_gain {
                max_gain = gain;
            }
        }
    }
    max_gain
}

/// Raw gain normalized against the max-gain constant, in (0, 1].
///
/// A degenerate room (max gain ≈ 0) clamps to 1 instead of dividing by
/// zero; a listener closer to a speaker than any corner caps at 1.
pub fn normalized_gain(distance: f32, max_gain: f32, reference_distance: f32) -> f32 {
    let raw = raw_gain(distance, reference_distance);
    if max_gain <= 0.0 {
        return 1.0;
    }
    (raw / max_gain).min(1.0)
}
