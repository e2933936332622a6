//! Yaw-compensating rotation mixer.
//!
//! Builds the weight matrix `W[v][r]` mapping canonical virtual source
//! channels onto the physically placed speakers. Virtual channels sit at
//! fixed, evenly spaced angles; rotating them by the negated listener yaw
//! keeps the perceived direction stable while the listener turns. Weights
//! fall off as a Gaussian of angular distance and every row is normalized
//! to sum 1, so rotation redistributes energy without creating or losing it.
//!
//! The subwoofer never participates; it is passed through by the renderer.

use crate::channels::ChannelLayout;
use crate::geometry::GeometrySnapshot;
use crate::math::{bearing_of, turns_to_radians, wrap_angle};

/// Row sums below this trigger the uniform fallback. A Gaussian is strictly
/// positive in exact arithmetic, but an extreme spread can underflow every
/// entry of a row to zero in f32.
const ROW_SUM_FLOOR: f32 = f32::MIN_POSITIVE;

pub struct RotationMixer {
    spread: f32,
    /// Channel index per virtual slot / matrix column, from the layout.
    angular_order: Vec<usize>,
    /// Canonical virtual-channel angles, fixed at construction.
    virtual_angles: Vec<f32>,
    /// Speaker bearings for the current block, rebuilt with the matrix.
    real_bearings: Vec<f32>,
    /// Row-major `S × S` weight matrix, reused every block.
    weights: Vec<f32>,
}

impl RotationMixer {
    /// Allocates the mixer's scratch for the given layout. No further
    /// allocation happens after construction.
    pub fn new(layout: &ChannelLayout, spread: f32) -> Self {
        let s = layout.directional_channels();
        let virtual_angles = (0..s).map(|slot| layout.virtual_angle(slot)).collect();
        Self {
            spread,
            angular_order: layout.angular_order().to_vec(),
            virtual_angles,
            real_bearings: vec![0.0; s],
            weights: vec![0.0; s * s],
        }
    }

    /// Number of directional channels S (matrix dimension).
    pub fn directional_channels(&self) -> usize {
        self.angular_order.len()
    }

    /// Channel indices in virtual-slot order; row `v` draws its input from
    /// channel `angular_order()[v]` and column `r` feeds channel
    /// `angular_order()[r]`.
    pub fn angular_order(&self) -> &[usize] {
        &self.angular_order
    }

    /// Weight of virtual slot `v` on real speaker column `r`.
    #[inline]
    pub fn weight(&self, v: usize, r: usize) -> f32 {
        self.weights[v * self.angular_order.len() + r]
    }

    /// Row `v` of the weight matrix.
    #[inline]
    pub fn row(&self, v: usize) -> &[f32] {
        let s = self.angular_order.len();
        &self.weights[v * s..(v + 1) * s]
    }

    /// Rebuilds the matrix for the current speaker positions and yaw.
    ///
    /// Depends only on those two inputs, so it runs once per block. Bounded
    /// time, no allocation.
    pub fn rebuild(&mut self, snap: &GeometrySnapshot) {
        let s = self.angular_order.len();
        let yaw_radians = turns_to_radians(snap.yaw);
        let inv_two_sigma_sq = 1.0 / (2.0 * self.spread * self.spread);

        for (bearing, &channel) in self.real_bearings.iter_mut().zip(&self.angular_order) {
            *bearing = bearing_of(snap.speakers[channel]);
        }

        for v in 0..s {
            let rotated = wrap_angle(self.virtual_angles[v] - yaw_radians);
            let row = &mut self.weights[v * s..(v + 1) * s];

            let mut sum = 0.0f32;
            for (w, &bearing) in row.iter_mut().zip(&self.real_bearings) {
                let d = wrap_angle(rotated - bearing);
                *w = (-d * d * inv_two_sigma_sq).exp();
                sum += *w;
            }

            if sum > ROW_SUM_FLOOR {
                let inv = 1.0 / sum;
                for w in row.iter_mut() {
                    *w *= inv;
                }
            } else {
                // Every entry underflowed; spread the energy evenly rather
                // than emit a zero row.
                let uniform = 1.0 / s as f32;
                row.fill(uniform);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{ChannelLayout, ChannelRole};
    use crate::geometry::{GeometrySnapshot, RoomBounds, SharedGeometry};
    use crate::math::Point;

    const SPREAD: f32 = 0.7;

    fn snapshot_for(layout: &ChannelLayout, yaw: f32) -> GeometrySnapshot {
        let shared = SharedGeometry::new(layout, RoomBounds::default());
        shared.set_listener_yaw(yaw);
        let mut snap = GeometrySnapshot::new(layout.channels());
        shared.load_into(&mut snap);
        snap
    }

    fn assert_rows_sum_to_one(mixer: &RotationMixer) {
        for v in 0..mixer.directional_channels() {
            let sum: f32 = mixer.row(v).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "row {} sums to {}", v, sum);
        }
    }

    #[test]
    fn test_rows_sum_to_one_across_yaws() {
        let layout = ChannelLayout::five_one();
        let mut mixer = RotationMixer::new(&layout, SPREAD);
        for i in 0..50 {
            let snap = snapshot_for(&layout, i as f32 * 0.02);
            mixer.rebuild(&snap);
            assert_rows_sum_to_one(&mixer);
        }
    }

    #[test]
    fn test_rows_sum_to_one_with_moved_speakers() {
        let layout = ChannelLayout::five_one();
        let shared = SharedGeometry::new(&layout, RoomBounds::default());
        shared.set_speaker_position(0, Point::new(-0.3, 0.1));
        shared.set_speaker_position(3, Point::new(5.0, -5.0));
        shared.set_listener_yaw(0.37);
        let mut snap = GeometrySnapshot::new(layout.channels());
        shared.load_into(&mut snap);

        let mut mixer = RotationMixer::new(&layout, SPREAD);
        mixer.rebuild(&snap);
        assert_rows_sum_to_one(&mixer);
    }

    #[test]
    fn test_yaw_periodicity_is_exact() {
        let layout = ChannelLayout::five_one();
        let mut mixer_a = RotationMixer::new(&layout, SPREAD);
        let mut mixer_b = RotationMixer::new(&layout, SPREAD);

        // Yaws chosen so that yaw + 1.0 is exact in f32 and wraps back to
        // the identical value.
        for &yaw in &[0.0f32, 0.25, 0.375, 0.5, 0.75] {
            mixer_a.rebuild(&snapshot_for(&layout, yaw));
            // One full extra turn must wrap to the identical yaw value.
            mixer_b.rebuild(&snapshot_for(&layout, yaw + 1.0));
            for v in 0..5 {
                assert_eq!(mixer_a.row(v), mixer_b.row(v), "yaw {} not periodic", yaw);
            }
        }
    }

    #[test]
    fn test_pentagon_rows_peak_on_colocated_speaker() {
        // Default pentagon: each speaker sits exactly on its virtual angle.
        // A tight spread pins ≥0.9 of each row on the co-located speaker.
        let layout = ChannelLayout::five_one();
        let mut mixer = RotationMixer::new(&layout, 0.4);
        mixer.rebuild(&snapshot_for(&layout, 0.0));
        for v in 0..5 {
            assert!(
                mixer.weight(v, v) >= 0.9,
                "row {} peak {} below 0.9",
                v,
                mixer.weight(v, v)
            );
        }
    }

    #[test]
    fn test_pentagon_default_spread_peaks_in_place() {
        let layout = ChannelLayout::five_one();
        let mut mixer = RotationMixer::new(&layout, SPREAD);
        mixer.rebuild(&snapshot_for(&layout, 0.0));
        for v in 0..5 {
            let row = mixer.row(v);
            let argmax = (0..5).max_by(|&a, &b| row[a].total_cmp(&row[b])).unwrap();
            assert_eq!(argmax, v);
        }
    }

    #[test]
    fn test_fifth_turn_cyclically_shifts_rows() {
        // Rotating the listener by one virtual-channel step (1/S turn) maps
        // each row onto the next slot's row.
        let layout = ChannelLayout::five_one();
        let mut at_rest = RotationMixer::new(&layout, SPREAD);
        let mut turned = RotationMixer::new(&layout, SPREAD);
        at_rest.rebuild(&snapshot_for(&layout, 0.0));
        turned.rebuild(&snapshot_for(&layout, 0.2));
        for v in 0..5 {
            let shifted = at_rest.row((v + 1) % 5);
            for (a, b) in turned.row(v).iter().zip(shifted) {
                assert!((a - b).abs() < 1e-4, "row {}: {} vs {}", v, a, b);
            }
        }
    }

    #[test]
    fn test_half_turn_moves_centre_to_back_pair() {
        let layout = ChannelLayout::five_one();
        let mut mixer = RotationMixer::new(&layout, SPREAD);
        mixer.rebuild(&snapshot_for(&layout, 0.5));

        // Virtual slot 0 is Centre; facing backwards its energy must land
        // almost entirely on the back pair, split evenly.
        let order = mixer.angular_order().to_vec();
        let col_of = |role: ChannelRole| {
            let ch = layout.index_of(role).unwrap();
            order.iter().position(|&c| c == ch).unwrap()
        };
        let bl = mixer.weight(0, col_of(ChannelRole::BackLeft));
        let br = mixer.weight(0, col_of(ChannelRole::BackRight));
        assert!(bl + br >= 0.9, "back pair got {}", bl + br);
        assert!((bl - br).abs() < 1e-4);
    }

    #[test]
    fn test_stereo_half_turn_swaps_rows_exactly() {
        let layout = ChannelLayout::stereo();
        let mut at_rest = RotationMixer::new(&layout, SPREAD);
        let mut turned = RotationMixer::new(&layout, SPREAD);
        at_rest.rebuild(&snapshot_for(&layout, 0.0));
        turned.rebuild(&snapshot_for(&layout, 0.5));
        assert_eq!(turned.row(0), at_rest.row(1));
        assert_eq!(turned.row(1), at_rest.row(0));
    }

    #[test]
    fn test_coincident_speakers_split_evenly() {
        let layout = ChannelLayout::five_one();
        let shared = SharedGeometry::new(&layout, RoomBounds::default());
        // Park BackLeft on top of BackRight.
        let br = layout.index_of(ChannelRole::BackRight).unwrap();
        let bl = layout.index_of(ChannelRole::BackLeft).unwrap();
        shared.set_speaker_position(bl, shared.speaker_position(br));
        let mut snap = GeometrySnapshot::new(layout.channels());
        shared.load_into(&mut snap);

        let mut mixer = RotationMixer::new(&layout, SPREAD);
        mixer.rebuild(&snap);
        assert_rows_sum_to_one(&mixer);

        let order = mixer.angular_order().to_vec();
        let bl_col = order.iter().position(|&c| c == bl).unwrap();
        let br_col = order.iter().position(|&c| c == br).unwrap();
        for v in 0..5 {
            let diff = (mixer.weight(v, bl_col) - mixer.weight(v, br_col)).abs();
            assert!(diff < 1e-5, "row {} split unevenly by {}", v, diff);
        }
    }

    #[test]
    fn test_extreme_spread_falls_back_to_uniform() {
        // Park both stereo speakers dead ahead so the rear-facing virtual
        // slot underflows to an all-zero row at a tiny spread.
        let layout = ChannelLayout::stereo();
        let shared = SharedGeometry::new(&layout, RoomBounds::default());
        shared.set_speaker_position(0, Point::new(0.0, 2.0));
        shared.set_speaker_position(1, Point::new(0.0, 2.0));
        let mut snap = GeometrySnapshot::new(layout.channels());
        shared.load_into(&mut snap);

        let mut mixer = RotationMixer::new(&layout, 1e-4);
        mixer.rebuild(&snap);
        assert_rows_sum_to_one(&mixer);
        assert_eq!(mixer.row(1), &[0.5, 0.5]);
    }
}
