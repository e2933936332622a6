//! Channel roles and compiled-in speaker layout presets.
//!
//! A layout fixes the engine's channel count for its whole lifetime. The
//! interleave position of each role is carried in an explicit role table
//! rather than derived from enum ordinals, so the wire order of a preset
//! (e.g. the 5.1 order FL, FR, BL, BR, Centre, Sub) is stated in one place.

use crate::error::{Result, SoundstageError};
use crate::math::{Point, point_at_bearing};
use std::f32::consts::TAU;
use std::fmt;

/// Directional role of one output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
    Centre,
    Subwoofer,
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelRole::FrontLeft => "FrontLeft",
            ChannelRole::FrontRight => "FrontRight",
            ChannelRole::BackLeft => "BackLeft",
            ChannelRole::BackRight => "BackRight",
            ChannelRole::Centre => "Centre",
            ChannelRole::Subwoofer => "Subwoofer",
        };
        f.write_str(name)
    }
}

/// Interleave order of the 6-channel preset.
const FIVE_ONE_ROLES: [ChannelRole; 6] = [
    ChannelRole::FrontLeft,
    ChannelRole::FrontRight,
    ChannelRole::BackLeft,
    ChannelRole::BackRight,
    ChannelRole::Centre,
    ChannelRole::Subwoofer,
];

const STEREO_ROLES: [ChannelRole; 2] = [ChannelRole::FrontLeft, ChannelRole::FrontRight];

/// Radius of the default pentagon speaker ring, in metres.
pub const DEFAULT_RING_RADIUS: f32 = 2.0;

/// A fixed, ordered speaker layout: one role and one default position per
/// output channel.
///
/// The angular order lists the non-subwoofer channels in the order their
/// canonical virtual angles are assigned (Centre first, then successive
/// −(360/S)° steps), which is the row order of the rotation mixer.
#[derive(Debug, Clone)]
pub struct ChannelLayout {
    roles: Vec<ChannelRole>,
    default_positions: Vec<Point>,
    angular_order: Vec<usize>,
    subwoofer: Option<usize>,
}

impl ChannelLayout {
    /// 2-channel stereo: FrontLeft, FrontRight. No subwoofer.
    pub fn stereo() -> Self {
        let angular_order = vec![0, 1];
        let default_positions = vec![Point::new(-1.5, 1.5), Point::new(1.5, 1.5)];
        Self {
            roles: STEREO_ROLES.to_vec(),
            default_positions,
            angular_order,
            subwoofer: None,
        }
    }

    /// 6-channel pentagon-plus-LFE in the interleave order
    /// FL, FR, BL, BR, Centre, Subwoofer.
    ///
    /// The five directional speakers default to a regular pentagon of radius
    /// [`DEFAULT_RING_RADIUS`] with Centre straight ahead; the subwoofer sits
    /// at the origin (its position never affects the audio).
    pub fn five_one() -> Self {
        let roles = FIVE_ONE_ROLES.to_vec();
        // Virtual slot order: Centre, then clockwise in −72° steps.
        let angular_order: Vec<usize> = [
            ChannelRole::Centre,
            ChannelRole::FrontRight,
            ChannelRole::BackRight,
            ChannelRole::BackLeft,
            ChannelRole::FrontLeft,
        ]
        .iter()
        .map(|role| roles.iter().position(|r| r == role).unwrap())
        .collect();

        let step = -(TAU / 5.0);
        let mut default_positions = vec![Point::ZERO; roles.len()];
        for (slot, &ch) in angular_order.iter().enumerate() {
            default_positions[ch] = point_at_bearing(slot as f32 * step, DEFAULT_RING_RADIUS);
        }
        // Subwoofer stays at the origin.

        Self {
            roles,
            default_positions,
            angular_order,
            subwoofer: Some(5),
        }
    }

    /// Returns the preset for a supported channel count, or a configuration
    /// error for anything else. The engine never runs partially initialized.
    pub fn for_channel_count(channels: u16) -> Result<Self> {
        match channels {
            2 => Ok(Self::stereo()),
            6 => Ok(Self::five_one()),
            other => Err(SoundstageError::Configuration(format!(
                "Unsupported channel count {} (supported: 2, 6)",
                other
            ))),
        }
    }

    /// Number of output channels N.
    pub fn channels(&self) -> usize {
        self.roles.len()
    }

    /// Roles in interleave order.
    pub fn roles(&self) -> &[ChannelRole] {
        &self.roles
    }

    /// Default speaker positions in interleave order.
    pub fn default_positions(&self) -> &[Point] {
        &self.default_positions
    }

    /// Interleave index of a role, looked up in the role table.
    pub fn index_of(&self, role: ChannelRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == role)
    }

    /// Interleave index of the subwoofer channel, if the layout has one.
    pub fn subwoofer_index(&self) -> Option<usize> {
        self.subwoofer
    }

    /// Channel indices participating in angular panning, in virtual-slot
    /// order (Centre at slot 0 for the 5.1 preset).
    pub fn angular_order(&self) -> &[usize] {
        &self.angular_order
    }

    /// Number of directional (non-subwoofer) channels S.
    pub fn directional_channels(&self) -> usize {
        self.angular_order.len()
    }

    /// Canonical virtual-channel angle for a virtual slot, in radians.
    ///
    /// Slots are evenly spaced around the circle in −(2π/S) steps starting
    /// from the forward direction. Independent of actual speaker placement.
    pub fn virtual_angle(&self, slot: usize) -> f32 {
        let s = self.directional_channels() as f32;
        crate::math::wrap_angle(-(slot as f32) * TAU / s)
    }
}
