//! Configuration for soundstage

use crate::channels::ChannelLayout;
use crate::geometry::RoomBounds;

/// Default Gaussian spread of the rotation mixer, in radians.
pub const DEFAULT_ROTATION_SPREAD: f32 = 0.7;

/// Reference distance of the distance→gain law, in metres.
pub const DEFAULT_REFERENCE_DISTANCE: f32 = 1.0;

/// Configuration descriptor for a soundstage engine.
#[derive(Debug, Clone)]
pub struct SoundstageDesc {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Frames rendered per callback invocation.
    pub block_size: usize,
    /// Speaker layout preset; fixes the channel count N for the engine's
    /// lifetime.
    pub layout: ChannelLayout,
    /// Axis-aligned room rectangle the listener moves in.
    pub room: RoomBounds,
    /// Gaussian spread σ of the rotation mixer, in radians. Smaller values
    /// pin each virtual channel harder to its nearest speaker.
    pub rotation_spread: f32,
    /// Reference distance of the distance→gain law, in metres.
    pub reference_distance: f32,
}

impl Default for SoundstageDesc {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 256,
            layout: ChannelLayout::five_one(),
            room: RoomBounds::default(),
            rotation_spread: DEFAULT_ROTATION_SPREAD,
            reference_distance: DEFAULT_REFERENCE_DISTANCE,
        }
    }
}

impl SoundstageDesc {
    /// Validates the descriptor. The engine refuses to construct from an
    /// invalid one rather than run partially initialized.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.block_size == 0 {
            return Err(crate::error::SoundstageError::Configuration(
                "block_size must be non-zero".into(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(crate::error::SoundstageError::Configuration(
                "sample_rate must be non-zero".into(),
            ));
        }
        if !(self.rotation_spread > 0.0) {
            return Err(crate::error::SoundstageError::Configuration(
                "rotation_spread must be positive".into(),
            ));
        }
        if !(self.reference_distance > 0.0) {
            return Err(crate::error::SoundstageError::Configuration(
                "reference_distance must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Real-time period of one block, in seconds.
    pub fn block_period(&self) -> f64 {
        self.block_size as f64 / self.sample_rate as f64
    }
}
