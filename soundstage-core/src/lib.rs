//! soundstage-core: a real-time geometric panning engine.
//!
//! A fixed-count multichannel source is continuously re-panned across a
//! physically placed speaker layout according to a movable virtual
//! listener's position and facing direction. The control actor mutates the
//! geometry through [`SoundstageWorld`]; the render callback reads one
//! snapshot per block, rebuilds the rotation mixer, applies distance gains,
//! and hands the block to the output device.

pub mod channels;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod math;
pub mod render;
pub mod source;
pub mod spatial;
pub mod world;

pub use channels::{ChannelLayout, ChannelRole};
pub use config::SoundstageDesc;
pub use engine::SoundstageEngine;
pub use error::SoundstageError;
pub use events::SoundstageEvent;
pub use geometry::{GeometrySnapshot, RoomBounds, SharedGeometry};
pub use math::Point;
pub use render::BlockRenderer;
pub use source::{LoopingPcmSource, SourceProvider, TriangleWaveSource};
pub use spatial::RotationMixer;
pub use world::SoundstageWorld;
