//! Control-side API for a running soundstage.
//!
//! `SoundstageWorld` owns the shared geometry and is the single writer to
//! it: pointer drags, scripts, or a network feed all flow through these
//! methods while the render callback reads a snapshot once per block. Every
//! write that can change the worst-case attenuation (speaker moves, bounds
//! changes, resets) recomputes the max-gain constant before returning.

use crate::config::SoundstageDesc;
use crate::error::{Result, SoundstageError};
use crate::geometry::{RoomBounds, SharedGeometry};
use crate::math::Point;
use crate::spatial::gain::max_corner_gain;
use std::sync::Arc;

pub struct SoundstageWorld {
    desc: SoundstageDesc,
    geometry: Arc<SharedGeometry>,
}

impl SoundstageWorld {
    pub fn new(desc: SoundstageDesc) -> Result<Self> {
        desc.validate()?;
        let geometry = Arc::new(SharedGeometry::new(&desc.layout, desc.room));
        let world = Self { desc, geometry };
        world.recompute_max_gain();
        Ok(world)
    }

    pub fn desc(&self) -> &SoundstageDesc {
        &self.desc
    }

    pub fn channels(&self) -> usize {
        self.desc.channels()
    }

    /// Shared geometry handle for the render side.
    pub fn geometry(&self) -> Arc<SharedGeometry> {
        self.geometry.clone()
    }

    pub fn set_listener_position(&self, p: Point) {
        self.geometry.set_listener_position(p);
    }

    pub fn listener_position(&self) -> Point {
        self.geometry.listener_position()
    }

    /// Sets the listener facing direction as a turn fraction; any value is
    /// accepted and wrapped into [0, 1).
    pub fn set_listener_yaw(&self, turns: f32) {
        self.geometry.set_listener_yaw(turns);
    }

    pub fn listener_yaw(&self) -> f32 {
        self.geometry.listener_yaw()
    }

    pub fn set_speaker_position(&self, channel: usize, p: Point) -> Result<()> {
        if channel >= self.channels() {
            return Err(SoundstageError::Configuration(format!(
                "speaker index {} out of range for {} channels",
                channel,
                self.channels()
            )));
        }
        self.geometry.set_speaker_position(channel, p);
        self.recompute_max_gain();
        Ok(())
    }

    pub fn speaker_position(&self, channel: usize) -> Point {
        self.geometry.speaker_position(channel)
    }

    pub fn set_room_bounds(&self, room: RoomBounds) {
        self.geometry.set_bounds(room);
        self.recompute_max_gain();
    }

    pub fn room_bounds(&self) -> RoomBounds {
        self.geometry.bounds()
    }

    /// Restores the layout's default speaker positions and puts the
    /// listener back at the room centre facing forward.
    pub fn reset_to_defaults(&self) {
        for (channel, p) in self.desc.layout.default_positions().iter().enumerate() {
            self.geometry.set_speaker_position(channel, *p);
        }
        self.geometry.set_bounds(self.desc.room);
        self.geometry
            .set_listener_position(self.desc.room.centre());
        self.geometry.set_listener_yaw(0.0);
        self.recompute_max_gain();
    }

    /// Last-block per-channel gain snapshot, for visualization only.
    pub fn channel_gains(&self) -> Vec<f32> {
        let mut gains = vec![0.0f32; self.channels()];
        self.geometry.load_channel_gains(&mut gains);
        gains
    }

    fn recompute_max_gain(&self) {
        let speakers: Vec<Point> = (0..self.channels())
            .map(|c| self.geometry.speaker_position(c))
            .collect();
        let max_gain = max_corner_gain(
            &self.geometry.bounds(),
            &speakers,
            self.desc.reference_distance,
        );
        self.geometry.store_max_gain(max_gain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelLayout;

    #[test]
    fn test_world_starts_with_max_gain() {
        let world = SoundstageWorld::new(SoundstageDesc::default()).unwrap();
        assert!(world.geometry().max_gain() > 0.0);
    }

    #[test]
    fn test_speaker_move_refreshes_max_gain() {
        let world = SoundstageWorld::new(SoundstageDesc::default()).unwrap();
        let before = world.geometry().max_gain();
        // Drag a speaker onto a room corner; the worst-case constant must
        // follow immediately, not at the next reconfiguration.
        world
            .set_speaker_position(0, world.room_bounds().max)
            .unwrap();
        let after = world.geometry().max_gain();
        assert!(after > before);
    }

    #[test]
    fn test_bounds_change_refreshes_max_gain() {
        let world = SoundstageWorld::new(SoundstageDesc::default()).unwrap();
        let before = world.geometry().max_gain();
        world.set_room_bounds(RoomBounds::new(
            Point::new(-20.0, -20.0),
            Point::new(20.0, 20.0),
        ));
        assert_ne!(world.geometry().max_gain(), before);
    }

    #[test]
    fn test_speaker_index_out_of_range() {
        let desc = SoundstageDesc {
            layout: ChannelLayout::stereo(),
            ..Default::default()
        };
        let world = SoundstageWorld::new(desc).unwrap();
        assert!(world.set_speaker_position(2, Point::ZERO).is_err());
        assert!(world.set_speaker_position(1, Point::ZERO).is_ok());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let world = SoundstageWorld::new(SoundstageDesc::default()).unwrap();
        world.set_listener_position(Point::new(2.0, -1.0));
        world.set_listener_yaw(0.6);
        world
            .set_speaker_position(1, world.desc().room.min)
            .unwrap();
        let max_gain_moved = world.geometry().max_gain();

        world.reset_to_defaults();
        assert_eq!(world.listener_position(), world.desc().room.centre());
        assert_eq!(world.listener_yaw(), 0.0);
        assert_eq!(
            world.speaker_position(1),
            world.desc().layout.default_positions()[1]
        );
        assert_ne!(world.geometry().max_gain(), max_gain_moved);
    }

    #[test]
    fn test_invalid_desc_rejected() {
        let desc = SoundstageDesc {
            block_size: 0,
            ..Default::default()
        };
        assert!(SoundstageWorld::new(desc).is_err());
    }
}
