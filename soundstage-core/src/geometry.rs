//! Shared geometry state: room bounds, listener pose, speaker positions.
//!
//! The control actor is the single writer and the render callback the single
//! reader. Every scalar lives in an `AtomicU32` holding f32 bits and is
//! accessed with relaxed ordering; the callback loads the whole set once per
//! block into a pre-allocated [`GeometrySnapshot`], so it never takes a lock
//! and never allocates.

use crate::channels::ChannelLayout;
use crate::math::{Point, wrap_turns};
use std::sync::atomic::{AtomicU32, Ordering};

/// Axis-aligned rectangle the listener moves in, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBounds {
    pub min: Point,
    pub max: Point,
}

impl RoomBounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn centre(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    /// The four corners, the evaluation points for the max-gain constant.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min.x, self.min.y),
            Point::new(self.min.x, self.max.y),
            Point::new(self.max.x, self.min.y),
            Point::new(self.max.x, self.max.y),
        ]
    }

    pub fn is_degenerate(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}

impl Default for RoomBounds {
    fn default() -> Self {
        Self {
            min: Point::new(-2.5, -2.5),
            max: Point::new(2.5, 2.5),
        }
    }
}

struct AtomicPoint {
    x: AtomicU32,
    y: AtomicU32,
}

impl AtomicPoint {
    fn new(p: Point) -> Self {
        Self {
            x: AtomicU32::new(p.x.to_bits()),
            y: AtomicU32::new(p.y.to_bits()),
        }
    }

    fn store(&self, p: Point) {
        self.x.store(p.x.to_bits(), Ordering::Relaxed);
        self.y.store(p.y.to_bits(), Ordering::Relaxed);
    }

    fn load(&self) -> Point {
        Point::new(
            f32::from_bits(self.x.load(Ordering::Relaxed)),
            f32::from_bits(self.y.load(Ordering::Relaxed)),
        )
    }
}

/// Lock-free geometry shared between the control and render actors.
///
/// Also carries the per-channel gain snapshot flowing the other way: the
/// render callback stores the gains it applied to each block and the control
/// side reads them for visualization only.
pub struct SharedGeometry {
    listener: AtomicPoint,
    listener_yaw: AtomicU32,
    speakers: Vec<AtomicPoint>,
    bounds_min: AtomicPoint,
    bounds_max: AtomicPoint,
    max_gain: AtomicU32,
    channel_gains: Vec<AtomicU32>,
}

impl SharedGeometry {
    /// Builds the shared state from a layout's default speaker positions,
    /// with the listener at the room centre facing forward.
    pub fn new(layout: &ChannelLayout, room: RoomBounds) -> Self {
        let speakers = layout
            .default_positions()
            .iter()
            .map(|p| AtomicPoint::new(*p))
            .collect();
        let channel_gains = (0..layout.channels())
            .map(|_| AtomicU32::new(0.0f32.to_bits()))
            .collect();
        Self {
            listener: AtomicPoint::new(room.centre()),
            listener_yaw: AtomicU32::new(0.0f32.to_bits()),
            speakers,
            bounds_min: AtomicPoint::new(room.min),
            bounds_max: AtomicPoint::new(room.max),
            max_gain: AtomicU32::new(1.0f32.to_bits()),
            channel_gains,
        }
    }

    pub fn channels(&self) -> usize {
        self.speakers.len()
    }

    pub fn set_listener_position(&self, p: Point) {
        self.listener.store(p);
    }

    pub fn listener_position(&self) -> Point {
        self.listener.load()
    }

    /// Stores the listener yaw, wrapped into [0, 1).
    pub fn set_listener_yaw(&self, turns: f32) {
        self.listener_yaw
            .store(wrap_turns(turns).to_bits(), Ordering::Relaxed);
    }

    pub fn listener_yaw(&self) -> f32 {
        f32::from_bits(self.listener_yaw.load(Ordering::Relaxed))
    }

    /// Stores one speaker position. The caller (control actor) must follow
    /// up with [`store_max_gain`](Self::store_max_gain); a stale max gain
    /// after a speaker move is a correctness bug.
    pub fn set_speaker_position(&self, channel: usize, p: Point) {
        self.speakers[channel].store(p);
    }

    pub fn speaker_position(&self, channel: usize) -> Point {
        self.speakers[channel].load()
    }

    pub fn set_bounds(&self, room: RoomBounds) {
        self.bounds_min.store(room.min);
        self.bounds_max.store(room.max);
    }

    pub fn bounds(&self) -> RoomBounds {
        RoomBounds {
            min: self.bounds_min.load(),
            max: self.bounds_max.load(),
        }
    }

    pub fn store_max_gain(&self, max_gain: f32) {
        self.max_gain.store(max_gain.to_bits(), Ordering::Relaxed);
    }

    pub fn max_gain(&self) -> f32 {
        f32::from_bits(self.max_gain.load(Ordering::Relaxed))
    }

    /// Render-side: record the normalized gain applied to one channel this
    /// block. Observability only.
    pub fn store_channel_gain(&self, channel: usize, gain: f32) {
        self.channel_gains[channel].store(gain.to_bits(), Ordering::Relaxed);
    }

    /// Control-side: copy the last-block gains into `out`.
    pub fn load_channel_gains(&self, out: &mut [f32]) {
        for (slot, gain) in out.iter_mut().zip(&self.channel_gains) {
            *slot = f32::from_bits(gain.load(Ordering::Relaxed));
        }
    }

    /// Loads every field into a pre-allocated snapshot. Called once at the
    /// start of each render block; does not allocate.
    pub fn load_into(&self, snap: &mut GeometrySnapshot) {
        debug_assert_eq!(snap.speakers.len(), self.speakers.len());
        snap.listener = self.listener.load();
        snap.yaw = self.listener_yaw();
        for (slot, speaker) in snap.speakers.iter_mut().zip(&self.speakers) {
            *slot = speaker.load();
        }
        snap.bounds = self.bounds();
        snap.max_gain = self.max_gain();
    }
}

/// One block's view of the geometry, owned by the render actor and refilled
/// in place every block.
#[derive(Debug, Clone)]
pub struct GeometrySnapshot {
    pub listener: Point,
    /// Turn fraction in [0, 1).
    pub yaw: f32,
    /// Speaker positions in interleave order; length N, fixed.
    pub speakers: Vec<Point>,
    pub bounds: RoomBounds,
    pub max_gain: f32,
}

impl GeometrySnapshot {
    pub fn new(channels: usize) -> Self {
        Self {
            listener: Point::ZERO,
            yaw: 0.0,
            speakers: vec![Point::ZERO; channels],
            bounds: RoomBounds::default(),
            max_gain: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_defaults_to_room_centre() {
        let layout = ChannelLayout::five_one();
        let room = RoomBounds::new(Point::new(0.0, 0.0), Point::new(4.0, 2.0));
        let shared = SharedGeometry::new(&layout, room);
        assert_eq!(shared.listener_position(), Point::new(2.0, 1.0));
    }

    #[test]
    fn test_yaw_wraps_into_unit_interval() {
        let layout = ChannelLayout::stereo();
        let shared = SharedGeometry::new(&layout, RoomBounds::default());
        shared.set_listener_yaw(1.25);
        assert_eq!(shared.listener_yaw(), 0.25);
        shared.set_listener_yaw(-0.25);
        assert_eq!(shared.listener_yaw(), 0.75);
        shared.set_listener_yaw(1.0);
        assert_eq!(shared.listener_yaw(), 0.0);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let layout = ChannelLayout::five_one();
        let shared = SharedGeometry::new(&layout, RoomBounds::default());
        shared.set_listener_position(Point::new(1.0, -1.0));
        shared.set_listener_yaw(0.5);
        shared.set_speaker_position(2, Point::new(-3.0, 0.5));
        shared.store_max_gain(0.42);

        let mut snap = GeometrySnapshot::new(layout.channels());
        shared.load_into(&mut snap);
        assert_eq!(snap.listener, Point::new(1.0, -1.0));
        assert_eq!(snap.yaw, 0.5);
        assert_eq!(snap.speakers[2], Point::new(-3.0, 0.5));
        assert_eq!(snap.max_gain, 0.42);
    }

    #[test]
    fn test_channel_gain_snapshot() {
        let layout = ChannelLayout::stereo();
        let shared = SharedGeometry::new(&layout, RoomBounds::default());
        shared.store_channel_gain(0, 0.25);
        shared.store_channel_gain(1, 0.75);
        let mut gains = [0.0f32; 2];
        shared.load_channel_gains(&mut gains);
        assert_eq!(gains, [0.25, 0.75]);
    }

    #[test]
    fn test_degenerate_bounds() {
        let room = RoomBounds::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0));
        assert!(room.is_degenerate());
        assert!(!RoomBounds::default().is_degenerate());
    }
}
