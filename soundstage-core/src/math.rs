//! Math types and angle helpers for soundstage

use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub use glam::Vec2;

/// A room-relative position in metres.
pub type Point = Vec2;

/// Wraps an angle in radians into the half-open interval (−π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Converts a turn fraction (1.0 = one full revolution) to radians.
pub fn turns_to_radians(turns: f32) -> f32 {
    turns * TAU
}

/// Wraps a turn fraction into [0, 1).
pub fn wrap_turns(turns: f32) -> f32 {
    let t = turns.rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 for tiny negative inputs
    if t >= 1.0 { 0.0 } else { t }
}

/// Bearing angle of a point as seen from the room origin.
///
/// Bearings are measured against the canonical "forward" direction (+Y),
/// so a point straight ahead has bearing 0 and a point to the listener's
/// left (−X side is +π/2 territory) wraps into (−π, π].
pub fn bearing_of(p: Point) -> f32 {
    wrap_angle(p.y.atan2(p.x) - FRAC_PI_2)
}

/// Returns the point at the given bearing and radius from the origin.
///
/// Inverse of [`bearing_of`] for points on the circle of that radius.
pub fn point_at_bearing(bearing: f32, radius: f32) -> Point {
    Point::new(-radius * bearing.sin(), radius * bearing.cos())
}

/// The point on a circle's circumference corresponding to a single-value
/// position in turns. Used by scripted listener motion.
pub fn circular_point(turns: f32, radius: f32) -> Point {
    let angle = turns * TAU;
    Point::new(radius * angle.cos(), radius * angle.sin())
}
