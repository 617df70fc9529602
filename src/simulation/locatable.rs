//! Trait for bodies that have a position and drift over time.
//!
//! Bodies are integrated kinematically: velocity moves the center, heading
//! follows angular velocity, and both decay with per-body damping the same
//! way a rigid-body engine applies linear and angular damping.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Velocity decay rates, in fraction per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Damping {
    /// Linear damping.
    pub linear: f32,
    /// Angular damping.
    pub angular: f32,
}

impl Damping {
    /// Scales a velocity for one step of `dt` seconds.
    #[inline]
    pub fn decay(rate: f32, dt: f32) -> f32 {
        1.0 / (1.0 + dt * rate.max(0.0))
    }
}

/// Trait for circular bodies with a position that can be updated over time.
pub trait Locatable {
    /// Returns the body's center.
    fn pos(&self) -> Coord<f32>;

    /// Returns a mutable reference to the body's center.
    fn pos_mut(&mut self) -> &mut Coord<f32>;

    /// Disc radius.
    fn radius(&self) -> f32;

    /// Advances the body by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Whether the whole disc has left a dish of the given radius centered at the origin.
    fn is_outside(&self, petri_radius: f32) -> bool {
        let pos = self.pos();
        (pos.x * pos.x + pos.y * pos.y).sqrt() - self.radius() > petri_radius
    }
}
