//! Pellets that creatures can eat.
//!
//! Pellets are either sprinkled into the dish (food, toxic, division) or
//! ejected by a creature's boost, in which case they carry its signal color.

use std::f32::consts::TAU;

use geo::Coord;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::contacts::{CircleEntry, CircleId, EdibleKind, EdibleProfile, SenseProfile};
use super::geometric_utils::{circle_area, radius_from_area};
use super::locatable::{Damping, Locatable};

/// Display and sensed color of a sprinkled pellet.
pub fn pellet_color(kind: EdibleKind) -> [f32; 3] {
    match kind {
        EdibleKind::Food => [0.0, 1.0, 0.0],
        EdibleKind::Toxic => [1.0, 0.0, 0.0],
        EdibleKind::Division => [0.0, 0.0, 1.0],
        EdibleKind::BoostParticle | EdibleKind::Creature => [1.0, 1.0, 1.0],
    }
}

/// A passive edible circle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pellet {
    /// Stable identifier.
    pub id: CircleId,
    /// Center in world space.
    pub pos: Coord<f32>,
    /// Linear velocity.
    pub vel: Coord<f32>,
    /// Disc radius.
    pub radius: f32,
    /// Sensed color.
    pub color: [f32; 3],
    /// What eating it does.
    pub kind: EdibleKind,
    /// Velocity decay.
    pub damping: Damping,
    /// Set once a creature has eaten it.
    pub eaten: bool,
}

impl Pellet {
    /// Creates a resting pellet of the given kind and area.
    pub fn new(id: CircleId, pos: Coord<f32>, area: f32, kind: EdibleKind) -> Self {
        Self {
            id,
            pos,
            vel: Coord { x: 0.0, y: 0.0 },
            radius: radius_from_area(area),
            color: pellet_color(kind),
            kind,
            damping: Damping {
                linear: 0.0,
                angular: 0.0,
            },
            eaten: false,
        }
    }

    /// Creates a pellet at a uniformly random point of a dish of radius `petri_radius`.
    ///
    /// The whole disc lies inside the dish when it fits.
    pub fn new_random<R: Rng + ?Sized>(
        id: CircleId,
        petri_radius: f32,
        area: f32,
        kind: EdibleKind,
        rng: &mut R,
    ) -> Self {
        let radius = radius_from_area(area);
        let pos = random_point_in_disc((petri_radius - radius).max(0.0), rng);
        Self::new(id, pos, area, kind)
    }

    /// Creates a boost particle moving with `vel`.
    pub fn boost_particle(
        id: CircleId,
        pos: Coord<f32>,
        vel: Coord<f32>,
        area: f32,
        color: [f32; 3],
        linear_damping: f32,
    ) -> Self {
        Self {
            vel,
            color,
            damping: Damping {
                linear: linear_damping,
                angular: 0.0,
            },
            ..Self::new(id, pos, area, EdibleKind::BoostParticle)
        }
    }

    /// Disc area.
    pub fn area(&self) -> f32 {
        circle_area(self.radius)
    }

    /// Checks if this pellet has been eaten.
    pub fn is_eaten(&self) -> bool {
        self.eaten
    }

    /// Marks this pellet as eaten.
    pub fn consume(&mut self) {
        self.eaten = true;
    }

    /// Capabilities advertised to the registry.
    pub fn registry_entry(&self) -> CircleEntry {
        CircleEntry {
            senseable: Some(SenseProfile {
                pos: self.pos,
                radius: self.radius,
                color: self.color,
            }),
            edible: (!self.eaten).then_some(EdibleProfile {
                area: self.area(),
                kind: self.kind,
            }),
        }
    }
}

impl Locatable for Pellet {
    fn pos(&self) -> Coord<f32> {
        self.pos
    }

    fn pos_mut(&mut self) -> &mut Coord<f32> {
        &mut self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn update(&mut self, dt: f32) {
        self.pos = self.pos + self.vel * dt;
        self.vel = self.vel * Damping::decay(self.damping.linear, dt);
    }
}

/// Uniform point in a disc of the given radius centered at the origin.
pub fn random_point_in_disc<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Coord<f32> {
    let r = radius * rng.random::<f32>().sqrt();
    let theta = rng.random::<f32>() * TAU;
    Coord {
        x: r * theta.cos(),
        y: r * theta.sin(),
    }
}
