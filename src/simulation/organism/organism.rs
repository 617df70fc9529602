//! Creature state and lifecycle.

use geo::Coord;
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::super::contacts::{CircleEntry, CircleId, EdibleKind, EdibleProfile, SenseProfile};
use super::super::geometric_utils::{circle_area, heading_vector, radius_from_area};
use super::super::locatable::{Damping, Locatable};
use super::super::neat::{Genome, InnovationLedger};
use super::super::params::Params;

/// Speed under which a creature counts as idle.
const IDLE_SPEED: f32 = 1e-3;

/// A circular creature driven by a NEAT genome.
///
/// Creatures:
/// - sense touching circles and the dish rim through color sectors
/// - boost to move and turn, shedding a bit of area each time
/// - eat smaller circles and grow
/// - divide into two independently mutating lineages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    /// Stable identifier.
    pub id: CircleId,
    /// Center in world space.
    pub pos: Coord<f32>,
    /// Heading in radians.
    pub rot: f32,
    /// Linear velocity.
    pub vel: Coord<f32>,
    /// Angular velocity.
    pub angular_vel: f32,
    /// Disc radius.
    pub radius: f32,
    /// Velocity decay.
    pub damping: Damping,
    /// Signal color shown to other creatures' sensors.
    pub signal: [f32; 3],
    /// Memory written by the last behavior tick.
    pub memory: Array1<f32>,
    /// Network that controls behavior.
    pub brain: Genome,
    /// Number of divisions since the lineage was founded.
    pub generation: u32,
    /// Simulation time the lineage was founded; survives divisions.
    pub creation_time: f32,
    /// Simulation time of the last division.
    pub last_division_time: f32,
    /// Seconds spent without moving.
    pub inactivity_timer: f32,
    /// Cleared when the creature is eaten or dies.
    pub alive: bool,
}

impl Organism {
    /// Creates a creature around an existing genome.
    pub fn new(
        id: CircleId,
        pos: Coord<f32>,
        rot: f32,
        area: f32,
        brain: Genome,
        params: &Params,
        sim_time: f32,
    ) -> Self {
        Self {
            id,
            pos,
            rot,
            vel: Coord { x: 0.0, y: 0.0 },
            angular_vel: 0.0,
            radius: radius_from_area(area),
            damping: Damping {
                linear: params.linear_damping,
                angular: params.angular_damping,
            },
            signal: [0.0; 3],
            memory: Array1::zeros(params.memory_slots),
            brain,
            generation: 0,
            creation_time: sim_time,
            last_division_time: sim_time,
            inactivity_timer: 0.0,
            alive: true,
        }
    }

    /// Creates a creature with a new, fully connected genome seeded by
    /// `params.init_mutation_rounds` mutation rounds.
    pub fn new_random<R: Rng + ?Sized>(
        id: CircleId,
        pos: Coord<f32>,
        rot: f32,
        params: &Params,
        ledger: &mut InnovationLedger,
        rng: &mut R,
        sim_time: f32,
    ) -> Self {
        let mut brain = Genome::new(
            params.brain_inputs(),
            params.brain_outputs(),
            ledger,
            params.weight_init_scale,
            true,
            rng,
        );
        for _ in 0..params.init_mutation_rounds {
            brain.mutate(ledger, &params.init_mutation, rng);
        }
        Self::new(id, pos, rot, params.creature_area, brain, params, sim_time)
    }

    /// Disc area.
    pub fn area(&self) -> f32 {
        circle_area(self.radius)
    }

    /// Resizes the disc to the given area.
    pub fn set_area(&mut self, area: f32) {
        self.radius = radius_from_area(area);
    }

    /// Adds area, e.g. after eating.
    pub fn grow_by_area(&mut self, area: f32) {
        self.set_area(self.area() + area);
    }

    /// Mass used to turn impulses into velocity changes.
    pub fn mass(&self, density: f32) -> f32 {
        (self.area() * density).max(f32::EPSILON)
    }

    /// Returns `true` until the creature is eaten or dies.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the creature dead.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Time since the lineage was founded.
    pub fn lineage_age(&self, now: f32) -> f32 {
        now - self.creation_time
    }

    /// Time since the last division.
    pub fn time_since_division(&self, now: f32) -> f32 {
        now - self.last_division_time
    }

    /// Capabilities advertised to the registry; dead creatures cannot be eaten.
    pub fn registry_entry(&self) -> CircleEntry {
        CircleEntry {
            senseable: Some(SenseProfile {
                pos: self.pos,
                radius: self.radius,
                color: self.signal,
            }),
            edible: self.alive.then_some(EdibleProfile {
                area: self.area(),
                kind: EdibleKind::Creature,
            }),
        }
    }

    /// Unit vector along the heading.
    pub fn forward(&self) -> Coord<f32> {
        heading_vector(self.rot)
    }

    /// Pushes the creature along its heading.
    pub fn apply_forward_impulse(&mut self, params: &Params) {
        let mass = self.mass(params.circle_density);
        self.vel = self.vel + self.forward() * (params.linear_impulse_magnitude / mass);
        self.inactivity_timer = 0.0;
    }

    /// Pushes the creature forward and spins it; positive `turn` turns left.
    pub fn apply_turning_impulse(&mut self, params: &Params, turn: f32) {
        self.apply_forward_impulse(params);
        let mass = self.mass(params.circle_density);
        self.angular_vel += turn * params.angular_impulse_magnitude / mass;
    }

    /// Advances the idle timer; returns `true` when the creature just timed out.
    ///
    /// A non-positive `timeout` disables the check.
    pub fn update_inactivity(&mut self, dt: f32, timeout: f32) -> bool {
        if dt <= 0.0 {
            return false;
        }
        let moving = self.vel.x.abs() > IDLE_SPEED || self.vel.y.abs() > IDLE_SPEED;
        if moving || timeout <= 0.0 {
            self.inactivity_timer = 0.0;
            return false;
        }
        self.inactivity_timer += dt;
        if self.inactivity_timer >= timeout && self.alive {
            self.inactivity_timer = 0.0;
            return true;
        }
        false
    }
}

impl Locatable for Organism {
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
        self.rot += self.angular_vel * dt;
        self.vel = self.vel * Damping::decay(self.damping.linear, dt);
        self.angular_vel *= Damping::decay(self.damping.angular, dt);
    }
}
