//! Asexual division.
//!
//! A creature splits its area in two: it keeps one half and moves forward by
//! the new radius, the child takes the other half mirrored behind it and faces
//! the opposite way. Both continue with independently mutated copies of the
//! pre-division genome.

use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::contacts::CircleId;
use super::neat::InnovationLedger;
use super::organism::Organism;
use super::params::Params;

/// Returns `true` if the creature holds more than twice the minimum area.
pub fn can_divide(organism: &Organism, params: &Params) -> bool {
    organism.area() > 2.0 * params.minimum_area
}

/// Divides `parent`, returning the child.
///
/// Returns `None` and leaves the parent untouched when either half would not
/// exceed `params.minimum_area`.
pub fn divide<R: Rng + ?Sized>(
    parent: &mut Organism,
    child_id: CircleId,
    ledger: &mut InnovationLedger,
    params: &Params,
    sim_time: f32,
    rng: &mut R,
) -> Option<Organism> {
    if !can_divide(parent, params) {
        return None;
    }
    let half_area = 0.5 * parent.area();
    if half_area <= params.minimum_area {
        return None;
    }

    let brain = parent.brain.clone();
    let next_generation = parent.generation + 1;
    let origin = parent.pos;

    parent.set_area(half_area);
    let offset = parent.forward() * parent.radius;
    parent.pos = origin + offset;

    let mut child = Organism::new(
        child_id,
        origin - offset,
        parent.rot + PI,
        half_area,
        brain,
        params,
        parent.creation_time,
    );
    child.signal = parent.signal;

    parent.generation = next_generation;
    child.generation = next_generation;
    parent.last_division_time = sim_time;
    child.last_division_time = sim_time;

    for _ in 0..params.mutation_rounds {
        parent.brain.mutate(ledger, &params.reproduction_mutation, rng);
        child.brain.mutate(ledger, &params.reproduction_mutation, rng);
    }

    parent.apply_forward_impulse(params);
    child.apply_forward_impulse(params);

    log::debug!(
        "creature {:?} divided into {:?} (generation {}, area {:.3} each)",
        parent.id,
        child.id,
        next_generation,
        half_area
    );
    Some(child)
}

/// Running totals of births and deaths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleStats {
    /// Successful divisions.
    pub divisions: u64,
    /// Creatures eaten by other creatures.
    pub eaten: u64,
    /// Deaths by poison.
    pub poisoned: u64,
    /// Deaths by inactivity.
    pub starved: u64,
    /// Bodies that left the dish.
    pub escaped: u64,
    /// Highest generation reached.
    pub max_generation: u32,
}

impl LifecycleStats {
    /// Records a successful division.
    pub fn record_division(&mut self, generation: u32) {
        self.divisions += 1;
        self.max_generation = self.max_generation.max(generation);
    }

    /// Total creature deaths.
    pub fn deaths(&self) -> u64 {
        self.eaten + self.poisoned + self.starved + self.escaped
    }
}
