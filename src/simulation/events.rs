//! Deferred world changes.
//!
//! Creatures are processed one after another while the body lists are being
//! iterated, so spawns and deaths are queued as events and applied once the
//! per-creature pass is over.

use serde::{Deserialize, Serialize};

use super::contacts::CircleId;
use super::ecosystem::Ecosystem;
use super::food::Pellet;
use super::organism::Organism;

/// Why a creature died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Eaten by a larger creature.
    Eaten,
    /// Poisoned by something it ate.
    Poisoned,
    /// Did not move for too long.
    Inactivity,
    /// Drifted out of the dish.
    LeftDish,
}

/// Events that modify simulation state.
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    /// A division produced a new creature.
    CreatureSpawned(Box<Organism>),
    /// A boost ejected a particle.
    PelletSpawned(Pellet),
    /// A creature died and will be removed at cleanup.
    CreatureDied {
        /// The dead creature.
        id: CircleId,
        /// What killed it.
        cause: DeathCause,
    },
}

/// Receives bodies created while the world is being iterated.
pub trait SpawnSink {
    /// Queues a new creature.
    fn spawn_creature(&mut self, organism: Organism);
    /// Queues a new pellet.
    fn spawn_pellet(&mut self, pellet: Pellet);
}

/// Queue for collecting simulation events during a tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }
}

impl SpawnSink for EventQueue {
    fn spawn_creature(&mut self, organism: Organism) {
        self.push(SimulationEvent::CreatureSpawned(Box::new(organism)));
    }

    fn spawn_pellet(&mut self, pellet: Pellet) {
        self.push(SimulationEvent::PelletSpawned(pellet));
    }
}

/// Applies all queued events to the ecosystem state.
///
/// Spawned bodies are appended; deaths only update statistics since the dead
/// creature was already flagged when the event was queued.
pub fn apply_events(state: &mut Ecosystem, mut queue: EventQueue) {
    for event in queue.drain() {
        match event {
            SimulationEvent::CreatureSpawned(organism) => {
                state.stats.max_generation = state.stats.max_generation.max(organism.generation);
                state.organisms.push(*organism);
            }
            SimulationEvent::PelletSpawned(pellet) => {
                state.pellets.push(pellet);
            }
            SimulationEvent::CreatureDied { id, cause } => {
                log::debug!("creature {:?} died: {:?}", id, cause);
                match cause {
                    DeathCause::Eaten => state.stats.eaten += 1,
                    DeathCause::Poisoned => state.stats.poisoned += 1,
                    DeathCause::Inactivity => state.stats.starved += 1,
                    DeathCause::LeftDish => state.stats.escaped += 1,
                }
            }
        }
    }
}
