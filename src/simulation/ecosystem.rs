//! Headless petri dish world.
//!
//! The ecosystem owns every creature and pellet plus the shared innovation
//! ledger. One [`Ecosystem::step`]:
//! - integrates every body
//! - rebuilds the capability registry and the contact graph
//! - lets each creature in turn eat, age, and (at the behavior cadence) sense,
//!   decide and act
//! - applies queued spawns and deaths
//! - removes eaten bodies and bodies that left the dish
//! - sprinkles pellets back up to their target counts

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::contacts::{CircleId, CircleRegistry, ContactGraph, EdibleKind};
use super::error::PetriError;
use super::events::{self, DeathCause, EventQueue, SimulationEvent, SpawnSink};
use super::food::{Pellet, random_point_in_disc};
use super::geometric_utils::{circle_overlap_area, radius_from_area};
use super::locatable::Locatable;
use super::neat::InnovationLedger;
use super::organism::{BoostSide, Control, ManualInput, Organism, Perception, Surroundings};
use super::params::Params;
use super::reproduction::{LifecycleStats, divide};
use super::spatial::{BodyFootprint, detect_contacts};

/// Share of a target's area that must lie inside the eater before it is eaten.
const EAT_OVERLAP_FRACTION: f32 = 0.8;

/// Where a registered id lives during one step.
#[derive(Debug, Clone, Copy)]
enum BodyRef {
    Creature(usize),
    Pellet(usize),
}

/// Result of one creature's meals in a step.
#[derive(Debug, Clone, Copy, Default)]
struct Meal {
    poisoned: bool,
    divide: bool,
}

fn entropy_rng() -> StdRng {
    StdRng::from_os_rng()
}

fn rng_for(params: &Params) -> StdRng {
    params.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

/// The main ecosystem containing all simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ecosystem {
    /// Creatures, alive until cleanup.
    pub organisms: Vec<Organism>,
    /// Pellets and boost particles.
    pub pellets: Vec<Pellet>,
    /// Innovation ids shared by every genome in the dish.
    pub ledger: InnovationLedger,
    /// Total simulation time elapsed.
    pub time: f32,
    /// Births and deaths so far.
    pub stats: LifecycleStats,
    /// Creature steered by [`Ecosystem::manual_input`] instead of its brain.
    pub possessed: Option<CircleId>,
    /// Keys currently held for the possessed creature.
    #[serde(skip)]
    pub manual_input: ManualInput,
    next_id: u32,
    behavior_accumulator: f32,
    #[serde(skip)]
    contacts: ContactGraph,
    #[serde(skip)]
    registry: CircleRegistry,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

impl Ecosystem {
    /// Creates a dish with `initial_creatures` fresh creatures and a full set of pellets.
    pub fn new(params: &Params) -> Result<Self, PetriError> {
        params.validate()?;
        let mut ecosystem = Self {
            organisms: Vec::with_capacity(params.initial_creatures),
            pellets: Vec::new(),
            ledger: InnovationLedger::new(),
            time: 0.0,
            stats: LifecycleStats::default(),
            possessed: None,
            manual_input: ManualInput::default(),
            next_id: 0,
            behavior_accumulator: 0.0,
            contacts: ContactGraph::new(),
            registry: CircleRegistry::new(),
            rng: rng_for(params),
        };

        for _ in 0..params.initial_creatures {
            ecosystem.spawn_random_creature(params);
        }
        ecosystem.sprinkle_pellets(params);

        log::info!(
            "genesis: {} creatures, {} pellets, {} innovations",
            ecosystem.organisms.len(),
            ecosystem.pellets.len(),
            ecosystem.ledger.len()
        );
        Ok(ecosystem)
    }

    /// Number of live creatures.
    pub fn population(&self) -> usize {
        self.organisms.iter().filter(|o| o.is_alive()).count()
    }

    /// Looks up a creature by id.
    pub fn creature(&self, id: CircleId) -> Option<&Organism> {
        self.organisms.iter().find(|o| o.id == id)
    }

    /// Contacts found by the last step.
    pub fn contacts(&self) -> &ContactGraph {
        &self.contacts
    }

    /// Capabilities registered by the last step.
    pub fn registry(&self) -> &CircleRegistry {
        &self.registry
    }

    /// Hands control of a creature to [`Ecosystem::manual_input`].
    pub fn possess(&mut self, id: CircleId) -> bool {
        if self.creature(id).is_some_and(Organism::is_alive) {
            self.possessed = Some(id);
            true
        } else {
            false
        }
    }

    /// Returns the possessed creature, if any, to its brain.
    pub fn release(&mut self) {
        self.possessed = None;
        self.manual_input = ManualInput::default();
    }

    fn allocate_id(&mut self) -> CircleId {
        let id = CircleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a creature with a fresh genome at a random point of the dish.
    pub fn spawn_random_creature(&mut self, params: &Params) -> CircleId {
        let id = self.allocate_id();
        let radius = radius_from_area(params.creature_area);
        let pos = random_point_in_disc((params.petri_radius - radius).max(0.0), &mut self.rng);
        let rot = self.rng.random::<f32>() * TAU;
        let organism = Organism::new_random(
            id,
            pos,
            rot,
            params,
            &mut self.ledger,
            &mut self.rng,
            self.time,
        );
        self.organisms.push(organism);
        id
    }

    /// Tops each sprinkled pellet kind up to its target count.
    pub fn sprinkle_pellets(&mut self, params: &Params) {
        let targets = [
            (EdibleKind::Food, params.target_food_pellets),
            (EdibleKind::Toxic, params.target_toxic_pellets),
            (EdibleKind::Division, params.target_division_pellets),
        ];
        for (kind, target) in targets {
            let present = self
                .pellets
                .iter()
                .filter(|p| p.kind == kind && !p.is_eaten())
                .count();
            for _ in present..target {
                let id = self.allocate_id();
                let pellet =
                    Pellet::new_random(id, params.petri_radius, params.pellet_area, kind, &mut self.rng);
                self.pellets.push(pellet);
            }
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Non-positive or non-finite `dt` leaves the world untouched.
    pub fn step(&mut self, params: &Params, dt: f32) -> Result<(), PetriError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Ok(());
        }

        for organism in &mut self.organisms {
            organism.update(dt);
        }
        for pellet in &mut self.pellets {
            pellet.update(dt);
        }
        self.time += dt;

        let index = self.refresh_contacts()?;

        let interval = params.behavior_interval();
        self.behavior_accumulator += dt;
        let behavior_due = self.behavior_accumulator >= interval;
        if behavior_due {
            self.behavior_accumulator %= interval;
        }
        let perception = behavior_due.then(|| Perception::for_params(params));

        let mut queue = EventQueue::new();
        let Self {
            organisms,
            pellets,
            ledger,
            time,
            stats,
            possessed,
            manual_input,
            next_id,
            contacts,
            registry,
            rng,
            ..
        } = self;
        let now = *time;

        for i in 0..organisms.len() {
            if !organisms[i].is_alive() {
                continue;
            }
            let id = organisms[i].id;

            let meal = eat_touching(
                i, organisms, pellets, &index, contacts, registry, params, rng, &mut queue,
            );
            if meal.poisoned {
                queue.push(SimulationEvent::CreatureDied {
                    id,
                    cause: DeathCause::Poisoned,
                });
                continue;
            }
            let mut wants_division = meal.divide;

            if organisms[i].update_inactivity(dt, params.inactivity_timeout) {
                organisms[i].kill();
                registry.unregister(id);
                queue.push(SimulationEvent::CreatureDied {
                    id,
                    cause: DeathCause::Inactivity,
                });
                continue;
            }

            if let Some(perception) = &perception {
                let surroundings = Surroundings {
                    contacts,
                    registry,
                    petri_radius: params.petri_radius,
                };
                let inputs = perception.perceive(&organisms[i], &surroundings);
                let control = if *possessed == Some(id) {
                    Control::Possessed(*manual_input)
                } else {
                    Control::Autonomous
                };
                let actions = organisms[i].behavior_tick(&inputs, control, rng);

                let boosts = [
                    (actions.boost_left, BoostSide::Left),
                    (actions.boost_right, BoostSide::Right),
                ];
                for (fire, side) in boosts {
                    if !fire {
                        continue;
                    }
                    let particle_id = CircleId(*next_id);
                    if let Some(particle) = organisms[i].boost(side, params, particle_id) {
                        *next_id += 1;
                        queue.spawn_pellet(particle);
                    }
                }
                wants_division |= actions.divide;
            }

            if wants_division {
                let child_id = CircleId(*next_id);
                if let Some(child) = divide(&mut organisms[i], child_id, ledger, params, now, rng) {
                    *next_id += 1;
                    stats.record_division(child.generation);
                    queue.spawn_creature(child);
                }
            }

            if perception.is_some() {
                organisms[i].live_mutate(ledger, params, rng);
            }

            registry.register(id, organisms[i].registry_entry());
        }

        events::apply_events(self, queue);
        self.remove_dead_and_escaped(params);
        self.sprinkle_pellets(params);
        Ok(())
    }

    /// Re-registers every live body and recomputes contacts.
    fn refresh_contacts(&mut self) -> Result<HashMap<CircleId, BodyRef>, PetriError> {
        self.registry.clear();
        let mut index = HashMap::with_capacity(self.organisms.len() + self.pellets.len());
        let mut footprints = Vec::with_capacity(self.organisms.len() + self.pellets.len());

        for (i, organism) in self.organisms.iter().enumerate() {
            if !organism.is_alive() {
                continue;
            }
            self.registry.register(organism.id, organism.registry_entry());
            index.insert(organism.id, BodyRef::Creature(i));
            footprints.push(BodyFootprint {
                id: organism.id,
                pos: organism.pos,
                radius: organism.radius,
            });
        }
        for (i, pellet) in self.pellets.iter().enumerate() {
            if pellet.is_eaten() {
                continue;
            }
            self.registry.register(pellet.id, pellet.registry_entry());
            index.insert(pellet.id, BodyRef::Pellet(i));
            footprints.push(BodyFootprint {
                id: pellet.id,
                pos: pellet.pos,
                radius: pellet.radius,
            });
        }

        detect_contacts(&footprints, &mut self.contacts)?;
        Ok(index)
    }

    fn remove_dead_and_escaped(&mut self, params: &Params) {
        let petri_radius = params.petri_radius;
        let mut queue = EventQueue::new();
        for organism in &mut self.organisms {
            if organism.is_alive() && organism.is_outside(petri_radius) {
                organism.kill();
                queue.push(SimulationEvent::CreatureDied {
                    id: organism.id,
                    cause: DeathCause::LeftDish,
                });
            }
        }
        events::apply_events(self, queue);
        self.organisms.retain(Organism::is_alive);
        self.pellets
            .retain(|p| !p.is_eaten() && !p.is_outside(petri_radius));

        if let Some(id) = self.possessed {
            if self.creature(id).is_none() {
                self.release();
            }
        }
    }

    /// Saves the ecosystem state to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PetriError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads an ecosystem state from a JSON file written with `params`.
    ///
    /// Every genome must be structurally sound and sized for `params`.
    pub fn load_from_file(path: impl AsRef<Path>, params: &Params) -> Result<Self, PetriError> {
        params.validate()?;
        let json = std::fs::read_to_string(path)?;
        let mut ecosystem: Self = serde_json::from_str(&json)?;
        ecosystem.check_snapshot(params)?;
        ecosystem.rng = rng_for(params);
        log::info!(
            "loaded snapshot at t={:.2}: {} creatures, {} pellets",
            ecosystem.time,
            ecosystem.organisms.len(),
            ecosystem.pellets.len()
        );
        Ok(ecosystem)
    }

    fn check_snapshot(&self, params: &Params) -> Result<(), PetriError> {
        let mut seen = std::collections::HashSet::new();
        let ids = self
            .organisms
            .iter()
            .map(|o| o.id)
            .chain(self.pellets.iter().map(|p| p.id));
        for id in ids {
            if id.0 >= self.next_id || !seen.insert(id) {
                return Err(PetriError::CorruptSnapshot(format!(
                    "circle id {} is duplicated or never allocated",
                    id.0
                )));
            }
        }

        for organism in &self.organisms {
            let brain = &organism.brain;
            if !brain.is_consistent() {
                return Err(PetriError::CorruptSnapshot(format!(
                    "creature {} has a malformed genome",
                    organism.id.0
                )));
            }
            if brain.nb_input() != params.brain_inputs()
                || brain.nb_output() != params.brain_outputs()
                || organism.memory.len() != params.memory_slots
            {
                return Err(PetriError::CorruptSnapshot(format!(
                    "creature {} was built for different sensor or memory settings",
                    organism.id.0
                )));
            }
            if brain
                .connections()
                .iter()
                .any(|c| self.ledger.get(c.source, c.target) != Some(c.innovation_id))
            {
                return Err(PetriError::CorruptSnapshot(format!(
                    "creature {} uses innovations missing from the ledger",
                    organism.id.0
                )));
            }
        }
        Ok(())
    }
}

/// Lets creature `eater` eat every touching, strictly smaller edible circle
/// that lies mostly inside it.
#[allow(clippy::too_many_arguments)]
fn eat_touching<R: Rng + ?Sized>(
    eater: usize,
    organisms: &mut [Organism],
    pellets: &mut [Pellet],
    index: &HashMap<CircleId, BodyRef>,
    contacts: &mut ContactGraph,
    registry: &mut CircleRegistry,
    params: &Params,
    rng: &mut R,
    queue: &mut EventQueue,
) -> Meal {
    let eater_id = organisms[eater].id;
    let mut touching: Vec<CircleId> = contacts.neighbors(eater_id).collect();
    touching.sort_unstable();

    let mut meal = Meal::default();
    for target in touching {
        let (Some(&edible), Some(&profile)) = (registry.edible(target), registry.senseable(target))
        else {
            continue;
        };
        let current = &organisms[eater];
        if edible.area >= current.area() {
            continue;
        }
        let offset = profile.pos - current.pos;
        let distance = (offset.x * offset.x + offset.y * offset.y).sqrt();
        if circle_overlap_area(current.radius, profile.radius, distance) < EAT_OVERLAP_FRACTION * edible.area {
            continue;
        }

        match index.get(&target) {
            Some(&BodyRef::Creature(j)) if j != eater && organisms[j].is_alive() => {
                organisms[j].kill();
                queue.push(SimulationEvent::CreatureDied {
                    id: target,
                    cause: DeathCause::Eaten,
                });
            }
            Some(&BodyRef::Pellet(j)) if !pellets[j].is_eaten() => pellets[j].consume(),
            _ => continue,
        }
        registry.unregister(target);
        contacts.remove_circle(target);

        let current = &mut organisms[eater];
        current.grow_by_area(edible.area);

        let poison_probability = if edible.kind == EdibleKind::Toxic {
            params.poison_death_probability
        } else {
            params.poison_death_probability_normal
        };
        if rng.random::<f32>() < poison_probability {
            meal.poisoned = true;
        }
        if edible.kind == EdibleKind::Division
            && rng.random::<f32>() < params.division_pellet_divide_probability
        {
            meal.divide = true;
        }
        registry.register(eater_id, current.registry_entry());
    }

    // poison takes effect once the whole meal is eaten
    if meal.poisoned {
        organisms[eater].kill();
        registry.unregister(eater_id);
    }
    meal
}
