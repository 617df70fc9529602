use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, PetriError};
use super::neat::MutationParams;

/// Number of action outputs (boost left, boost right, divide).
pub const ACTION_OUTPUTS: usize = 3;
/// Number of signal color outputs (RGB).
pub const COLOR_OUTPUTS: usize = 3;
/// Color channels sensed per sector.
pub const SECTOR_CHANNELS: usize = 3;

/// Simulation parameters that control ecosystem behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Radius of the petri dish, centered at the world origin.
    pub petri_radius: f32,
    /// Smallest area a creature may shrink to.
    pub minimum_area: f32,
    /// Area of a freshly spawned creature.
    pub creature_area: f32,
    /// Mass per unit area.
    pub circle_density: f32,
    /// Fraction of linear velocity lost per second.
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second.
    pub angular_damping: f32,
    /// Impulse applied by a boost along the heading.
    pub linear_impulse_magnitude: f32,
    /// Turning impulse applied by an eccentric boost.
    pub angular_impulse_magnitude: f32,
    /// Area spent (and ejected as a particle) by one boost.
    pub boost_area: f32,
    /// Share of the creature's impulse given to the ejected particle.
    pub boost_particle_impulse_fraction: f32,
    /// Linear damping of boost particles.
    pub boost_particle_linear_damping: f32,
    /// Number of angular color sectors.
    pub sector_count: usize,
    /// Number of memory slots fed back into the next cycle.
    pub memory_slots: usize,
    /// Behavior ticks per simulated second.
    pub behavior_rate: f32,
    /// Mutate brains once per behavior tick.
    pub live_mutation_enabled: bool,
    /// Initial and replacement weights are drawn from `[-scale, scale]`.
    pub weight_init_scale: f32,
    /// Thresholds for live mutation.
    pub tick_mutation: MutationParams,
    /// Mutation rounds applied to brand new genomes.
    pub init_mutation_rounds: usize,
    /// Thresholds for genome seeding.
    pub init_mutation: MutationParams,
    /// Mutation rounds applied to parent and child at division.
    pub mutation_rounds: usize,
    /// Thresholds for division-time mutation.
    pub reproduction_mutation: MutationParams,
    /// Chance that eating a toxic pellet kills.
    pub poison_death_probability: f32,
    /// Chance that eating anything else kills.
    pub poison_death_probability_normal: f32,
    /// Chance that eating a division pellet triggers a division.
    pub division_pellet_divide_probability: f32,
    /// Seconds without motion before a creature dies (0 disables).
    pub inactivity_timeout: f32,
    /// Creatures spawned at genesis.
    pub initial_creatures: usize,
    /// Food pellet count the sprinkler tops up to.
    pub target_food_pellets: usize,
    /// Toxic pellet count the sprinkler tops up to.
    pub target_toxic_pellets: usize,
    /// Division pellet count the sprinkler tops up to.
    pub target_division_pellets: usize,
    /// Area of a sprinkled pellet.
    pub pellet_area: f32,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        let reproduction_mutation = MutationParams {
            weight_prob: 0.05,
            weight_full_replace_prob: 0.0,
            weight_perturb_scale: 0.2,
            add_connection_prob: 0.1,
            add_connection_max_tries: 20,
            reactivate_prob: 0.25,
            disable_connection_prob: 0.0,
            add_node_prob: 0.005,
            add_node_max_tries: 20,
        };
        Self {
            petri_radius: 50.0,
            minimum_area: 1.0,
            creature_area: 5.0,
            circle_density: 1.0,
            linear_damping: 1.0,
            angular_damping: 1.0,
            linear_impulse_magnitude: 0.5,
            angular_impulse_magnitude: 0.5,
            boost_area: 0.002,
            boost_particle_impulse_fraction: 0.003,
            boost_particle_linear_damping: 5.0,
            sector_count: 5,
            memory_slots: 4,
            behavior_rate: 10.0,
            live_mutation_enabled: false,
            weight_init_scale: 1.0,
            tick_mutation: reproduction_mutation.with_structure(0.0, 0.0),
            init_mutation_rounds: 3,
            init_mutation: MutationParams {
                weight_prob: 0.8,
                weight_full_replace_prob: 0.1,
                weight_perturb_scale: 1.2,
                ..reproduction_mutation.with_structure(0.3, 0.1)
            },
            mutation_rounds: 1,
            reproduction_mutation,
            poison_death_probability: 1.0,
            poison_death_probability_normal: 0.0,
            division_pellet_divide_probability: 1.0,
            inactivity_timeout: 5.0,
            initial_creatures: 20,
            target_food_pellets: 200,
            target_toxic_pellets: 5,
            target_division_pellets: 5,
            pellet_area: 0.3,
            seed: None,
        }
    }
}

impl Params {
    /// Brain inputs: sector colors, size, memory.
    pub fn brain_inputs(&self) -> usize {
        self.sector_count * SECTOR_CHANNELS + 1 + self.memory_slots
    }

    /// Brain outputs: actions, signal color, memory.
    pub fn brain_outputs(&self) -> usize {
        ACTION_OUTPUTS + COLOR_OUTPUTS + self.memory_slots
    }

    /// Seconds between behavior ticks.
    pub fn behavior_interval(&self) -> f32 {
        1.0 / self.behavior_rate
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sector_count < 3 {
            return Err(ConfigError::InvalidSectorCount(self.sector_count));
        }
        if !(self.petri_radius.is_finite() && self.petri_radius > 0.0) {
            return Err(ConfigError::InvalidPetriRadius(self.petri_radius));
        }
        if !(self.minimum_area.is_finite() && self.minimum_area > 0.0) {
            return Err(ConfigError::InvalidMinimumArea(self.minimum_area));
        }
        if !(self.behavior_rate.is_finite() && self.behavior_rate > 0.0) {
            return Err(ConfigError::InvalidBehaviorRate(self.behavior_rate));
        }

        let quantities = [
            ("creature_area", self.creature_area),
            ("circle_density", self.circle_density),
            ("linear_damping", self.linear_damping),
            ("angular_damping", self.angular_damping),
            ("boost_area", self.boost_area),
            ("pellet_area", self.pellet_area),
            ("weight_init_scale", self.weight_init_scale),
            ("inactivity_timeout", self.inactivity_timeout),
        ];
        for (name, value) in quantities {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidQuantity { name, value });
            }
        }

        let probabilities = [
            ("poison_death_probability", self.poison_death_probability),
            (
                "poison_death_probability_normal",
                self.poison_death_probability_normal,
            ),
            (
                "division_pellet_divide_probability",
                self.division_pellet_divide_probability,
            ),
        ];
        for (name, value) in probabilities {
            check_probability(name, value)?;
        }
        for mutation in [
            &self.tick_mutation,
            &self.init_mutation,
            &self.reproduction_mutation,
        ] {
            validate_mutation(mutation)?;
        }
        Ok(())
    }

    /// Loads parameters from a JSON file and validates them.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PetriError> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Saves parameters as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PetriError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

fn validate_mutation(mutation: &MutationParams) -> Result<(), ConfigError> {
    for (name, value) in mutation.probabilities() {
        check_probability(name, value)?;
    }
    if !(mutation.weight_perturb_scale.is_finite() && mutation.weight_perturb_scale >= 0.0) {
        return Err(ConfigError::InvalidQuantity {
            name: "weight_perturb_scale",
            value: mutation.weight_perturb_scale,
        });
    }
    if mutation.add_connection_prob > 0.0 && mutation.add_connection_max_tries == 0 {
        return Err(ConfigError::ZeroSearchBudget {
            name: "add_connection_max_tries",
        });
    }
    if mutation.add_node_prob > 0.0 && mutation.add_node_max_tries == 0 {
        return Err(ConfigError::ZeroSearchBudget {
            name: "add_node_max_tries",
        });
    }
    Ok(())
}
