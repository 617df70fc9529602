//! Turning brain outputs into actions.
//!
//! Output layout: boost-left, boost-right, divide, three signal color
//! channels, then one output per memory slot.

use geo::Coord;
use ndarray::Array1;
use rand::Rng;

use super::super::contacts::CircleId;
use super::super::food::Pellet;
use super::super::neat::InnovationLedger;
use super::super::neat::activation::sigmoid;
use super::super::params::{ACTION_OUTPUTS, COLOR_OUTPUTS, Params};
use super::Organism;

/// Output driving the left turn boost.
pub const BOOST_LEFT_OUTPUT: usize = 0;
/// Output driving the right turn boost.
pub const BOOST_RIGHT_OUTPUT: usize = 1;
/// Output driving division.
pub const DIVIDE_OUTPUT: usize = 2;
/// First signal color output.
pub const COLOR_OUTPUT_START: usize = ACTION_OUTPUTS;
/// First memory output.
pub const MEMORY_OUTPUT_START: usize = ACTION_OUTPUTS + COLOR_OUTPUTS;

/// Lateral offset of the boost nozzle, as a fraction of the radius.
const NOZZLE_LATERAL_FRACTION: f32 = 0.5;

/// Keys held by a player possessing a creature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualInput {
    /// Left arrow.
    pub left: bool,
    /// Right arrow.
    pub right: bool,
    /// Space bar.
    pub space: bool,
}

/// Who decides what a creature does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Control {
    /// Actions are sampled from the brain outputs.
    #[default]
    Autonomous,
    /// Actions follow the held keys.
    Possessed(ManualInput),
}

/// Actions chosen on one behavior tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    /// Boost and turn left.
    pub boost_left: bool,
    /// Boost and turn right.
    pub boost_right: bool,
    /// Try to divide.
    pub divide: bool,
}

impl Actions {
    /// Returns `true` if nothing fires.
    pub fn is_idle(&self) -> bool {
        !(self.boost_left || self.boost_right || self.divide)
    }
}

/// Side a boost turns toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostSide {
    /// Counter-clockwise.
    Left,
    /// Clockwise.
    Right,
}

impl BoostSide {
    /// `+1` for left, `-1` for right.
    pub fn turn_sign(self) -> f32 {
        match self {
            BoostSide::Left => 1.0,
            BoostSide::Right => -1.0,
        }
    }
}

/// Picks the actions for one tick.
///
/// Under autonomous control each action fires iff its output is strictly
/// greater than a fresh uniform draw in `[0, 1)`; missing outputs never fire.
/// Possessed control maps the held keys directly and draws nothing.
pub fn decide_actions<R: Rng + ?Sized>(
    outputs: &Array1<f32>,
    control: Control,
    rng: &mut R,
) -> Actions {
    match control {
        Control::Possessed(keys) => Actions {
            boost_left: keys.left,
            boost_right: keys.right,
            divide: keys.space,
        },
        Control::Autonomous => {
            let mut fires = |idx: usize| {
                let draw = rng.random::<f32>();
                outputs.get(idx).is_some_and(|&out| out > draw)
            };
            Actions {
                boost_left: fires(BOOST_LEFT_OUTPUT),
                boost_right: fires(BOOST_RIGHT_OUTPUT),
                divide: fires(DIVIDE_OUTPUT),
            }
        }
    }
}

impl Organism {
    /// Runs one behavior tick on already perceived `inputs`.
    ///
    /// Updates the signal color and memory from the outputs and returns the
    /// chosen actions, which the caller applies before [`Organism::live_mutate`].
    pub fn behavior_tick<R: Rng + ?Sized>(
        &mut self,
        inputs: &Array1<f32>,
        control: Control,
        rng: &mut R,
    ) -> Actions {
        let outputs = self.brain.think(inputs, sigmoid);

        for (channel, signal) in self.signal.iter_mut().enumerate() {
            if let Some(&out) = outputs.get(COLOR_OUTPUT_START + channel) {
                *signal = out.clamp(0.0, 1.0);
            }
        }

        let actions = decide_actions(&outputs, control, rng);

        for (slot, memory) in self.memory.iter_mut().enumerate() {
            *memory = outputs
                .get(MEMORY_OUTPUT_START + slot)
                .map_or(0.0, |&out| out.clamp(0.0, 1.0));
        }

        actions
    }

    /// Mutates the brain with the tick thresholds when live mutation is on.
    ///
    /// Runs after the tick's actions, so a division on the same tick hands the
    /// child the genome the actions were decided with.
    pub fn live_mutate<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        params: &Params,
        rng: &mut R,
    ) -> bool {
        if !params.live_mutation_enabled {
            return false;
        }
        let report = self.brain.mutate(ledger, &params.tick_mutation, rng);
        if report.is_structural() {
            log::trace!("creature {:?} live mutation: {:?}", self.id, report);
        }
        true
    }

    /// Boosts forward while turning toward `side`.
    ///
    /// The boost costs `params.boost_area`, ejected as a particle from the rear
    /// rim on the side opposite the turn. Without enough spare area above
    /// `params.minimum_area` nothing happens. A zero cost applies the impulse
    /// and ejects nothing.
    pub fn boost(&mut self, side: BoostSide, params: &Params, particle_id: CircleId) -> Option<Pellet> {
        let cost = params.boost_area.max(0.0);
        if cost <= 0.0 {
            self.apply_turning_impulse(params, side.turn_sign());
            return None;
        }

        let new_area = self.area() - cost;
        if new_area <= params.minimum_area {
            return None;
        }
        self.set_area(new_area);
        self.apply_turning_impulse(params, side.turn_sign());

        let forward = self.forward();
        let left = Coord {
            x: -forward.y,
            y: forward.x,
        };
        let lateral = NOZZLE_LATERAL_FRACTION;
        let back = (1.0 - lateral * lateral).max(0.0).sqrt();
        let nozzle = forward * -back + left * (-side.turn_sign() * lateral);
        let pos = self.pos + nozzle * self.radius;

        let particle_mass = (cost * params.circle_density).max(f32::EPSILON);
        let impulse = params.linear_impulse_magnitude * params.boost_particle_impulse_fraction;
        let vel = forward * -(impulse / particle_mass);

        Some(Pellet::boost_particle(
            particle_id,
            pos,
            vel,
            cost,
            self.signal,
            params.boost_particle_linear_damping,
        ))
    }
}
