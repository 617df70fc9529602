//! Mutation thresholds and random helpers.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Thresholds for one call of [`super::Genome::mutate`].
///
/// Probabilities are expected in `[0, 1]`; [`crate::simulation::params::Params::validate`]
/// rejects anything else before it reaches a genome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationParams {
    /// Per-connection probability of touching its weight.
    pub weight_prob: f32,
    /// Given a weight mutation, probability of a fresh uniform draw instead of a perturbation.
    pub weight_full_replace_prob: f32,
    /// Scale of the Gaussian weight perturbation.
    pub weight_perturb_scale: f32,
    /// Probability of attempting to add a connection.
    pub add_connection_prob: f32,
    /// Sampling budget when searching for a connectable pair.
    pub add_connection_max_tries: usize,
    /// Probability of re-enabling a connection hit as a duplicate.
    pub reactivate_prob: f32,
    /// Probability of disabling one enabled connection.
    pub disable_connection_prob: f32,
    /// Probability of attempting to split a connection with a new node.
    pub add_node_prob: f32,
    /// Sampling budget when searching for an enabled connection to split.
    pub add_node_max_tries: usize,
}

impl Default for MutationParams {
    fn default() -> Self {
        Self {
            weight_prob: 0.8,
            weight_full_replace_prob: 0.1,
            weight_perturb_scale: 0.1,
            add_connection_prob: 0.05,
            add_connection_max_tries: 20,
            reactivate_prob: 0.25,
            disable_connection_prob: 0.0,
            add_node_prob: 0.03,
            add_node_max_tries: 20,
        }
    }
}

impl MutationParams {
    /// Same thresholds with structural probabilities replaced.
    pub fn with_structure(self, add_connection_prob: f32, add_node_prob: f32) -> Self {
        Self {
            add_connection_prob,
            add_node_prob,
            ..self
        }
    }

    /// Every probability field with its name, for validation.
    pub fn probabilities(&self) -> [(&'static str, f32); 6] {
        [
            ("weight_prob", self.weight_prob),
            ("weight_full_replace_prob", self.weight_full_replace_prob),
            ("add_connection_prob", self.add_connection_prob),
            ("reactivate_prob", self.reactivate_prob),
            ("disable_connection_prob", self.disable_connection_prob),
            ("add_node_prob", self.add_node_prob),
        ]
    }
}

/// What a [`super::Genome::mutate`] call did.
///
/// `connection_added` is also `true` when the sampled pair already existed,
/// whether or not it was reactivated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationReport {
    /// Number of connection weights that changed.
    pub weights_mutated: usize,
    /// The add-connection operator fired and succeeded.
    pub connection_added: bool,
    /// A connection was disabled.
    pub connection_disabled: bool,
    /// A connection was split by a new node.
    pub node_added: bool,
}

impl MutationReport {
    /// Returns `true` if the topology may have changed.
    pub fn is_structural(&self) -> bool {
        self.connection_added || self.connection_disabled || self.node_added
    }
}

/// Uniform draw in `[-scale, scale]`.
pub(crate) fn uniform_weight<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * scale
}

/// Standard normal sample built from two uniforms (Box–Muller).
pub(crate) fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // u1 must stay away from 0 for the logarithm
    let u1 = 1.0 - rng.random::<f32>();
    let u2 = rng.random::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}
