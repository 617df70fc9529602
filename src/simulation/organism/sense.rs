//! Abstract sense trait for organism perception.
//!
//! Senses collect information from the environment and convert it into
//! neural network inputs for the organism's brain.

use ndarray::Array1;

use super::super::contacts::{CircleRegistry, ContactGraph, SenseProfile};
use super::Organism;

/// Read-only view of the world a sense may consult.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    /// Current contacts.
    pub contacts: &'a ContactGraph,
    /// Capabilities of every registered circle.
    pub registry: &'a CircleRegistry,
    /// Radius of the dish, centered at the world origin.
    pub petri_radius: f32,
}

impl Surroundings<'_> {
    /// Sensor profiles of every senseable circle touching `organism`, in id order.
    pub fn touching(&self, organism: &Organism) -> impl Iterator<Item = SenseProfile> + '_ {
        let registry = self.registry;
        let mut ids: Vec<_> = self.contacts.neighbors(organism.id).collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(move |id| registry.senseable(id).copied())
    }
}

/// Trait for different sensory modalities that organisms can use to perceive their environment.
///
/// Each sense processes environmental information and returns a vector of activations
/// that will be fed as inputs to the organism's brain.
pub trait Sense {
    /// Process sensory information and return neural network inputs.
    ///
    /// # Arguments
    ///
    /// * `organism` - The organism doing the sensing
    /// * `surroundings` - Contacts, capabilities and dish geometry
    ///
    /// # Returns
    ///
    /// A 1D array of `input_size()` sensory activations.
    fn sense(&self, organism: &Organism, surroundings: &Surroundings<'_>) -> Array1<f32>;

    /// Returns the number of neural network inputs this sense produces.
    fn input_size(&self) -> usize;

    /// Returns a human-readable name for this sense.
    fn name(&self) -> &str;
}
