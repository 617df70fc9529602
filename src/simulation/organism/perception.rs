//! Perception system that combines multiple senses into brain inputs.
//!
//! The perception system manages different sensory modalities and combines
//! their outputs into a single input vector for the organism's brain.

use ndarray::{Array1, s};

use super::super::params::Params;
use super::Organism;
use super::color_sectors::ColorSectors;
use super::proprioception::Proprioception;
use super::sense::{Sense, Surroundings};

/// Manages multiple senses and combines them into brain inputs.
///
/// The perception system:
/// 1. Queries each sense for its outputs
/// 2. Concatenates all sensory outputs in order
/// 3. Returns a single input vector for the brain
pub struct Perception {
    /// Ordered list of senses that contribute to perception
    senses: Vec<Box<dyn Sense>>,
}

impl Perception {
    /// Creates a new perception system with the given senses.
    ///
    /// Senses are queried in the order given.
    pub fn new(senses: Vec<Box<dyn Sense>>) -> Self {
        Self { senses }
    }

    /// Color sectors followed by proprioception, sized from `params`.
    ///
    /// The result produces exactly `params.brain_inputs()` values.
    pub fn for_params(params: &Params) -> Self {
        Self::new(vec![
            Box::new(ColorSectors::new(params.sector_count)),
            Box::new(Proprioception::new(params.memory_slots)),
        ])
    }

    /// Process all senses and return combined brain inputs.
    ///
    /// # Arguments
    ///
    /// * `organism` - The organism doing the sensing
    /// * `surroundings` - Contacts, capabilities and dish geometry
    ///
    /// # Returns
    ///
    /// A 1D array containing all sensory activations concatenated in order.
    pub fn perceive(&self, organism: &Organism, surroundings: &Surroundings<'_>) -> Array1<f32> {
        let mut combined_inputs = Array1::zeros(self.total_input_size());

        let mut offset = 0;
        for sense in &self.senses {
            let size = sense.input_size();
            let outputs = sense.sense(organism, surroundings);
            let filled = outputs.len().min(size);
            combined_inputs
                .slice_mut(s![offset..offset + filled])
                .assign(&outputs.slice(s![..filled]));
            offset += size;
        }

        combined_inputs
    }

    /// Returns the total number of brain inputs produced by all senses.
    pub fn total_input_size(&self) -> usize {
        self.senses.iter().map(|s| s.input_size()).sum()
    }

    /// Returns a reference to the senses in this perception system.
    pub fn senses(&self) -> &[Box<dyn Sense>] {
        &self.senses
    }
}
