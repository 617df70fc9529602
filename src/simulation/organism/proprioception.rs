//! Proprioception sense - organism's awareness of its own state.
//!
//! Provides the organism's size and the memory it wrote on the previous
//! behavior tick.

use ndarray::Array1;

use super::Organism;
use super::sense::{Sense, Surroundings};

/// Half-saturation area of the size input.
const SIZE_HALF_AREA: f32 = 10.0;

/// Proprioception sense for internal state awareness.
///
/// Outputs:
/// - Size, `area / (area + 10)`
/// - Memory state (all memory slots)
pub struct Proprioception {
    memory_slots: usize,
}

impl Proprioception {
    /// Creates a new proprioception sense reporting `memory_slots` memory values.
    pub fn new(memory_slots: usize) -> Self {
        Self { memory_slots }
    }

    /// Size input for a body of the given area.
    pub fn size_signal(area: f32) -> f32 {
        let area = area.max(0.0);
        area / (area + SIZE_HALF_AREA)
    }
}

impl Sense for Proprioception {
    fn sense(&self, organism: &Organism, _surroundings: &Surroundings<'_>) -> Array1<f32> {
        let mut outputs = Array1::zeros(self.input_size());
        outputs[0] = Self::size_signal(organism.area());
        for (slot, &value) in outputs
            .iter_mut()
            .skip(1)
            .zip(organism.memory.iter())
        {
            *slot = value;
        }
        outputs
    }

    fn input_size(&self) -> usize {
        1 + self.memory_slots
    }

    fn name(&self) -> &str {
        "Proprioception"
    }
}
