//! Organism module containing organism behavior and perception systems.

mod behavior;
mod color_sectors;
mod organism;
mod perception;
mod proprioception;
mod sense;

// Re-export everything from the organism module
pub use organism::*;

pub use behavior::{
    Actions, BOOST_LEFT_OUTPUT, BOOST_RIGHT_OUTPUT, BoostSide, COLOR_OUTPUT_START, Control,
    DIVIDE_OUTPUT, MEMORY_OUTPUT_START, ManualInput, decide_actions,
};

// Re-export perception system components
pub use color_sectors::ColorSectors;
pub use perception::Perception;
pub use proprioception::Proprioception;
pub use sense::{Sense, Surroundings};
