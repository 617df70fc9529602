//! # Petri - NEAT creatures in a petri dish
//!
//! A headless simulation of circular creatures whose behavior is driven by
//! NEAT genomes that grow over generations.
//!
//! ## Features
//!
//! - NEAT genomes with a shared innovation ledger and lazily cached topology
//! - Radial color sensing with exact disc/wedge overlap areas
//! - Stochastic actions (turn boosts, division) or manual possession
//! - Division with independent mutation of parent and child lineages
//! - Eating, poisoning and division pellets
//! - Save/load simulation state
//!
//! ## Core Modules
//!
//! - [`simulation::neat`] - Genome, mutation operators and innovation ledger
//! - [`simulation::organism`] - Creature state, senses and behavior
//! - [`simulation::reproduction`] - Division
//! - [`simulation::ecosystem`] - Main simulation logic
//! - [`simulation::contacts`] - Contact graph and capability registry

/// Core simulation logic and data structures.
pub mod simulation {
    /// Contact graph and capability registry keyed by circle id.
    pub mod contacts;
    /// Main ecosystem simulation.
    pub mod ecosystem;
    /// Error types.
    pub mod error;
    /// Deferred spawns and deaths.
    pub mod events;
    /// Pellets that creatures can eat.
    pub mod food;
    /// Geometric utility functions for circles, wedges and heading frames.
    pub mod geometric_utils;
    /// Trait for locatable entities that can be updated.
    ///
    /// The [`locatable::Locatable`] trait is implemented by every body that
    /// has a position in the dish and drifts over time (Organism, Pellet).
    pub mod locatable;
    /// NEAT genomes.
    pub mod neat;
    /// Organism behavior, state, and lifecycle.
    pub mod organism;
    /// Simulation parameters.
    pub mod params;
    /// Division and lifecycle statistics.
    pub mod reproduction;
    /// K-d tree contact detection.
    pub mod spatial;
}
