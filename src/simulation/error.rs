//! Error types for the fallible edges of the simulation.
//!
//! Core operations (mutation, sensing, division) never fail; they report
//! policy outcomes through `bool` or `Option`. Errors only come from bad
//! configuration, snapshot I/O and the spatial index.

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Sectors must be narrower than a half-turn.
    #[error("Color sector count must be at least 3, got {0}")]
    InvalidSectorCount(usize),
    /// Dish radius must be positive and finite.
    #[error("Petri dish radius must be positive, got {0}")]
    InvalidPetriRadius(f32),
    /// Minimum area must be positive.
    #[error("Minimum area must be positive, got {0}")]
    InvalidMinimumArea(f32),
    /// Behavior cadence must be positive.
    #[error("Behavior rate must be positive, got {0}")]
    InvalidBehaviorRate(f32),
    /// A probability outside `[0, 1]`.
    #[error("Probability {name} must lie in [0, 1], got {value}")]
    InvalidProbability {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A structural operator can fire but has no search budget.
    #[error("{name} is enabled but its search budget is zero")]
    ZeroSearchBudget {
        /// Field name.
        name: &'static str,
    },
    /// A non-negative quantity was negative or not finite.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidQuantity {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum PetriError {
    /// Rejected parameters.
    #[error("Invalid parameters: {0}")]
    Config(#[from] ConfigError),
    /// Snapshot or config file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot or config file is not valid JSON for the expected type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A body position could not be indexed (non-finite coordinates).
    #[error("Spatial index rejected body {id}: {kind:?}")]
    Spatial {
        /// Body that failed to index.
        id: u32,
        /// Error reported by the k-d tree.
        kind: kdtree::ErrorKind,
    },
    /// A loaded snapshot breaks a structural invariant.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}
