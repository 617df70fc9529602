//! Contact tracking and capability lookup keyed by stable circle ids.
//!
//! The contact graph answers "who touches whom"; the registry answers "what
//! can this neighbor be used for". Sensing and eating only ever read these
//! two structures, never the bodies themselves.

use std::collections::{HashMap, HashSet};

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Stable identifier shared by creatures and pellets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CircleId(pub u32);

/// Undirected, symmetric set of current contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactGraph {
    adjacency: HashMap<CircleId, HashSet<CircleId>>,
}

impl ContactGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `a` and `b` touch. Self-contacts are ignored.
    pub fn add_contact(&mut self, a: CircleId, b: CircleId) {
        if a == b {
            return;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Forgets a contact in both directions.
    pub fn remove_contact(&mut self, a: CircleId, b: CircleId) {
        if a == b {
            return;
        }
        self.unlink(a, b);
        self.unlink(b, a);
    }

    /// Drops a circle and every contact it takes part in.
    pub fn remove_circle(&mut self, id: CircleId) {
        let Some(neighbors) = self.adjacency.remove(&id) else {
            return;
        };
        for neighbor in neighbors {
            self.unlink(neighbor, id);
        }
    }

    fn unlink(&mut self, from: CircleId, to: CircleId) {
        if let Some(set) = self.adjacency.get_mut(&from) {
            set.remove(&to);
            if set.is_empty() {
                self.adjacency.remove(&from);
            }
        }
    }

    /// Whether `a` and `b` currently touch.
    pub fn contains(&self, a: CircleId, b: CircleId) -> bool {
        self.adjacency.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Iterates over the circles touching `id`.
    pub fn neighbors(&self, id: CircleId) -> impl Iterator<Item = CircleId> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Number of circles touching `id`.
    pub fn degree(&self, id: CircleId) -> usize {
        self.adjacency.get(&id).map_or(0, HashSet::len)
    }

    /// Removes every contact.
    pub fn clear(&mut self) {
        self.adjacency.clear();
    }
}

/// What a neighbor looks like to a color sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenseProfile {
    /// World position of the center.
    pub pos: Coord<f32>,
    /// Disc radius.
    pub radius: f32,
    /// Signal color in `[0, 1]`.
    pub color: [f32; 3],
}

/// Kind of edible body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdibleKind {
    /// Plain food pellet.
    Food,
    /// Pellet that may poison the eater.
    Toxic,
    /// Pellet that may make the eater divide.
    Division,
    /// Particle ejected by a boost.
    BoostParticle,
    /// Another creature.
    Creature,
}

/// What a neighbor offers to an eater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdibleProfile {
    /// Area gained by eating it.
    pub area: f32,
    /// Kind of body.
    pub kind: EdibleKind,
}

/// Capability records for one circle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircleEntry {
    /// Present when the circle can be seen by sensors.
    pub senseable: Option<SenseProfile>,
    /// Present when the circle can be eaten.
    pub edible: Option<EdibleProfile>,
}

/// Maps circle ids to optional capability records.
#[derive(Debug, Clone, Default)]
pub struct CircleRegistry {
    entries: HashMap<CircleId, CircleEntry>,
}

impl CircleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the capabilities of a circle.
    pub fn register(&mut self, id: CircleId, entry: CircleEntry) {
        self.entries.insert(id, entry);
    }

    /// Forgets a circle.
    pub fn unregister(&mut self, id: CircleId) {
        self.entries.remove(&id);
    }

    /// Sensor view of a circle, if it has one.
    pub fn senseable(&self, id: CircleId) -> Option<&SenseProfile> {
        self.entries.get(&id)?.senseable.as_ref()
    }

    /// Eater view of a circle, if it has one.
    pub fn edible(&self, id: CircleId) -> Option<&EdibleProfile> {
        self.entries.get(&id)?.edible.as_ref()
    }

    /// Number of registered circles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
