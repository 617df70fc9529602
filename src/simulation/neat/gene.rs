//! Node and connection genes.

use serde::{Deserialize, Serialize};

/// A neuron in a [`super::Genome`].
///
/// `sum_input` and `sum_output` are evaluation scratch space and are reset on
/// every network run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node id, equal to the node's index in the genome.
    pub id: usize,
    /// Rank used to force feed-forward evaluation order.
    pub layer: u32,
    /// Accumulated weighted input of the current run.
    pub sum_input: f32,
    /// Activated output of the current run.
    pub sum_output: f32,
    /// Nodes are never removed; kept for parity with connections.
    pub enabled: bool,
}

impl Node {
    /// Creates a node with cleared scratch values.
    pub fn new(id: usize, layer: u32) -> Self {
        Self {
            id,
            layer,
            sum_input: 0.0,
            sum_output: 0.0,
            enabled: true,
        }
    }
}

/// A weighted directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Historical marking shared by every connection between the same pair.
    pub innovation_id: usize,
    /// Id of the node the signal is read from.
    pub source: usize,
    /// Id of the node the signal is added to.
    pub target: usize,
    /// Multiplier applied to the source output.
    pub weight: f32,
    /// Disabled connections are skipped during evaluation.
    pub enabled: bool,
}

impl Connection {
    /// Creates an enabled connection.
    pub fn new(innovation_id: usize, source: usize, target: usize, weight: f32) -> Self {
        Self {
            innovation_id,
            source,
            target,
            weight,
            enabled: true,
        }
    }
}
