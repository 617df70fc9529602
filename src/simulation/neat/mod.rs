//! NEAT genome: an incrementally growing feed-forward network.
//!
//! Nodes carry a `layer` rank and every connection must point from a lower to
//! a strictly higher layer. That keeps the graph acyclic and lets evaluation
//! walk nodes bucketed by layer. The bucketed order and the forward adjacency
//! are cached and rebuilt lazily whenever the structure changes.
//!
//! Historical markings come from an [`InnovationLedger`] that the caller
//! passes into every constructing or mutating call.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod activation;
pub mod gene;
pub mod innovation;
pub mod mutation;

pub use gene::{Connection, Node};
pub use innovation::InnovationLedger;
pub use mutation::{MutationParams, MutationReport};

use mutation::{gaussian, uniform_weight};

/// Id of the bias node.
pub const BIAS_NODE: usize = 0;

/// Result of checking a `(source, target)` pair against the genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCandidate {
    /// Self-loop, unknown node or non-increasing layers.
    Invalid,
    /// The pair may receive a new connection.
    New,
    /// The pair is already connected at this index.
    Duplicate(usize),
}

/// Cached evaluation schedule.
#[derive(Debug, Clone)]
struct Topology {
    dirty: bool,
    order: Vec<usize>,
    forward: Vec<Vec<usize>>,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            dirty: true,
            order: Vec::new(),
            forward: Vec::new(),
        }
    }
}

/// An evolvable network owned by exactly one organism.
///
/// Cloning is a deep copy: parent and clone share nothing afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    nb_input: usize,
    nb_output: usize,
    weight_init_scale: f32,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    #[serde(skip)]
    topology: Topology,
}

impl Genome {
    /// Creates a genome with a bias node, `nb_input` inputs and `nb_output` outputs.
    ///
    /// With `connect_inputs_to_outputs` the bias and every input are connected
    /// to every output with weights drawn uniformly from
    /// `[-weight_init_scale, weight_init_scale]`.
    pub fn new<R: Rng + ?Sized>(
        nb_input: usize,
        nb_output: usize,
        ledger: &mut InnovationLedger,
        weight_init_scale: f32,
        connect_inputs_to_outputs: bool,
        rng: &mut R,
    ) -> Self {
        let mut nodes = Vec::with_capacity(1 + nb_input + nb_output);
        let mut bias = Node::new(BIAS_NODE, 0);
        bias.sum_input = 1.0;
        bias.sum_output = 1.0;
        nodes.push(bias);
        nodes.extend((1..=nb_input).map(|id| Node::new(id, 0)));
        nodes.extend((nb_input + 1..=nb_input + nb_output).map(|id| Node::new(id, 1)));

        let mut connections = Vec::new();
        if connect_inputs_to_outputs {
            connections.reserve((nb_input + 1) * nb_output);
            for source in 0..=nb_input {
                for target in nb_input + 1..=nb_input + nb_output {
                    let innovation_id = ledger.innovation_id(source, target);
                    let weight = uniform_weight(rng, weight_init_scale);
                    connections.push(Connection::new(innovation_id, source, target, weight));
                }
            }
        }

        Self {
            nb_input,
            nb_output,
            weight_init_scale,
            nodes,
            connections,
            topology: Topology::default(),
        }
    }

    /// Number of input nodes (bias excluded).
    pub fn nb_input(&self) -> usize {
        self.nb_input
    }

    /// Number of output nodes.
    pub fn nb_output(&self) -> usize {
        self.nb_output
    }

    /// Scale of uniform weight draws.
    pub fn weight_init_scale(&self) -> f32 {
        self.weight_init_scale
    }

    /// All nodes, indexed by id.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All connections, including disabled ones.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Mutable access to connection weights and enabled flags.
    ///
    /// Marks the cached topology dirty since flags may change.
    pub fn connections_mut(&mut self) -> &mut [Connection] {
        self.topology.dirty = true;
        &mut self.connections
    }

    /// Iterates over enabled connections.
    pub fn enabled_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(|c| c.enabled)
    }

    /// Ids of the output nodes.
    pub fn output_ids(&self) -> std::ops::RangeInclusive<usize> {
        self.nb_input + 1..=self.nb_input + self.nb_output
    }

    /// Nodes beyond bias, inputs and outputs.
    pub fn hidden_count(&self) -> usize {
        self.nodes.len() - 1 - self.nb_input - self.nb_output
    }

    /// Highest node layer.
    pub fn max_layer(&self) -> u32 {
        self.nodes.iter().map(|n| n.layer).max().unwrap_or(0)
    }

    /// Whether the cached schedule must be rebuilt before the next run.
    pub fn is_topology_dirty(&self) -> bool {
        self.topology.dirty
    }

    /// Structural sanity check for genomes read from outside, e.g. snapshots.
    ///
    /// Node ids must match their index, the fixed bias/input/output block must
    /// exist and every connection must point from a lower to a strictly higher
    /// layer between existing nodes, never into the bias or an input.
    pub fn is_consistent(&self) -> bool {
        let fixed = 1 + self.nb_input + self.nb_output;
        if self.nodes.len() < fixed || self.nodes.iter().enumerate().any(|(i, n)| n.id != i) {
            return false;
        }
        self.connections.iter().all(|c| {
            c.source < self.nodes.len()
                && c.target < self.nodes.len()
                && c.target > self.nb_input
                && self.nodes[c.source].layer < self.nodes[c.target].layer
        })
    }

    /// Cached evaluation order, rebuilding it first if needed.
    pub fn topological_order(&mut self) -> &[usize] {
        if self.topology.dirty {
            self.rebuild_topology();
        }
        &self.topology.order
    }

    /// Writes inputs into nodes `1..=nb_input` as already-activated values.
    ///
    /// Extra values are ignored; missing ones leave the node untouched.
    pub fn load_inputs(&mut self, inputs: &Array1<f32>) {
        for (node, &value) in self.nodes[1..=self.nb_input].iter_mut().zip(inputs.iter()) {
            node.sum_input = value;
            node.sum_output = value;
        }
    }

    /// Evaluates the network once.
    ///
    /// Bias and inputs bypass `activation`; every other node goes through it
    /// exactly once.
    pub fn run_network(&mut self, activation: impl Fn(f32) -> f32) {
        if self.topology.dirty {
            self.rebuild_topology();
        }
        for node in &mut self.nodes[self.nb_input + 1..] {
            node.sum_input = 0.0;
            node.sum_output = 0.0;
        }

        for &node_id in &self.topology.order {
            if node_id > self.nb_input {
                let node = &mut self.nodes[node_id];
                node.sum_output = activation(node.sum_input);
            }
            let output = self.nodes[node_id].sum_output;
            for &edge in &self.topology.forward[node_id] {
                let conn = &self.connections[edge];
                self.nodes[conn.target].sum_input += output * conn.weight;
            }
        }
    }

    /// Output node values from the last run, in id order.
    pub fn outputs(&self) -> Array1<f32> {
        self.output_ids()
            .map(|id| self.nodes[id].sum_output)
            .collect()
    }

    /// Loads `inputs`, runs the network and returns the outputs.
    pub fn think(&mut self, inputs: &Array1<f32>, activation: impl Fn(f32) -> f32) -> Array1<f32> {
        self.load_inputs(inputs);
        self.run_network(activation);
        self.outputs()
    }

    /// Restores strictly increasing layers along every connection, then
    /// rebuilds the evaluation order and forward adjacency.
    pub fn rebuild_topology(&mut self) {
        self.ensure_forward_layers();

        let max_layer = self.max_layer() as usize;
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_layer + 1];
        for node in &self.nodes {
            buckets[node.layer as usize].push(node.id);
        }
        self.topology.order = buckets.into_iter().flatten().collect();

        self.topology.forward = vec![Vec::new(); self.nodes.len()];
        for (idx, conn) in self.connections.iter().enumerate() {
            if conn.enabled {
                self.topology.forward[conn.source].push(idx);
            }
        }
        self.topology.dirty = false;
    }

    /// Pushes targets above their sources, propagating forward with a worklist.
    fn ensure_forward_layers(&mut self) {
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for conn in &self.connections {
            outgoing[conn.source].push(conn.target);
        }

        let mut stack = Vec::new();
        for conn in &self.connections {
            if self.nodes[conn.target].layer <= self.nodes[conn.source].layer {
                self.nodes[conn.target].layer = self.nodes[conn.source].layer + 1;
                stack.push(conn.target);
            }
            // the graph is acyclic, so this terminates
            while let Some(node_id) = stack.pop() {
                let layer = self.nodes[node_id].layer;
                for &next in &outgoing[node_id] {
                    if self.nodes[next].layer <= layer {
                        self.nodes[next].layer = layer + 1;
                        stack.push(next);
                    }
                }
            }
        }
    }

    /// Classifies a prospective connection.
    pub fn connection_candidate(&self, source: usize, target: usize) -> ConnectionCandidate {
        if source == target || source >= self.nodes.len() || target >= self.nodes.len() {
            return ConnectionCandidate::Invalid;
        }
        if self.nodes[source].layer >= self.nodes[target].layer {
            return ConnectionCandidate::Invalid;
        }
        match self
            .connections
            .iter()
            .position(|c| c.source == source && c.target == target)
        {
            Some(idx) => ConnectionCandidate::Duplicate(idx),
            None => ConnectionCandidate::New,
        }
    }

    /// Applies the four mutation operators in order, each behind its own roll.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        params: &MutationParams,
        rng: &mut R,
    ) -> MutationReport {
        let mut report = MutationReport {
            weights_mutated: self.mutate_weights(
                params.weight_prob,
                params.weight_full_replace_prob,
                params.weight_perturb_scale,
                rng,
            ),
            ..MutationReport::default()
        };

        if rng.random::<f32>() < params.add_connection_prob {
            report.connection_added = self.add_connection(
                ledger,
                params.add_connection_max_tries,
                params.reactivate_prob,
                rng,
            );
        }
        if rng.random::<f32>() < params.disable_connection_prob {
            report.connection_disabled = self.disable_connection(rng);
        }
        if rng.random::<f32>() < params.add_node_prob {
            report.node_added = self.add_node(ledger, params.add_node_max_tries, rng);
        }

        if report.is_structural() {
            log::trace!(
                "genome mutated: {} nodes, {} connections ({:?})",
                self.nodes.len(),
                self.connections.len(),
                report
            );
        }
        report
    }

    /// Mutates each weight with probability `weight_prob`; returns how many changed.
    pub fn mutate_weights<R: Rng + ?Sized>(
        &mut self,
        weight_prob: f32,
        full_replace_prob: f32,
        perturb_scale: f32,
        rng: &mut R,
    ) -> usize {
        let mut mutated = 0;
        for conn in &mut self.connections {
            if rng.random::<f32>() >= weight_prob {
                continue;
            }
            if rng.random::<f32>() < full_replace_prob {
                conn.weight = uniform_weight(rng, self.weight_init_scale);
            } else {
                conn.weight += gaussian(rng) * perturb_scale;
            }
            mutated += 1;
        }
        mutated
    }

    /// Samples node pairs until one is connectable or `max_tries` is spent.
    ///
    /// Hitting an existing pair counts as success: with probability
    /// `reactivate_prob` a disabled duplicate is re-enabled, otherwise nothing
    /// changes.
    pub fn add_connection<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        max_tries: usize,
        reactivate_prob: f32,
        rng: &mut R,
    ) -> bool {
        let node_count = self.nodes.len();
        let found = (0..max_tries).find_map(|_| {
            let source = rng.random_range(0..node_count);
            let target = rng.random_range(0..node_count);
            match self.connection_candidate(source, target) {
                ConnectionCandidate::Invalid => None,
                candidate => Some((source, target, candidate)),
            }
        });
        let Some((source, target, candidate)) = found else {
            return false;
        };

        match candidate {
            ConnectionCandidate::Duplicate(idx) => {
                if rng.random::<f32>() < reactivate_prob && !self.connections[idx].enabled {
                    self.connections[idx].enabled = true;
                    self.topology.dirty = true;
                }
                true
            }
            _ => self.push_connection(ledger, source, target, rng),
        }
    }

    /// Adds a new connection between two nodes if the pair is valid and new.
    ///
    /// The weight is drawn uniformly from the init scale.
    pub fn connect<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        source: usize,
        target: usize,
        rng: &mut R,
    ) -> bool {
        match self.connection_candidate(source, target) {
            ConnectionCandidate::New => self.push_connection(ledger, source, target, rng),
            _ => false,
        }
    }

    fn push_connection<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        source: usize,
        target: usize,
        rng: &mut R,
    ) -> bool {
        let innovation_id = ledger.innovation_id(source, target);
        let weight = uniform_weight(rng, self.weight_init_scale);
        self.connections
            .push(Connection::new(innovation_id, source, target, weight));
        self.topology.dirty = true;
        true
    }

    /// Disables one enabled connection chosen uniformly.
    pub fn disable_connection<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let enabled: Vec<usize> = self
            .connections
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.enabled.then_some(idx))
            .collect();
        if enabled.is_empty() {
            return false;
        }
        let idx = enabled[rng.random_range(0..enabled.len())];
        self.connections[idx].enabled = false;
        self.topology.dirty = true;
        true
    }

    /// Samples connections until an enabled one is found and splits it.
    pub fn add_node<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        max_tries: usize,
        rng: &mut R,
    ) -> bool {
        if self.connections.is_empty() {
            return false;
        }
        let count = self.connections.len();
        let found = (0..max_tries)
            .map(|_| rng.random_range(0..count))
            .find(|&idx| self.connections[idx].enabled);
        match found {
            Some(idx) => self.split_connection(ledger, idx),
            None => false,
        }
    }

    /// Inserts a node in the middle of an enabled connection.
    ///
    /// The connection is disabled and replaced by `source -> new` with weight
    /// 1.0 and `new -> target` carrying the old weight. The new node sits at
    /// `layer(source) + 1` and the target side is pushed up right away if it
    /// would collide.
    pub fn split_connection(&mut self, ledger: &mut InnovationLedger, conn_idx: usize) -> bool {
        let Some(conn) = self.connections.get(conn_idx) else {
            return false;
        };
        if !conn.enabled {
            return false;
        }
        let (source, target, weight) = (conn.source, conn.target, conn.weight);

        self.connections[conn_idx].enabled = false;
        let new_id = self.nodes.len();
        self.nodes
            .push(Node::new(new_id, self.nodes[source].layer + 1));

        let innovation_id = ledger.innovation_id(source, new_id);
        self.connections
            .push(Connection::new(innovation_id, source, new_id, 1.0));
        let innovation_id = ledger.innovation_id(new_id, target);
        self.connections
            .push(Connection::new(innovation_id, new_id, target, weight));

        if self.nodes[target].layer <= self.nodes[new_id].layer {
            self.ensure_forward_layers();
        }
        self.topology.dirty = true;
        true
    }
}
