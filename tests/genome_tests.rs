#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use ndarray::Array1;
use petri::simulation::neat::activation::{identity, sigmoid};
use petri::simulation::neat::{
    BIAS_NODE, ConnectionCandidate, Genome, InnovationLedger, MutationParams,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn aggressive_mutation() -> MutationParams {
    MutationParams {
        weight_prob: 0.8,
        weight_full_replace_prob: 0.1,
        weight_perturb_scale: 0.5,
        add_connection_prob: 0.9,
        add_connection_max_tries: 30,
        reactivate_prob: 0.5,
        disable_connection_prob: 0.2,
        add_node_prob: 0.6,
        add_node_max_tries: 30,
    }
}

fn ramp_inputs(n: usize) -> Array1<f32> {
    Array1::from_iter((0..n).map(|i| (i as f32 + 1.0) / (n as f32 + 1.0)))
}

/// Evaluates a genome by recursion over incoming edges, independent of its cached order.
fn reference_outputs(genome: &Genome, inputs: &Array1<f32>, activation: fn(f32) -> f32) -> Vec<f32> {
    fn value(
        genome: &Genome,
        node: usize,
        inputs: &Array1<f32>,
        activation: fn(f32) -> f32,
        memo: &mut Vec<Option<f32>>,
    ) -> f32 {
        if let Some(v) = memo[node] {
            return v;
        }
        let v = if node == BIAS_NODE {
            1.0
        } else if node <= genome.nb_input() {
            inputs[node - 1]
        } else {
            let sum: f32 = genome
                .enabled_connections()
                .filter(|c| c.target == node)
                .map(|c| value(genome, c.source, inputs, activation, memo) * c.weight)
                .sum();
            activation(sum)
        };
        memo[node] = Some(v);
        v
    }

    let mut memo = vec![None; genome.nodes().len()];
    genome
        .output_ids()
        .map(|id| value(genome, id, inputs, activation, &mut memo))
        .collect()
}

#[test]
fn test_full_connection_and_single_split() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut ledger = InnovationLedger::new();
    let mut genome = Genome::new(12, 7, &mut ledger, 1.0, true, &mut rng);

    assert_eq!(genome.connections().len(), 13 * 7);
    assert_eq!(genome.nodes().len(), 1 + 12 + 7);
    assert_eq!(ledger.len(), 13 * 7);

    let inputs = ramp_inputs(12);
    let before = genome.think(&inputs, identity);

    let nodes_before = genome.nodes().len();
    let enabled_before = genome.enabled_connections().count();
    let total_before = genome.connections().len();
    let split_weight = genome.connections()[5].weight;

    assert_eq!(genome.hidden_count(), 0);
    assert!(genome.split_connection(&mut ledger, 5));

    assert_eq!(genome.nodes().len(), nodes_before + 1);
    assert_eq!(genome.hidden_count(), 1);
    assert_eq!(genome.enabled_connections().count(), enabled_before + 1);
    assert_eq!(genome.connections().len(), total_before + 2);
    assert!(!genome.connections()[5].enabled);

    let new_id = nodes_before;
    let incoming = &genome.connections()[total_before];
    let outgoing = &genome.connections()[total_before + 1];
    assert_eq!(incoming.target, new_id);
    assert_eq!(incoming.weight, 1.0);
    assert_eq!(outgoing.source, new_id);
    assert_eq!(outgoing.weight, split_weight);

    let after = genome.think(&inputs, identity);
    for (a, b) in before.iter().zip(after.iter()) {
        assert!((a - b).abs() < 1e-5, "split changed output: {a} vs {b}");
    }
}

#[test]
fn test_shared_ledger_gives_identical_innovation_ids() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut ledger = InnovationLedger::new();
    let mut first = Genome::new(3, 7, &mut ledger, 1.0, false, &mut rng);
    let mut second = Genome::new(3, 7, &mut ledger, 1.0, false, &mut rng);
    assert!(ledger.is_empty());

    assert_eq!(first.connection_candidate(2, 9), ConnectionCandidate::New);
    assert!(first.connect(&mut ledger, 2, 9, &mut rng));
    let counter = ledger.last_id();
    assert!(second.connect(&mut ledger, 2, 9, &mut rng));

    assert_eq!(ledger.last_id(), counter);
    assert_eq!(ledger.len(), 1);
    assert_eq!(
        first.connections()[0].innovation_id,
        second.connections()[0].innovation_id
    );
    assert_eq!(ledger.get(2, 9), Some(first.connections()[0].innovation_id));
}

#[test]
fn test_connection_candidates() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut ledger = InnovationLedger::new();
    let genome = Genome::new(2, 2, &mut ledger, 1.0, true, &mut rng);

    // nodes: 0 bias, 1-2 inputs, 3-4 outputs
    assert_eq!(genome.connection_candidate(1, 1), ConnectionCandidate::Invalid);
    assert_eq!(genome.connection_candidate(3, 1), ConnectionCandidate::Invalid);
    assert_eq!(genome.connection_candidate(3, 4), ConnectionCandidate::Invalid);
    assert_eq!(genome.connection_candidate(1, 99), ConnectionCandidate::Invalid);
    assert!(matches!(
        genome.connection_candidate(1, 3),
        ConnectionCandidate::Duplicate(_)
    ));
}

#[test]
fn test_duplicate_hit_reports_success_without_change() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut ledger = InnovationLedger::new();
    // fully connected with no hidden nodes: every valid pair is a duplicate
    let mut genome = Genome::new(2, 1, &mut ledger, 1.0, true, &mut rng);
    let connections = genome.connections().to_vec();
    let last_id = ledger.last_id();

    assert!(genome.add_connection(&mut ledger, 10_000, 0.0, &mut rng));

    assert_eq!(genome.connections(), connections.as_slice());
    assert_eq!(ledger.last_id(), last_id);
}

#[test]
fn test_duplicate_hit_can_reactivate() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut ledger = InnovationLedger::new();
    let mut genome = Genome::new(1, 1, &mut ledger, 1.0, true, &mut rng);
    for conn in genome.connections_mut() {
        conn.enabled = false;
    }

    // bias->out and in->out are the only valid pairs
    assert!(genome.add_connection(&mut ledger, 10_000, 1.0, &mut rng));
    assert_eq!(genome.enabled_connections().count(), 1);
    assert_eq!(genome.connections().len(), 2);
}

#[test]
fn test_operators_are_noops_without_candidates() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut ledger = InnovationLedger::new();
    let mut genome = Genome::new(3, 2, &mut ledger, 1.0, false, &mut rng);

    assert!(!genome.disable_connection(&mut rng));
    assert!(!genome.add_node(&mut ledger, 50, &mut rng));
    assert!(!genome.add_connection(&mut ledger, 0, 1.0, &mut rng));
    assert_eq!(genome.mutate_weights(1.0, 0.5, 1.0, &mut rng), 0);
    assert!(genome.connections().is_empty());
    assert_eq!(genome.nodes().len(), 6);

    let mut connected = Genome::new(3, 2, &mut ledger, 1.0, true, &mut rng);
    for conn in connected.connections_mut() {
        conn.enabled = false;
    }
    assert!(!connected.add_node(&mut ledger, 50, &mut rng));
    assert!(!connected.split_connection(&mut ledger, 0));
    assert!(!connected.split_connection(&mut ledger, 10_000));
}

#[test]
fn test_mutate_weights_paths() {
    let mut rng = StdRng::seed_from_u64(15);
    let mut ledger = InnovationLedger::new();
    let mut genome = Genome::new(3, 2, &mut ledger, 0.5, true, &mut rng);
    let count = genome.connections().len();
    assert_eq!(genome.weight_init_scale(), 0.5);

    // zero probability leaves every weight alone
    let original = genome.connections().to_vec();
    assert_eq!(genome.mutate_weights(0.0, 1.0, 1.0, &mut rng), 0);
    assert_eq!(genome.connections(), original.as_slice());

    // full replacement draws from the init range
    for conn in genome.connections_mut() {
        conn.weight = 10.0;
    }
    assert_eq!(genome.mutate_weights(1.0, 1.0, 1.0, &mut rng), count);
    let scale = genome.weight_init_scale();
    assert!(
        genome
            .connections()
            .iter()
            .all(|c| (-scale..=scale).contains(&c.weight))
    );

    // without replacement the weights are nudged, not redrawn
    for conn in genome.connections_mut() {
        conn.weight = 10.0;
    }
    assert_eq!(genome.mutate_weights(1.0, 0.0, 0.1, &mut rng), count);
    assert!(genome.connections().iter().all(|c| (c.weight - 10.0).abs() < 1.0));
    assert!(genome.connections().iter().any(|c| c.weight != 10.0));
}

#[test]
fn test_disable_connection_turns_off_exactly_one() {
    let mut rng = StdRng::seed_from_u64(19);
    let mut ledger = InnovationLedger::new();
    let mut genome = Genome::new(3, 2, &mut ledger, 1.0, true, &mut rng);
    let total = genome.connections().len();
    genome.think(&ramp_inputs(3), sigmoid);
    assert!(!genome.is_topology_dirty());

    assert!(genome.disable_connection(&mut rng));
    assert_eq!(genome.enabled_connections().count(), total - 1);
    assert_eq!(genome.connections().len(), total);
    assert!(genome.is_topology_dirty());

    for _ in 1..total {
        assert!(genome.disable_connection(&mut rng));
    }
    assert_eq!(genome.enabled_connections().count(), 0);
    assert!(!genome.disable_connection(&mut rng));
}

#[test]
fn test_topology_cache_goes_dirty_on_change() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut ledger = InnovationLedger::new();
    let mut genome = Genome::new(2, 2, &mut ledger, 1.0, true, &mut rng);
    assert!(genome.is_topology_dirty());

    genome.think(&ramp_inputs(2), sigmoid);
    assert!(!genome.is_topology_dirty());

    assert!(genome.split_connection(&mut ledger, 0));
    assert!(genome.is_topology_dirty());
    let order = genome.topological_order().to_vec();
    assert_eq!(order.len(), genome.nodes().len());
    assert!(!genome.is_topology_dirty());
}

#[test]
fn test_mutated_networks_match_reference_evaluation() {
    let params = aggressive_mutation();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ledger = InnovationLedger::new();
        let mut genome = Genome::new(4, 3, &mut ledger, 1.0, true, &mut rng);
        for _ in 0..25 {
            genome.mutate(&mut ledger, &params, &mut rng);
        }

        let inputs = ramp_inputs(4);
        let expected = reference_outputs(&genome, &inputs, sigmoid);
        let actual = genome.think(&inputs, sigmoid);
        for (e, a) in expected.iter().zip(actual.iter()) {
            assert!((e - a).abs() < 1e-5, "seed {seed}: {e} vs {a}");
        }
    }
}

#[test]
fn test_clone_is_independent() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut ledger = InnovationLedger::new();
    let parent = Genome::new(3, 2, &mut ledger, 1.0, true, &mut rng);
    let mut child = parent.clone();

    assert!(child.split_connection(&mut ledger, 0));
    child.connections_mut()[1].weight = 42.0;

    assert_eq!(parent.nodes().len(), 1 + 3 + 2);
    assert!(parent.connections()[0].enabled);
    assert_ne!(parent.connections()[1].weight, 42.0);
}

#[test]
fn test_genome_serde_keeps_structure() {
    let mut rng = StdRng::seed_from_u64(23);
    let mut ledger = InnovationLedger::new();
    let mut genome = Genome::new(3, 2, &mut ledger, 1.0, true, &mut rng);
    for _ in 0..10 {
        genome.mutate(&mut ledger, &aggressive_mutation(), &mut rng);
    }
    let inputs = ramp_inputs(3);
    let expected = genome.think(&inputs, sigmoid);

    let json = serde_json::to_string(&genome).unwrap();
    let mut restored: Genome = serde_json::from_str(&json).unwrap();
    assert!(restored.is_topology_dirty());
    assert!(restored.is_consistent());
    assert_eq!(restored.connections(), genome.connections());
    assert_eq!(restored.think(&inputs, sigmoid), expected);

    let ledger_json = serde_json::to_string(&ledger).unwrap();
    let restored_ledger: InnovationLedger = serde_json::from_str(&ledger_json).unwrap();
    assert_eq!(restored_ledger, ledger);
}

proptest! {
    #[test]
    fn prop_connections_point_to_higher_layers(seed in any::<u64>(), rounds in 1usize..40) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ledger = InnovationLedger::new();
        let mut genome = Genome::new(3, 2, &mut ledger, 1.0, seed % 2 == 0, &mut rng);
        let params = aggressive_mutation();

        for _ in 0..rounds {
            genome.mutate(&mut ledger, &params, &mut rng);
            let nodes = genome.nodes();
            for conn in genome.connections() {
                prop_assert!(nodes[conn.source].layer < nodes[conn.target].layer);
            }
        }
        prop_assert!(genome.is_consistent());
    }
}
