#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::f32::consts::PI;

use geo::Coord;
use petri::simulation::contacts::CircleId;
use petri::simulation::neat::{Genome, InnovationLedger};
use petri::simulation::organism::Organism;
use petri::simulation::params::Params;
use petri::simulation::reproduction::{can_divide, divide};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn make_parent(params: &Params, area: f32, ledger: &mut InnovationLedger, rng: &mut StdRng) -> Organism {
    let brain = Genome::new(
        params.brain_inputs(),
        params.brain_outputs(),
        ledger,
        params.weight_init_scale,
        true,
        rng,
    );
    let mut parent = Organism::new(
        CircleId(1),
        Coord { x: 3.0, y: -2.0 },
        0.7,
        area,
        brain,
        params,
        1.5,
    );
    parent.generation = 4;
    parent.signal = [0.2, 0.4, 0.6];
    parent
}

#[test]
fn test_division_conserves_area_and_mirrors_child() {
    let params = Params::default();
    let mut rng = StdRng::seed_from_u64(42);
    let mut ledger = InnovationLedger::new();
    let mut parent = make_parent(&params, 8.0, &mut ledger, &mut rng);
    let origin = parent.pos;
    let heading = parent.rot;
    let pre_area = parent.area();

    assert!(can_divide(&parent, &params));
    let child = divide(&mut parent, CircleId(2), &mut ledger, &params, 10.0, &mut rng)
        .expect("division should succeed");

    assert!((parent.area() + child.area() - pre_area).abs() < 1e-4);
    assert!((parent.area() - child.area()).abs() < 1e-5);

    // parent moved forward by the new radius, child sits mirrored behind
    let forward = Coord {
        x: heading.cos(),
        y: heading.sin(),
    };
    let expected_parent = origin + forward * parent.radius;
    let expected_child = origin - forward * parent.radius;
    assert!((parent.pos.x - expected_parent.x).abs() < 1e-5);
    assert!((parent.pos.y - expected_parent.y).abs() < 1e-5);
    assert!((child.pos.x - expected_child.x).abs() < 1e-5);
    assert!((child.pos.y - expected_child.y).abs() < 1e-5);
    assert!((child.rot - (heading + PI)).abs() < 1e-6);
    assert_eq!(child.id, CircleId(2));
}

#[test]
fn test_division_lineage_bookkeeping() {
    let params = Params::default();
    let mut rng = StdRng::seed_from_u64(43);
    let mut ledger = InnovationLedger::new();
    let mut parent = make_parent(&params, 8.0, &mut ledger, &mut rng);

    let child = divide(&mut parent, CircleId(2), &mut ledger, &params, 10.0, &mut rng)
        .expect("division should succeed");

    assert_eq!(parent.generation, 5);
    assert_eq!(child.generation, 5);
    assert_eq!(child.creation_time, 1.5);
    assert_eq!(parent.creation_time, 1.5);
    assert_eq!(parent.last_division_time, 10.0);
    assert_eq!(child.last_division_time, 10.0);
    assert_eq!(child.lineage_age(12.0), 10.5);
    assert_eq!(child.time_since_division(12.0), 2.0);
    assert_eq!(child.signal, parent.signal);
    assert!(child.memory.iter().all(|&m| m == 0.0));
    assert!(child.is_alive());
}

#[test]
fn test_division_clones_genome_before_mutation() {
    let mut params = Params::default();
    params.mutation_rounds = 0;
    let mut rng = StdRng::seed_from_u64(44);
    let mut ledger = InnovationLedger::new();
    let mut parent = make_parent(&params, 8.0, &mut ledger, &mut rng);
    let original = parent.brain.connections().to_vec();

    let mut child = divide(&mut parent, CircleId(2), &mut ledger, &params, 1.0, &mut rng)
        .expect("division should succeed");
    assert_eq!(child.brain.connections(), original.as_slice());
    assert_eq!(parent.brain.connections(), original.as_slice());

    // later changes to one lineage never leak into the other
    assert!(child.brain.split_connection(&mut ledger, 0));
    assert_eq!(parent.brain.connections(), original.as_slice());
}

#[test]
fn test_division_mutates_lineages_independently() {
    let mut params = Params::default();
    params.mutation_rounds = 3;
    params.reproduction_mutation.weight_prob = 1.0;
    let mut rng = StdRng::seed_from_u64(45);
    let mut ledger = InnovationLedger::new();
    let mut parent = make_parent(&params, 8.0, &mut ledger, &mut rng);

    let child = divide(&mut parent, CircleId(2), &mut ledger, &params, 1.0, &mut rng)
        .expect("division should succeed");
    let differs = parent
        .brain
        .connections()
        .iter()
        .zip(child.brain.connections())
        .any(|(a, b)| a.weight != b.weight);
    assert!(differs);
}

#[test]
fn test_division_below_floor_is_a_noop() {
    let params = Params::default();
    let mut rng = StdRng::seed_from_u64(46);
    let mut ledger = InnovationLedger::new();
    // the half would not exceed the floor
    let mut parent = make_parent(&params, 1.99 * params.minimum_area, &mut ledger, &mut rng);
    let before = parent.clone();
    let last_id = ledger.last_id();

    assert!(divide(&mut parent, CircleId(2), &mut ledger, &params, 10.0, &mut rng).is_none());

    assert_eq!(parent.pos, before.pos);
    assert_eq!(parent.radius, before.radius);
    assert_eq!(parent.vel, before.vel);
    assert_eq!(parent.generation, before.generation);
    assert_eq!(parent.last_division_time, before.last_division_time);
    assert_eq!(parent.brain.connections(), before.brain.connections());
    assert_eq!(ledger.last_id(), last_id);
}
