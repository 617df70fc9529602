#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use geo::Coord;
use petri::simulation::contacts::{CircleId, EdibleKind};
use petri::simulation::food::Pellet;
use petri::simulation::locatable::{Damping, Locatable};
use petri::simulation::neat::{Genome, InnovationLedger};
use petri::simulation::organism::Organism;
use petri::simulation::params::Params;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_pellet_locatable() {
    let mut pellet = Pellet::new(
        CircleId(3),
        Coord { x: 10.0, y: 20.0 },
        0.3,
        EdibleKind::Food,
    );

    // Test pos accessor
    assert_eq!(pellet.pos(), Coord { x: 10.0, y: 20.0 });

    // A resting pellet stays put
    pellet.update(1.0);
    assert_eq!(pellet.pos(), Coord { x: 10.0, y: 20.0 });

    // Test pos_mut accessor
    pellet.pos_mut().x = 15.0;
    assert_eq!(pellet.pos().x, 15.0);
}

#[test]
fn test_boost_particle_slows_down() {
    let mut particle = Pellet::boost_particle(
        CircleId(4),
        Coord { x: 0.0, y: 0.0 },
        Coord { x: 2.0, y: 0.0 },
        0.002,
        [0.5, 0.5, 0.5],
        5.0,
    );

    particle.update(0.1);
    assert!((particle.pos.x - 0.2).abs() < 1e-6);
    assert!((particle.vel.x - 2.0 * Damping::decay(5.0, 0.1)).abs() < 1e-6);
    assert!(particle.vel.x < 2.0);
    assert_eq!(particle.vel.y, 0.0);
}

#[test]
fn test_locatable_trait_polymorphism() {
    let pellet = Pellet::new(
        CircleId(1),
        Coord { x: 5.0, y: 5.0 },
        0.3,
        EdibleKind::Toxic,
    );
    let other = Pellet::new(
        CircleId(2),
        Coord { x: 10.0, y: 10.0 },
        0.3,
        EdibleKind::Division,
    );

    // We can work with them through the trait
    fn get_distance(a: &dyn Locatable, b: &dyn Locatable) -> f32 {
        let d = a.pos() - b.pos();
        (d.x * d.x + d.y * d.y).sqrt()
    }

    let distance = get_distance(&pellet, &other);
    assert!((distance - 7.071).abs() < 0.01);
}

#[test]
fn test_is_outside_needs_whole_disc_out() {
    let mut pellet = Pellet::new(CircleId(1), Coord { x: 0.0, y: 0.0 }, 1.0, EdibleKind::Food);
    let r = pellet.radius();

    pellet.pos_mut().x = 50.0;
    assert!(!pellet.is_outside(50.0));
    pellet.pos_mut().x = 50.0 + 0.5 * r;
    assert!(!pellet.is_outside(50.0));
    pellet.pos_mut().x = 50.0 + 1.5 * r;
    assert!(pellet.is_outside(50.0));
}

#[test]
fn test_organism_locatable_update() {
    let params = Params::default();
    let mut rng = StdRng::seed_from_u64(0);
    let mut ledger = InnovationLedger::new();
    let brain = Genome::new(
        params.brain_inputs(),
        params.brain_outputs(),
        &mut ledger,
        1.0,
        false,
        &mut rng,
    );
    let mut organism = Organism::new(
        CircleId(0),
        Coord { x: 10.0, y: 20.0 },
        0.0,
        params.creature_area,
        brain,
        &params,
        0.0,
    );

    // Test pos accessor
    assert_eq!(organism.pos(), Coord { x: 10.0, y: 20.0 });

    organism.vel = Coord { x: 1.0, y: 0.0 };
    organism.angular_vel = 0.5;

    // Test update through Locatable trait
    organism.update(1.0);
    assert_eq!(organism.pos(), Coord { x: 11.0, y: 20.0 });
    assert_eq!(organism.rot, 0.5);

    // Damping halves the velocity for dt = 1 and rate = 1
    assert_eq!(organism.vel.x, 0.5);
    assert_eq!(organism.angular_vel, 0.25);

    organism.update(0.5);
    assert_eq!(organism.pos().x, 11.25);
}
