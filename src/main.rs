//! Petri CLI - run a headless dish from JSON parameters.

use std::path::PathBuf;
use std::time::Instant;

use petri::simulation::ecosystem::Ecosystem;
use petri::simulation::error::PetriError;
use petri::simulation::params::Params;

/// Fixed physics step in seconds.
const DT: f32 = 1.0 / 60.0;

/// Steps run when none are given.
const DEFAULT_STEPS: u64 = 600;

fn print_usage(program: &str) {
    eprintln!("Usage: {program} <params.json|--default> [steps] [snapshot.json]");
    eprintln!();
    eprintln!("Run a petri dish simulation without a window.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  params.json    Path to simulation parameters (--default for built-ins)");
    eprintln!("  steps          Number of simulation steps (default: {DEFAULT_STEPS})");
    eprintln!("  snapshot.json  Where to save the final state (default: timestamped name)");
    eprintln!();
    eprintln!("Example parameters are printed with the --example flag.");
}

fn print_example_params() -> Result<(), PetriError> {
    println!("{}", serde_json::to_string_pretty(&Params::default())?);
    Ok(())
}

/// Parses the optional step count; anything but a positive integer is rejected.
fn parse_steps(arg: Option<&str>) -> Result<u64, String> {
    match arg {
        None => Ok(DEFAULT_STEPS),
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) | Err(_) => Err(format!("invalid step count '{raw}', expected a positive integer")),
            Ok(steps) => Ok(steps),
        },
    }
}

fn run(args: &[String], steps: u64) -> Result<(), PetriError> {
    let params = if args[1] == "--default" {
        Params::default()
    } else {
        Params::load_from_file(PathBuf::from(&args[1]))?
    };
    let snapshot = args.get(3).map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(format!(
            "petri_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    println!("Petri Dish Simulation");
    println!("=====================");
    println!("Dish radius: {}", params.petri_radius);
    println!(
        "Brain: {} inputs, {} outputs",
        params.brain_inputs(),
        params.brain_outputs()
    );
    println!("Steps: {} (dt = {:.4}s)", steps, DT);
    println!();

    let mut ecosystem = Ecosystem::new(&params)?;
    let start = Instant::now();

    for i in 0..steps {
        ecosystem.step(&params, DT)?;

        if (i + 1) % (steps / 10).max(1) == 0 {
            let elapsed = start.elapsed().as_secs_f32();
            log::info!(
                "step {}/{}: t={:.1}s creatures={} pellets={} divisions={} deaths={} max_gen={} ({:.1} steps/s)",
                i + 1,
                steps,
                ecosystem.time,
                ecosystem.population(),
                ecosystem.pellets.len(),
                ecosystem.stats.divisions,
                ecosystem.stats.deaths(),
                ecosystem.stats.max_generation,
                (i + 1) as f32 / elapsed.max(f32::EPSILON)
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Final state:");
    println!("  Creatures: {}", ecosystem.population());
    println!("  Pellets: {}", ecosystem.pellets.len());
    println!("  Innovations: {}", ecosystem.ledger.len());
    println!("  Divisions: {}", ecosystem.stats.divisions);
    println!(
        "  Deaths: {} eaten, {} poisoned, {} inactive, {} escaped",
        ecosystem.stats.eaten,
        ecosystem.stats.poisoned,
        ecosystem.stats.starved,
        ecosystem.stats.escaped
    );
    println!("  Max generation: {}", ecosystem.stats.max_generation);
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32().max(f32::EPSILON)
    );

    ecosystem.save_to_file(&snapshot)?;
    println!("Snapshot saved to {}", snapshot.display());
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let result = if args[1] == "--example" {
        print_example_params()
    } else {
        let steps = match parse_steps(args.get(2).map(String::as_str)) {
            Ok(steps) => steps,
            Err(msg) => {
                eprintln!("Error: {msg}");
                print_usage(&args[0]);
                std::process::exit(2);
            }
        };
        run(&args, steps)
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
