use electrostatics_core::{Charge, FieldConfig, FieldEngine};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::{Duration, Instant};

fn create_charges(count: usize, extent: f64, seed: u64) -> Vec<Charge> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let half = extent / 2.0;
    (0..count)
        .map(|_| {
            Charge::nanocoulombs(
                rng.random_range(-5.0..5.0),
                rng.random_range(-half..half),
                rng.random_range(-half..half),
            )
        })
        .collect()
}

fn time_evaluations(engine: &FieldEngine, repeats: u32) -> Duration {
    let start = Instant::now();
    for _ in 0..repeats {
        std::hint::black_box(engine.evaluate_grid());
    }
    start.elapsed() / repeats
}

fn main() {
    let num_charges = 32;
    let repeats = 5;
    let base = FieldConfig {
        charges: create_charges(num_charges, 10.0, 42),
        ..FieldConfig::default()
    };
    println!(
        "Benchmarking evaluate_grid with {} charges, {} repeats per resolution",
        num_charges, repeats
    );

    for resolution in [30, 100, 300, 1000] {
        let serial = FieldEngine::new(FieldConfig {
            grid_resolution: resolution,
            parallel: false,
            ..base.clone()
        });
        let parallel = FieldEngine::new(FieldConfig {
            grid_resolution: resolution,
            parallel: true,
            ..base.clone()
        });

        let serial_time = time_evaluations(&serial, repeats);
        let parallel_time = time_evaluations(&parallel, repeats);
        let speedup = serial_time.as_secs_f64() / parallel_time.as_secs_f64().max(f64::EPSILON);

        println!(
            "resolution {:>5} ({:>8} points): serial {:?}, parallel {:?}, speedup {:.2}x",
            resolution,
            resolution * resolution,
            serial_time,
            parallel_time,
            speedup
        );
    }
}
