//! Headless 2D Particle Fluid
//!
//! Drives the simulation the way an interactive front end would: spawn from an
//! emitter, cull anything that left the domain, step, repeat. Progress is
//! reported through the logger instead of a window.

use std::time::{Duration, Instant};

use glam::DVec2;
use particle_physics::{Particle, PARTICLE_MASS};
use particle_simulation::{ParticleSimulation, SimulationParams, StepStats};
use rand::Rng;

const TICKS: u64 = 600;
const SPAWN_PER_TICK: usize = 2;
const EMITTER_POSITION: DVec2 = DVec2::new(32.0, 48.0);
const EMITTER_RADIUS: f64 = 10.0;
const EMITTER_VELOCITY: DVec2 = DVec2::new(32.0, 0.0);
const VELOCITY_JITTER: f64 = 1.0;
const REPORT_INTERVAL: u64 = 60;

/// Uniform sample from the unit disc by rejection
fn random_in_unit_disc(rng: &mut impl Rng) -> DVec2 {
    loop {
        let v = DVec2::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

/// Emit up to `SPAWN_PER_TICK` particles, respecting the simulation capacity
fn spawn(particles: &mut Vec<Particle>, max_objects: usize, rng: &mut impl Rng) -> usize {
    let room = max_objects.saturating_sub(particles.len());
    let count = SPAWN_PER_TICK.min(room);
    if count < SPAWN_PER_TICK {
        log::warn!(
            "particle cap of {} reached, spawning {} of {}",
            max_objects,
            count,
            SPAWN_PER_TICK
        );
    }

    for _ in 0..count {
        let position = EMITTER_POSITION + random_in_unit_disc(rng) * EMITTER_RADIUS;
        let velocity = EMITTER_VELOCITY + random_in_unit_disc(rng) * VELOCITY_JITTER;
        particles.push(Particle::new(position, velocity, PARTICLE_MASS));
    }
    count
}

fn report(stats: &StepStats, window: &[Duration]) {
    let mean = window.iter().sum::<Duration>() / window.len().max(1) as u32;
    log::info!(
        "tick {:>4}: {:>6} particles, {:>7} candidate pairs, {:>7} interacting, step {:.3} ms",
        stats.step,
        stats.particles,
        stats.candidate_pairs,
        stats.interacting_pairs,
        mean.as_secs_f64() * 1000.0
    );
}

fn main() {
    // Initialize logger (RUST_LOG=debug for per-step output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting headless particle fluid simulation...");

    let params = SimulationParams::default();
    let mut simulation = match ParticleSimulation::new(params) {
        Ok(simulation) => simulation,
        Err(err) => {
            log::error!("Failed to create simulation: {err}");
            std::process::exit(1);
        }
    };

    let mut rng = rand::rng();
    let mut particles: Vec<Particle> = Vec::with_capacity(params.max_objects);
    let mut step_times = Vec::with_capacity(REPORT_INTERVAL as usize);
    let mut spawned = 0;
    let mut culled = 0;
    let mut degenerate = 0;
    let started = Instant::now();

    for tick in 0..TICKS {
        spawned += spawn(&mut particles, params.max_objects, &mut rng);
        culled += simulation.retain_in_domain(&mut particles);

        let step_start = Instant::now();
        let stats = match simulation.step(&mut particles) {
            Ok(stats) => stats,
            Err(err) => {
                log::error!("Step {tick} failed: {err}");
                std::process::exit(1);
            }
        };
        step_times.push(step_start.elapsed());
        degenerate += stats.degenerate_pairs;

        if (tick + 1) % REPORT_INTERVAL == 0 {
            report(&stats, &step_times);
            step_times.clear();
        }
    }

    log::info!(
        "✓ Ran {} ticks in {:.2?}: {} spawned, {} culled, {} alive, {} degenerate pairs skipped",
        simulation.steps_taken(),
        started.elapsed(),
        spawned,
        culled,
        particles.len(),
        degenerate
    );
}
