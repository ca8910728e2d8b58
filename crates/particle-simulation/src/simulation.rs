//! CPU particle simulation manager
//!
//! One step is rebuild, pairwise forces, integration, copy-back, in that order.
//! Each phase runs to completion before the next starts. The particles come back
//! in grid order, so slot indices are not stable across steps.

use particle_grid::SpatialGrid;
use particle_physics::{Integrator, Interaction, Particle};

use crate::error::Result;
use crate::params::SimulationParams;

/// Counters for a single step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub step: u64,
    pub particles: usize,
    /// Pairs produced by the grid traversal
    pub candidate_pairs: usize,
    /// Candidate pairs inside the interaction radius
    pub interacting_pairs: usize,
    /// Pairs skipped because both particles share a position
    pub degenerate_pairs: usize,
}

pub struct ParticleSimulation {
    params: SimulationParams,
    grid: SpatialGrid<Particle>,
    integrator: Integrator,
    steps_taken: u64,
}

impl ParticleSimulation {
    pub fn new(params: SimulationParams) -> Result<Self> {
        log::info!("Initializing ParticleSimulation...");
        params.validate()?;

        let grid = SpatialGrid::new(
            params.width,
            params.height,
            params.cell_size,
            params.max_objects,
        )?;
        let integrator = Integrator::new(params.timestep, params.bounds(), params.damping_factor);

        log::info!(
            "  interaction radius {} ({} cell stencil), dt {:.5}, kernel {:?}",
            params.interaction_radius,
            grid.stencil_radius(params.interaction_radius),
            params.timestep,
            params.kernel
        );

        Ok(Self {
            params,
            grid,
            integrator,
            steps_taken: 0,
        })
    }

    /// Advance `particles` by one timestep.
    ///
    /// Every particle must already lie inside the domain; use
    /// [`ParticleSimulation::retain_in_domain`] first if that is not guaranteed.
    /// Any force already present in a particle's accumulator is applied along with
    /// the forces computed here. On success `particles` holds the updated state in
    /// grid order. On error `particles` is left untouched.
    pub fn step(&mut self, particles: &mut [Particle]) -> Result<StepStats> {
        self.grid.rebuild(particles)?;

        let mut stats = StepStats {
            step: self.steps_taken,
            particles: particles.len(),
            ..Default::default()
        };

        let radius = self.params.interaction_radius;
        let kernel = self.params.kernel;
        self.grid.for_each_pair(radius, |i, j, a, b| {
            stats.candidate_pairs += 1;
            match kernel.interact(a.position, b.position, radius) {
                Interaction::Force(force) => {
                    a.force += force;
                    b.force -= force;
                    stats.interacting_pairs += 1;
                }
                Interaction::Degenerate => {
                    stats.degenerate_pairs += 1;
                    log::trace!("skipping coincident particles in slots {} and {}", i, j);
                }
                Interaction::OutOfRange => {}
            }
        });

        let gravity = self.params.gravity;
        let drag = self.params.drag;
        let integrator = self.integrator;
        self.grid.for_each_ordered_mut(|_, particle| {
            particle.force += gravity * particle.mass;
            particle.force -= particle.velocity * drag;
            integrator.step(particle);
        });

        self.grid
            .for_each_ordered(|slot, particle| particles[slot] = *particle);

        self.steps_taken += 1;
        log::debug!(
            "step {}: {} particles, {} candidate pairs, {} interacting, {} degenerate",
            stats.step,
            stats.particles,
            stats.candidate_pairs,
            stats.interacting_pairs,
            stats.degenerate_pairs
        );

        Ok(stats)
    }

    /// Drop particles outside the domain, returning how many were removed
    pub fn retain_in_domain(&self, particles: &mut Vec<Particle>) -> usize {
        let bounds = self.params.bounds();
        let before = particles.len();
        particles.retain(|particle| bounds.contains(particle.position));

        let removed = before - particles.len();
        if removed > 0 {
            log::debug!("culled {} particles outside the domain", removed);
        }
        removed
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Grid as left by the last step; its buffer mirrors the last output
    pub fn grid(&self) -> &SpatialGrid<Particle> {
        &self.grid
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }
}
