//! Particle state for the 2D fluid

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use particle_grid::GridObject;

/// A point mass with a per-step force accumulator
///
/// Laid out `repr(C)` without padding so a slice of particles can be handed to a
/// renderer with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position in the domain
    pub position: DVec2,
    /// Velocity vector
    pub velocity: DVec2,
    /// Force accumulated during the current step, cleared by `apply_force`
    pub force: DVec2,
    /// Mass of the particle (> 0)
    pub mass: f64,
}

impl Particle {
    pub fn new(position: DVec2, velocity: DVec2, mass: f64) -> Self {
        Self {
            position,
            velocity,
            force: DVec2::ZERO,
            mass,
        }
    }

    /// A motionless particle
    pub fn at_rest(position: DVec2, mass: f64) -> Self {
        Self::new(position, DVec2::ZERO, mass)
    }

    /// Fold the accumulated force into velocity and clear the accumulator.
    ///
    /// The force is not divided by mass: external terms such as gravity are
    /// pre-scaled by mass when they are accumulated.
    pub fn apply_force(&mut self, dt: f64) {
        self.velocity += self.force * dt;
        self.force = DVec2::ZERO;
    }

    pub fn update_position(&mut self, dt: f64) {
        self.position += self.velocity * dt;
    }
}

impl GridObject for Particle {
    fn grid_position(&self) -> DVec2 {
        self.position
    }
}
