//! Explicit Euler integration with damped wall reflection

use glam::DVec2;

use crate::particle::Particle;

/// Rectangular domain `[0, width] x [0, height]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: DVec2) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrator {
    pub timestep: f64,
    pub bounds: Bounds,
    /// Velocity scale applied on reflection
    pub damping: f64,
}

impl Integrator {
    pub fn new(timestep: f64, bounds: Bounds, damping: f64) -> Self {
        Self {
            timestep,
            bounds,
            damping,
        }
    }

    /// Apply the accumulated force, move, then bounce off the walls
    pub fn step(&self, particle: &mut Particle) {
        particle.apply_force(self.timestep);
        particle.update_position(self.timestep);
        self.reflect(particle);
    }

    /// Mirror a particle that left the domain back inside, reversing and
    /// damping the velocity on each crossed axis
    pub fn reflect(&self, particle: &mut Particle) {
        reflect_axis(
            &mut particle.position.x,
            &mut particle.velocity.x,
            self.bounds.width,
            self.damping,
        );
        reflect_axis(
            &mut particle.position.y,
            &mut particle.velocity.y,
            self.bounds.height,
            self.damping,
        );
    }
}

fn reflect_axis(position: &mut f64, velocity: &mut f64, extent: f64, damping: f64) {
    if *position > extent {
        *position = 2.0 * extent - *position;
        *velocity = -*velocity * damping;
    }
    if *position < 0.0 {
        *position = -*position;
        *velocity = -*velocity * damping;
    }
}
