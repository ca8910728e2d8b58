//! Simulation parameters, fixed at construction

use glam::DVec2;
use particle_physics::{
    Bounds, ForceKernel, CELL_SIZE, DRAG, GRAVITY, INTERACTION_RADIUS, REFLECTION_DAMPING,
    TIMESTEP,
};

use crate::error::{Result, SimulationError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    // Domain and grid
    pub width: f64,
    pub height: f64,
    /// Smaller cells scan fewer candidates per radius but cost more to clear
    pub cell_size: f64,
    /// Hard cap on the number of particles handed to a step
    pub max_objects: usize,

    // Forces
    pub interaction_radius: f64,
    pub kernel: ForceKernel,
    /// Added to every particle's force as `gravity * mass`
    pub gravity: DVec2,
    /// Linear drag, added as `-velocity * drag`
    pub drag: f64,

    // Integration
    pub timestep: f64,
    /// Velocity scale on wall reflection
    pub damping_factor: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            cell_size: CELL_SIZE,
            max_objects: 100_000,
            interaction_radius: INTERACTION_RADIUS,
            kernel: ForceKernel::default(),
            gravity: DVec2::new(0.0, GRAVITY),
            drag: DRAG,
            timestep: TIMESTEP,
            damping_factor: REFLECTION_DAMPING,
        }
    }
}

impl SimulationParams {
    /// Check the force and integration fields. Domain and grid fields are
    /// checked when the grid is built.
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(invalid(format!(
                "timestep must be positive and finite, got {}",
                self.timestep
            )));
        }
        if !(self.interaction_radius.is_finite() && self.interaction_radius > 0.0) {
            return Err(invalid(format!(
                "interaction_radius must be positive and finite, got {}",
                self.interaction_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(invalid(format!(
                "damping_factor must lie in [0, 1], got {}",
                self.damping_factor
            )));
        }
        if !(self.drag.is_finite() && self.drag >= 0.0) {
            return Err(invalid(format!(
                "drag must be non-negative and finite, got {}",
                self.drag
            )));
        }
        if !self.gravity.is_finite() {
            return Err(invalid(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

fn invalid(message: String) -> SimulationError {
    SimulationError::InvalidParameter(message)
}
