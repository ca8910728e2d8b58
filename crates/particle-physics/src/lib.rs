//! # Particle Physics
//!
//! Particle state, the short-range pairwise force kernels, and the explicit
//! integrator with boundary reflection for the 2D particle fluid.

pub mod constants;
pub mod forces;
pub mod integrator;
pub mod particle;

pub use constants::*;
pub use forces::*;
pub use integrator::*;
pub use particle::*;
