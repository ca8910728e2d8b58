//! # Particle Simulation Engine
//!
//! Step driver for the 2D particle fluid: rebuild the spatial grid, accumulate
//! pairwise forces over neighbor pairs, integrate, and hand the particles back
//! in grid order.

pub mod error;
pub mod params;
pub mod simulation;

pub use error::*;
pub use params::*;
pub use simulation::*;
