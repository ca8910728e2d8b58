//! Tuned constants for the 2D particle fluid
//!
//! Units are screen units: lengths in pixels, time in seconds. The values are
//! hand-tuned for a stable-looking fluid at 60 steps per second rather than
//! derived from any physical material.

/// Strength `K` of the cosine pairwise kernel
pub const FORCE_STRENGTH: f64 = 500.0;

/// Period of the cosine kernel as a fraction of the interaction radius.
/// The force is repulsive below a third of the radius and attractive beyond it.
pub const KERNEL_PERIOD_FRACTION: f64 = 2.0 / 3.0;

/// Cutoff distance for pairwise forces
pub const INTERACTION_RADIUS: f64 = 5.0;

/// Edge length of a grid cell
pub const CELL_SIZE: f64 = 4.0;

/// Downward acceleration (screen y grows downward)
pub const GRAVITY: f64 = 9.8;

/// Linear drag coefficient applied against velocity each step
pub const DRAG: f64 = 0.2;

/// Fraction of velocity kept (and reversed) when bouncing off a wall
pub const REFLECTION_DAMPING: f64 = 0.1;

/// Fixed integration step
pub const TIMESTEP: f64 = 1.0 / 60.0;

/// Default particle mass
pub const PARTICLE_MASS: f64 = 1.0;

// Lennard-Jones style kernel: (LJ_K1 / d^LJ_M - LJ_K2 / d^LJ_N)
pub const LJ_K1: f64 = 1.0;
pub const LJ_K2: f64 = 1.0;
pub const LJ_M: f64 = 4.0;
pub const LJ_N: f64 = 2.0;
