//! # Particle Grid
//!
//! Uniform 2D spatial grid for short-range neighbor search. The grid is rebuilt
//! from scratch every step with a counting sort, after which particles sit in a
//! contiguous buffer grouped by cell and neighbor pairs can be enumerated
//! exactly once each.

pub mod error;
pub mod grid;

pub use error::*;
pub use grid::*;
