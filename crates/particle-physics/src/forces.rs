//! Short-range pairwise force kernels
//!
//! A kernel is evaluated once per unordered pair. The returned force acts on the
//! first particle; the second receives the negation.

use std::f64::consts::PI;

use glam::DVec2;

use crate::constants::*;

/// Outcome of evaluating a kernel for one pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    /// Force on the first particle
    Force(DVec2),
    /// Coincident positions, direction undefined. The pair contributes nothing.
    Degenerate,
    /// Separation at or beyond the cutoff
    OutOfRange,
}

impl Interaction {
    pub fn force(&self) -> Option<DVec2> {
        match self {
            Interaction::Force(force) => Some(*force),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ForceKernel {
    /// `cos(π d / (2/3 R)) / d * strength` along the separation.
    /// Repulsive below R/3, attractive between R/3 and R.
    Cosine { strength: f64 },
    /// `k1 / d^m - k2 / d^n` along the separation
    LennardJones { k1: f64, k2: f64, m: f64, n: f64 },
}

impl Default for ForceKernel {
    fn default() -> Self {
        ForceKernel::Cosine {
            strength: FORCE_STRENGTH,
        }
    }
}

impl ForceKernel {
    pub fn lennard_jones() -> Self {
        ForceKernel::LennardJones {
            k1: LJ_K1,
            k2: LJ_K2,
            m: LJ_M,
            n: LJ_N,
        }
    }

    /// Evaluate the kernel for particles at `p1` and `p2`
    pub fn interact(&self, p1: DVec2, p2: DVec2, max_distance: f64) -> Interaction {
        let offset = p1 - p2;
        let d = offset.length();

        // Also catches NaN separations
        if !(d < max_distance) {
            return Interaction::OutOfRange;
        }
        if d == 0.0 {
            return Interaction::Degenerate;
        }

        let direction = offset / d;
        let magnitude = match *self {
            ForceKernel::Cosine { strength } => {
                (PI * d / (KERNEL_PERIOD_FRACTION * max_distance)).cos() * (1.0 / d) * strength
            }
            ForceKernel::LennardJones { k1, k2, m, n } => k1 / d.powf(m) - k2 / d.powf(n),
        };

        Interaction::Force(direction * magnitude)
    }
}

/// Cosine kernel with the default strength
pub fn pairwise_force(p1: DVec2, p2: DVec2, max_distance: f64) -> Interaction {
    ForceKernel::default().interact(p1, p2, max_distance)
}
