//! Error types for the step driver.

use particle_grid::GridError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("invalid simulation parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
