//! Error types for grid construction and rebuild.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid grid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("rebuild received {count} objects but the grid holds at most {max_objects}")]
    CapacityExceeded { count: usize, max_objects: usize },

    #[error("object {index} at ({x}, {y}) lies outside the {width}x{height} grid domain")]
    OutOfBounds {
        index: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

pub type Result<T> = std::result::Result<T, GridError>;
