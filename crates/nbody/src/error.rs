use std::error::Error as StdError;

use nbody_core::TimeGridError;
use thiserror::Error;

use crate::ConfigError;

/// Errors returned by body and system construction and by integration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    #[error("duplicate body name `{name}` at positions {first} and {second}")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("integration failed: {0}")]
    Integration(#[source] Box<dyn StdError + Send + Sync>),
}

/// Input values rejected before any computation takes place.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ParameterError {
    #[error("mass must be finite and positive, got {0}")]
    Mass(f64),

    #[error("initial position must be finite")]
    Position,

    #[error("initial velocity must be finite")]
    Velocity,

    #[error("a system needs at least one body")]
    NoBodies,

    #[error("{0}")]
    Gravity(#[from] ConfigError),

    #[error("{0}")]
    TimeGrid(#[from] TimeGridError),
}

impl Error {
    pub(crate) fn integration<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Integration(Box::new(err))
    }
}

impl From<TimeGridError> for Error {
    fn from(err: TimeGridError) -> Self {
        Self::InvalidParameter(err.into())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::InvalidParameter(err.into())
    }
}
