use thiserror::Error;

/// Configuration for the fixed-step RK4 integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    substeps: usize,
}

/// Errors that can occur when validating an RK4 config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("substeps must be at least 1")]
    Substeps,
}

impl Default for Config {
    fn default() -> Self {
        Self { substeps: 1 }
    }
}

impl Config {
    /// Creates a config that takes `substeps` equal steps per grid interval.
    ///
    /// # Errors
    ///
    /// Returns an error if `substeps` is zero.
    pub fn new(substeps: usize) -> Result<Self, ConfigError> {
        if substeps == 0 {
            return Err(ConfigError::Substeps);
        }
        Ok(Self { substeps })
    }

    /// Returns the number of steps taken between consecutive grid times.
    #[must_use]
    pub fn substeps(&self) -> usize {
        self.substeps
    }
}
