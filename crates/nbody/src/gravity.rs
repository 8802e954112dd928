use thiserror::Error;

use crate::Vec2;

/// Physical constants for Newtonian gravity.
///
/// Each [`System`](crate::System) carries its own config, so systems with
/// different unit conventions can be simulated side by side.
///
/// Pairs of bodies closer than the coincidence threshold exert no force on
/// each other. This keeps accelerations finite when bodies (nearly) overlap,
/// at the cost of under-counting the force during near collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityConfig {
    gravitational_constant: f64,
    coincidence_threshold: f64,
}

/// Errors that can occur when validating a gravity config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("gravitational_constant must be finite and positive")]
    GravitationalConstant,

    #[error("coincidence_threshold must be finite and positive")]
    CoincidenceThreshold,
}

impl Default for GravityConfig {
    /// `G = 1` with a coincidence threshold of `1e-6`.
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1.0, 1e-6).unwrap()
    }
}

impl GravityConfig {
    /// Creates a config with validated constants.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is non-finite or not positive.
    pub fn new(gravitational_constant: f64, coincidence_threshold: f64) -> Result<Self, ConfigError> {
        if !gravitational_constant.is_finite() || gravitational_constant <= 0.0 {
            return Err(ConfigError::GravitationalConstant);
        }
        if !coincidence_threshold.is_finite() || coincidence_threshold <= 0.0 {
            return Err(ConfigError::CoincidenceThreshold);
        }

        Ok(Self {
            gravitational_constant,
            coincidence_threshold,
        })
    }

    /// Returns the gravitational constant `G`.
    #[must_use]
    pub fn gravitational_constant(&self) -> f64 {
        self.gravitational_constant
    }

    /// Returns the separation below which a pair is skipped.
    #[must_use]
    pub fn coincidence_threshold(&self) -> f64 {
        self.coincidence_threshold
    }

    /// Acceleration of a body at `at` due to a mass `mass` at `source`.
    ///
    /// Returns `None` when the separation is below the coincidence threshold.
    #[must_use]
    pub fn acceleration(&self, at: Vec2, source: Vec2, mass: f64) -> Option<Vec2> {
        let r = source - at;
        let d = r.norm();
        if d < self.coincidence_threshold {
            return None;
        }
        Some(r * (self.gravitational_constant * mass / (d * d * d)))
    }
}
