use thiserror::Error;

/// Configuration for the adaptive Dormand–Prince integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    abs_tol: f64,
    rel_tol: f64,
    min_step: f64,
    max_steps: usize,
    initial_step: Option<f64>,
}

/// Errors that can occur when validating a Dormand–Prince config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("abs_tol must be finite and non-negative")]
    AbsTol,

    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("abs_tol and rel_tol cannot both be zero")]
    ZeroTolerance,

    #[error("min_step must be finite and positive")]
    MinStep,

    #[error("max_steps must be at least 1")]
    MaxSteps,

    #[error("initial_step must be finite and positive")]
    InitialStep,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-10, 1e-10).unwrap()
    }
}

impl Config {
    /// Creates a config with the given tolerances and default step limits.
    ///
    /// The defaults are a minimum step of `1e-14` and a budget of five million
    /// accepted or rejected steps.
    ///
    /// # Errors
    ///
    /// Returns an error if either tolerance is negative or non-finite, or if
    /// both are zero.
    pub fn new(abs_tol: f64, rel_tol: f64) -> Result<Self, ConfigError> {
        if !abs_tol.is_finite() || abs_tol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if !rel_tol.is_finite() || rel_tol < 0.0 {
            return Err(ConfigError::RelTol);
        }
        if abs_tol == 0.0 && rel_tol == 0.0 {
            return Err(ConfigError::ZeroTolerance);
        }

        Ok(Self {
            abs_tol,
            rel_tol,
            min_step: 1e-14,
            max_steps: 5_000_000,
            initial_step: None,
        })
    }

    /// Sets the smallest step the controller may take before giving up.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_step` is not finite and positive.
    pub fn with_min_step(mut self, min_step: f64) -> Result<Self, ConfigError> {
        if !min_step.is_finite() || min_step <= 0.0 {
            return Err(ConfigError::MinStep);
        }
        self.min_step = min_step;
        Ok(self)
    }

    /// Sets the total number of attempted steps allowed in one integration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_steps` is zero.
    pub fn with_max_steps(mut self, max_steps: usize) -> Result<Self, ConfigError> {
        if max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }
        self.max_steps = max_steps;
        Ok(self)
    }

    /// Fixes the first trial step instead of estimating it.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial_step` is not finite and positive.
    pub fn with_initial_step(mut self, initial_step: f64) -> Result<Self, ConfigError> {
        if !initial_step.is_finite() || initial_step <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        self.initial_step = Some(initial_step);
        Ok(self)
    }

    /// Returns the absolute error tolerance.
    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    /// Returns the relative error tolerance.
    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Returns the minimum step size.
    #[must_use]
    pub fn min_step(&self) -> f64 {
        self.min_step
    }

    /// Returns the maximum number of attempted steps.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns the fixed first step, if one was set.
    #[must_use]
    pub fn initial_step(&self) -> Option<f64> {
        self.initial_step
    }
}
