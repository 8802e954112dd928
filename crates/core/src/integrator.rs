use crate::{OdeProblem, TimeGrid, Trajectory};

/// A numerical method that solves an [`OdeProblem`] on a [`TimeGrid`].
///
/// Given an initial state at `grid.start()`, an integrator returns a
/// [`Trajectory`] with exactly one row per grid time. Internal stepping
/// between grid times is up to the implementation.
///
/// Implementing this trait lets callers swap methods (for example an adaptive
/// embedded Runge–Kutta pair for a fixed-step one) without changing the model
/// that supplies the derivative.
pub trait Integrator {
    /// The error type returned if integration fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Integrates `problem` from `initial` over `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the problem fails, if the derivative is not
    /// finite, or if the method cannot reach the end of the grid.
    fn integrate<P: OdeProblem>(
        &self,
        problem: &P,
        initial: &[f64],
        grid: &TimeGrid,
    ) -> Result<Trajectory, Self::Error>;
}
