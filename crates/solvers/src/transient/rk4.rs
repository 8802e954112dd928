//! Classical fixed-step fourth-order Runge–Kutta integrator.
//!
//! Each grid interval `[t_i, t_{i+1}]` is split into `substeps` equal steps
//! and each step combines four derivative evaluations:
//!
//! ```text
//! k1 = f(y, t)
//! k2 = f(y + h/2 k1, t + h/2)
//! k3 = f(y + h/2 k2, t + h/2)
//! k4 = f(y + h k3,   t + h)
//! y' = y + h/6 (k1 + 2 k2 + 2 k3 + k4)
//! ```
//!
//! There is no error control, so accuracy is set entirely by the grid spacing
//! and the number of substeps.
//!
//! # Example
//!
//! ```ignore
//! use nbody_solvers::transient::rk4;
//!
//! let config = rk4::Config::new(10)?;
//! let solution = rk4::solve_unobserved(&problem, &initial, &grid, &config)?;
//! ```

mod config;
mod error;

pub use config::{Config, ConfigError};
pub use error::Error;

use log::{debug, warn};
use nbody_core::{Integrator, Observer, OdeProblem, TimeGrid, Trajectory};

use super::{Action, EvalError, Event, Solution, Stats, Status, evaluate::evaluate};

/// Integrates an ODE problem over a time grid using classical RK4.
///
/// The observer receives an [`Event`] for the initial state and for each grid
/// time reached, and may return [`Action::StopEarly`] to end the integration.
///
/// # Errors
///
/// Returns an error if `initial` does not match the problem dimension, if the
/// problem fails, or if any derivative evaluation is not finite.
pub fn solve<P, Obs>(
    problem: &P,
    initial: &[f64],
    grid: &TimeGrid,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    P: OdeProblem,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let dimension = problem.dimension();
    if initial.len() != dimension {
        return Err(Error::DimensionMismatch {
            expected: dimension,
            actual: initial.len(),
        });
    }

    let times = grid.times();
    let mut trajectory = Trajectory::with_capacity(dimension, times.len());
    let mut stats = Stats::default();
    let mut state = initial.to_vec();

    trajectory.push(times[0], &state);
    let event = Event {
        index: 0,
        t: times[0],
        state: &state,
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            trajectory,
            stats,
        });
    }

    let mut stages = Stages::new(dimension);
    #[allow(clippy::cast_precision_loss)]
    let substeps = config.substeps() as f64;

    for (interval, pair) in times.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let h = (end - start) / substeps;

        for substep in 0..config.substeps() {
            #[allow(clippy::cast_precision_loss)]
            let t = start + h * substep as f64;

            stages
                .step(problem, &mut state, t, h, &mut stats)
                .map_err(|err| {
                    let err = Error::from(err);
                    warn!("rk4 integration failed: {err}");
                    err
                })?;
            stats.accepted_steps += 1;
        }

        let index = interval + 1;
        trajectory.push(end, &state);

        let event = Event {
            index,
            t: end,
            state: &state,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            debug!("rk4 stopped by observer at t = {end}");
            return Ok(Solution {
                status: Status::StoppedByObserver,
                trajectory,
                stats,
            });
        }
    }

    debug!(
        "rk4 finished {} rows with {} evaluations",
        trajectory.len(),
        stats.evaluations
    );

    Ok(Solution {
        status: Status::Complete,
        trajectory,
        stats,
    })
}

/// Integrates an ODE problem using RK4 without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error if `initial` does not match the problem dimension, if the
/// problem fails, or if any derivative evaluation is not finite.
pub fn solve_unobserved<P: OdeProblem>(
    problem: &P,
    initial: &[f64],
    grid: &TimeGrid,
    config: &Config,
) -> Result<Solution, Error> {
    solve(problem, initial, grid, config, ())
}

/// Fixed-step RK4 as a pluggable [`Integrator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rk4 {
    config: Config,
}

impl Rk4 {
    /// Creates an integrator with the given config.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the integrator config.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Integrator for Rk4 {
    type Error = Error;

    fn integrate<P: OdeProblem>(
        &self,
        problem: &P,
        initial: &[f64],
        grid: &TimeGrid,
    ) -> Result<Trajectory, Self::Error> {
        solve_unobserved(problem, initial, grid, &self.config).map(|solution| solution.trajectory)
    }
}

/// Stage buffers reused across steps.
struct Stages {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    scratch: Vec<f64>,
}

impl Stages {
    fn new(dimension: usize) -> Self {
        Self {
            k1: vec![0.0; dimension],
            k2: vec![0.0; dimension],
            k3: vec![0.0; dimension],
            k4: vec![0.0; dimension],
            scratch: vec![0.0; dimension],
        }
    }

    /// Advances `state` from `t` to `t + h` in place.
    fn step<P: OdeProblem>(
        &mut self,
        problem: &P,
        state: &mut [f64],
        t: f64,
        h: f64,
        stats: &mut Stats,
    ) -> Result<(), EvalError<P::Error>> {
        let Self {
            k1,
            k2,
            k3,
            k4,
            scratch,
        } = self;
        let half = 0.5 * h;

        evaluate(problem, state, t, k1, stats)?;

        offset(scratch, state, half, k1);
        evaluate(problem, scratch, t + half, k2, stats)?;

        offset(scratch, state, half, k2);
        evaluate(problem, scratch, t + half, k3, stats)?;

        offset(scratch, state, h, k3);
        evaluate(problem, scratch, t + h, k4, stats)?;

        let sixth = h / 6.0;
        for (i, y) in state.iter_mut().enumerate() {
            *y += sixth * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }

        Ok(())
    }
}

/// Writes `base + h * slope` into `out`.
fn offset(out: &mut [f64], base: &[f64], h: f64, slope: &[f64]) {
    for ((o, b), s) in out.iter_mut().zip(base).zip(slope) {
        *o = b + h * s;
    }
}
