//! Adaptive Dormand–Prince 5(4) integrator.
//!
//! # Algorithm
//!
//! Each step evaluates seven stages, advances the state with the fifth-order
//! solution, and estimates the local error from the difference with the
//! embedded fourth-order solution. The error is measured as a root mean
//! square over components of
//!
//! ```text
//! err_i / (abs_tol + rel_tol * max(|y_i|, |y_next_i|))
//! ```
//!
//! A step is accepted when that norm is at most 1. Either way the next trial
//! step is scaled by `0.9 * norm^(-1/5)`, clamped to `[0.2, 5]` (and to at
//! most 1 right after a rejection).
//!
//! Steps are shortened to land exactly on every grid time, so the trajectory
//! holds the integrated state at each requested time without interpolation.
//!
//! # Failure
//!
//! The integration fails if the step size collapses below
//! [`Config::min_step`], if more than [`Config::max_steps`] steps are
//! attempted, or if the derivative is ever non-finite.

mod config;
mod error;
mod tableau;

pub use config::{Config, ConfigError};
pub use error::Error;

use log::{debug, trace, warn};
use nbody_core::{Integrator, Observer, OdeProblem, TimeGrid, Trajectory};

use super::{Action, EvalError, Event, Solution, Stats, Status, evaluate::evaluate};

use tableau::{
    A21, A31, A32, A41, A42, A43, A51, A52, A53, A54, A61, A62, A63, A64, A65, A71, A73, A74,
    A75, A76, C2, C3, C4, C5, E1, E3, E4, E5, E6, E7,
};

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
const ERROR_EXPONENT: f64 = 1.0 / 5.0;

/// Integrates an ODE problem over a time grid using Dormand–Prince 5(4).
///
/// The observer receives an [`Event`] for the initial state and for each grid
/// time reached, and may return [`Action::StopEarly`] to end the integration.
///
/// # Errors
///
/// Returns an error if `initial` does not match the problem dimension, if the
/// problem fails, if a derivative is not finite, or if the step controller
/// cannot reach the end of the grid.
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

    trajectory.push(times[0], initial);
    let event = Event {
        index: 0,
        t: times[0],
        state: initial,
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            trajectory,
            stats,
        });
    }

    let mut stepper = Stepper::new(problem, config, initial, times[0], &mut stats)
        .map_err(|err| failed(Error::from(err)))?;

    for (index, &target) in times.iter().enumerate().skip(1) {
        stepper
            .advance_to(target, &mut stats)
            .map_err(failed)?;

        trajectory.push(target, &stepper.state);

        let event = Event {
            index,
            t: target,
            state: &stepper.state,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            debug!("dopri5 stopped by observer at t = {target}");
            return Ok(Solution {
                status: Status::StoppedByObserver,
                trajectory,
                stats,
            });
        }
    }

    debug!(
        "dopri5 finished {} rows: {} accepted, {} rejected, {} evaluations",
        trajectory.len(),
        stats.accepted_steps,
        stats.rejected_steps,
        stats.evaluations
    );

    Ok(Solution {
        status: Status::Complete,
        trajectory,
        stats,
    })
}

/// Integrates an ODE problem using Dormand–Prince 5(4) without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved<P: OdeProblem>(
    problem: &P,
    initial: &[f64],
    grid: &TimeGrid,
    config: &Config,
) -> Result<Solution, Error> {
    solve(problem, initial, grid, config, ())
}

/// Adaptive Dormand–Prince 5(4) as a pluggable [`Integrator`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dopri5 {
    config: Config,
}

impl Dopri5 {
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

impl Integrator for Dopri5 {
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

fn failed(err: Error) -> Error {
    warn!("dopri5 integration failed: {err}");
    err
}

/// Integration state carried between grid times.
struct Stepper<'p, P> {
    problem: &'p P,
    config: &'p Config,
    t: f64,
    /// Proposed size of the next step, before clamping to a grid time.
    h: f64,
    attempts: usize,
    state: Vec<f64>,
    next: Vec<f64>,
    scratch: Vec<f64>,
    /// Stages; `k[0]` holds the derivative at `(t, state)`.
    k: [Vec<f64>; 7],
}

impl<'p, P: OdeProblem> Stepper<'p, P> {
    fn new(
        problem: &'p P,
        config: &'p Config,
        initial: &[f64],
        t0: f64,
        stats: &mut Stats,
    ) -> Result<Self, EvalError<P::Error>> {
        let dimension = initial.len();
        let mut stepper = Self {
            problem,
            config,
            t: t0,
            h: 0.0,
            attempts: 0,
            state: initial.to_vec(),
            next: vec![0.0; dimension],
            scratch: vec![0.0; dimension],
            k: std::array::from_fn(|_| vec![0.0; dimension]),
        };

        evaluate(problem, &stepper.state, t0, &mut stepper.k[0], stats)?;
        stepper.h = match config.initial_step() {
            Some(h) => h,
            None => stepper.estimate_initial_step(stats)?,
        };

        Ok(stepper)
    }

    /// Steps until `t == target`, landing on it exactly.
    fn advance_to(&mut self, target: f64, stats: &mut Stats) -> Result<(), Error> {
        while self.t < target {
            if self.attempts >= self.config.max_steps() {
                return Err(Error::MaxStepsExceeded {
                    t: self.t,
                    target,
                    max_steps: self.config.max_steps(),
                });
            }
            if self.h < self.config.min_step() || self.t + self.h == self.t {
                return Err(Error::StepSizeUnderflow {
                    t: self.t,
                    h: self.h,
                });
            }
            self.attempts += 1;

            let remaining = target - self.t;
            let lands = self.h >= remaining;
            let h = if lands { remaining } else { self.h };

            self.stages(h, stats)?;
            let norm = self.error_norm(h);

            if norm <= 1.0 {
                self.t = if lands { target } else { self.t + h };
                std::mem::swap(&mut self.state, &mut self.next);
                // First same as last: the seventh stage is f(t + h, y_next).
                self.k.swap(0, 6);
                stats.accepted_steps += 1;

                let proposed = h * step_factor(norm, MAX_FACTOR);
                // A shortened landing step says nothing against the old proposal.
                self.h = if lands { self.h.max(proposed) } else { proposed };
            } else {
                stats.rejected_steps += 1;
                self.h = h * step_factor(norm, 1.0);
                trace!(
                    "dopri5 rejected step h = {h:e} at t = {} (error norm {norm:e})",
                    self.t
                );
            }
        }

        Ok(())
    }

    /// Evaluates stages 2..7 for a step of size `h` and writes the fifth-order
    /// solution into `next`.
    fn stages(&mut self, h: f64, stats: &mut Stats) -> Result<(), EvalError<P::Error>> {
        let Self {
            problem,
            t,
            state,
            next,
            scratch,
            k,
            ..
        } = self;
        let (problem, t) = (*problem, *t);

        combine(scratch, state, h, &[(A21, &k[0])]);
        evaluate(problem, scratch, t + C2 * h, &mut k[1], stats)?;

        combine(scratch, state, h, &[(A31, &k[0]), (A32, &k[1])]);
        evaluate(problem, scratch, t + C3 * h, &mut k[2], stats)?;

        combine(scratch, state, h, &[(A41, &k[0]), (A42, &k[1]), (A43, &k[2])]);
        evaluate(problem, scratch, t + C4 * h, &mut k[3], stats)?;

        combine(
            scratch,
            state,
            h,
            &[(A51, &k[0]), (A52, &k[1]), (A53, &k[2]), (A54, &k[3])],
        );
        evaluate(problem, scratch, t + C5 * h, &mut k[4], stats)?;

        combine(
            scratch,
            state,
            h,
            &[
                (A61, &k[0]),
                (A62, &k[1]),
                (A63, &k[2]),
                (A64, &k[3]),
                (A65, &k[4]),
            ],
        );
        evaluate(problem, scratch, t + h, &mut k[5], stats)?;

        combine(
            next,
            state,
            h,
            &[
                (A71, &k[0]),
                (A73, &k[2]),
                (A74, &k[3]),
                (A75, &k[4]),
                (A76, &k[5]),
            ],
        );
        evaluate(problem, next, t + h, &mut k[6], stats)?;

        Ok(())
    }

    /// Scaled RMS norm of the embedded error estimate for the last stages.
    fn error_norm(&self, h: f64) -> f64 {
        let k = &self.k;
        let sum: f64 = (0..self.state.len())
            .map(|i| {
                let err = h
                    * (E1 * k[0][i]
                        + E3 * k[2][i]
                        + E4 * k[3][i]
                        + E5 * k[4][i]
                        + E6 * k[5][i]
                        + E7 * k[6][i]);
                let scale = self.config.abs_tol()
                    + self.config.rel_tol() * self.state[i].abs().max(self.next[i].abs());
                (err / scale).powi(2)
            })
            .sum();

        #[allow(clippy::cast_precision_loss)]
        let norm = (sum / self.state.len().max(1) as f64).sqrt();

        // A NaN norm must still shrink the step.
        if norm.is_nan() { f64::INFINITY } else { norm }
    }

    /// Estimates a first step from the scale of the state and its derivatives.
    ///
    /// Follows Hairer, Nørsett & Wanner, *Solving ODEs I*, section II.4.
    fn estimate_initial_step(&mut self, stats: &mut Stats) -> Result<f64, EvalError<P::Error>> {
        let scale = |y: f64| self.config.abs_tol() + self.config.rel_tol() * y.abs();

        let d0 = rms(self.state.iter().map(|&y| y / scale(y)));
        let d1 = rms(
            self.state
                .iter()
                .zip(&self.k[0])
                .map(|(&y, &f)| f / scale(y)),
        );

        let h0 = if d0 < 1e-5 || d1 < 1e-5 || !(d0 / d1).is_finite() {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        combine(&mut self.scratch, &self.state, h0, &[(1.0, &self.k[0])]);
        evaluate(
            self.problem,
            &self.scratch,
            self.t + h0,
            &mut self.k[1],
            stats,
        )?;

        let d2 = rms(
            self.state
                .iter()
                .zip(self.k[1].iter().zip(&self.k[0]))
                .map(|(&y, (&f1, &f0))| (f1 - f0) / scale(y)),
        ) / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(ERROR_EXPONENT)
        };

        let h = (100.0 * h0).min(h1);
        Ok(if h.is_finite() && h > 0.0 { h } else { 1e-6 })
    }
}

/// Writes `base + h * sum(a_j * k_j)` into `out`.
fn combine(out: &mut [f64], base: &[f64], h: f64, terms: &[(f64, &Vec<f64>)]) {
    for (i, (o, b)) in out.iter_mut().zip(base).enumerate() {
        let slope: f64 = terms.iter().map(|(a, k)| a * k[i]).sum();
        *o = b + h * slope;
    }
}

/// Step size multiplier for an error norm, capped at `max_factor`.
fn step_factor(norm: f64, max_factor: f64) -> f64 {
    if norm == 0.0 {
        return max_factor;
    }
    (SAFETY * norm.powf(-ERROR_EXPONENT)).clamp(MIN_FACTOR, max_factor)
}

fn rms(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let len = values.len().max(1) as f64;
    (values.map(|v| v * v).sum::<f64>() / len).sqrt()
}
