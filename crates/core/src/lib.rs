//! Core traits and types for integrating ordinary differential equations.
//!
//! This crate defines the shared abstractions that integrators and physical
//! models build on:
//!
//! - [`OdeProblem`] — a first-order system `dy/dt = f(y, t)` of fixed dimension
//! - [`Integrator`] — a strategy that solves an [`OdeProblem`] on a time grid
//! - [`Observer`] — receives solver events and optionally returns control actions
//! - [`TimeGrid`] — a validated, strictly increasing sequence of query times
//! - [`Trajectory`] — the row-major matrix of solved states, one row per time

mod grid;
mod integrator;
mod observer;
mod problem;
mod trajectory;

pub use grid::{TimeGrid, TimeGridError};
pub use integrator::Integrator;
pub use observer::Observer;
pub use problem::OdeProblem;
pub use trajectory::Trajectory;
