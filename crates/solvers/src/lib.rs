//! Numerical integrators for the nbody workspace.
//!
//! Every integrator solves an [`OdeProblem`] on a [`TimeGrid`] and reports
//! exactly one state per grid time.
//!
//! # Modules
//!
//! - [`transient`] — time integrators ([`transient::dopri5`], [`transient::rk4`])
//!
//! [`OdeProblem`]: nbody_core::OdeProblem
//! [`TimeGrid`]: nbody_core::TimeGrid

pub mod transient;
