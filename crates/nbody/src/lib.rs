//! Gravitational N-body simulation in two dimensions.
//!
//! A [`System`] groups point-mass [`Body`] values and exposes the first-order
//! ODE that Newtonian gravity induces on them:
//!
//! - [`System::initial_state_vector`] flattens every body's initial position
//!   and velocity into one state vector (see [`StateLayout`])
//! - [`System::derivatives`] maps a state to velocities and accelerations
//! - [`System::solve`] integrates over a time grid and returns the trajectory
//!
//! Integration is delegated to any [`Integrator`]; [`System::solve`] uses the
//! adaptive Dormand–Prince method from `nbody-solvers`.
//!
//! # Example
//!
//! ```
//! use nbody::{Body, System};
//!
//! let system = System::new([
//!     Body::new(1.0, [-1.0, 0.0], [0.0, -0.5])?.named("a"),
//!     Body::new(1.0, [1.0, 0.0], [0.0, 0.5])?.named("b"),
//! ])?;
//!
//! let trajectory = system.solve(&[0.0, 0.5, 1.0])?;
//! assert_eq!(trajectory.len(), 3);
//! assert_eq!(trajectory.dimension(), 8);
//! # Ok::<(), nbody::Error>(())
//! ```
//!
//! [`Integrator`]: nbody_core::Integrator

mod body;
mod error;
mod gravity;
mod state;
mod system;
mod vector;

pub mod scenarios;

pub use body::{Body, DEFAULT_NAME};
pub use error::{Error, ParameterError};
pub use gravity::{ConfigError, GravityConfig};
pub use state::StateLayout;
pub use system::System;
pub use vector::Vec2;

pub use nbody_core::{Integrator, TimeGrid, Trajectory};
