//! Time integrators for ODE problems.
//!
//! Both integrators advance an [`OdeProblem`] across a [`TimeGrid`] and
//! return a [`Solution`] holding one trajectory row per grid time.
//!
//! # Integrators
//!
//! - [`dopri5`] — adaptive Dormand–Prince 5(4) with embedded error control
//! - [`rk4`] — classical fixed-step fourth-order Runge–Kutta
//!
//! # Observer Events
//!
//! Each integrator emits one [`Event`] per trajectory row, starting with the
//! initial state at index 0. Observers may return [`Action::StopEarly`] to end
//! the integration with the rows produced so far.
//!
//! [`OdeProblem`]: nbody_core::OdeProblem
//! [`TimeGrid`]: nbody_core::TimeGrid

mod action;
mod evaluate;
mod event;
mod solution;

pub mod dopri5;
pub mod rk4;

pub use action::Action;
pub use evaluate::EvalError;
pub use event::Event;
pub use solution::{Solution, Stats, Status};
