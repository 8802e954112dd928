use nbody_core::Trajectory;

/// Indicates how the integrator terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the last time in the grid.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// Work counters collected during an integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of derivative evaluations.
    pub evaluations: usize,

    /// Number of accepted steps.
    pub accepted_steps: usize,

    /// Number of steps rejected by error control.
    pub rejected_steps: usize,
}

/// The result of a time integration.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the integrator terminated.
    pub status: Status,

    /// One row per grid time reached, including the initial state.
    pub trajectory: Trajectory,

    /// Work performed to produce the trajectory.
    pub stats: Stats,
}
