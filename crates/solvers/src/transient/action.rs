/// Control actions supported by the time integrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the integrator early and return the rows produced so far.
    StopEarly,
}
