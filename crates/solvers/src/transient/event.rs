/// Event emitted by a time integrator for each trajectory row.
///
/// Index 0 is the initial state before any integration.
/// Indices 1..T are emitted as each grid time is reached.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The row index within the time grid.
    pub index: usize,

    /// The grid time of this row.
    pub t: f64,

    /// The state at `t`.
    pub state: &'a [f64],
}
