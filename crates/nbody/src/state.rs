use crate::Vec2;

/// Index arithmetic for the flat state vector of `N` bodies.
///
/// A state vector holds `4N` reals in two blocks:
///
/// ```text
/// [x_0, y_0, ..., x_{N-1}, y_{N-1}, vx_0, vy_0, ..., vx_{N-1}, vy_{N-1}]
///  ^ position block, offset 0        ^ velocity block, offset 2N
/// ```
///
/// Each body occupies [`STRIDE`](Self::STRIDE) consecutive entries in each
/// block, in system order. A derivative vector uses the same layout with
/// velocities in the first block and accelerations in the second.
///
/// Methods taking a state panic if its length is not [`len`](Self::len):
/// a mis-sized state is a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    bodies: usize,
}

impl StateLayout {
    /// Entries per body in each block.
    pub const STRIDE: usize = 2;

    #[must_use]
    pub fn new(bodies: usize) -> Self {
        Self { bodies }
    }

    /// Returns the number of bodies.
    #[must_use]
    pub fn bodies(&self) -> usize {
        self.bodies
    }

    /// Returns the state vector length, `4N`.
    #[must_use]
    pub fn len(&self) -> usize {
        2 * Self::STRIDE * self.bodies
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies == 0
    }

    /// Returns the offset of the velocity block, `2N`.
    #[must_use]
    pub fn velocity_block(&self) -> usize {
        Self::STRIDE * self.bodies
    }

    /// Returns the index of `x_body`.
    #[must_use]
    pub fn position_offset(&self, body: usize) -> usize {
        assert!(body < self.bodies, "body index out of range");
        Self::STRIDE * body
    }

    /// Returns the index of `vx_body`.
    #[must_use]
    pub fn velocity_offset(&self, body: usize) -> usize {
        self.velocity_block() + self.position_offset(body)
    }

    /// Reads the position of `body` from `state`.
    #[must_use]
    pub fn position(&self, state: &[f64], body: usize) -> Vec2 {
        self.check(state);
        let i = self.position_offset(body);
        Vec2::new(state[i], state[i + 1])
    }

    /// Reads the velocity of `body` from `state`.
    #[must_use]
    pub fn velocity(&self, state: &[f64], body: usize) -> Vec2 {
        self.check(state);
        let i = self.velocity_offset(body);
        Vec2::new(state[i], state[i + 1])
    }

    /// Splits a state into per-body positions and velocities.
    #[must_use]
    pub fn decode(&self, state: &[f64]) -> (Vec<Vec2>, Vec<Vec2>) {
        self.check(state);
        let (positions, velocities) = state.split_at(self.velocity_block());
        (pairs(positions), pairs(velocities))
    }

    /// Flattens per-body positions and velocities into a state.
    ///
    /// # Panics
    ///
    /// Panics if either slice does not hold exactly one entry per body.
    #[must_use]
    pub fn encode(&self, positions: &[Vec2], velocities: &[Vec2]) -> Vec<f64> {
        assert_eq!(positions.len(), self.bodies, "one position per body");
        assert_eq!(velocities.len(), self.bodies, "one velocity per body");

        positions
            .iter()
            .chain(velocities)
            .flat_map(|v| [v.x, v.y])
            .collect()
    }

    fn check(&self, state: &[f64]) {
        assert_eq!(
            state.len(),
            self.len(),
            "state vector must have 4 entries per body"
        );
    }
}

fn pairs(block: &[f64]) -> Vec<Vec2> {
    block
        .chunks_exact(StateLayout::STRIDE)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect()
}
