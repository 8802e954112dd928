/// Time series of solved states stored as a row-major matrix.
///
/// Row `i` is the full state vector at `times()[i]`. Every row has the same
/// length, [`dimension`](Self::dimension).
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    dimension: usize,
    times: Vec<f64>,
    data: Vec<f64>,
}

impl Trajectory {
    /// Creates an empty trajectory with room for `rows` states.
    #[must_use]
    pub fn with_capacity(dimension: usize, rows: usize) -> Self {
        Self {
            dimension,
            times: Vec::with_capacity(rows),
            data: Vec::with_capacity(rows * dimension),
        }
    }

    /// Appends the state at time `t`.
    ///
    /// # Panics
    ///
    /// Panics if `state.len()` differs from the trajectory dimension.
    pub fn push(&mut self, t: f64, state: &[f64]) {
        assert_eq!(
            state.len(),
            self.dimension,
            "state length must match trajectory dimension"
        );
        self.times.push(t);
        self.data.extend_from_slice(state);
    }

    /// Returns the length of each state row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` if no rows have been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the time of each row.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns row `index`, or `None` if it is out of range.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Returns the last row, or `None` if the trajectory is empty.
    #[must_use]
    pub fn last(&self) -> Option<&[f64]> {
        self.len().checked_sub(1).and_then(|index| self.row(index))
    }

    /// Iterates over rows in time order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        // `chunks_exact` panics on a zero chunk size.
        self.data
            .chunks_exact(self.dimension.max(1))
            .take(self.times.len())
    }

    /// Iterates over column `index` in time order.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than the dimension.
    pub fn column(&self, index: usize) -> impl ExactSizeIterator<Item = f64> + '_ {
        assert!(index < self.dimension, "column index out of range");
        self.rows().map(move |row| row[index])
    }

    /// Returns the underlying row-major data.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consumes the trajectory and returns one owned vector per row.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory {
        let mut trajectory = Trajectory::with_capacity(3, 2);
        trajectory.push(0.0, &[1.0, 2.0, 3.0]);
        trajectory.push(0.5, &[4.0, 5.0, 6.0]);
        trajectory
    }

    #[test]
    fn rows_and_columns() {
        let trajectory = sample();

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.dimension(), 3);
        assert_eq!(trajectory.times(), &[0.0, 0.5]);
        assert_eq!(trajectory.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(trajectory.row(2), None);
        assert_eq!(trajectory.last(), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(trajectory.column(1).collect::<Vec<_>>(), vec![2.0, 5.0]);
    }

    #[test]
    fn into_rows_preserves_order() {
        let rows = sample().into_rows();

        assert_eq!(rows, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn empty_trajectory_has_no_last_row() {
        let trajectory = Trajectory::with_capacity(4, 0);

        assert!(trajectory.is_empty());
        assert_eq!(trajectory.last(), None);
        assert_eq!(trajectory.rows().len(), 0);
    }

    #[test]
    #[should_panic(expected = "state length must match trajectory dimension")]
    fn push_rejects_wrong_length() {
        let mut trajectory = Trajectory::with_capacity(2, 1);
        trajectory.push(0.0, &[1.0]);
    }
}
