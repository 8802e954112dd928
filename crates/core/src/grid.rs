use thiserror::Error;

/// A strictly increasing sequence of at least two finite times.
///
/// The first entry is the start of integration. Every entry is both a point
/// at which the integrator must report the state and the row label of the
/// resulting [`Trajectory`](crate::Trajectory).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

/// Errors that can occur when validating a time grid.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TimeGridError {
    #[error("time grid needs at least 2 points, got {len}")]
    TooFewPoints { len: usize },

    #[error("time grid entry {index} is not finite")]
    NonFinite { index: usize },

    #[error("time grid is not strictly increasing at index {index}")]
    NotIncreasing { index: usize },
}

impl TimeGrid {
    /// Creates a grid from explicit times.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than two times, if any time is
    /// non-finite, or if the times are not strictly increasing.
    pub fn new(times: Vec<f64>) -> Result<Self, TimeGridError> {
        if times.len() < 2 {
            return Err(TimeGridError::TooFewPoints { len: times.len() });
        }

        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(TimeGridError::NonFinite { index });
        }

        if let Some(index) = times.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(TimeGridError::NotIncreasing { index: index + 1 });
        }

        Ok(Self { times })
    }

    /// Creates `count` evenly spaced times from `start` to `end`, inclusive.
    ///
    /// The last entry is exactly `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if `count < 2`, if either bound is non-finite, or if
    /// the spacing is too small to keep the times strictly increasing.
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self, TimeGridError> {
        if count < 2 {
            return Err(TimeGridError::TooFewPoints { len: count });
        }

        let last = count - 1;
        #[allow(clippy::cast_precision_loss)]
        let step = (end - start) / last as f64;

        let times = (0..count)
            .map(|i| {
                if i == last {
                    end
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let offset = step * i as f64;
                    start + offset
                }
            })
            .collect();

        Self::new(times)
    }

    /// Returns the times as a slice.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the first time.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.times[0]
    }

    /// Returns the last time.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Returns the number of times in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; a valid grid holds at least two times.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<f64>> for TimeGrid {
    type Error = TimeGridError;

    fn try_from(times: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(times)
    }
}

impl TryFrom<&[f64]> for TimeGrid {
    type Error = TimeGridError;

    fn try_from(times: &[f64]) -> Result<Self, Self::Error> {
        Self::new(times.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn accepts_increasing_times() {
        let grid = TimeGrid::new(vec![0.0, 0.5, 2.0]).unwrap();

        assert_eq!(grid.len(), 3);
        assert_relative_eq!(grid.start(), 0.0);
        assert_relative_eq!(grid.end(), 2.0);
    }

    #[test]
    fn rejects_too_few_points() {
        assert_eq!(
            TimeGrid::new(vec![]),
            Err(TimeGridError::TooFewPoints { len: 0 })
        );
        assert_eq!(
            TimeGrid::new(vec![1.0]),
            Err(TimeGridError::TooFewPoints { len: 1 })
        );
    }

    #[test]
    fn rejects_non_finite_times() {
        assert_eq!(
            TimeGrid::new(vec![0.0, f64::NAN, 1.0]),
            Err(TimeGridError::NonFinite { index: 1 })
        );
        assert_eq!(
            TimeGrid::new(vec![0.0, f64::INFINITY]),
            Err(TimeGridError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn rejects_repeated_or_decreasing_times() {
        assert_eq!(
            TimeGrid::new(vec![0.0, 1.0, 1.0]),
            Err(TimeGridError::NotIncreasing { index: 2 })
        );
        assert_eq!(
            TimeGrid::new(vec![0.0, -1.0]),
            Err(TimeGridError::NotIncreasing { index: 1 })
        );
    }

    #[test]
    fn linspace_hits_both_ends() {
        let grid = TimeGrid::linspace(0.0, 20.0, 5).unwrap();

        assert_eq!(grid.times(), &[0.0, 5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn linspace_rejects_reversed_bounds() {
        assert_eq!(
            TimeGrid::linspace(1.0, 0.0, 3),
            Err(TimeGridError::NotIncreasing { index: 1 })
        );
    }

    #[test]
    fn converts_from_slice() {
        let times = [0.0, 1.0, 2.0];
        let grid = TimeGrid::try_from(&times[..]).unwrap();

        assert_eq!(grid.times(), &times);
    }
}
