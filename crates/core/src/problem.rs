/// Defines a first-order ODE system to be integrated.
///
/// The state is a flat slice of `dimension()` reals and the derivative is
/// written into a caller-provided buffer of the same length, so integrators
/// can reuse their stage buffers across evaluations.
///
/// Higher-order systems are reduced to first order by the implementor. For
/// example, a mechanical system stores positions followed by velocities and
/// returns velocities followed by accelerations.
pub trait OdeProblem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the length of the state vector.
    fn dimension(&self) -> usize;

    /// Writes `dy/dt` evaluated at `state` and time `t` into `out`.
    ///
    /// Integrators guarantee that `state` and `out` both have length
    /// [`dimension`](Self::dimension).
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be evaluated.
    fn derivative(&self, state: &[f64], t: f64, out: &mut [f64]) -> Result<(), Self::Error>;
}

impl<P: OdeProblem + ?Sized> OdeProblem for &P {
    type Error = P::Error;

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn derivative(&self, state: &[f64], t: f64, out: &mut [f64]) -> Result<(), Self::Error> {
        (**self).derivative(state, t, out)
    }
}
