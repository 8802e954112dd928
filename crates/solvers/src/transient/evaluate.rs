use thiserror::Error;

use nbody_core::OdeProblem;

use super::Stats;

/// Errors that can occur when evaluating a problem's derivative.
#[derive(Debug, Error)]
pub enum EvalError<PE> {
    /// The problem failed to compute a derivative.
    #[error("problem error")]
    Problem(#[source] PE),

    /// The derivative contains a NaN or infinite component.
    #[error("derivative is not finite at t = {t}")]
    NonFinite { t: f64 },
}

/// Evaluates the derivative into `out` and rejects non-finite results.
///
/// Every call counts toward [`Stats::evaluations`], including failed ones.
pub(crate) fn evaluate<P: OdeProblem>(
    problem: &P,
    state: &[f64],
    t: f64,
    out: &mut [f64],
    stats: &mut Stats,
) -> Result<(), EvalError<P::Error>> {
    stats.evaluations += 1;
    problem
        .derivative(state, t, out)
        .map_err(EvalError::Problem)?;

    if out.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(EvalError::NonFinite { t })
    }
}
