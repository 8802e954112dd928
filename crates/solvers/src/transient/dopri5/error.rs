use std::error::Error as StdError;

use crate::transient::EvalError;

/// Errors that can occur during Dormand–Prince integration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("initial state has length {actual}, problem dimension is {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("derivative is not finite at t = {t}")]
    NonFinite { t: f64 },

    #[error("step size {h:e} fell below the minimum at t = {t}")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("exceeded {max_steps} steps before reaching t = {target} (stopped at t = {t})")]
    MaxStepsExceeded {
        t: f64,
        target: f64,
        max_steps: usize,
    },

    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),
}

impl<PE> From<EvalError<PE>> for Error
where
    PE: StdError + Send + Sync + 'static,
{
    fn from(err: EvalError<PE>) -> Self {
        match err {
            EvalError::Problem(e) => Self::Problem(Box::new(e)),
            EvalError::NonFinite { t } => Self::NonFinite { t },
        }
    }
}
