use std::error::Error as StdError;

use crate::transient::EvalError;

/// Errors that can occur during RK4 integration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("initial state has length {actual}, problem dimension is {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("derivative is not finite at t = {t}")]
    NonFinite { t: f64 },

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
