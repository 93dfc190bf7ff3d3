use crate::flim::{FitParams, FitResults};

use super::Result;

/// A curve-fitting routine the session dispatches to by name.
///
/// Implementations read the working view from `params.trans_map` (a single-pixel window
/// or the whole binned view) and must not retain it past the call. Failures are reported
/// as [`OpsError::AlgorithmFailed`](super::OpsError::AlgorithmFailed).
pub trait FitAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    fn fit(&self, params: &FitParams) -> Result<FitResults>;
}
