use ndarray::{Array2, ArrayView1, Axis, Zip};

use crate::flim::FitResults;

use super::{OpsError, Result};

/// A per-pixel quantity computed from a parameter map.
pub trait DerivedQuantity: Send + Sync {
    fn name(&self) -> &'static str;

    /// Map shaped `(width, height)` computed from `results.param_map`, whose parameter
    /// axis sits at `param_axis`.
    fn compute(&self, results: &FitResults, param_axis: usize) -> Result<Array2<f32>>;
}

/// Amplitude-weighted mean lifetime `Σ Aᵢτᵢ² / Σ Aᵢτᵢ`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanLifetime;

impl DerivedQuantity for MeanLifetime {
    fn name(&self) -> &'static str {
        "tau_mean"
    }

    fn compute(&self, results: &FitResults, param_axis: usize) -> Result<Array2<f32>> {
        let param_map = results.param_map.as_ref().ok_or(OpsError::MissingParamMap)?;
        if param_axis >= param_map.ndim() {
            return Err(OpsError::UnsupportedLayout(format!(
                "parameter axis {param_axis} is out of range"
            )));
        }
        Ok(Zip::from(param_map.lanes(Axis(param_axis))).par_map_collect(mean_lifetime))
    }
}

/// Mean lifetime of one `[z, A₁, τ₁, A₂, τ₂, ...]` parameter vector; `0` when undefined.
pub fn mean_lifetime(param: ArrayView1<'_, f32>) -> f32 {
    let mut weighted = 0.0_f32;
    let mut norm = 0.0_f32;
    let mut components = param.iter().skip(1);
    while let (Some(&amplitude), Some(&tau)) = (components.next(), components.next()) {
        weighted += amplitude * tau * tau;
        norm += amplitude * tau;
    }
    let tau_m = weighted / norm;
    if tau_m.is_finite() { tau_m } else { 0.0 }
}
