use std::sync::Arc;

use ndarray::Array3;

use super::axes::permute_axes;
use super::model::NoiseType;
use super::roi::RoiMask;

/// Value of a parameter slot that the algorithm should estimate from scratch.
pub const UNESTIMATED: f32 = f32::INFINITY;

/// Mutable bundle of everything a fitting algorithm reads.
///
/// `param` and `param_free` always have the same length; use [`FitParams::resize_params`]
/// to change it.
#[derive(Debug, Clone)]
pub struct FitParams {
    /// Working view handed to the algorithm: a single-pixel window while previewing,
    /// the full binned view during a whole-image fit.
    pub trans_map: Option<Arc<Array3<f32>>>,
    /// Trace of the previewed pixel, one sample per lifetime bin.
    pub trans: Vec<f32>,
    pub lt_axis: usize,
    /// Time per lifetime bin.
    pub x_inc: f32,
    pub fit_start: usize,
    pub fit_end: usize,
    pub n_comp: usize,
    pub param: Vec<f32>,
    pub param_free: Vec<bool>,
    /// Per-pixel initial values, shaped like the working view with the lifetime axis
    /// replaced by the parameter axis. `None` asks the algorithm to estimate everything.
    pub param_map: Option<Array3<f32>>,
    pub noise: NoiseType,
    pub i_thresh: f32,
    pub chisq_target: f32,
    pub chisq_delta: f32,
    /// Instrument response trace, if one has been picked.
    pub instr: Option<Vec<f32>>,
    pub roi_mask: RoiMask,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            trans_map: None,
            trans: Vec::new(),
            lt_axis: 2,
            x_inc: 1.0,
            fit_start: 0,
            fit_end: 0,
            n_comp: 1,
            param: Vec::new(),
            param_free: Vec::new(),
            param_map: None,
            noise: NoiseType::default(),
            i_thresh: 0.0,
            chisq_target: 1.0,
            chisq_delta: 1e-4,
            instr: None,
            roi_mask: RoiMask::All,
        }
    }
}

impl FitParams {
    pub fn n_param(&self) -> usize {
        self.param.len()
    }

    /// Resizes both parameter vectors and rebuilds the single-pixel parameter map.
    pub fn resize_params(&mut self, n_param: usize) {
        resize_with_sentinel(&mut self.param, &mut self.param_free, n_param);
        self.sync_param_map();
    }

    /// Resets every free slot to [`UNESTIMATED`]; fixed slots keep their values.
    pub fn clear_free_estimates(&mut self) {
        for (value, free) in self.param.iter_mut().zip(&self.param_free) {
            if *free {
                *value = UNESTIMATED;
            }
        }
    }

    /// Rebuilds the `1 x 1 x n_param` map (in stored axis order) from `param`.
    pub fn sync_param_map(&mut self) {
        self.param_map = Some(single_pixel_map(&self.param, self.lt_axis));
    }

    pub fn fit_window_len(&self) -> usize {
        self.fit_end.saturating_sub(self.fit_start)
    }
}

/// Grows or shrinks `values`/`free` to `len`, keeping existing slots and marking new
/// ones as unestimated and free.
pub fn resize_with_sentinel(values: &mut Vec<f32>, free: &mut Vec<bool>, len: usize) {
    let fill_start = free.len().min(values.len());
    values.truncate(fill_start);
    free.truncate(fill_start);
    values.resize(len, UNESTIMATED);
    free.resize(len, true);
}

fn single_pixel_map(param: &[f32], lt_axis: usize) -> Array3<f32> {
    let [a, b, c] = permute_axes([1, 1, param.len()], lt_axis);
    // two of the three indices are always zero
    Array3::from_shape_fn((a, b, c), |(i, j, k)| param[i + j + k])
}
