use ndarray::{Array2, Array3, Axis, Zip};

use super::axes::spatial_axes;
use super::params::FitParams;
use super::roi::RoiMask;

/// Fraction of the peak height above the tail floor that still counts as signal.
pub const TAIL_FRACTION: f32 = 0.05;

/// Half-open `[start, end)` range of lifetime bins to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitWindow {
    pub start: usize,
    pub end: usize,
}

impl FitWindow {
    pub fn apply_to(self, params: &mut FitParams) {
        params.fit_start = self.start;
        params.fit_end = self.end;
    }
}

/// Intensity and fit-window estimates over a working view.
#[derive(Debug, Clone, Copy)]
pub struct ParamEstimator<'a> {
    view: &'a Array3<f32>,
    lifetime_axis: usize,
    roi: &'a RoiMask,
}

impl<'a> ParamEstimator<'a> {
    pub fn new(view: &'a Array3<f32>, lifetime_axis: usize, roi: &'a RoiMask) -> Self {
        Self {
            view,
            lifetime_axis,
            roi,
        }
    }

    /// Sum of every trace along the lifetime axis, shaped `(width, height)`.
    /// Pixels outside the ROI read as zero.
    pub fn intensity_map(&self) -> Array2<f32> {
        let mut intensity = Zip::from(self.view.lanes(Axis(self.lifetime_axis)))
            .par_map_collect(|trace| trace.sum());
        if !self.roi.is_all() {
            intensity.indexed_iter_mut().for_each(|((x, y), value)| {
                if !self.roi.contains(x, y) {
                    *value = 0.0;
                }
            });
        }
        intensity
    }

    /// Bin-wise sum of all selected traces.
    pub fn aggregate_trace(&self) -> Vec<f32> {
        let [x_axis, y_axis] = spatial_axes(self.lifetime_axis);
        let n_bins = self.view.len_of(Axis(self.lifetime_axis));
        let mut aggregate = vec![0.0_f32; n_bins];
        for x in 0..self.view.len_of(Axis(x_axis)) {
            let plane = self.view.index_axis(Axis(x_axis), x);
            let y_axis = if y_axis > x_axis { y_axis - 1 } else { y_axis };
            for (y, trace) in plane.axis_iter(Axis(y_axis)).enumerate() {
                if !self.roi.contains(x, y) {
                    continue;
                }
                for (sum, value) in aggregate.iter_mut().zip(trace.iter()) {
                    *sum += *value;
                }
            }
        }
        aggregate
    }

    pub fn estimate_start_end(&self) -> FitWindow {
        fit_window(&self.aggregate_trace())
    }
}

/// Deterministic fit window for a decay trace.
///
/// `start` is the first maximum. `end` is one past the last bin at or after the peak that
/// rises more than [`TAIL_FRACTION`] of the peak height above the tail floor. Traces with
/// no peak above the floor (all zero, flat, non-finite) get the full range.
pub fn fit_window(trace: &[f32]) -> FitWindow {
    let full = FitWindow {
        start: 0,
        end: trace.len(),
    };
    let Some((peak_index, peak)) = trace
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (index, value)| match best {
            Some((_, best_value)) if value <= best_value => best,
            _ if value.is_nan() => best,
            _ => Some((index, value)),
        })
    else {
        return full;
    };
    let floor = trace[peak_index..]
        .iter()
        .copied()
        .filter(|value| !value.is_nan())
        .fold(peak, f32::min);
    if !peak.is_finite() || !floor.is_finite() || peak <= floor {
        return full;
    }

    let threshold = floor + (peak - floor) * TAIL_FRACTION;
    let last_signal = trace[peak_index..]
        .iter()
        .rposition(|value| *value > threshold)
        .map_or(peak_index, |offset| peak_index + offset);
    FitWindow {
        start: peak_index,
        end: last_signal + 1,
    }
}
