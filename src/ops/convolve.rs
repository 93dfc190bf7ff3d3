use ndarray::Array3;
use rayon::prelude::*;

use super::{OpsError, Result, SquareKernel};

/// Convolution primitive used for binning.
pub trait Convolver: Send + Sync {
    /// Convolves `view` with `kernel` over the two `spatial_axes`, leaving the remaining
    /// axis untouched. Always returns a fresh array.
    fn convolve(
        &self,
        view: &Array3<f32>,
        spatial_axes: [usize; 2],
        kernel: &SquareKernel,
    ) -> Result<Array3<f32>>;
}

/// Separable box filter with replicated edges, parallel over lanes.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoxConvolver;

impl Convolver for BoxConvolver {
    fn convolve(
        &self,
        view: &Array3<f32>,
        spatial_axes: [usize; 2],
        kernel: &SquareKernel,
    ) -> Result<Array3<f32>> {
        if let Some(axis) = spatial_axes.iter().find(|axis| **axis >= view.ndim()) {
            return Err(OpsError::UnsupportedLayout(format!(
                "axis {axis} is out of range for a {}-d view",
                view.ndim()
            )));
        }
        if kernel.is_identity() {
            return Ok(view.clone());
        }

        let shape = view.shape().to_vec();
        let strides = row_major_strides(&shape);
        let weights = kernel.weights_1d();
        let radius = kernel.radius() as isize;
        let mut current = view.iter().copied().collect::<Vec<_>>();
        for axis in spatial_axes {
            if shape[axis] <= 1 {
                continue;
            }
            current = smooth_axis(&current, &shape, &strides, axis, &weights, radius);
        }

        Array3::from_shape_vec((shape[0], shape[1], shape[2]), current).map_err(|_| {
            OpsError::UnsupportedLayout("failed to rebuild binned array".to_string())
        })
    }
}

fn smooth_axis(
    input: &[f32],
    shape: &[usize],
    strides: &[usize],
    axis: usize,
    weights: &[f32],
    radius: isize,
) -> Vec<f32> {
    let axis_len = shape[axis];
    let axis_stride = strides[axis];
    let lane_count = input.len() / axis_len;
    let lane_bases = (0..lane_count)
        .map(|lane| lane_base_offset(lane, axis, shape, strides))
        .collect::<Vec<_>>();

    let lanes = lane_bases
        .par_iter()
        .map(|base| {
            (0..axis_len)
                .map(|coord| {
                    weights
                        .iter()
                        .enumerate()
                        .map(|(tap, weight)| {
                            let candidate = coord as isize + tap as isize - radius;
                            let clamped = candidate.clamp(0, axis_len as isize - 1) as usize;
                            input[*base + clamped * axis_stride] * *weight
                        })
                        .sum::<f32>()
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut output = vec![0.0_f32; input.len()];
    for (base, lane) in lane_bases.iter().zip(lanes) {
        for (coord, value) in lane.into_iter().enumerate() {
            output[*base + coord * axis_stride] = value;
        }
    }
    output
}

fn lane_base_offset(lane_index: usize, axis: usize, shape: &[usize], strides: &[usize]) -> usize {
    let mut remainder = lane_index;
    let mut base = 0usize;
    for dimension in 0..shape.len() {
        if dimension == axis {
            continue;
        }
        let size = shape[dimension];
        base += (remainder % size) * strides[dimension];
        remainder /= size;
    }
    base
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for index in (0..shape.len().saturating_sub(1)).rev() {
        strides[index] = strides[index + 1] * shape[index + 1];
    }
    strides
}
