use std::ops::Range;

use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use super::axes::spatial_axes;

/// Spatial predicate selecting which pixels take part in aggregate computations.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RoiMask {
    #[default]
    All,
    /// Per-pixel selection shaped `(width, height)`.
    Pixels(Array2<bool>),
}

impl RoiMask {
    pub fn rect(width: usize, height: usize, rect: &RoiRect) -> Self {
        let xs = rect.x_range();
        let ys = rect.y_range();
        RoiMask::Pixels(Array2::from_shape_fn((width, height), |(x, y)| {
            xs.contains(&x) && ys.contains(&y)
        }))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RoiMask::All)
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        match self {
            RoiMask::All => true,
            RoiMask::Pixels(mask) => mask.get((x, y)).copied().unwrap_or(false),
        }
    }

    /// Shape the mask expects, or `None` when it accepts any shape.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            RoiMask::All => None,
            RoiMask::Pixels(mask) => Some(mask.dim()),
        }
    }

    /// Copy of `view` with the traces of unselected pixels zeroed.
    pub fn apply(&self, view: &Array3<f32>, lifetime_axis: usize) -> Array3<f32> {
        let mut masked = view.clone();
        if let RoiMask::Pixels(mask) = self {
            let [x_axis, y_axis] = spatial_axes(lifetime_axis);
            for x in 0..masked.len_of(Axis(x_axis)) {
                for y in 0..masked.len_of(Axis(y_axis)) {
                    if mask.get((x, y)).copied().unwrap_or(false) {
                        continue;
                    }
                    // removing x first shifts y's axis down when it came after x
                    let mut trace = masked.index_axis_mut(Axis(x_axis), x);
                    let y_axis_after = if y_axis > x_axis { y_axis - 1 } else { y_axis };
                    trace.index_axis_mut(Axis(y_axis_after), y).fill(0.0);
                }
            }
        }
        masked
    }
}

/// Half-open rectangle `[x0, x1) x [y0, y1)` in working-view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl RoiRect {
    pub fn x_range(&self) -> Range<usize> {
        self.x0..self.x1
    }

    pub fn y_range(&self) -> Range<usize> {
        self.y0..self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}
