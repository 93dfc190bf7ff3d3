//! Coordinate conversion between lifetime-last order and the stored array order.
//!
//! Algorithm code addresses a working view as `[x, y, t]`. The stored array keeps its
//! lifetime axis wherever the dataset put it, so every slice goes through
//! [`permute_axes`] to build offsets and extents.

use ndarray::{Array3, ArrayView3, Axis, Slice};

/// Rank of every working view.
pub const RANK: usize = 3;

/// Moves the last coordinate to `lifetime_axis`, shifting the ones after it down by one.
///
/// `[x, y, v]` becomes `[v, x, y]`, `[x, v, y]` or `[x, y, v]` for axes 0, 1 and 2.
pub fn permute_axes<T: Copy>(coordinates: [T; RANK], lifetime_axis: usize) -> [T; RANK] {
    let mut permuted = coordinates;
    for index in (lifetime_axis + 1..RANK).rev() {
        permuted.swap(index, index - 1);
    }
    permuted
}

/// Inverse of [`permute_axes`].
pub fn unpermute_axes<T: Copy>(coordinates: [T; RANK], lifetime_axis: usize) -> [T; RANK] {
    let mut restored = coordinates;
    for index in lifetime_axis + 1..RANK {
        restored.swap(index - 1, index);
    }
    restored
}

/// Array axes holding the `x` and `y` coordinates, in that order.
pub fn spatial_axes(lifetime_axis: usize) -> [usize; 2] {
    let [x, y, _] = unpermute_axes([0, 1, 2], lifetime_axis);
    [x, y]
}

/// `(width, height)` of a working view, i.e. its extents along `x` and `y`.
pub fn spatial_extent(view: &Array3<f32>, lifetime_axis: usize) -> (usize, usize) {
    let [x, y] = spatial_axes(lifetime_axis);
    (view.len_of(Axis(x)), view.len_of(Axis(y)))
}

/// Single-pixel window at `(x, y)` covering the full lifetime axis.
///
/// The caller guarantees the position lies inside the view.
pub fn trace_window(
    view: &Array3<f32>,
    x: usize,
    y: usize,
    lifetime_axis: usize,
) -> ArrayView3<'_, f32> {
    let offset = permute_axes([x, y, 0], lifetime_axis);
    let size = permute_axes([1, 1, view.len_of(Axis(lifetime_axis))], lifetime_axis);
    view.slice_each_axis(|description| {
        let index = description.axis.index();
        Slice::from(offset[index]..offset[index] + size[index])
    })
}

/// Copies the trace at `(x, y)` into `trace` and returns the window it came from.
pub fn fill_trace<'a>(
    view: &'a Array3<f32>,
    trace: &mut [f32],
    x: usize,
    y: usize,
    lifetime_axis: usize,
) -> ArrayView3<'a, f32> {
    let window = trace_window(view, x, y, lifetime_axis);
    for (slot, value) in trace.iter_mut().zip(window.iter()) {
        *slot = *value;
    }
    window
}
