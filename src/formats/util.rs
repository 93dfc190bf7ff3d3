use std::path::Path;

use crate::model::{Dim, Metadata, PixelType};

use super::{IoError, Result};

pub(crate) fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
    Ok(ext)
}

pub(crate) fn metadata_for_dims(path: &Path, dims: Vec<Dim>, pixel_type: PixelType) -> Metadata {
    Metadata {
        dims,
        pixel_type,
        source: Some(path.to_path_buf()),
        ..Metadata::default()
    }
}

/// Maps the finite range of `values` onto `0..=255`; non-finite samples become 0.
pub(crate) fn scale_to_u8(values: &[f32]) -> Vec<u8> {
    let (min, max) = finite_min_max(values);
    let span = max - min;
    values
        .iter()
        .map(|value| {
            if !value.is_finite() || span <= f32::EPSILON {
                return 0;
            }
            (((*value - min) / span).clamp(0.0, 1.0) * 255.0).round() as u8
        })
        .collect()
}

fn finite_min_max(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(None, |range: Option<(f32, f32)>, value| match range {
            Some((min, max)) => Some((min.min(value), max.max(value))),
            None => Some((value, value)),
        })
        .unwrap_or((0.0, 0.0))
}

/// Rounds and clamps a raw count into an integer sample type's range.
pub(crate) fn clamp_count(value: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.round().clamp(0.0, max)
    } else {
        0.0
    }
}
