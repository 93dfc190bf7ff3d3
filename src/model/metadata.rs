use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{AxisKind, CoreError, PixelType, Result, default_axis_for_index};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dim {
    pub axis: AxisKind,
    pub size: usize,
    pub spacing: Option<f32>,
    pub unit: Option<String>,
}

impl Dim {
    pub fn new(axis: AxisKind, size: usize) -> Self {
        Self {
            axis,
            size,
            spacing: None,
            unit: None,
        }
    }

    pub fn calibrated(axis: AxisKind, size: usize, spacing: f32, unit: impl Into<String>) -> Self {
        Self {
            axis,
            size,
            spacing: Some(spacing),
            unit: Some(unit.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub dims: Vec<Dim>,
    pub pixel_type: PixelType,
    #[serde(default)]
    pub channel_names: Vec<String>,
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            dims: Vec::new(),
            pixel_type: PixelType::F32,
            channel_names: Vec::new(),
            source: None,
            extras: BTreeMap::new(),
        }
    }
}

impl Metadata {
    pub fn from_shape(shape: &[usize], pixel_type: PixelType) -> Self {
        let dims = shape
            .iter()
            .enumerate()
            .map(|(index, size)| Dim::new(default_axis_for_index(index), *size))
            .collect();
        Self {
            dims,
            pixel_type,
            ..Self::default()
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.size).collect()
    }

    pub fn axis_index(&self, axis: AxisKind) -> Option<usize> {
        self.dims.iter().position(|d| d.axis == axis)
    }

    /// First dimension whose kind matches one of `labels`, tried in order.
    pub fn find_axis(&self, labels: &[AxisKind]) -> Option<usize> {
        labels.iter().find_map(|label| self.axis_index(*label))
    }

    /// Calibrated step of one sample along `axis`, if the metadata carries one.
    pub fn spacing(&self, axis: usize) -> Option<f32> {
        self.dims.get(axis).and_then(|dim| dim.spacing)
    }

    pub fn validate_shape(&self, shape: &[usize]) -> Result<()> {
        if self.dims.len() != shape.len() {
            return Err(CoreError::DimensionalityMismatch {
                data_ndim: shape.len(),
                meta_ndim: self.dims.len(),
            });
        }
        for (axis, (dim, actual)) in self.dims.iter().zip(shape).enumerate() {
            if dim.size == 0 {
                return Err(CoreError::ZeroSizedDimension { axis });
            }
            if dim.size != *actual {
                return Err(CoreError::DimensionSizeMismatch {
                    axis,
                    data_size: *actual,
                    meta_size: dim.size,
                });
            }
        }
        Ok(())
    }
}
