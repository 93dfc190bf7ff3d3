use thiserror::Error;

use crate::model::CoreError;
use crate::ops::OpsError;

use super::PromptKind;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("dataset dimensionality ({ndim}) is not 3 or 4")]
    InvalidDimensionality { ndim: usize },

    #[error("could not determine the {axis} and the prompt was cancelled")]
    AmbiguousAxis { axis: PromptKind },

    #[error("time calibration must be positive, got {value}")]
    DegenerateCalibration { value: f32 },

    #[error("axis {axis} is out of range for a {ndim}-d dataset")]
    AxisOutOfRange { axis: usize, ndim: usize },

    #[error("axis {axis} cannot be both the channel and the lifetime axis")]
    AxisConflict { axis: usize },

    #[error("channel {index} is out of range ({channels} channels)")]
    ChannelOutOfRange { index: usize, channels: usize },

    #[error("position ({x}, {y}) is outside the {width}x{height} view")]
    PositionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("ROI mask is {actual:?} but the view is {expected:?}")]
    MaskShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("preview option {index} does not exist ({count} options)")]
    UnknownPreviewOption { index: usize, count: usize },

    #[error("parameter index {index} is out of range ({len} parameters)")]
    ParameterIndex { index: usize, len: usize },

    #[error("component count must be at least 1")]
    InvalidComponentCount,

    #[error("no fit algorithm has been selected")]
    NoAlgorithm,

    #[error("no instrument response dataset is loaded")]
    IrfNotLoaded,

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error(transparent)]
    Ops(#[from] OpsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
