use crate::flim::{FitType, NoiseType, RoiRect};

/// A change raised by a panel, applied to the session on the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEdit {
    IntensityThreshold(f32),
    ChisqTarget(f32),
    ChisqDelta(f32),
    Noise(NoiseType),
    Model { fit_type: FitType, n_comp: usize },
    ParamValue { index: usize, value: f32 },
    ParamFixed { index: usize, fixed: bool },
    PreviewPosition { x: usize, y: usize },
    PickingIrf(bool),
    /// `None` selects the whole image.
    Roi(Option<RoiRect>),
    /// Runs on the background worker; the update follows the hand-back.
    Binning(usize),
    /// Instrument response by directory name; `None` unloads it.
    Irf(Option<String>),
    FitDataset,
}
