use log::{debug, warn};
use ndarray::{Array3, Axis, Ix3};
use serde::{Deserialize, Serialize};

use crate::model::{AxisKind, CoreError, DatasetF32};

use super::{NumberHarvester, NumberKind, NumberPrompt, PromptKind, Result, SessionError};

/// Default total time range offered by the calibration prompt, in ns.
const DEFAULT_TIME_RANGE: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSelection {
    pub axis: Option<usize>,
    pub index: Option<usize>,
}

/// Caller-supplied choices that take precedence over metadata lookup and prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisSelectors {
    #[serde(default)]
    pub channel: ChannelSelection,
    #[serde(default)]
    pub lifetime_axis: Option<usize>,
    /// Total time covered by the lifetime axis, in ns.
    #[serde(default)]
    pub time_range: Option<f32>,
}

/// A dataset reduced to a 3-d working view with its lifetime axis and calibration.
#[derive(Debug, Clone)]
pub struct ResolvedView {
    pub view: Array3<f32>,
    pub lt_axis: usize,
    pub x_inc: f32,
}

impl ResolvedView {
    pub fn bins(&self) -> usize {
        self.view.len_of(Axis(self.lt_axis))
    }
}

/// Resolves the channel and lifetime axes of `dataset` and its time calibration.
///
/// Nothing is returned unless every choice succeeded, so a cancelled prompt leaves the
/// caller's state as it was.
pub fn resolve_view(
    dataset: &DatasetF32,
    selectors: &AxisSelectors,
    harvester: &dyn NumberHarvester,
) -> Result<ResolvedView> {
    let ndim = dataset.ndim();
    if !(3..=4).contains(&ndim) {
        return Err(SessionError::InvalidDimensionality { ndim });
    }
    let metadata = &dataset.metadata;

    let mut data = dataset.data.view();
    let mut channel_axis = None;
    if ndim == 4 {
        let axis = match selectors
            .channel
            .axis
            .or_else(|| metadata.find_axis(&AxisKind::CHANNEL_LABELS))
        {
            Some(axis) => axis,
            None => prompt_index(
                harvester,
                PromptKind::ChannelAxis,
                "Multiple Channel Detected",
                "Select Channel Dimension Index:",
                ndim,
            )?,
        };
        if axis >= ndim {
            return Err(SessionError::AxisOutOfRange { axis, ndim });
        }
        let channels = dataset.shape()[axis];
        let index = match selectors.channel.index {
            Some(index) => index,
            None => prompt_index(
                harvester,
                PromptKind::Channel,
                "Multiple Channel Detected",
                "Select Channel:",
                channels,
            )?,
        };
        if index >= channels {
            return Err(SessionError::ChannelOutOfRange { index, channels });
        }
        data = data.index_axis_move(Axis(axis), index);
        channel_axis = Some(axis);
    }

    let lifetime_axis = match selectors
        .lifetime_axis
        .or_else(|| metadata.find_axis(&AxisKind::LIFETIME_LABELS))
    {
        Some(axis) => axis,
        None => prompt_index(
            harvester,
            PromptKind::LifetimeAxis,
            "Lifetime Axis Not Detected",
            "Select Lifetime Dimension Index:",
            ndim,
        )?,
    };
    if lifetime_axis >= ndim {
        return Err(SessionError::AxisOutOfRange {
            axis: lifetime_axis,
            ndim,
        });
    }
    if channel_axis == Some(lifetime_axis) {
        return Err(SessionError::AxisConflict {
            axis: lifetime_axis,
        });
    }
    // dropping a channel axis in front of the lifetime axis shifts it down
    let lt_axis = match channel_axis {
        Some(channel) if channel < lifetime_axis => lifetime_axis - 1,
        _ => lifetime_axis,
    };

    let view = data
        .into_dimensionality::<Ix3>()
        .map_err(CoreError::from)?
        .to_owned();
    let bins = view.len_of(Axis(lt_axis));

    let x_inc = match selectors.time_range {
        Some(range) => range_per_bin(range, bins)?,
        None => match metadata.spacing(lifetime_axis).filter(|spacing| *spacing > 0.0) {
            Some(spacing) => spacing,
            None => {
                let prompt = NumberPrompt {
                    kind: PromptKind::TimeBin,
                    title: "Time Bin Info Not Detected".to_string(),
                    number: NumberKind::Real,
                    label: "Input Time Bin (ns):".to_string(),
                    min: 0.0,
                    max: f64::INFINITY,
                    default: DEFAULT_TIME_RANGE,
                };
                let Some(range) = harvester.harvest(&prompt) else {
                    warn!("time calibration prompt cancelled");
                    return Err(SessionError::DegenerateCalibration {
                        value: metadata.spacing(lifetime_axis).unwrap_or(0.0),
                    });
                };
                range_per_bin(range as f32, bins)?
            }
        },
    };

    debug!(
        "resolved {:?} view: lifetime axis {lt_axis}, channel axis {channel_axis:?}, {x_inc} per bin",
        view.shape()
    );
    Ok(ResolvedView {
        view,
        lt_axis,
        x_inc,
    })
}

fn range_per_bin(range: f32, bins: usize) -> Result<f32> {
    let x_inc = range / bins as f32;
    if x_inc.is_finite() && x_inc > 0.0 {
        Ok(x_inc)
    } else {
        Err(SessionError::DegenerateCalibration { value: x_inc })
    }
}

fn prompt_index(
    harvester: &dyn NumberHarvester,
    kind: PromptKind,
    title: &str,
    label: &str,
    count: usize,
) -> Result<usize> {
    let prompt = NumberPrompt {
        kind,
        title: title.to_string(),
        number: NumberKind::Integer,
        label: label.to_string(),
        min: 0.0,
        max: count.saturating_sub(1) as f64,
        default: 0.0,
    };
    match harvester.harvest(&prompt) {
        Some(value) if value.is_finite() && value >= 0.0 => Ok(value.round() as usize),
        _ => {
            warn!("{kind} prompt cancelled");
            Err(SessionError::AmbiguousAxis { axis: kind })
        }
    }
}
