use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::flim::{FitType, NoiseType, RoiRect};
use crate::session::{AxisSelectors, PresetHarvester};

use super::{PipelineError, Result};

/// Everything needed to replay an interactive fitting session without a UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionRecipe {
    pub name: Option<String>,
    pub axes: AxisSelectors,
    pub binning: usize,
    pub roi: Option<RoiRect>,
    pub algorithm: Option<FitType>,
    pub components: usize,
    pub noise: NoiseType,
    pub intensity_threshold: f32,
    pub chisq_target: f32,
    pub fixed: Vec<FixedParam>,
    pub position: Option<[usize; 2]>,
    pub irf: Option<IrfRecipe>,
    pub fit_dataset: bool,
    pub exports: Vec<MapExport>,
}

impl Default for SessionRecipe {
    fn default() -> Self {
        Self {
            name: None,
            axes: AxisSelectors::default(),
            binning: 0,
            roi: None,
            algorithm: None,
            components: 1,
            noise: NoiseType::default(),
            intensity_threshold: 0.0,
            chisq_target: 1.0,
            fixed: Vec::new(),
            position: None,
            irf: None,
            fit_dataset: false,
            exports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FixedParam {
    pub index: usize,
    pub value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrfRecipe {
    pub path: PathBuf,
    #[serde(default)]
    pub axes: AxisSelectors,
    /// Pixel whose trace becomes the instrument response.
    #[serde(default)]
    pub position: Option<[usize; 2]>,
}

/// A preview map written after the session has run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapExport {
    /// Preview option label, e.g. `Intensity` or `τₘ`.
    pub option: String,
    pub path: PathBuf,
}

impl SessionRecipe {
    pub fn validate(&self) -> Result<()> {
        if self.components == 0 {
            return Err(PipelineError::Parse(
                "recipe must use at least one component".to_string(),
            ));
        }
        if let Some(roi) = &self.roi {
            if roi.is_empty() {
                return Err(PipelineError::Parse(format!(
                    "ROI [{}, {}) x [{}, {}) is empty",
                    roi.x0, roi.x1, roi.y0, roi.y1
                )));
            }
        }
        if !self.fixed.is_empty() && self.algorithm.is_none() {
            return Err(PipelineError::Parse(
                "fixed parameters need an algorithm".to_string(),
            ));
        }
        for export in &self.exports {
            if export.option.trim().is_empty() {
                return Err(PipelineError::Parse(format!(
                    "export to `{}` names no preview option",
                    export.path.display()
                )));
            }
        }
        Ok(())
    }

    /// Headless prompt answers: every prompt takes its offered default.
    pub fn harvester(&self) -> PresetHarvester {
        PresetHarvester::accepting_defaults()
    }
}
