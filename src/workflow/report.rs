use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::flim::{FitType, NoiseType};
use crate::session::{FitSession, SessionPhase};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepReport {
    pub step: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionReport {
    pub recipe_name: Option<String>,
    pub steps: Vec<StepReport>,
    pub shape: Vec<usize>,
    pub lt_axis: usize,
    pub x_inc: f32,
    pub bin_radius: usize,
    pub position: [usize; 2],
    pub fit_window: [usize; 2],
    pub trace: Vec<f32>,
    pub fit_type: Option<FitType>,
    pub n_comp: usize,
    pub noise: NoiseType,
    pub param_names: Vec<String>,
    pub param: Vec<f32>,
    pub chisq: f32,
    pub fit_complete: bool,
    pub irf: Option<String>,
    pub preview_options: Vec<String>,
    #[serde(default)]
    pub exports: Vec<PathBuf>,
}

impl SessionReport {
    pub fn from_session(
        session: &FitSession,
        recipe_name: Option<String>,
        steps: Vec<StepReport>,
    ) -> Self {
        let params = session.params();
        let (x, y) = session.preview_position();
        let fit_type = session.fit_type();
        Self {
            recipe_name,
            steps,
            shape: session.working_view().shape().to_vec(),
            lt_axis: params.lt_axis,
            x_inc: params.x_inc,
            bin_radius: session.bin_radius(),
            position: [x, y],
            fit_window: [params.fit_start, params.fit_end],
            trace: params.trans.clone(),
            fit_type,
            n_comp: params.n_comp,
            noise: params.noise,
            param_names: fit_type
                .map(|fit_type| fit_type.param_names(params.n_comp))
                .unwrap_or_default(),
            param: session.results().param.clone(),
            chisq: session.results().chisq,
            fit_complete: session.phase() == SessionPhase::FitComplete,
            irf: session.irf_name().map(str::to_string),
            preview_options: session.preview_options(),
            exports: Vec::new(),
        }
    }
}
