use crate::flim::{FitType, NoiseType};
use crate::session::FitSession;

use super::{Panel, PanelHandle, SessionEdit};

/// One row of the parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRow {
    pub label: String,
    pub value: f32,
    pub fixed: bool,
    /// Latest fitted value, if a fit has produced one for this slot.
    pub fitted: Option<f32>,
}

/// Fit settings and the parameter table.
///
/// The setters behave like bound widgets: a value that actually changes raises an edit,
/// whether the change came from the user or from [`Panel::refresh`].
#[derive(Debug)]
pub struct SettingsPanel {
    handle: PanelHandle,
    threshold: f32,
    threshold_max: f32,
    chisq_target: f32,
    chisq: f32,
    noise: NoiseType,
    fit_type: Option<FitType>,
    n_comp: usize,
    rows: Vec<ParamRow>,
    preview_options: Vec<String>,
    refreshes: usize,
}

impl SettingsPanel {
    pub fn new(handle: PanelHandle) -> Self {
        Self {
            handle,
            threshold: 0.0,
            threshold_max: 0.0,
            chisq_target: 0.0,
            chisq: 0.0,
            noise: NoiseType::default(),
            fit_type: None,
            n_comp: 0,
            rows: Vec::new(),
            preview_options: Vec::new(),
            refreshes: 0,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Upper end of the threshold slider: the brightest pixel of the intensity map.
    pub fn threshold_max(&self) -> f32 {
        self.threshold_max
    }

    pub fn chisq_target(&self) -> f32 {
        self.chisq_target
    }

    pub fn chisq(&self) -> f32 {
        self.chisq
    }

    pub fn noise(&self) -> NoiseType {
        self.noise
    }

    pub fn fit_type(&self) -> Option<FitType> {
        self.fit_type
    }

    pub fn n_comp(&self) -> usize {
        self.n_comp
    }

    pub fn rows(&self) -> &[ParamRow] {
        &self.rows
    }

    pub fn preview_options(&self) -> &[String] {
        &self.preview_options
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        if threshold != self.threshold {
            self.threshold = threshold;
            self.handle.submit(SessionEdit::IntensityThreshold(threshold));
        }
    }

    pub fn set_chisq_target(&mut self, target: f32) {
        if target != self.chisq_target {
            self.chisq_target = target;
            self.handle.submit(SessionEdit::ChisqTarget(target));
        }
    }

    pub fn select_noise(&mut self, noise: NoiseType) {
        if noise != self.noise {
            self.noise = noise;
            self.handle.submit(SessionEdit::Noise(noise));
        }
    }

    pub fn select_model(&mut self, fit_type: FitType, n_comp: usize) {
        if Some(fit_type) != self.fit_type || n_comp != self.n_comp {
            self.fit_type = Some(fit_type);
            self.n_comp = n_comp;
            self.handle.submit(SessionEdit::Model { fit_type, n_comp });
        }
    }

    pub fn edit_param(&mut self, index: usize, value: f32) {
        if let Some(row) = self.rows.get_mut(index) {
            row.value = value;
        }
        self.handle.submit(SessionEdit::ParamValue { index, value });
    }

    pub fn toggle_fixed(&mut self, index: usize, fixed: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.fixed = fixed;
        }
        self.handle.submit(SessionEdit::ParamFixed { index, fixed });
    }

    pub fn set_binning(&self, radius: usize) {
        self.handle.submit(SessionEdit::Binning(radius));
    }

    pub fn select_irf(&self, name: Option<String>) {
        self.handle.submit(SessionEdit::Irf(name));
    }

    pub fn set_picking_irf(&self, picking: bool) {
        self.handle.submit(SessionEdit::PickingIrf(picking));
    }

    pub fn click_fit(&self) {
        self.handle.submit(SessionEdit::FitDataset);
    }
}

impl Panel for SettingsPanel {
    fn refresh(&mut self, session: &FitSession) {
        let params = session.params();
        let results = session.results();

        self.threshold_max = results
            .intensity_map
            .as_ref()
            .map_or(0.0, |map| map.fold(0.0_f32, |max, value| max.max(*value)));
        self.set_threshold(params.i_thresh);
        self.set_chisq_target(params.chisq_target);
        self.select_noise(params.noise);
        self.chisq = results.chisq;
        self.fit_type = session.fit_type();
        self.n_comp = params.n_comp;

        let labels = self
            .fit_type
            .map(|fit_type| fit_type.param_names(self.n_comp))
            .unwrap_or_default();
        self.rows = params
            .param
            .iter()
            .zip(&params.param_free)
            .enumerate()
            .map(|(index, (value, free))| ParamRow {
                label: labels.get(index).cloned().unwrap_or_default(),
                value: *value,
                fixed: !*free,
                fitted: results.param.get(index).copied(),
            })
            .collect();
        self.preview_options = session.preview_options();
        self.refreshes += 1;
    }

    fn destroy(&mut self) {
        self.rows.clear();
        self.preview_options.clear();
    }
}
