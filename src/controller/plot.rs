use crate::session::FitSession;

use super::{Panel, PanelHandle, SessionEdit};

/// Decay plot for the previewed pixel: measured trace, fitted curve and residuals.
#[derive(Debug)]
pub struct PlotPanel {
    handle: PanelHandle,
    times: Vec<f32>,
    trace: Vec<f32>,
    fitted: Vec<f32>,
    residuals: Vec<f32>,
    window: (usize, usize),
    irf: Option<Vec<f32>>,
    position: (usize, usize),
}

impl PlotPanel {
    pub fn new(handle: PanelHandle) -> Self {
        Self {
            handle,
            times: Vec::new(),
            trace: Vec::new(),
            fitted: Vec::new(),
            residuals: Vec::new(),
            window: (0, 0),
            irf: None,
            position: (0, 0),
        }
    }

    /// Bin start times in ns.
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn trace(&self) -> &[f32] {
        &self.trace
    }

    /// Model over the fit window.
    pub fn fitted(&self) -> &[f32] {
        &self.fitted
    }

    pub fn residuals(&self) -> &[f32] {
        &self.residuals
    }

    pub fn window(&self) -> (usize, usize) {
        self.window
    }

    pub fn irf(&self) -> Option<&[f32]> {
        self.irf.as_deref()
    }

    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    /// A click on the preview image.
    pub fn select_pixel(&self, x: usize, y: usize) {
        self.handle.submit(SessionEdit::PreviewPosition { x, y });
    }
}

impl Panel for PlotPanel {
    fn refresh(&mut self, session: &FitSession) {
        let params = session.params();
        self.trace.clone_from(&params.trans);
        self.times = (0..self.trace.len())
            .map(|bin| bin as f32 * params.x_inc)
            .collect();
        self.window = (params.fit_start, params.fit_end);
        self.fitted = session.model_curve();
        self.residuals = self
            .trace
            .get(params.fit_start..params.fit_end)
            .unwrap_or_default()
            .iter()
            .zip(&self.fitted)
            .map(|(measured, model)| measured - model)
            .collect();
        self.irf.clone_from(&params.instr);
        self.position = session.preview_position();
    }

    fn destroy(&mut self) {
        self.trace.clear();
        self.fitted.clear();
        self.residuals.clear();
        self.irf = None;
    }
}
