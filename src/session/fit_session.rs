use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use ndarray::{Array2, Array3, Axis};

use crate::flim::axes::{fill_trace, spatial_axes, spatial_extent};
use crate::flim::{
    FitParams, FitResults, FitType, ModelFn, NoiseType, ParamEstimator, RoiMask, RoiRect,
    UNESTIMATED, zero_model,
};
use crate::model::DatasetF32;
use crate::ops::{
    AlgorithmRegistry, BoxConvolver, Convolver, DerivedQuantity, MeanLifetime, SquareKernel,
};

use super::swap::{LentParamMap, SwapScope, WholeImage};
use super::{
    AxisSelectors, NumberHarvester, Preview, PreviewKind, PreviewOption, Result, SessionError,
    resolve_view,
};

/// External collaborators a session dispatches to.
#[derive(Clone)]
pub struct SessionServices {
    pub algorithms: Arc<AlgorithmRegistry>,
    pub convolver: Arc<dyn Convolver>,
    pub derived: Arc<dyn DerivedQuantity>,
}

impl SessionServices {
    /// Box binning and mean-lifetime previews around the given algorithms.
    pub fn new(algorithms: Arc<AlgorithmRegistry>) -> Self {
        Self {
            algorithms,
            convolver: Arc::new(BoxConvolver),
            derived: Arc::new(MeanLifetime),
        }
    }
}

impl fmt::Debug for SessionServices {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionServices")
            .field("algorithms", &self.algorithms)
            .field("derived", &self.derived.name())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Configured,
    /// Binning, ROI or position changed since panels last pulled state.
    NeedsRefresh,
    FitInFlight,
    FitComplete,
}

/// Binning of the original view, detached from the session so it can run elsewhere.
#[derive(Clone)]
pub struct BinningTask {
    source: Arc<Array3<f32>>,
    lt_axis: usize,
    radius: usize,
    convolver: Arc<dyn Convolver>,
}

impl fmt::Debug for BinningTask {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BinningTask")
            .field("shape", &self.source.shape())
            .field("radius", &self.radius)
            .finish()
    }
}

impl BinningTask {
    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn run(self) -> crate::ops::Result<BinnedView> {
        let view = if self.radius == 0 {
            self.source
        } else {
            let kernel = SquareKernel::for_radius(self.radius);
            Arc::new(
                self.convolver
                    .convolve(&self.source, spatial_axes(self.lt_axis), &kernel)?,
            )
        };
        Ok(BinnedView {
            radius: self.radius,
            view,
        })
    }
}

/// Output of a [`BinningTask`], applied with [`FitSession::apply_binned`].
#[derive(Debug, Clone)]
pub struct BinnedView {
    radius: usize,
    view: Arc<Array3<f32>>,
}

impl BinnedView {
    pub fn radius(&self) -> usize {
        self.radius
    }
}

/// Live state behind an interactive fitting UI.
pub struct FitSession {
    services: SessionServices,
    params: FitParams,
    irf_params: FitParams,
    irf_name: Option<String>,
    irf_intensity: Option<Array2<f32>>,
    results: FitResults,
    orig_trans: Arc<Array3<f32>>,
    /// Binned, not yet masked.
    binned_base: Arc<Array3<f32>>,
    /// Binned and masked; what fits and previews read.
    binned_trans: Arc<Array3<f32>>,
    bin_radius: usize,
    is_picking_irf: bool,
    fit_type: Option<FitType>,
    preview: (usize, usize),
    disp_params: Option<Array3<f32>>,
    persistent_options: Vec<PreviewOption>,
    contextual_options: Vec<PreviewOption>,
    phase: SessionPhase,
}

impl fmt::Debug for FitSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FitSession")
            .field("shape", &self.orig_trans.shape())
            .field("lt_axis", &self.params.lt_axis)
            .field("fit_type", &self.fit_type)
            .field("bin_radius", &self.bin_radius)
            .field("preview", &self.preview)
            .field("phase", &self.phase)
            .finish()
    }
}

impl FitSession {
    /// Resolves `dataset` into a working view and sets up an unbinned session previewing
    /// `(0, 0)`. The parameter vectors start empty until a model is chosen.
    pub fn configure(
        dataset: &DatasetF32,
        selectors: &AxisSelectors,
        harvester: &dyn NumberHarvester,
        services: SessionServices,
    ) -> Result<Self> {
        let resolved = resolve_view(dataset, selectors, harvester)?;
        let params = FitParams {
            trans: vec![0.0; resolved.bins()],
            lt_axis: resolved.lt_axis,
            x_inc: resolved.x_inc,
            ..FitParams::default()
        };
        let orig_trans = Arc::new(resolved.view);
        let mut session = Self {
            services,
            params,
            irf_params: FitParams::default(),
            irf_name: None,
            irf_intensity: None,
            results: FitResults::default(),
            binned_base: Arc::clone(&orig_trans),
            binned_trans: Arc::clone(&orig_trans),
            orig_trans,
            bin_radius: 0,
            is_picking_irf: false,
            fit_type: None,
            preview: (0, 0),
            disp_params: None,
            persistent_options: vec![PreviewOption::intensity()],
            contextual_options: Vec::new(),
            phase: SessionPhase::Configured,
        };
        session.set_binning(0)?;
        session.phase = SessionPhase::Configured;
        info!(
            "configured session over {:?} (lifetime axis {})",
            session.orig_trans.shape(),
            session.params.lt_axis
        );
        Ok(session)
    }

    pub fn params(&self) -> &FitParams {
        &self.params
    }

    pub fn irf_params(&self) -> &FitParams {
        &self.irf_params
    }

    pub fn results(&self) -> &FitResults {
        &self.results
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Panels have pulled the latest state.
    pub fn mark_refreshed(&mut self) {
        if self.phase == SessionPhase::NeedsRefresh {
            self.phase = SessionPhase::Configured;
        }
    }

    pub fn original_view(&self) -> &Arc<Array3<f32>> {
        &self.orig_trans
    }

    pub fn working_view(&self) -> &Arc<Array3<f32>> {
        &self.binned_trans
    }

    /// `(width, height)` of the working view.
    pub fn extent(&self) -> (usize, usize) {
        spatial_extent(&self.binned_trans, self.params.lt_axis)
    }

    pub fn bin_radius(&self) -> usize {
        self.bin_radius
    }

    pub fn preview_position(&self) -> (usize, usize) {
        self.preview
    }

    pub fn fit_type(&self) -> Option<FitType> {
        self.fit_type
    }

    pub fn irf_name(&self) -> Option<&str> {
        self.irf_name.as_deref()
    }

    pub fn has_irf(&self) -> bool {
        self.irf_params.trans_map.is_some()
    }

    pub fn is_picking_irf(&self) -> bool {
        self.is_picking_irf
    }

    pub fn binning_task(&self, radius: usize) -> BinningTask {
        BinningTask {
            source: Arc::clone(&self.orig_trans),
            lt_axis: self.params.lt_axis,
            radius,
            convolver: Arc::clone(&self.services.convolver),
        }
    }

    /// Bins the original view in place and re-applies the ROI.
    pub fn set_binning(&mut self, radius: usize) -> Result<()> {
        let binned = self.binning_task(radius).run()?;
        self.apply_binned(binned)
    }

    /// Installs a binned view produced by [`BinningTask::run`].
    pub fn apply_binned(&mut self, binned: BinnedView) -> Result<()> {
        debug!("binning radius {} -> {}", self.bin_radius, binned.radius);
        self.bin_radius = binned.radius;
        self.binned_base = binned.view;
        self.apply_roi()
    }

    pub fn set_roi(&mut self, mask: RoiMask) -> Result<()> {
        let expected = spatial_extent(&self.binned_base, self.params.lt_axis);
        match mask.shape() {
            Some(actual) if actual != expected => {
                return Err(SessionError::MaskShapeMismatch { expected, actual });
            }
            _ => {}
        }
        self.params.roi_mask = mask;
        self.apply_roi()
    }

    pub fn set_roi_rect(&mut self, rect: Option<RoiRect>) -> Result<()> {
        let mask = match rect {
            Some(rect) => {
                let (width, height) = spatial_extent(&self.binned_base, self.params.lt_axis);
                RoiMask::rect(width, height, &rect)
            }
            None => RoiMask::All,
        };
        self.set_roi(mask)
    }

    fn apply_roi(&mut self) -> Result<()> {
        let lt_axis = self.params.lt_axis;
        self.binned_trans = if self.params.roi_mask.is_all() {
            Arc::clone(&self.binned_base)
        } else {
            Arc::new(self.params.roi_mask.apply(&self.binned_base, lt_axis))
        };

        let estimator = ParamEstimator::new(&self.binned_trans, lt_axis, &self.params.roi_mask);
        let intensity = estimator.intensity_map();
        let window = estimator.estimate_start_end();
        window.apply_to(&mut self.params);
        self.results.intensity_map = Some(intensity);
        debug!("fit window [{}, {})", window.start, window.end);

        let (x, y) = self.preview;
        self.load_main_trace(x, y)?;
        self.phase = SessionPhase::NeedsRefresh;
        Ok(())
    }

    pub fn set_algorithm(&mut self, fit_type: FitType) {
        self.fit_type = Some(fit_type);
        self.params
            .resize_params(fit_type.n_param(self.params.n_comp));
    }

    pub fn set_component_count(&mut self, n_comp: usize) -> Result<()> {
        if n_comp == 0 {
            return Err(SessionError::InvalidComponentCount);
        }
        self.params.n_comp = n_comp;
        if let Some(fit_type) = self.fit_type {
            self.params.resize_params(fit_type.n_param(n_comp));
        }
        Ok(())
    }

    /// Switches variant and component count together, resizing the parameter vectors once.
    pub fn set_model(&mut self, fit_type: FitType, n_comp: usize) -> Result<()> {
        if n_comp == 0 {
            return Err(SessionError::InvalidComponentCount);
        }
        self.params.n_comp = n_comp;
        self.set_algorithm(fit_type);
        Ok(())
    }

    pub fn n_param(&self) -> usize {
        self.fit_type
            .map_or(0, |fit_type| fit_type.n_param(self.params.n_comp))
    }

    pub fn fit_function(&self) -> ModelFn {
        self.fit_type.map_or(zero_model as ModelFn, FitType::model)
    }

    /// Model evaluated over the fit window with the latest fitted parameters.
    pub fn model_curve(&self) -> Vec<f32> {
        let model = self.fit_function();
        (self.params.fit_start..self.params.fit_end)
            .map(|bin| {
                let t = (bin - self.params.fit_start) as f32 * self.params.x_inc;
                model(t, &self.results.param)
            })
            .collect()
    }

    pub fn set_intensity_threshold(&mut self, threshold: f32) {
        self.params.i_thresh = threshold;
    }

    pub fn set_chisq_target(&mut self, target: f32) {
        self.params.chisq_target = target;
    }

    pub fn set_chisq_delta(&mut self, delta: f32) {
        self.params.chisq_delta = delta;
    }

    pub fn set_noise(&mut self, noise: NoiseType) {
        self.params.noise = noise;
    }

    pub fn set_param_value(&mut self, index: usize, value: f32) -> Result<()> {
        let len = self.params.n_param();
        let slot = self
            .params
            .param
            .get_mut(index)
            .ok_or(SessionError::ParameterIndex { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Pins or frees a parameter. A freed parameter is re-estimated from scratch.
    pub fn set_param_fixed(&mut self, index: usize, fixed: bool) -> Result<()> {
        let len = self.params.n_param();
        if index >= len {
            return Err(SessionError::ParameterIndex { index, len });
        }
        self.params.param_free[index] = !fixed;
        if !fixed {
            self.params.param[index] = UNESTIMATED;
        }
        Ok(())
    }

    pub fn set_picking_irf(&mut self, picking: bool) -> Result<()> {
        if picking && !self.has_irf() {
            return Err(SessionError::IrfNotLoaded);
        }
        self.is_picking_irf = picking;
        Ok(())
    }

    /// Loads the trace at `(x, y)`: into the IRF bundle while picking an IRF, otherwise
    /// into the main bundle, clearing every free parameter estimate.
    ///
    /// `x` indexes the first stored spatial axis and `y` the second. TIFF stacks are read
    /// as `[Y, X, Lifetime]`, so for those `x` is the row and `y` the column.
    pub fn set_preview_position(&mut self, x: usize, y: usize) -> Result<()> {
        if self.is_picking_irf {
            let view = self
                .irf_params
                .trans_map
                .clone()
                .ok_or(SessionError::IrfNotLoaded)?;
            let lt_axis = self.irf_params.lt_axis;
            check_position(&view, lt_axis, x, y)?;
            fill_trace(&view, &mut self.irf_params.trans, x, y, lt_axis);
            self.params.instr = self
                .irf_params
                .trans
                .get(self.irf_params.fit_start..self.irf_params.fit_end)
                .map(<[f32]>::to_vec);
            debug!("picked IRF trace at ({x}, {y})");
        } else {
            self.load_main_trace(x, y)?;
        }
        self.phase = SessionPhase::NeedsRefresh;
        Ok(())
    }

    /// Refreshes the main bundle's trace from the working view, whatever is being picked.
    fn load_main_trace(&mut self, x: usize, y: usize) -> Result<()> {
        let lt_axis = self.params.lt_axis;
        check_position(&self.binned_trans, lt_axis, x, y)?;
        let window = fill_trace(&self.binned_trans, &mut self.params.trans, x, y, lt_axis);
        self.params.trans_map = Some(Arc::new(window.to_owned()));
        self.params.clear_free_estimates();
        self.preview = (x, y);
        debug!("preview position ({x}, {y})");
        Ok(())
    }

    fn algorithm_name(&self) -> Result<&'static str> {
        self.fit_type
            .map(FitType::op_name)
            .ok_or(SessionError::NoAlgorithm)
    }

    /// Fits the previewed pixel with the live parameter vectors.
    pub fn fit_preview(&mut self) -> Result<&FitResults> {
        let name = self.algorithm_name()?;
        self.params.sync_param_map();
        let mut results = self.services.algorithms.run(name, &self.params)?;
        results.intensity_map = self.results.intensity_map.take();
        self.results = results;
        Ok(&self.results)
    }

    /// Fits the whole working view. The preview buffers are swapped out for the duration
    /// of the call and are back in place afterwards whether or not the algorithm failed.
    pub fn fit(&mut self) -> Result<&FitResults> {
        let name = self.algorithm_name()?;
        let previous = self.phase;
        self.phase = SessionPhase::FitInFlight;
        let outcome = {
            let whole = WholeImage::new(Arc::clone(&self.binned_trans));
            let scope = SwapScope::install(&mut self.params, whole);
            self.services.algorithms.run(name, &scope)
        };
        let mut results = match outcome {
            Ok(results) => results,
            Err(error) => {
                self.phase = previous;
                return Err(error.into());
            }
        };

        results.intensity_map = self.results.intensity_map.take();
        self.disp_params = results.param_map.clone();
        if let Some(fit_type) = self.fit_type {
            self.contextual_options =
                PreviewOption::contextual(fit_type.param_names(self.params.n_comp));
        }
        self.results = results;
        self.phase = SessionPhase::FitComplete;
        info!("{name} finished, chi² = {}", self.results.chisq);
        Ok(&self.results)
    }

    /// Configures `dataset` as the instrument response. On failure the previous IRF, if
    /// any, stays loaded.
    pub fn load_irf(
        &mut self,
        dataset: &DatasetF32,
        selectors: &AxisSelectors,
        harvester: &dyn NumberHarvester,
    ) -> Result<()> {
        let resolved = resolve_view(dataset, selectors, harvester)?;
        self.irf_params.trans = vec![0.0; resolved.bins()];
        self.irf_params.lt_axis = resolved.lt_axis;
        self.irf_params.x_inc = resolved.x_inc;
        self.irf_params.trans_map = Some(Arc::new(resolved.view));
        self.irf_name = dataset.name();
        info!("loaded IRF {:?}", self.irf_name);
        self.update_irf();
        Ok(())
    }

    pub fn clear_irf(&mut self) {
        self.irf_params.trans_map = None;
        self.irf_name = None;
        self.update_irf();
    }

    /// Brings the IRF window, intensity and preview option in line with whether an IRF is
    /// loaded.
    pub fn update_irf(&mut self) {
        match self.irf_params.trans_map.clone() {
            Some(view) => {
                let roi = RoiMask::All;
                let estimator = ParamEstimator::new(&view, self.irf_params.lt_axis, &roi);
                estimator
                    .estimate_start_end()
                    .apply_to(&mut self.irf_params);
                self.irf_intensity = Some(estimator.intensity_map());
                if !self
                    .persistent_options
                    .iter()
                    .any(|option| option.kind == PreviewKind::IrfIntensity)
                {
                    self.persistent_options.push(PreviewOption::irf_intensity());
                }
            }
            None => {
                self.persistent_options
                    .retain(|option| option.kind != PreviewKind::IrfIntensity);
                self.irf_params.trans.clear();
                self.irf_intensity = None;
                self.params.instr = None;
                self.is_picking_irf = false;
            }
        }
    }

    pub fn preview_entries(&self) -> Vec<&PreviewOption> {
        self.persistent_options
            .iter()
            .chain(&self.contextual_options)
            .collect()
    }

    pub fn preview_options(&self) -> Vec<String> {
        self.preview_entries()
            .into_iter()
            .map(|option| option.label.clone())
            .collect()
    }

    pub fn preview_ready(&self) -> bool {
        self.disp_params.is_some() || self.irf_intensity.is_some()
    }

    pub fn preview_image(&mut self, index: usize) -> Result<Preview> {
        let entries = self.preview_entries();
        let kind = entries
            .get(index)
            .map(|option| option.kind)
            .ok_or(SessionError::UnknownPreviewOption {
                index,
                count: entries.len(),
            })?;
        if self.fit_type.is_none() || !self.preview_ready() {
            return Ok(Preview::NotReady);
        }

        let lt_axis = self.params.lt_axis;
        let map = match kind {
            PreviewKind::Intensity => self.results.intensity_map.clone(),
            PreviewKind::IrfIntensity => self.irf_intensity.clone(),
            PreviewKind::Parameter(param) => match &self.disp_params {
                Some(map) => {
                    let len = map.len_of(Axis(lt_axis));
                    if param >= len {
                        return Err(SessionError::ParameterIndex { index: param, len });
                    }
                    Some(map.index_axis(Axis(lt_axis), param).to_owned())
                }
                None => None,
            },
            PreviewKind::MeanLifetime => {
                if self.disp_params.is_none() {
                    return Ok(Preview::NotReady);
                }
                let scope = SwapScope::install(
                    &mut self.results,
                    LentParamMap(&mut self.disp_params),
                );
                Some(self.services.derived.compute(&scope, lt_axis)?)
            }
        };
        Ok(map.map_or(Preview::NotReady, Preview::Ready))
    }
}

fn check_position(view: &Array3<f32>, lt_axis: usize, x: usize, y: usize) -> Result<()> {
    let (width, height) = spatial_extent(view, lt_axis);
    if x >= width || y >= height {
        return Err(SessionError::PositionOutOfBounds {
            x,
            y,
            width,
            height,
        });
    }
    Ok(())
}
