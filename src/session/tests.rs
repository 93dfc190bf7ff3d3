use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use ndarray::{Array, Array3, Axis};

use crate::flim::{FitParams, FitResults, FitType, RoiMask, RoiRect, UNESTIMATED};
use crate::model::{AxisKind, Dataset, DatasetF32, Dim, Metadata, PixelType};
use crate::ops::{AlgorithmRegistry, FitAlgorithm, OpsError};

use super::{
    AxisSelectors, ChannelSelection, FitSession, NumberPrompt, PresetHarvester, Preview,
    PromptKind, SessionError, SessionPhase, SessionServices,
};

const WIDTH: usize = 4;
const HEIGHT: usize = 3;
const BINS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
struct Observation {
    shape: Vec<usize>,
    param_map_shape: Option<Vec<usize>>,
}

/// Returns amplitude 1 and lifetime 2 for every component of every pixel it is given.
#[derive(Default)]
struct RecordingFit {
    seen: Mutex<Vec<Observation>>,
}

impl RecordingFit {
    fn observations(&self) -> Vec<Observation> {
        self.seen.lock().expect("lock").clone()
    }
}

impl FitAlgorithm for RecordingFit {
    fn name(&self) -> &'static str {
        "fit.lma"
    }

    fn fit(&self, params: &FitParams) -> crate::ops::Result<FitResults> {
        let view = params
            .trans_map
            .as_ref()
            .ok_or_else(|| OpsError::AlgorithmFailed {
                name: self.name().to_string(),
                message: "no working view".to_string(),
            })?;
        self.seen.lock().expect("lock").push(Observation {
            shape: view.shape().to_vec(),
            param_map_shape: params.param_map.as_ref().map(|map| map.shape().to_vec()),
        });

        let lt_axis = params.lt_axis;
        let mut shape = [view.shape()[0], view.shape()[1], view.shape()[2]];
        shape[lt_axis] = params.n_param();
        let param_map = Array3::from_shape_fn(shape, |(a, b, c)| match [a, b, c][lt_axis] {
            0 => 0.0,
            slot if slot % 2 == 1 => 1.0,
            _ => 2.0,
        });
        let param = (0..params.n_param())
            .map(|slot| match slot {
                0 => 0.0,
                slot if slot % 2 == 1 => 1.0,
                _ => 2.0,
            })
            .collect();
        Ok(FitResults {
            param_map: Some(param_map),
            chisq: 1.25,
            param,
            ..FitResults::default()
        })
    }
}

struct FailingFit;

impl FitAlgorithm for FailingFit {
    fn name(&self) -> &'static str {
        "fit.lma"
    }

    fn fit(&self, _params: &FitParams) -> crate::ops::Result<FitResults> {
        Err(OpsError::AlgorithmFailed {
            name: self.name().to_string(),
            message: "did not converge".to_string(),
        })
    }
}

fn sample(x: usize, y: usize, t: usize) -> f32 {
    (x + 1) as f32 * 10.0 * (-(t as f32) / 2.0).exp() + y as f32
}

/// `[X, Y, Time]` decay stack calibrated at 0.5 ns per bin.
fn decay_dataset() -> DatasetF32 {
    let data = Array::from_shape_fn((WIDTH, HEIGHT, BINS), |(x, y, t)| sample(x, y, t)).into_dyn();
    let metadata = Metadata {
        dims: vec![
            Dim::new(AxisKind::X, WIDTH),
            Dim::new(AxisKind::Y, HEIGHT),
            Dim::calibrated(AxisKind::Time, BINS, 0.5, "ns"),
        ],
        pixel_type: PixelType::F32,
        ..Metadata::default()
    };
    Dataset::new(data, metadata).expect("dataset")
}

fn services_with(algorithm: Arc<dyn FitAlgorithm>) -> SessionServices {
    let mut registry = AlgorithmRegistry::new();
    registry.register_shared(algorithm);
    SessionServices::new(Arc::new(registry))
}

fn session_with(algorithm: Arc<dyn FitAlgorithm>) -> FitSession {
    FitSession::configure(
        &decay_dataset(),
        &AxisSelectors::default(),
        &PresetHarvester::new(),
        services_with(algorithm),
    )
    .expect("configure")
}

fn no_prompts(prompt: &NumberPrompt) -> Option<f64> {
    panic!("unexpected prompt: {prompt:?}")
}

#[test]
fn configure_rejects_unsupported_rank() {
    let dataset = Dataset::from_data_with_default_metadata(
        Array::<f32, _>::zeros((4, 4)).into_dyn(),
        PixelType::F32,
    );
    let error = FitSession::configure(
        &dataset,
        &AxisSelectors::default(),
        &no_prompts,
        SessionServices::new(Arc::new(AlgorithmRegistry::new())),
    )
    .expect_err("2-d data");
    assert!(matches!(error, SessionError::InvalidDimensionality { ndim: 2 }));
}

#[test]
fn configure_reads_axes_and_calibration_from_metadata() {
    let session = FitSession::configure(
        &decay_dataset(),
        &AxisSelectors::default(),
        &no_prompts,
        SessionServices::new(Arc::new(AlgorithmRegistry::new())),
    )
    .expect("configure");
    let params = session.params();
    assert_eq!(params.lt_axis, 2);
    assert_relative_eq!(params.x_inc, 0.5);
    assert!(params.param.is_empty());
    assert!(params.param_free.is_empty());
    assert_eq!(params.trans.len(), BINS);
    assert_eq!(session.extent(), (WIDTH, HEIGHT));
    assert_eq!(session.preview_options(), vec!["Intensity"]);
    assert_eq!(session.phase(), SessionPhase::Configured);
}

#[test]
fn configure_collapses_channel_and_shifts_lifetime_axis() {
    let data = Array::from_shape_fn((2, WIDTH, HEIGHT, BINS), |(c, x, y, t)| {
        sample(x, y, t) + 100.0 * c as f32
    })
    .into_dyn();
    let metadata = Metadata {
        dims: vec![
            Dim::new(AxisKind::Channel, 2),
            Dim::new(AxisKind::X, WIDTH),
            Dim::new(AxisKind::Y, HEIGHT),
            Dim::calibrated(AxisKind::Lifetime, BINS, 0.25, "ns"),
        ],
        ..Metadata::default()
    };
    let dataset = Dataset::new(data, metadata).expect("dataset");
    let harvester = |prompt: &NumberPrompt| {
        assert_eq!(prompt.kind, PromptKind::Channel);
        assert_eq!(prompt.max, 1.0);
        Some(1.0)
    };
    let session = FitSession::configure(
        &dataset,
        &AxisSelectors::default(),
        &harvester,
        SessionServices::new(Arc::new(AlgorithmRegistry::new())),
    )
    .expect("configure");
    assert_eq!(session.params().lt_axis, 2);
    assert_relative_eq!(session.params().x_inc, 0.25);
    assert_eq!(session.original_view()[(1, 2, 3)], sample(1, 2, 3) + 100.0);
}

#[test]
fn selectors_override_metadata_without_prompting() {
    let selectors = AxisSelectors {
        channel: ChannelSelection::default(),
        lifetime_axis: Some(2),
        time_range: Some(16.0),
    };
    let session = FitSession::configure(
        &decay_dataset(),
        &selectors,
        &no_prompts,
        SessionServices::new(Arc::new(AlgorithmRegistry::new())),
    )
    .expect("configure");
    assert_relative_eq!(session.params().x_inc, 2.0);
}

#[test]
fn missing_lifetime_axis_is_prompted() {
    let dataset = Dataset::from_data_with_default_metadata(
        Array::from_shape_fn((BINS, WIDTH, HEIGHT), |(t, x, y)| sample(x, y, t)).into_dyn(),
        PixelType::F32,
    );
    let harvester = PresetHarvester::new()
        .with_answer(PromptKind::LifetimeAxis, 0.0)
        .with_answer(PromptKind::TimeBin, 8.0);
    let session = FitSession::configure(
        &dataset,
        &AxisSelectors::default(),
        &harvester,
        SessionServices::new(Arc::new(AlgorithmRegistry::new())),
    )
    .expect("configure");
    assert_eq!(session.params().lt_axis, 0);
    assert_relative_eq!(session.params().x_inc, 1.0);
    assert_eq!(session.params().trans[0], sample(0, 0, 0));
}

#[test]
fn cancelled_prompts_abort_configuration() {
    let dataset = Dataset::from_data_with_default_metadata(
        Array::<f32, _>::ones((BINS, WIDTH, HEIGHT)).into_dyn(),
        PixelType::F32,
    );
    let services = SessionServices::new(Arc::new(AlgorithmRegistry::new()));
    let error = FitSession::configure(
        &dataset,
        &AxisSelectors::default(),
        &PresetHarvester::new(),
        services.clone(),
    )
    .expect_err("cancelled");
    assert!(matches!(
        error,
        SessionError::AmbiguousAxis {
            axis: PromptKind::LifetimeAxis
        }
    ));

    let harvester = PresetHarvester::new()
        .with_answer(PromptKind::LifetimeAxis, 0.0)
        .with_answer(PromptKind::TimeBin, 0.0);
    let error = FitSession::configure(&dataset, &AxisSelectors::default(), &harvester, services)
        .expect_err("zero time range");
    assert!(matches!(error, SessionError::DegenerateCalibration { .. }));
}

#[test]
fn zero_binning_is_the_identity() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    assert_eq!(**session.working_view(), **session.original_view());

    session.set_binning(1).expect("bin");
    assert_ne!(**session.working_view(), **session.original_view());
    session.set_binning(0).expect("unbin");
    session.set_binning(0).expect("unbin again");
    assert_eq!(**session.working_view(), **session.original_view());
    assert_eq!(session.bin_radius(), 0);
}

#[test]
fn repeated_binning_does_not_compound() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    session.set_binning(1).expect("bin");
    let once = Arc::clone(session.working_view());
    session.set_binning(1).expect("bin again");
    assert_eq!(**session.working_view(), *once);
    assert_eq!(session.phase(), SessionPhase::NeedsRefresh);
}

#[test]
fn binning_task_runs_off_the_session_thread() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    let task = session.binning_task(1);
    let binned = std::thread::spawn(move || task.run())
        .join()
        .expect("join")
        .expect("binning");
    assert_eq!(binned.radius(), 1);
    session.apply_binned(binned).expect("apply");
    let threaded = Arc::clone(session.working_view());

    session.set_binning(1).expect("bin inline");
    assert_eq!(**session.working_view(), *threaded);
}

#[test]
fn roi_masks_working_view_but_not_original() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    let error = session
        .set_roi(RoiMask::Pixels(ndarray::Array2::from_elem((2, 2), true)))
        .expect_err("wrong shape");
    assert!(matches!(error, SessionError::MaskShapeMismatch { .. }));

    session
        .set_roi_rect(Some(RoiRect {
            x0: 0,
            y0: 0,
            x1: 2,
            y1: HEIGHT,
        }))
        .expect("roi");
    let view = session.working_view();
    assert_eq!(view[(3, 0, 0)], 0.0);
    assert_eq!(view[(1, 2, 4)], sample(1, 2, 4));
    assert_eq!(session.original_view()[(3, 0, 0)], sample(3, 0, 0));
    let intensity = session.results().intensity_map.as_ref().expect("intensity");
    assert_eq!(intensity[(3, 1)], 0.0);
    assert!(intensity[(0, 1)] > 0.0);

    session.set_roi_rect(None).expect("select all");
    assert_eq!(session.working_view()[(3, 0, 0)], sample(3, 0, 0));
}

#[test]
fn position_change_clears_only_free_parameters() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    session.set_model(FitType::Lma, 1).expect("model");
    for (index, value) in [1.0, 2.0, 3.0].into_iter().enumerate() {
        session.set_param_value(index, value).expect("value");
    }
    session.set_param_fixed(1, true).expect("fix");
    assert_eq!(session.params().param_free, vec![true, false, true]);

    session.set_preview_position(1, 1).expect("move");
    assert_eq!(session.params().param, vec![UNESTIMATED, 2.0, UNESTIMATED]);
    assert_eq!(session.preview_position(), (1, 1));
    let expected = (0..BINS).map(|t| sample(1, 1, t)).collect::<Vec<_>>();
    assert_eq!(session.params().trans, expected);
}

#[test]
fn freeing_a_parameter_resets_it() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    session.set_model(FitType::Global, 1).expect("model");
    session.set_param_fixed(2, true).expect("fix");
    session.set_param_value(2, 4.5).expect("value");
    session.set_param_fixed(2, false).expect("free");
    assert_eq!(session.params().param[2], UNESTIMATED);
    assert!(matches!(
        session.set_param_value(3, 1.0),
        Err(SessionError::ParameterIndex { index: 3, len: 3 })
    ));
}

#[test]
fn model_change_resizes_with_sentinel() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    assert_eq!(session.n_param(), 0);
    session.set_model(FitType::Lma, 1).expect("model");
    session.set_param_fixed(0, true).expect("fix");
    session.set_param_value(0, 0.5).expect("value");

    session.set_model(FitType::Bayes, 2).expect("model");
    let params = session.params();
    assert_eq!(session.n_param(), 5);
    assert_eq!(params.param.len(), 5);
    assert_eq!(params.param[0], 0.5);
    assert!(!params.param_free[0]);
    assert!(params.param[3..].iter().all(|value| *value == UNESTIMATED));
    assert!(params.param_free[3..].iter().all(|free| *free));

    assert!(matches!(
        session.set_component_count(0),
        Err(SessionError::InvalidComponentCount)
    ));
}

#[test]
fn out_of_bounds_position_is_rejected() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    let error = session
        .set_preview_position(WIDTH, 0)
        .expect_err("outside");
    assert!(matches!(
        error,
        SessionError::PositionOutOfBounds {
            width: WIDTH,
            height: HEIGHT,
            ..
        }
    ));
    assert_eq!(session.preview_position(), (0, 0));
}

#[test]
fn fit_requires_an_algorithm() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    assert!(matches!(session.fit(), Err(SessionError::NoAlgorithm)));
    assert_eq!(session.fit_function()(1.0, &[5.0, 1.0, 1.0]), 0.0);
}

#[test]
fn failed_fit_restores_swapped_fields() {
    let mut session = session_with(Arc::new(FailingFit));
    session.set_model(FitType::Lma, 1).expect("model");
    session.set_preview_position(2, 1).expect("move");
    let trans_map = session.params().trans_map.clone().expect("preview window");
    let param_map = session.params().param_map.clone();
    let phase = session.phase();

    let error = session.fit().expect_err("failing algorithm");
    assert!(matches!(
        error,
        SessionError::Ops(OpsError::AlgorithmFailed { .. })
    ));
    let restored = session.params().trans_map.as_ref().expect("restored window");
    assert!(Arc::ptr_eq(restored, &trans_map));
    assert_eq!(session.params().param_map, param_map);
    assert_eq!(session.phase(), phase);

    // still usable afterwards
    session.set_preview_position(0, 0).expect("move");
}

#[test]
fn whole_image_fit_sees_full_view_and_populates_options() {
    let algorithm = Arc::new(RecordingFit::default());
    let mut session = session_with(algorithm.clone());
    session.set_model(FitType::Lma, 2).expect("model");
    assert_eq!(session.preview_image(0).expect("preview"), Preview::NotReady);
    let intensity = session.results().intensity_map.clone();

    let results = session.fit().expect("fit");
    assert_relative_eq!(results.chisq, 1.25);
    assert_eq!(results.intensity_map, intensity);
    assert_eq!(
        algorithm.observations(),
        vec![Observation {
            shape: vec![WIDTH, HEIGHT, BINS],
            param_map_shape: None,
        }]
    );
    let window = session.params().trans_map.as_ref().expect("window");
    assert_eq!(window.shape(), &[1, 1, BINS]);
    assert_eq!(session.phase(), SessionPhase::FitComplete);

    let options = session.preview_options();
    assert_eq!(
        options,
        vec!["Intensity", "z", "A₁", "τ₁", "A₂", "τ₂", "τₘ"]
    );
    assert_eq!(options.len() - 1, session.n_param() + 1);
}

#[test]
fn preview_images_after_fit() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    session.set_model(FitType::Lma, 1).expect("model");
    session.fit().expect("fit");
    assert!(session.preview_ready());

    let intensity = session
        .preview_image(0)
        .expect("intensity")
        .into_map()
        .expect("ready");
    let expected = (0..BINS).map(|t| sample(2, 1, t)).sum::<f32>();
    assert_relative_eq!(intensity[(2, 1)], expected, epsilon = 1e-4);

    let tau = session
        .preview_image(3)
        .expect("tau")
        .into_map()
        .expect("ready");
    assert_eq!(tau.dim(), (WIDTH, HEIGHT));
    assert_eq!(tau[(3, 2)], 2.0);

    let tau_m = session
        .preview_image(4)
        .expect("mean lifetime")
        .into_map()
        .expect("ready");
    assert_relative_eq!(tau_m[(1, 1)], 2.0);
    // the displayed map was only lent for the computation
    assert!(session.results().param_map.is_some());
    assert!(session.preview_image(4).expect("again").is_ready());

    assert!(matches!(
        session.preview_image(5),
        Err(SessionError::UnknownPreviewOption { index: 5, count: 5 })
    ));
}

#[test]
fn preview_fit_uses_single_pixel_buffers() {
    let algorithm = Arc::new(RecordingFit::default());
    let mut session = session_with(algorithm.clone());
    session.set_model(FitType::Lma, 1).expect("model");
    session.set_preview_position(1, 2).expect("move");

    let results = session.fit_preview().expect("preview fit");
    assert_eq!(results.param, vec![0.0, 1.0, 2.0]);
    assert!(results.intensity_map.is_some());
    assert_eq!(
        algorithm.observations(),
        vec![Observation {
            shape: vec![1, 1, BINS],
            param_map_shape: Some(vec![1, 1, 3]),
        }]
    );
    assert_eq!(session.preview_options(), vec!["Intensity"]);

    let curve = session.model_curve();
    let window = session.params().fit_window_len();
    assert_eq!(curve.len(), window);
    assert_relative_eq!(curve[0], 1.0);
    let x_inc = session.params().x_inc;
    assert_relative_eq!(curve[1], (-x_inc / 2.0).exp(), epsilon = 1e-6);
}

#[test]
fn irf_adds_option_and_feeds_instrument_trace() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    assert!(matches!(
        session.set_picking_irf(true),
        Err(SessionError::IrfNotLoaded)
    ));

    let irf = decay_dataset();
    session
        .load_irf(&irf, &AxisSelectors::default(), &no_prompts)
        .expect("irf");
    session
        .load_irf(&irf, &AxisSelectors::default(), &no_prompts)
        .expect("irf again");
    assert_eq!(session.preview_options(), vec!["Intensity", "IRF Intensity"]);
    assert!(session.preview_ready());

    session.set_picking_irf(true).expect("picking");
    session.set_preview_position(3, 2).expect("pick");
    let irf_params = session.irf_params();
    assert_eq!(irf_params.trans[0], sample(3, 2, 0));
    let instr = session.params().instr.as_ref().expect("instrument trace");
    assert_eq!(instr.len(), irf_params.fit_window_len());
    assert_eq!(session.preview_position(), (0, 0));

    session.set_model(FitType::Lma, 1).expect("model");
    let irf_map = session
        .preview_image(1)
        .expect("irf intensity")
        .into_map()
        .expect("ready");
    assert_eq!(irf_map.dim(), (WIDTH, HEIGHT));

    session.clear_irf();
    assert_eq!(session.preview_options(), vec!["Intensity"]);
    assert!(session.params().instr.is_none());
    assert!(!session.is_picking_irf());
    assert!(!session.preview_ready());
}

#[test]
fn failed_irf_load_keeps_previous_irf() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    session
        .load_irf(&decay_dataset(), &AxisSelectors::default(), &no_prompts)
        .expect("irf");
    let flat = Dataset::from_data_with_default_metadata(
        Array::<f32, _>::zeros((2, 2)).into_dyn(),
        PixelType::F32,
    );
    assert!(
        session
            .load_irf(&flat, &AxisSelectors::default(), &no_prompts)
            .is_err()
    );
    assert!(session.has_irf());
    assert_eq!(
        session
            .irf_params()
            .trans_map
            .as_ref()
            .expect("irf view")
            .len_of(Axis(2)),
        BINS
    );
}

#[test]
fn rebinning_while_picking_refreshes_the_main_trace() {
    let mut session = session_with(Arc::new(RecordingFit::default()));
    let irf = Dataset::new(
        Array::from_shape_fn((2, 2, BINS), |(x, y, t)| sample(x, y, t)).into_dyn(),
        Metadata {
            dims: vec![
                Dim::new(AxisKind::X, 2),
                Dim::new(AxisKind::Y, 2),
                Dim::calibrated(AxisKind::Time, BINS, 0.5, "ns"),
            ],
            pixel_type: PixelType::F32,
            ..Metadata::default()
        },
    )
    .expect("irf dataset");
    session
        .load_irf(&irf, &AxisSelectors::default(), &no_prompts)
        .expect("irf");
    session.set_preview_position(3, 2).expect("preview");
    session.set_picking_irf(true).expect("picking");

    session.set_binning(1).expect("rebin while picking");
    assert_eq!(session.bin_radius(), 1);
    assert_eq!(session.preview_position(), (3, 2));
    assert!(session.is_picking_irf());
    let binned = session
        .working_view()
        .slice(ndarray::s![3, 2, ..])
        .to_vec();
    assert_eq!(session.params().trans, binned);
    assert_ne!(binned[0], sample(3, 2, 0));
    let trans_map = session.params().trans_map.as_ref().expect("preview view");
    assert_eq!(trans_map.iter().copied().collect::<Vec<_>>(), binned);

    session
        .set_roi_rect(Some(RoiRect {
            x0: 2,
            y0: 1,
            x1: WIDTH,
            y1: HEIGHT,
        }))
        .expect("roi while picking");
    assert_eq!(session.params().trans, binned);
    assert_eq!(session.phase(), SessionPhase::NeedsRefresh);
}

#[test]
fn position_indexes_stored_spatial_axes_in_order() {
    let data = Array::from_shape_fn((HEIGHT, WIDTH, BINS), |(row, col, t)| {
        sample(col, row, t)
    })
    .into_dyn();
    let metadata = Metadata {
        dims: vec![
            Dim::new(AxisKind::Y, HEIGHT),
            Dim::new(AxisKind::X, WIDTH),
            Dim::calibrated(AxisKind::Time, BINS, 0.5, "ns"),
        ],
        pixel_type: PixelType::F32,
        ..Metadata::default()
    };
    let dataset = Dataset::new(data, metadata).expect("dataset");
    let mut session = FitSession::configure(
        &dataset,
        &AxisSelectors::default(),
        &PresetHarvester::new(),
        services_with(Arc::new(RecordingFit::default())),
    )
    .expect("configure");
    assert_eq!(session.extent(), (HEIGHT, WIDTH));

    session.set_preview_position(2, 3).expect("row 2, column 3");
    let expected = (0..BINS).map(|t| sample(3, 2, t)).collect::<Vec<_>>();
    assert_eq!(session.params().trans, expected);
    assert!(matches!(
        session.set_preview_position(3, 2),
        Err(SessionError::PositionOutOfBounds {
            width: HEIGHT,
            height: WIDTH,
            ..
        })
    ));
}
