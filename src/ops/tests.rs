use approx::assert_relative_eq;
use ndarray::{Array3, arr1};

use crate::flim::{FitParams, FitResults};

use super::{
    AlgorithmRegistry, BoxConvolver, Convolver, DerivedQuantity, FitAlgorithm, MeanLifetime,
    OpsError, Result, SquareKernel, mean_lifetime,
};

struct EchoFit;

impl FitAlgorithm for EchoFit {
    fn name(&self) -> &'static str {
        "fit.echo"
    }

    fn fit(&self, params: &FitParams) -> Result<FitResults> {
        Ok(FitResults {
            param: params.param.clone(),
            chisq: 1.5,
            ..FitResults::default()
        })
    }
}

#[test]
fn kernel_side_must_be_odd() {
    assert!(matches!(SquareKernel::new(0), Err(OpsError::InvalidKernel(0))));
    assert!(matches!(SquareKernel::new(4), Err(OpsError::InvalidKernel(4))));
    let kernel = SquareKernel::new(5).expect("odd side");
    assert_eq!(kernel.radius(), 2);
    assert_eq!(SquareKernel::for_radius(2), kernel);
    assert_relative_eq!(kernel.weights_1d().iter().sum::<f32>(), 1.0, epsilon = 1e-6);
}

#[test]
fn unit_kernel_is_identity() {
    let view = Array3::from_shape_fn((3, 4, 5), |(a, b, c)| (a * 20 + b * 5 + c) as f32);
    let output = BoxConvolver
        .convolve(&view, [0, 1], &SquareKernel::for_radius(0))
        .expect("convolve");
    assert_eq!(output, view);
}

#[test]
fn box_filter_averages_spatial_neighbourhood() {
    let mut view = Array3::zeros((3, 3, 2));
    view[(1, 1, 0)] = 9.0;
    let output = BoxConvolver
        .convolve(&view, [0, 1], &SquareKernel::for_radius(1))
        .expect("convolve");
    assert_relative_eq!(output[(1, 1, 0)], 1.0, epsilon = 1e-6);
    assert_relative_eq!(output[(0, 0, 0)], 1.0, epsilon = 1e-6);
    assert_eq!(output[(1, 1, 1)], 0.0);
}

#[test]
fn box_filter_leaves_lifetime_axis_alone() {
    // constant over space, varying along the lifetime axis at index 1
    let view = Array3::from_shape_fn((4, 6, 5), |(_, t, _)| t as f32);
    let output = BoxConvolver
        .convolve(&view, [0, 2], &SquareKernel::for_radius(2))
        .expect("convolve");
    for ((_, t, _), value) in output.indexed_iter() {
        assert_relative_eq!(*value, t as f32, epsilon = 1e-5);
    }
}

#[test]
fn box_filter_rejects_out_of_range_axes() {
    let view = Array3::<f32>::zeros((2, 2, 2));
    let error = BoxConvolver
        .convolve(&view, [0, 3], &SquareKernel::for_radius(1))
        .expect_err("axis 3 does not exist");
    assert!(matches!(error, OpsError::UnsupportedLayout(_)));
}

#[test]
fn mean_lifetime_of_single_component_is_its_tau() {
    assert_relative_eq!(mean_lifetime(arr1(&[0.1, 5.0, 2.5]).view()), 2.5);
}

#[test]
fn mean_lifetime_weights_by_amplitude_and_tau() {
    let tau_m = mean_lifetime(arr1(&[0.0, 1.0, 1.0, 1.0, 3.0]).view());
    // (1 + 9) / (1 + 3)
    assert_relative_eq!(tau_m, 2.5, epsilon = 1e-6);
    assert_eq!(mean_lifetime(arr1(&[0.0, 0.0, 1.0]).view()), 0.0);
    assert_eq!(mean_lifetime(arr1(&[0.0, f32::INFINITY, 1.0]).view()), 0.0);
}

#[test]
fn derived_map_follows_parameter_axis() {
    let param_map = Array3::from_shape_fn((3, 2, 4), |(p, x, y)| match p {
        0 => 0.0,
        1 => 1.0,
        _ => (x + y + 1) as f32,
    });
    let results = FitResults {
        param_map: Some(param_map),
        ..FitResults::default()
    };
    let map = MeanLifetime.compute(&results, 0).expect("derived map");
    assert_eq!(map.dim(), (2, 4));
    assert_relative_eq!(map[(1, 3)], 5.0, epsilon = 1e-6);

    let error = MeanLifetime
        .compute(&FitResults::default(), 0)
        .expect_err("no map");
    assert!(matches!(error, OpsError::MissingParamMap));
}

#[test]
fn registry_dispatches_by_name() {
    let mut registry = AlgorithmRegistry::new();
    assert!(registry.names().is_empty());
    registry.register(EchoFit);
    assert_eq!(registry.names(), vec!["fit.echo"]);

    let params = FitParams {
        param: vec![1.0, 2.0],
        param_free: vec![true, true],
        ..FitParams::default()
    };
    let results = registry.run("fit.echo", &params).expect("fit");
    assert_eq!(results.param, vec![1.0, 2.0]);

    let error = registry
        .run("fit.lma", &params)
        .expect_err("nothing registered under fit.lma");
    assert!(matches!(error, OpsError::UnknownAlgorithm(name) if name == "fit.lma"));
}
