pub mod axes;
mod estimator;
mod model;
mod params;
mod results;
mod roi;


pub use estimator::{FitWindow, ParamEstimator, TAIL_FRACTION, fit_window};
pub use model::{FitType, ModelFn, NoiseType, multi_exponential, zero_model};
pub use params::{FitParams, UNESTIMATED, resize_with_sentinel};
pub use results::FitResults;
pub use roi::{RoiMask, RoiRect};
