use ndarray::{Array2, Array3};

/// Output of one fitting run. Replaced wholesale by the session after every fit.
#[derive(Debug, Clone, Default)]
pub struct FitResults {
    /// Total counts per pixel, shaped `(width, height)`.
    pub intensity_map: Option<Array2<f32>>,
    /// Fitted parameters per pixel, laid out like the working view with the lifetime
    /// axis replaced by the parameter axis.
    pub param_map: Option<Array3<f32>>,
    pub chisq: f32,
    /// Parameters of the previewed pixel (or the global parameters).
    pub param: Vec<f32>,
    /// Fitted curve over the fit window of the previewed pixel.
    pub fitted: Vec<f32>,
    pub residuals: Vec<f32>,
}
