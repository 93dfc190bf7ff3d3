mod algorithm;
mod convolve;
mod derived;
mod error;
mod kernel;
mod registry;

#[cfg(test)]
mod tests;

pub use algorithm::FitAlgorithm;
pub use convolve::{BoxConvolver, Convolver};
pub use derived::{DerivedQuantity, MeanLifetime, mean_lifetime};
pub use error::{OpsError, Result};
pub use kernel::SquareKernel;
pub use registry::AlgorithmRegistry;
