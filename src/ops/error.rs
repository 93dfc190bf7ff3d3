use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpsError>;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("unknown fit algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("fit algorithm `{name}` failed: {message}")]
    AlgorithmFailed { name: String, message: String },

    #[error("kernel side must be odd and at least 1, got {0}")]
    InvalidKernel(usize),

    #[error("unsupported array layout: {0}")]
    UnsupportedLayout(String),

    #[error("fit results carry no parameter map")]
    MissingParamMap,
}
