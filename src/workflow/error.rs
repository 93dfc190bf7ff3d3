use crate::model::CoreError;
use crate::session::SessionError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("session recipe parse failure: {0}")]
    Parse(String),

    #[error("recipe I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("recipe serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("recipe YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("session step failed: {0}")]
    Session(#[from] SessionError),

    #[error("dataset validation failed: {0}")]
    Core(#[from] CoreError),
}
