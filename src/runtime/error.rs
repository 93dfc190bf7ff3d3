use crate::controller::ControllerError;
use crate::formats::IoError;
use crate::model::CoreError;
use crate::ops::OpsError;
use crate::session::SessionError;
use crate::workflow::PipelineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker `{0}` has shut down")]
    ShutDown(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("dataset error: {0}")]
    Dataset(#[from] CoreError),

    #[error("I/O service error: {0}")]
    Io(#[from] IoError),

    #[error("operation service error: {0}")]
    Ops(#[from] OpsError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("recipe error: {0}")]
    Pipeline(#[from] PipelineError),
}
