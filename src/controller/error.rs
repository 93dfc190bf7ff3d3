use thiserror::Error;

use crate::formats::IoError;
use crate::runtime::RuntimeError;
use crate::session::SessionError;

pub type Result<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("the session has been destroyed")]
    Destroyed,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("dataset directory: {0}")]
    Directory(#[from] IoError),
}
