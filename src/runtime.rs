mod context;
mod error;
mod io_service;
mod ops_service;
mod recipe_service;
mod ui_queue;
mod worker;


pub use context::AppContext;
pub use error::{AppError, Result, RuntimeError};
pub use io_service::IoService;
pub use ops_service::OpsService;
pub use recipe_service::RecipeService;
pub use ui_queue::{UiQueue, UiSender};
pub use worker::BackgroundWorker;
