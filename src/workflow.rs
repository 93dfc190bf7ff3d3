mod error;
mod execute;
mod io;
mod recipe;
mod report;


pub use error::{PipelineError, Result};
pub use execute::run_recipe;
pub use io::{load_recipe, save_report};
pub use recipe::{FixedParam, IrfRecipe, MapExport, SessionRecipe};
pub use report::{SessionReport, StepReport};
