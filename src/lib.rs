pub mod cli;
pub mod controller;
pub mod flim;
pub mod formats;
pub mod model;
pub mod ops;
pub mod runtime;
pub mod session;
pub mod workflow;

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}
