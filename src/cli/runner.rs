use std::path::Path;

use clap::Parser;
use serde::Serialize;
use serde_json::json;

use crate::model::{AxisKind, DatasetF32};
use crate::runtime::AppContext;
use crate::session::{AxisSelectors, FitSession, PresetHarvester};
use crate::workflow::SessionReport;

use super::types::{Cli, Commands, DatasetInfo, OpsCommand};

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn emit(value: &impl Serialize) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

fn open_session(
    app: &AppContext,
    input: &Path,
    selectors: &AxisSelectors,
    bin: usize,
) -> Result<FitSession, String> {
    let dataset = app
        .io_service()
        .read(input)
        .map_err(|error| error.to_string())?;
    let mut session = FitSession::configure(
        &dataset,
        selectors,
        &PresetHarvester::accepting_defaults(),
        app.ops_service().session_services(),
    )
    .map_err(|error| error.to_string())?;
    if bin > 0 {
        session
            .set_binning(bin)
            .map_err(|error| error.to_string())?;
    }
    Ok(session)
}

fn dataset_info(dataset: &DatasetF32) -> DatasetInfo {
    let metadata = &dataset.metadata;
    let lifetime_axis = metadata.find_axis(&AxisKind::LIFETIME_LABELS);
    let (min, max) = dataset.min_max().unzip();
    DatasetInfo {
        shape: dataset.shape().to_vec(),
        ndim: dataset.ndim(),
        pixel_type: format!("{:?}", metadata.pixel_type),
        axes: metadata
            .dims
            .iter()
            .map(|dimension| format!("{:?}", dimension.axis))
            .collect(),
        spatial_axes: metadata
            .dims
            .iter()
            .enumerate()
            .filter(|(_, dimension)| dimension.axis.is_spatial())
            .map(|(index, _)| index)
            .collect(),
        lifetime_axis,
        channel_axis: metadata.find_axis(&AxisKind::CHANNEL_LABELS),
        time_per_bin: lifetime_axis.and_then(|axis| metadata.spacing(axis)),
        channel_names: metadata.channel_names.clone(),
        source: metadata
            .source
            .as_ref()
            .map(|path| path.display().to_string()),
        min,
        max,
    }
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let app = AppContext::new();

    match cli.command {
        Commands::Info { input } => {
            let dataset = app
                .io_service()
                .read(&input)
                .map_err(|error| error.to_string())?;
            dataset.validate().map_err(|error| error.to_string())?;
            emit(&dataset_info(&dataset))?;
        }
        Commands::Trace {
            input,
            axes,
            x,
            y,
            bin,
        } => {
            let mut session = open_session(&app, &input, &axes.selectors(), bin)?;
            session
                .set_preview_position(x, y)
                .map_err(|error| error.to_string())?;
            emit(&SessionReport::from_session(&session, None, Vec::new()))?;
        }
        Commands::Intensity {
            input,
            output,
            axes,
            bin,
        } => {
            let session = open_session(&app, &input, &axes.selectors(), bin)?;
            let intensity = session
                .results()
                .intensity_map
                .as_ref()
                .ok_or_else(|| "no intensity map was computed".to_string())?;
            app.io_service()
                .write_map(&output, intensity)
                .map_err(|error| error.to_string())?;
            println!("{}", json!({"status": "ok", "output": output}));
        }
        Commands::Run {
            input,
            recipe,
            report,
        } => {
            let recipes = app.recipe_service();
            let recipe = recipes.load(&recipe).map_err(|error| error.to_string())?;
            let (_, run_report) = recipes
                .run(&recipe, &input)
                .map_err(|error| error.to_string())?;
            if let Some(report_path) = report {
                recipes
                    .save_report(report_path, &run_report)
                    .map_err(|error| error.to_string())?;
            }
            emit(&run_report)?;
        }
        Commands::Ops { command } => match command {
            OpsCommand::List => emit(&app.ops_service().list())?,
        },
    }

    Ok(())
}
