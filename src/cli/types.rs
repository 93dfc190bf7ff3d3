use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use crate::session::{AxisSelectors, ChannelSelection};

#[derive(Debug, Parser)]
#[command(
    name = "flim-session",
    version,
    about = "Headless fluorescence-lifetime fitting sessions"
)]
pub(super) struct Cli {
    /// Log more: `-v` for info, `-vv` for debug. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(super) verbose: u8,

    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Prints the dataset layout and the detected lifetime and channel axes.
    Info { input: PathBuf },
    /// Prints the binned trace and fit window at one pixel.
    Trace {
        input: PathBuf,
        #[command(flatten)]
        axes: AxisArgs,
        #[arg(long, default_value_t = 0)]
        x: usize,
        #[arg(long, default_value_t = 0)]
        y: usize,
        /// Binning radius in pixels.
        #[arg(long, default_value_t = 0)]
        bin: usize,
    },
    /// Writes the intensity map as PNG or TIFF.
    Intensity {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        axes: AxisArgs,
        #[arg(long, default_value_t = 0)]
        bin: usize,
    },
    /// Replays a session recipe.
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        recipe: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    Ops {
        #[command(subcommand)]
        command: OpsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub(super) enum OpsCommand {
    /// Lists the registered fit algorithms.
    List,
}

#[derive(Debug, Args)]
pub(super) struct AxisArgs {
    #[arg(long)]
    pub(super) lifetime_axis: Option<usize>,
    #[arg(long)]
    pub(super) channel_axis: Option<usize>,
    #[arg(long)]
    pub(super) channel: Option<usize>,
    /// Total time covered by the lifetime axis, in ns.
    #[arg(long)]
    pub(super) time_range: Option<f32>,
}

impl AxisArgs {
    pub(super) fn selectors(&self) -> AxisSelectors {
        AxisSelectors {
            channel: ChannelSelection {
                axis: self.channel_axis,
                index: self.channel,
            },
            lifetime_axis: self.lifetime_axis,
            time_range: self.time_range,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DatasetInfo {
    pub(super) shape: Vec<usize>,
    pub(super) ndim: usize,
    pub(super) pixel_type: String,
    pub(super) axes: Vec<String>,
    pub(super) spatial_axes: Vec<usize>,
    pub(super) lifetime_axis: Option<usize>,
    pub(super) channel_axis: Option<usize>,
    pub(super) time_per_bin: Option<f32>,
    pub(super) channel_names: Vec<String>,
    pub(super) source: Option<String>,
    pub(super) min: Option<f32>,
    pub(super) max: Option<f32>,
}
