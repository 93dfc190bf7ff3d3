mod configure;
mod error;
mod fit_session;
mod harvest;
mod preview;
mod swap;

#[cfg(test)]
mod tests;

pub use configure::{AxisSelectors, ChannelSelection, ResolvedView, resolve_view};
pub use error::{Result, SessionError};
pub use fit_session::{BinnedView, BinningTask, FitSession, SessionPhase, SessionServices};
pub use harvest::{NumberHarvester, NumberKind, NumberPrompt, PresetHarvester, PromptKind};
pub use preview::{
    INTENSITY_LABEL, IRF_INTENSITY_LABEL, MEAN_LIFETIME_LABEL, Preview, PreviewKind,
    PreviewOption,
};
