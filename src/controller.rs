mod bridge;
mod edit;
mod error;
mod panel;
mod plot;
mod settings;


pub use bridge::{ControllerBridge, UpdatePolicy};
pub use edit::SessionEdit;
pub use error::{ControllerError, Result};
pub use panel::{Panel, PanelHandle, RefreshGuard};
pub use plot::PlotPanel;
pub use settings::{ParamRow, SettingsPanel};
