use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisKind {
    X,
    Y,
    Z,
    Channel,
    Spectra,
    Time,
    Lifetime,
    Unknown,
}

impl AxisKind {
    /// Axis kinds that identify the time-bin dimension, in lookup order.
    pub const LIFETIME_LABELS: [AxisKind; 2] = [AxisKind::Time, AxisKind::Lifetime];

    /// Axis kinds that identify a channel dimension, in lookup order.
    pub const CHANNEL_LABELS: [AxisKind; 2] = [AxisKind::Channel, AxisKind::Spectra];

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "x" => AxisKind::X,
            "y" => AxisKind::Y,
            "z" => AxisKind::Z,
            "channel" | "c" => AxisKind::Channel,
            "spectra" => AxisKind::Spectra,
            "time" | "t" => AxisKind::Time,
            "lifetime" => AxisKind::Lifetime,
            _ => AxisKind::Unknown,
        }
    }

    pub fn is_spatial(self) -> bool {
        matches!(self, AxisKind::X | AxisKind::Y | AxisKind::Z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelType {
    U8,
    U16,
    #[default]
    F32,
}

pub fn default_axis_for_index(index: usize) -> AxisKind {
    match index {
        0 => AxisKind::Y,
        1 => AxisKind::X,
        2 => AxisKind::Z,
        3 => AxisKind::Channel,
        4 => AxisKind::Time,
        _ => AxisKind::Unknown,
    }
}
