use ndarray::Array2;

pub const INTENSITY_LABEL: &str = "Intensity";
pub const IRF_INTENSITY_LABEL: &str = "IRF Intensity";
pub const MEAN_LIFETIME_LABEL: &str = "τₘ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Intensity,
    IrfIntensity,
    /// Slice of the displayed parameter map at this parameter index.
    Parameter(usize),
    MeanLifetime,
}

/// A selectable preview channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOption {
    pub label: String,
    pub kind: PreviewKind,
}

impl PreviewOption {
    pub fn intensity() -> Self {
        Self {
            label: INTENSITY_LABEL.to_string(),
            kind: PreviewKind::Intensity,
        }
    }

    pub fn irf_intensity() -> Self {
        Self {
            label: IRF_INTENSITY_LABEL.to_string(),
            kind: PreviewKind::IrfIntensity,
        }
    }

    /// One option per parameter label followed by the mean lifetime.
    pub fn contextual(param_names: Vec<String>) -> Vec<Self> {
        param_names
            .into_iter()
            .enumerate()
            .map(|(index, label)| Self {
                label,
                kind: PreviewKind::Parameter(index),
            })
            .chain(std::iter::once(Self {
                label: MEAN_LIFETIME_LABEL.to_string(),
                kind: PreviewKind::MeanLifetime,
            }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Map shaped `(width, height)`.
    Ready(Array2<f32>),
    NotReady,
}

impl Preview {
    pub fn is_ready(&self) -> bool {
        matches!(self, Preview::Ready(_))
    }

    pub fn into_map(self) -> Option<Array2<f32>> {
        match self {
            Preview::Ready(map) => Some(map),
            Preview::NotReady => None,
        }
    }
}
