use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model function evaluated at time `t` with a flat parameter vector.
pub type ModelFn = fn(f32, &[f32]) -> f32;

/// The closed set of fitting variants the session can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitType {
    #[default]
    Lma,
    Global,
    Bayes,
}

impl FitType {
    pub const ALL: [FitType; 3] = [FitType::Lma, FitType::Global, FitType::Bayes];

    /// Name the variant is registered under in the algorithm registry.
    pub fn op_name(self) -> &'static str {
        match self {
            FitType::Lma => "fit.lma",
            FitType::Global => "fit.global",
            FitType::Bayes => "fit.bayes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FitType::Lma => "LMA",
            FitType::Global => "Global",
            FitType::Bayes => "Bayes",
        }
    }

    /// One baseline term plus an amplitude/lifetime pair per component.
    pub fn n_param(self, n_comp: usize) -> usize {
        match self {
            FitType::Lma | FitType::Global | FitType::Bayes => 2 * n_comp + 1,
        }
    }

    pub fn model(self) -> ModelFn {
        match self {
            FitType::Lma | FitType::Global | FitType::Bayes => multi_exponential,
        }
    }

    /// Display labels for each slot of the parameter vector.
    pub fn param_names(self, n_comp: usize) -> Vec<String> {
        const SUBSCRIPTS: [&str; 4] = ["₁", "₂", "₃", "ᵢ"];
        match self {
            FitType::Lma | FitType::Global | FitType::Bayes => {
                let mut names = Vec::with_capacity(self.n_param(n_comp));
                names.push("z".to_string());
                for component in 0..n_comp {
                    let subscript = if n_comp > 1 {
                        SUBSCRIPTS[component.min(SUBSCRIPTS.len() - 1)]
                    } else {
                        ""
                    };
                    names.push(format!("A{subscript}"));
                    names.push(format!("τ{subscript}"));
                }
                names
            }
        }
    }
}

impl fmt::Display for FitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lma" | "mla" => Ok(FitType::Lma),
            "global" => Ok(FitType::Global),
            "bayes" => Ok(FitType::Bayes),
            other => Err(format!("unknown fit algorithm `{other}`")),
        }
    }
}

/// `z + Σ aᵢ·exp(-t / τᵢ)`, with non-finite results reported as zero.
pub fn multi_exponential(t: f32, param: &[f32]) -> f32 {
    let Some((&baseline, components)) = param.split_first() else {
        return 0.0;
    };
    let mut y = baseline;
    for pair in components.chunks_exact(2) {
        y += pair[0] * (-t / pair[1]).exp();
    }
    // the plot path cannot draw Inf/NaN
    if y.is_finite() { y } else { 0.0 }
}

/// Used before any variant has been selected.
pub fn zero_model(_t: f32, _param: &[f32]) -> f32 {
    0.0
}

/// Noise model handed to the fitting algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    GaussianFit,
    #[default]
    PoissonFit,
    PoissonData,
    Mle,
}

impl NoiseType {
    pub const ALL: [NoiseType; 4] = [
        NoiseType::GaussianFit,
        NoiseType::PoissonFit,
        NoiseType::PoissonData,
        NoiseType::Mle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NoiseType::GaussianFit => "Gaussian (Fit)",
            NoiseType::PoissonFit => "Poisson (Fit)",
            NoiseType::PoissonData => "Poisson (Data)",
            NoiseType::Mle => "MLE",
        }
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NoiseType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NoiseType::ALL
            .into_iter()
            .find(|noise| noise.label().eq_ignore_ascii_case(value.trim()))
            .or(match value.trim().to_ascii_lowercase().as_str() {
                "gaussian_fit" | "gaussian" => Some(NoiseType::GaussianFit),
                "poisson_fit" | "poisson" => Some(NoiseType::PoissonFit),
                "poisson_data" => Some(NoiseType::PoissonData),
                "mle" => Some(NoiseType::Mle),
                _ => None,
            })
            .ok_or_else(|| format!("unknown noise model `{value}`"))
    }
}
