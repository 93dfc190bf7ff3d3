use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

/// What a numeric prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    ChannelAxis,
    Channel,
    LifetimeAxis,
    TimeBin,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PromptKind::ChannelAxis => "channel axis",
            PromptKind::Channel => "channel index",
            PromptKind::LifetimeAxis => "lifetime axis",
            PromptKind::TimeBin => "time bin",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Real,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberPrompt {
    pub kind: PromptKind,
    pub title: String,
    pub number: NumberKind,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// Synchronous source of numbers for configuration the dataset leaves open.
///
/// `None` means the prompt was cancelled.
pub trait NumberHarvester {
    fn harvest(&self, prompt: &NumberPrompt) -> Option<f64>;
}

impl<F> NumberHarvester for F
where
    F: Fn(&NumberPrompt) -> Option<f64>,
{
    fn harvest(&self, prompt: &NumberPrompt) -> Option<f64> {
        self(prompt)
    }
}

/// Answers prompts from preset values, e.g. taken from a recipe or the command line.
#[derive(Debug, Clone, Default)]
pub struct PresetHarvester {
    answers: HashMap<PromptKind, f64>,
    accept_defaults: bool,
}

impl PresetHarvester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every prompt without a preset with the prompt's own default.
    pub fn accepting_defaults() -> Self {
        Self {
            accept_defaults: true,
            ..Self::default()
        }
    }

    pub fn with_answer(mut self, kind: PromptKind, value: f64) -> Self {
        self.set_answer(kind, value);
        self
    }

    pub fn set_answer(&mut self, kind: PromptKind, value: f64) {
        self.answers.insert(kind, value);
    }
}

impl NumberHarvester for PresetHarvester {
    fn harvest(&self, prompt: &NumberPrompt) -> Option<f64> {
        let answer = self
            .answers
            .get(&prompt.kind)
            .copied()
            .or(self.accept_defaults.then_some(prompt.default));
        debug!("{}: {} -> {answer:?}", prompt.title, prompt.label);
        answer
    }
}
