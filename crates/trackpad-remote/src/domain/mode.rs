//! Interpretation mode of the trackpad surface.

use serde::{Deserialize, Serialize};

/// How contact input is turned into wire messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Gestures are classified locally; the executor receives moves, scrolls
    /// and clicks.
    #[default]
    Gestures,
    /// Raw contact positions are streamed and the executor classifies them.
    Raw,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputMode::Gestures => f.write_str("gestures"),
            InputMode::Raw => f.write_str("raw"),
        }
    }
}
