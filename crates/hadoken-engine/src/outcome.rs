//! Results produced by the combo machine

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

/// Hold durations (in seconds) of the action button that count as charged.
pub const CHARGE_WINDOW: RangeInclusive<f64> = 2.0..=3.0;

/// A completed combo, reported when the action button is released.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboMatch {
    pub combo: String,
    pub charged: bool,
    /// How long the action button was held, rounded to milliseconds.
    /// Only present for charged combos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_duration: Option<f64>,
}

impl ComboMatch {
    /// Build a match from the raw hold duration of the action button.
    pub fn from_hold(combo: impl Into<String>, hold_duration: f64) -> Self {
        let charged = CHARGE_WINDOW.contains(&hold_duration);
        Self {
            combo: combo.into(),
            charged,
            hold_duration: charged.then(|| round_millis(hold_duration)),
        }
    }
}

impl fmt::Display for ComboMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hold_duration {
            Some(hold) => write!(f, "{} (charged, held {:.3}s)", self.combo, hold),
            None => write!(f, "{}", self.combo),
        }
    }
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Explicit errors reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchError {
    /// The action button was released with no combo pending
    IncompleteCombo,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::IncompleteCombo => write!(f, "incomplete combo"),
        }
    }
}

/// What a single event produced.
///
/// Serializes to `null`, `{"combo": .., "charged": .., "hold_duration": ..}`
/// or `{"error": "incomplete_combo"}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Nothing to report
    #[default]
    Empty,
    Matched(ComboMatch),
    Error { error: MatchError },
}

impl Outcome {
    pub fn incomplete() -> Self {
        Outcome::Error {
            error: MatchError::IncompleteCombo,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    /// The completed combo, if any.
    pub fn matched(&self) -> Option<&ComboMatch> {
        match self {
            Outcome::Matched(m) => Some(m),
            _ => None,
        }
    }
}
