//! Input events consumed by the combo machine

use serde::Deserialize;

/// Whether a button went down or came back up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    #[default]
    Press,
    Release,
}

/// A single timestamped button event.
///
/// `button` is the raw symbol from the event source; it is normalized by the
/// machine. `timestamp` is in seconds on a monotonic clock chosen by the
/// caller and must never decrease between events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputEvent {
    pub button: String,
    pub timestamp: f64,
    #[serde(default)]
    pub action: KeyAction,
}

impl InputEvent {
    pub fn new(button: impl Into<String>, timestamp: f64, action: KeyAction) -> Self {
        Self {
            button: button.into(),
            timestamp,
            action,
        }
    }

    /// Create a press event.
    pub fn press(button: impl Into<String>, timestamp: f64) -> Self {
        Self::new(button, timestamp, KeyAction::Press)
    }

    /// Create a release event.
    pub fn release(button: impl Into<String>, timestamp: f64) -> Self {
        Self::new(button, timestamp, KeyAction::Release)
    }
}
