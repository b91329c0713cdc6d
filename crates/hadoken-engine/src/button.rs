//! Canonical button tokens and raw symbol normalization

use std::fmt;

/// One of the five buttons a combo can be built from.
///
/// The set is closed: the four directions plus a single action button
/// (the space bar on a keyboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    /// The action button that terminates every combo
    Action,
}

impl Button {
    /// All buttons, directions first.
    pub const ALL: [Button; 5] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Action,
    ];

    /// The raw symbol an event source emits for this button.
    pub fn glyph(self) -> &'static str {
        match self {
            Button::Up => "↑",
            Button::Down => "↓",
            Button::Left => "←",
            Button::Right => "→",
            Button::Action => " ",
        }
    }

    fn from_glyph(symbol: &str) -> Option<Self> {
        match symbol {
            "↑" => Some(Button::Up),
            "↓" => Some(Button::Down),
            "←" => Some(Button::Left),
            "→" => Some(Button::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Button::Up => write!(f, "UP"),
            Button::Down => write!(f, "DOWN"),
            Button::Left => write!(f, "LEFT"),
            Button::Right => write!(f, "RIGHT"),
            Button::Action => write!(f, "ACTION"),
        }
    }
}

/// Map a raw input symbol to its canonical [`Button`].
///
/// Accepts only the four arrow glyphs and the literal space character. A space
/// surrounded by other whitespace still counts as the action button. Returns
/// `None` for anything else, including the empty string.
pub fn normalize(raw: &str) -> Option<Button> {
    if raw == " " {
        return Some(Button::Action);
    }

    let trimmed = raw.trim().to_uppercase();
    if trimmed.is_empty() && raw.contains(' ') {
        return Some(Button::Action);
    }

    Button::from_glyph(&trimmed)
}
