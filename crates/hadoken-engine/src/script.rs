//! Scripted event sequences
//!
//! Builds timestamped [`InputEvent`] lists the way a player would produce
//! them, for self checks, demos and tests.

use crate::button::Button;
use crate::event::InputEvent;
use crate::table::ComboDefinition;

/// Default spacing between scripted presses, in seconds.
pub const DEFAULT_GAP: f64 = 0.2;

/// Builder for a timestamped event list.
///
/// Every press advances the clock by the configured gap. Holding the action
/// button advances it by the hold duration first.
#[derive(Debug, Clone)]
pub struct Script {
    clock: f64,
    gap: f64,
    events: Vec<InputEvent>,
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl Script {
    /// Start a script at `t = 0`.
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Start a script at an arbitrary timestamp.
    pub fn starting_at(start: f64) -> Self {
        Self {
            clock: start,
            gap: DEFAULT_GAP,
            events: Vec::new(),
        }
    }

    /// Set the spacing used by subsequent presses.
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Let time pass without any input.
    pub fn wait(mut self, seconds: f64) -> Self {
        self.clock += seconds;
        self
    }

    /// Press a raw symbol.
    pub fn press(mut self, symbol: &str) -> Self {
        self.events.push(InputEvent::press(symbol, self.clock));
        self.clock += self.gap;
        self
    }

    /// Press the action button and release it `hold` seconds later.
    pub fn hold_action(mut self, hold: f64) -> Self {
        let glyph = Button::Action.glyph();
        self.events.push(InputEvent::press(glyph, self.clock));
        self.events.push(InputEvent::release(glyph, self.clock + hold));
        self.clock += hold + self.gap;
        self
    }

    /// Play a whole combo, holding the final action button for `hold` seconds.
    pub fn combo(self, definition: &ComboDefinition, hold: f64) -> Self {
        definition
            .sequence
            .iter()
            .fold(self, |script, &button| match button {
                Button::Action => script.hold_action(hold),
                direction => script.press(direction.glyph()),
            })
    }

    /// The timestamp the next event would get.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<InputEvent> {
        self.events
    }
}
