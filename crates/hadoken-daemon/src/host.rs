//! Host side of the combo machine
//!
//! The machine only notices a timeout on the next press. [`ComboHost`] adds the
//! proactive half: it stamps events with a monotonic clock and resets the
//! machine once the input has been idle for longer than the machine's timeout,
//! unless the action button is still being held for a charge.

use std::time::{Duration, Instant};

use hadoken_engine::{ComboMachine, InputEvent, Outcome};

use crate::source::{KeyEvent, KeyTranslator};

pub struct ComboHost {
    machine: ComboMachine,
    translator: KeyTranslator,
    started: Instant,
    last_event: Option<Instant>,
}

impl ComboHost {
    /// Create a host whose event timestamps count from `started`.
    pub fn new(machine: ComboMachine, started: Instant) -> Self {
        Self {
            machine,
            translator: KeyTranslator::new(),
            started,
            last_event: None,
        }
    }

    pub fn machine(&self) -> &ComboMachine {
        &self.machine
    }

    /// The machine's timeout as a `Duration`; out of range values never expire.
    fn idle_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.machine.timeout_seconds()).unwrap_or(Duration::MAX)
    }

    /// Feed a key event received at `now`.
    pub fn handle_key(&mut self, event: KeyEvent, now: Instant) -> Outcome {
        let Some((symbol, action)) = self.translator.translate(event) else {
            return Outcome::Empty;
        };

        self.last_event = Some(now);
        let timestamp = now.saturating_duration_since(self.started).as_secs_f64();
        self.machine
            .handle_event(&InputEvent::new(symbol, timestamp, action))
    }

    /// Reset the machine if the input has been idle for too long.
    ///
    /// Returns `true` when a reset happened.
    pub fn poll_idle(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_event else {
            return false;
        };
        if self.translator.action_held() {
            return false;
        }
        if now.saturating_duration_since(last) <= self.idle_timeout() {
            return false;
        }

        tracing::debug!("Input idle for more than {:?}, resetting", self.idle_timeout());
        self.machine.reset();
        self.last_event = None;
        true
    }
}
