//! Combo detection state machine
//!
//! # States
//!
//! ```text
//!            press (advances)                press (terminal, ACTION)
//!  ┌──────┐ ───────────────► ┌────────────┐ ───────────────────────► ┌───────────────────┐
//!  │ IDLE │                  │ TRAVERSING │                          │ PENDING_COMPLETION│
//!  └──────┘ ◄─────────────── └────────────┘                          └─────────┬─────────┘
//!     ▲      timeout / unsupported / no transition                             │
//!     │                                                                        │
//!     └──────────────── ACTION release (match), timeout, unsupported ──────────┘
//! ```
//!
//! Every completed sequence is consumed on the press that completes it: the
//! traversal goes back to the root and the combo waits in
//! [`PendingCombo`] until the action button is released. The hold duration
//! of that release decides whether the combo was charged.
//!
//! Timeouts are evaluated lazily on the next press. Hosts that want the
//! machine cleared during silence have to call [`ComboMachine::reset`]
//! themselves, using [`ComboMachine::timeout_seconds`].

use std::sync::Arc;

use crate::button::{normalize, Button};
use crate::event::{InputEvent, KeyAction};
use crate::outcome::{ComboMatch, Outcome};
use crate::trie::{ComboTrie, NodeId};

/// Default maximum gap between two presses, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 1.0;

/// Coarse view of the machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// At the root with nothing pending
    Idle,
    /// Part way through a sequence with nothing pending
    Traversing,
    /// A combo was completed and waits for the action button release
    PendingCompletion,
}

/// A completed combo waiting for the action button to be released.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCombo {
    pub name: String,
    /// Timestamp of the action press that completed the combo
    pub action_pressed_at: f64,
}

/// Consumes input events one at a time and reports completed combos.
#[derive(Debug, Clone)]
pub struct ComboMachine {
    trie: Arc<ComboTrie>,
    timeout_seconds: f64,
    current: NodeId,
    last_press: Option<f64>,
    pending: Option<PendingCombo>,
}

impl Default for ComboMachine {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl ComboMachine {
    /// Create a machine over the built-in combo table.
    ///
    /// `timeout_seconds` must be positive. Callers taking it from user input
    /// validate it first.
    pub fn new(timeout_seconds: f64) -> Self {
        Self::with_trie(Arc::new(ComboTrie::default()), timeout_seconds)
    }

    /// Create a machine over an existing trie.
    ///
    /// The trie is never modified, so one trie can back any number of machines.
    pub fn with_trie(trie: Arc<ComboTrie>, timeout_seconds: f64) -> Self {
        debug_assert!(
            timeout_seconds > 0.0,
            "timeout must be positive, got {}",
            timeout_seconds
        );
        Self {
            trie,
            timeout_seconds,
            current: ComboTrie::ROOT,
            last_press: None,
            pending: None,
        }
    }

    pub fn timeout_seconds(&self) -> f64 {
        self.timeout_seconds
    }

    pub fn trie(&self) -> &Arc<ComboTrie> {
        &self.trie
    }

    pub fn pending_combo(&self) -> Option<&PendingCombo> {
        self.pending.as_ref()
    }

    pub fn state(&self) -> MachineState {
        if self.pending.is_some() {
            MachineState::PendingCompletion
        } else if self.current == ComboTrie::ROOT {
            MachineState::Idle
        } else {
            MachineState::Traversing
        }
    }

    /// Return to the root and forget all timing and pending state.
    pub fn reset(&mut self) {
        self.current = ComboTrie::ROOT;
        self.last_press = None;
        self.pending = None;
    }

    /// Process one event.
    ///
    /// Unsupported symbols reset the machine. Presses advance through the trie
    /// and never produce a match themselves; the match is reported on the
    /// following action release.
    pub fn handle_event(&mut self, event: &InputEvent) -> Outcome {
        let Some(button) = normalize(&event.button) else {
            tracing::trace!("Unsupported input {:?}, resetting", event.button);
            self.reset();
            return Outcome::Empty;
        };

        match event.action {
            KeyAction::Press => self.handle_press(button, event.timestamp),
            KeyAction::Release => self.handle_release(button, event.timestamp),
        }
    }

    fn handle_press(&mut self, button: Button, timestamp: f64) -> Outcome {
        if let Some(last) = self.last_press {
            if timestamp - last > self.timeout_seconds {
                tracing::debug!(
                    "Press gap of {:.3}s exceeds timeout of {:.3}s, resetting",
                    timestamp - last,
                    self.timeout_seconds
                );
                self.reset();
            }
        }
        self.last_press = Some(timestamp);

        // On a mismatch, retry the same button once from the root
        let next = self.trie.child(self.current, button).or_else(|| {
            self.current = ComboTrie::ROOT;
            self.trie.child(ComboTrie::ROOT, button)
        });

        let Some(next) = next else {
            return Outcome::Empty;
        };
        self.current = next;

        if let Some(name) = self.trie.combo_at(next) {
            tracing::debug!("Sequence for {} complete, waiting for release", name);
            if button == Button::Action {
                self.pending = Some(PendingCombo {
                    name: name.to_string(),
                    action_pressed_at: timestamp,
                });
            }
            self.current = ComboTrie::ROOT;
        }

        Outcome::Empty
    }

    fn handle_release(&mut self, button: Button, timestamp: f64) -> Outcome {
        if button != Button::Action {
            return Outcome::Empty;
        }

        let Some(pending) = self.pending.take() else {
            tracing::debug!("Action released with no combo pending");
            return Outcome::incomplete();
        };

        let result = ComboMatch::from_hold(pending.name, timestamp - pending.action_pressed_at);
        self.current = ComboTrie::ROOT;

        tracing::debug!("Combo detected: {}", result);
        Outcome::Matched(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Script;
    use crate::table::{ComboDefinition, ComboTable};

    fn feed(machine: &mut ComboMachine, events: &[InputEvent]) -> Vec<Outcome> {
        events
            .iter()
            .map(|e| machine.handle_event(e))
            .filter(|o| !o.is_empty())
            .collect()
    }

    fn matched(name: &str, hold_duration: Option<f64>) -> Outcome {
        Outcome::Matched(ComboMatch {
            combo: name.to_string(),
            charged: hold_duration.is_some(),
            hold_duration,
        })
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "timeout must be positive")]
    fn test_negative_timeout_rejected_in_debug() {
        let _ = ComboMachine::new(-1.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "timeout must be positive")]
    fn test_nan_timeout_rejected_in_debug() {
        let _ = ComboMachine::new(f64::NAN);
    }

    #[test]
    fn test_hadoken_charged_scenario() {
        let mut machine = ComboMachine::default();
        let events = [
            InputEvent::press("→", 0.0),
            InputEvent::press("→", 0.2),
            InputEvent::press("→", 0.3),
            InputEvent::press(" ", 0.4),
            InputEvent::release(" ", 2.6),
        ];

        assert_eq!(feed(&mut machine, &events), vec![matched("Hadoken", Some(2.2))]);
        assert_eq!(machine.state(), MachineState::Idle);
    }

    #[test]
    fn test_shoryuken_uncharged_scenario() {
        let mut machine = ComboMachine::default();
        let events = [
            InputEvent::press("↑", 5.0),
            InputEvent::press("↓", 5.4),
            InputEvent::press("↑", 5.8),
            InputEvent::press("→", 6.1),
            InputEvent::press(" ", 6.5),
            InputEvent::release(" ", 6.5),
        ];

        assert_eq!(feed(&mut machine, &events), vec![matched("Shoryuken", None)]);
    }

    #[test]
    fn test_every_combo_quick_release() {
        let table = ComboTable::builtin();
        for definition in table.definitions() {
            let mut machine = ComboMachine::default();
            let events = Script::new().gap(0.2).combo(definition, 0.1).into_events();
            assert_eq!(
                feed(&mut machine, &events),
                vec![matched(&definition.name, None)],
                "{}",
                definition.name
            );
        }
    }

    #[test]
    fn test_every_combo_charged() {
        let table = ComboTable::builtin();
        for hold in [2.1, 2.5, 2.9] {
            for definition in table.definitions() {
                let mut machine = ComboMachine::default();
                let events = Script::starting_at(10.0)
                    .gap(0.2)
                    .combo(definition, hold)
                    .into_events();
                let outcomes = feed(&mut machine, &events);

                assert_eq!(outcomes.len(), 1, "{}", definition.name);
                let m = outcomes[0].matched().expect("combo should match");
                assert_eq!(m.combo, definition.name);
                assert!(m.charged, "{} held {}", definition.name, hold);
                let held = m.hold_duration.expect("charged combos report hold");
                assert!((held - hold).abs() <= 0.001, "{} vs {}", held, hold);
            }
        }
    }

    #[test]
    fn test_every_combo_overheld_is_not_charged() {
        let table = ComboTable::builtin();
        for definition in table.definitions() {
            let mut machine = ComboMachine::default();
            let events = Script::new().gap(0.2).combo(definition, 3.5).into_events();
            assert_eq!(
                feed(&mut machine, &events),
                vec![matched(&definition.name, None)]
            );
        }
    }

    #[test]
    fn test_gap_over_timeout_breaks_every_combo() {
        let table = ComboTable::builtin();
        for definition in table.definitions() {
            let len = definition.sequence.len();
            // Stall before each press after the first, one position at a time
            for stall_before in 1..len {
                let mut machine = ComboMachine::default();
                let mut t = 0.0;
                let mut outcomes = Vec::new();
                for (i, button) in definition.sequence.iter().enumerate() {
                    t += if i == stall_before { 1.5 } else { 0.2 };
                    outcomes.push(machine.handle_event(&InputEvent::press(button.glyph(), t)));
                }
                outcomes.push(machine.handle_event(&InputEvent::release(" ", t + 0.1)));

                let completed: Vec<_> = outcomes.iter().filter_map(|o| o.matched()).collect();
                assert!(
                    completed.iter().all(|m| m.combo != definition.name),
                    "{} completed despite a stall before press {}",
                    definition.name,
                    stall_before
                );
            }
        }
    }

    #[test]
    fn test_gap_equal_to_timeout_is_allowed() {
        let mut machine = ComboMachine::new(1.0);
        let events = [
            InputEvent::press("→", 0.0),
            InputEvent::press("→", 1.0),
            InputEvent::press("→", 2.0),
            InputEvent::press(" ", 3.0),
            InputEvent::release(" ", 3.1),
        ];
        assert_eq!(feed(&mut machine, &events), vec![matched("Hadoken", None)]);
    }

    #[test]
    fn test_timeout_still_processes_new_press_from_root() {
        let mut machine = ComboMachine::default();
        machine.handle_event(&InputEvent::press("↑", 0.0));
        machine.handle_event(&InputEvent::press("↓", 0.2));

        // Stale attempt is dropped, but the new → starts a fresh one
        let events = [
            InputEvent::press("→", 5.0),
            InputEvent::press("→", 5.2),
            InputEvent::press("→", 5.4),
            InputEvent::press(" ", 5.6),
            InputEvent::release(" ", 5.7),
        ];
        assert_eq!(feed(&mut machine, &events), vec![matched("Hadoken", None)]);
    }

    #[test]
    fn test_unsupported_input_resets_mid_sequence() {
        let mut machine = ComboMachine::default();
        machine.handle_event(&InputEvent::press("→", 0.0));
        machine.handle_event(&InputEvent::press("→", 0.1));
        assert_eq!(machine.state(), MachineState::Traversing);

        machine.handle_event(&InputEvent::press("x", 0.2));
        assert_eq!(machine.state(), MachineState::Idle);

        let events = Script::starting_at(0.3)
            .gap(0.1)
            .combo(ComboTable::builtin().get("Tatsumaki").unwrap(), 0.2)
            .into_events();
        assert_eq!(feed(&mut machine, &events), vec![matched("Tatsumaki", None)]);
    }

    #[test]
    fn test_unsupported_input_discards_pending_combo() {
        let mut machine = ComboMachine::default();
        for (i, glyph) in ["→", "→", "→", " "].iter().enumerate() {
            machine.handle_event(&InputEvent::press(*glyph, i as f64 * 0.1));
        }
        assert_eq!(machine.state(), MachineState::PendingCompletion);

        machine.handle_event(&InputEvent::release("?", 0.5));
        assert_eq!(machine.state(), MachineState::Idle);
        assert_eq!(
            machine.handle_event(&InputEvent::release(" ", 0.6)),
            Outcome::incomplete()
        );
    }

    #[test]
    fn test_release_without_pending_is_incomplete() {
        let mut machine = ComboMachine::default();
        assert_eq!(
            machine.handle_event(&InputEvent::release(" ", 0.0)),
            Outcome::incomplete()
        );

        // Machine stays usable
        machine.handle_event(&InputEvent::press("→", 0.1));
        assert_eq!(machine.state(), MachineState::Traversing);
    }

    #[test]
    fn test_action_press_without_sequence_then_release_is_incomplete() {
        let mut machine = ComboMachine::default();
        machine.handle_event(&InputEvent::press("→", 0.0));
        machine.handle_event(&InputEvent::press(" ", 0.1));
        assert_eq!(
            machine.handle_event(&InputEvent::release(" ", 0.2)),
            Outcome::incomplete()
        );
    }

    #[test]
    fn test_non_action_release_is_ignored() {
        let mut machine = ComboMachine::default();
        machine.handle_event(&InputEvent::press("→", 0.0));
        assert_eq!(
            machine.handle_event(&InputEvent::release("→", 0.1)),
            Outcome::Empty
        );
        assert_eq!(machine.state(), MachineState::Traversing);
    }

    #[test]
    fn test_pending_survives_direction_presses() {
        let mut machine = ComboMachine::default();
        for (i, glyph) in ["→", "→", "→", " "].iter().enumerate() {
            machine.handle_event(&InputEvent::press(*glyph, i as f64 * 0.1));
        }
        machine.handle_event(&InputEvent::press("↑", 0.5));

        assert_eq!(machine.state(), MachineState::PendingCompletion);
        assert_eq!(
            machine.handle_event(&InputEvent::release(" ", 0.6)),
            matched("Hadoken", None)
        );
    }

    #[test]
    fn test_pending_cleared_by_timeout() {
        let mut machine = ComboMachine::default();
        for (i, glyph) in ["→", "→", "→", " "].iter().enumerate() {
            machine.handle_event(&InputEvent::press(*glyph, i as f64 * 0.1));
        }
        machine.handle_event(&InputEvent::press("↑", 2.0));

        assert_eq!(machine.pending_combo(), None);
        assert_eq!(
            machine.handle_event(&InputEvent::release(" ", 2.1)),
            Outcome::incomplete()
        );
    }

    #[test]
    fn test_pending_records_action_press_time() {
        let mut machine = ComboMachine::default();
        for (i, glyph) in ["←", "→", "←", "→", " "].iter().enumerate() {
            machine.handle_event(&InputEvent::press(*glyph, 1.0 + i as f64 * 0.25));
        }
        assert_eq!(
            machine.pending_combo(),
            Some(&PendingCombo {
                name: "Tatsumaki".to_string(),
                action_pressed_at: 2.0,
            })
        );
    }

    #[test]
    fn test_mismatch_retries_from_root() {
        // ↑ ↑ ↓ is a valid prefix; ← breaks it but is itself a valid first token
        let mut machine = ComboMachine::default();
        let events = [
            InputEvent::press("↑", 0.0),
            InputEvent::press("↑", 0.1),
            InputEvent::press("←", 0.2),
            InputEvent::press("→", 0.3),
            InputEvent::press("←", 0.4),
            InputEvent::press("→", 0.5),
            InputEvent::press(" ", 0.6),
            InputEvent::release(" ", 0.7),
        ];
        assert_eq!(feed(&mut machine, &events), vec![matched("Tatsumaki", None)]);
    }

    #[test]
    fn test_mismatch_does_not_replay_broken_attempt() {
        // ← ↑ → → ↓ breaks on →, whose tail → → ↓ → ↑ ↓ → would spell out
        // Ultra Shoryuken. Only the breaking button is retried, so it never
        // completes.
        let mut machine = ComboMachine::default();
        let glyphs = ["←", "↑", "→", "→", "↓", "→", "↑", "↓", "→", " "];
        for (i, glyph) in glyphs.iter().enumerate() {
            machine.handle_event(&InputEvent::press(*glyph, i as f64 * 0.1));
        }

        assert_eq!(machine.state(), MachineState::Idle);
        assert_eq!(
            machine.handle_event(&InputEvent::release(" ", 1.1)),
            Outcome::incomplete()
        );
    }

    #[test]
    fn test_unmatched_first_token_stays_idle() {
        let mut machine = ComboMachine::default();
        machine.handle_event(&InputEvent::press("↓", 0.0));
        assert_eq!(machine.state(), MachineState::Idle);
        machine.handle_event(&InputEvent::press(" ", 0.1));
        assert_eq!(machine.state(), MachineState::Idle);
    }

    #[test]
    fn test_longer_combo_sharing_prefix() {
        // Hadoken's → → → then ↓ continues into Giga Hadoken
        let mut machine = ComboMachine::default();
        let giga = ComboTable::builtin().get("Giga Hadoken").unwrap().clone();
        let events = Script::new().gap(0.3).combo(&giga, 2.9).into_events();
        let outcomes = feed(&mut machine, &events);
        assert_eq!(outcomes.len(), 1);
        let m = outcomes[0].matched().unwrap();
        assert_eq!(m.combo, "Giga Hadoken");
        assert!(m.charged);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut machine = ComboMachine::default();
        for (i, glyph) in ["→", "→", "→", " ", "↑"].iter().enumerate() {
            machine.handle_event(&InputEvent::press(*glyph, i as f64 * 0.1));
        }
        assert_eq!(machine.state(), MachineState::PendingCompletion);

        machine.reset();
        assert_eq!(machine.state(), MachineState::Idle);
        assert_eq!(machine.pending_combo(), None);

        // No last press time either: a long gap is not a timeout anymore
        machine.handle_event(&InputEvent::press("→", 100.0));
        assert_eq!(machine.state(), MachineState::Traversing);
    }

    #[test]
    fn test_custom_timeout() {
        let mut machine = ComboMachine::new(0.25);
        assert_eq!(machine.timeout_seconds(), 0.25);
        let events = [
            InputEvent::press("→", 0.0),
            InputEvent::press("→", 0.2),
            InputEvent::press("→", 0.5),
            InputEvent::press(" ", 0.6),
            InputEvent::release(" ", 0.7),
        ];
        assert_eq!(feed(&mut machine, &events), vec![Outcome::incomplete()]);
    }

    #[test]
    fn test_machines_share_trie() {
        let table = ComboTable::new(vec![ComboDefinition::new(
            "Tap",
            vec![Button::Up, Button::Action],
        )])
        .unwrap();
        let trie = Arc::new(ComboTrie::build(&table));

        let mut first = ComboMachine::with_trie(Arc::clone(&trie), 1.0);
        let mut second = ComboMachine::with_trie(Arc::clone(&trie), 1.0);

        first.handle_event(&InputEvent::press("↑", 0.0));
        assert_eq!(first.state(), MachineState::Traversing);
        assert_eq!(second.state(), MachineState::Idle);

        first.handle_event(&InputEvent::press(" ", 0.1));
        second.handle_event(&InputEvent::press("↑", 0.1));
        assert_eq!(
            first.handle_event(&InputEvent::release(" ", 0.2)),
            matched("Tap", None)
        );
        assert_eq!(second.state(), MachineState::Traversing);
        assert!(Arc::ptr_eq(first.trie(), second.trie()));
    }
}
