//! Combo recognition engine for hadoken
//!
//! This crate turns a stream of timestamped button presses and releases into
//! fighting-game style combo detections. It has no I/O of its own: a host feeds
//! [`InputEvent`]s into a [`ComboMachine`] and acts on the returned [`Outcome`].

mod button;
mod error;
mod event;
mod machine;
mod outcome;
pub mod script;
mod table;
mod trie;

pub use button::{normalize, Button};
pub use error::TableError;
pub use event::{InputEvent, KeyAction};
pub use machine::{ComboMachine, MachineState, PendingCombo, DEFAULT_TIMEOUT_SECONDS};
pub use outcome::{ComboMatch, MatchError, Outcome, CHARGE_WINDOW};
pub use table::{ComboDefinition, ComboTable};
pub use trie::{ComboTrie, NodeId};
