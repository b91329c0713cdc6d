//! Keyboard event source
//!
//! Reads key events from the selected evdev devices and forwards them to the
//! daemon's event loop.
//!
//! ```text
//! +------------------+      +---------+      +-----------+
//! | device reader    | ---> | mpsc    | ---> | ComboHost |
//! | (one task each)  |      | channel |      | loop      |
//! +------------------+      +---------+      +-----------+
//! ```

use anyhow::{Context, Result};
use evdev::{InputEventKind, Key};
use hadoken_engine::{Button, KeyAction};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::device::SelectedDevice;

/// Default capacity of the key event channel
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Event value constants for key events.
pub mod event_value {
    /// Key release event value
    pub const RELEASE: i32 = 0;
    /// Key press event value
    pub const PRESS: i32 = 1;
}

/// A raw key event read from a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub value: i32,
}

/// Translates evdev key events into raw combo symbols.
///
/// Arrow keys are forwarded on press only. The space bar is forwarded on press
/// and, if that press was seen, on release. Key repeats and every other key
/// are dropped.
#[derive(Debug, Default)]
pub struct KeyTranslator {
    action_held: bool,
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the action button is currently held down
    pub fn action_held(&self) -> bool {
        self.action_held
    }

    pub fn translate(&mut self, event: KeyEvent) -> Option<(&'static str, KeyAction)> {
        let button = match event.key {
            Key::KEY_UP => Button::Up,
            Key::KEY_DOWN => Button::Down,
            Key::KEY_LEFT => Button::Left,
            Key::KEY_RIGHT => Button::Right,
            Key::KEY_SPACE => Button::Action,
            _ => return None,
        };

        match (button, event.value) {
            (Button::Action, event_value::PRESS) => {
                self.action_held = true;
                Some((button.glyph(), KeyAction::Press))
            }
            (Button::Action, event_value::RELEASE) if self.action_held => {
                self.action_held = false;
                Some((button.glyph(), KeyAction::Release))
            }
            (Button::Action, _) => None,
            (direction, event_value::PRESS) => Some((direction.glyph(), KeyAction::Press)),
            _ => None,
        }
    }
}

/// Spawn one reader task per device, all feeding the returned channel.
///
/// A reader stops when its device disappears or the receiver is dropped.
pub fn spawn_readers(
    devices: Vec<SelectedDevice>,
    buffer_size: usize,
) -> Result<(mpsc::Receiver<KeyEvent>, Vec<JoinHandle<()>>)> {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let mut handles = Vec::with_capacity(devices.len());

    for SelectedDevice { info, device, .. } in devices {
        let mut stream = device.into_event_stream().with_context(|| {
            format!(
                "Failed to create event stream for device '{}' at {}",
                info.name,
                info.path.display()
            )
        })?;
        let sender = sender.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let event = match stream.next_event().await {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Stopped reading from '{}': {}", info.name, e);
                        break;
                    }
                };

                if let InputEventKind::Key(key) = event.kind() {
                    let key_event = KeyEvent {
                        key,
                        value: event.value(),
                    };
                    if sender.send(key_event).await.is_err() {
                        tracing::debug!("Event loop gone, stopping reader for '{}'", info.name);
                        break;
                    }
                }
            }
        }));
    }

    Ok((receiver, handles))
}
