//! Self check: play every combo through a fresh machine

use hadoken_engine::script::{Script, DEFAULT_GAP};
use hadoken_engine::{ComboDefinition, ComboMachine, ComboTable};

/// Hold used for the charged variant, in the middle of the charge window
pub const CHARGED_HOLD: f64 = 2.5;

/// Hold used for the quick variant
pub const QUICK_HOLD: f64 = 0.1;

/// Result of playing one combo
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub charged: bool,
    pub passed: bool,
}

/// Play `definition` and check that it is detected with the expected charge.
pub fn simulate_combo(definition: &ComboDefinition, charged: bool, timeout_seconds: f64) -> bool {
    let hold = if charged { CHARGED_HOLD } else { QUICK_HOLD };
    let mut machine = ComboMachine::new(timeout_seconds);

    let detected = Script::new()
        .gap(DEFAULT_GAP)
        .combo(definition, hold)
        .into_events()
        .iter()
        .filter_map(|event| machine.handle_event(event).matched().cloned())
        .last();

    match detected {
        Some(m) => m.combo == definition.name && m.charged == charged,
        None => false,
    }
}

/// Run the quick variant of every combo and, optionally, the charged one.
pub fn run_checks(
    table: &ComboTable,
    include_charged: bool,
    timeout_seconds: f64,
) -> Vec<CheckResult> {
    let variants: &[bool] = if include_charged { &[false, true] } else { &[false] };

    variants
        .iter()
        .flat_map(|&charged| {
            table.definitions().iter().map(move |definition| CheckResult {
                name: definition.name.clone(),
                charged,
                passed: simulate_combo(definition, charged, timeout_seconds),
            })
        })
        .collect()
}
