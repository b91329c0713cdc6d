//! Replay recorded events
//!
//! Input is newline-delimited JSON, one event per line:
//!
//! ```text
//! {"button": "→", "timestamp": 0.0}
//! {"button": " ", "timestamp": 0.4, "action": "press"}
//! {"button": " ", "timestamp": 2.9, "action": "release"}
//! ```

use std::io::{BufRead, Write};

use hadoken_engine::{ComboMachine, InputEvent};
use miette::{miette, IntoDiagnostic};

/// Feed every event in `reader` to `machine`, writing each non-empty outcome
/// to `out` as a JSON line as soon as it is produced.
///
/// Returns the number of outcomes written. Outcomes before a malformed line
/// have already been written when the error is returned.
pub fn replay<R: BufRead, W: Write>(
    reader: R,
    machine: &mut ComboMachine,
    out: &mut W,
) -> miette::Result<usize> {
    let mut written = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.into_diagnostic()?;
        let line_number = index + 1;

        if line.trim().is_empty() {
            continue;
        }

        let event: InputEvent = serde_json::from_str(&line)
            .map_err(|e| miette!("line {}: {}", line_number, e))?;
        tracing::trace!("line {}: {:?}", line_number, event);

        let outcome = machine.handle_event(&event);
        if outcome.is_empty() {
            continue;
        }

        serde_json::to_writer(&mut *out, &outcome).into_diagnostic()?;
        writeln!(out).into_diagnostic()?;
        out.flush().into_diagnostic()?;
        written += 1;
    }

    Ok(written)
}
