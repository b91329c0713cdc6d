//! hadoken daemon
//!
//! Reads arrow keys and the space bar from keyboards, recognizes combos and
//! prints each detection as a JSON line on stdout.

mod device;
mod host;
mod source;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use hadoken_config::{Config, DEFAULT_CONFIG_PATH};
use hadoken_engine::{ComboMachine, Outcome};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use crate::host::ComboHost;
use crate::source::DEFAULT_CHANNEL_BUFFER;

#[derive(Parser, Debug)]
#[command(name = "hadokend")]
#[command(about = "Keyboard combo detection daemon")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

/// Load the configuration, falling back to defaults when the file is absent
fn load_config(path: &Path) -> Result<(Config, bool)> {
    if !path.exists() {
        return Ok((Config::default(), false));
    }
    Ok((hadoken_config::parse_config(path)?, true))
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Empty => return,
        Outcome::Matched(m) => tracing::info!("Detected -> {}", m),
        Outcome::Error { error } => tracing::info!("Combo not finished ({})", error),
    }

    match serde_json::to_string(outcome) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::warn!("Failed to serialize outcome: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Expand tilde in config path
    let config_path: PathBuf = shellexpand::tilde(&args.config).into_owned().into();
    let loaded = load_config(&config_path);

    // Initialize tracing; RUST_LOG overrides the configured level
    let default_level = loaded
        .as_ref()
        .map(|(config, _)| config.global.log_level.as_filter())
        .unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, from_file) = loaded?;
    if from_file {
        tracing::info!("Loaded configuration from {}", config_path.display());
    } else {
        tracing::info!(
            "No configuration at {}, using defaults",
            config_path.display()
        );
    }

    let devices = device::select_devices(&config)?;
    if devices.is_empty() {
        bail!("No matching keyboard found. Check device permissions and configuration.");
    }
    tracing::info!(
        "Listening on {} device(s) ({} grabbed)",
        devices.len(),
        devices.iter().filter(|d| d.grab).count()
    );

    let (mut key_events, readers) = source::spawn_readers(devices, DEFAULT_CHANNEL_BUFFER)?;

    let machine = ComboMachine::new(config.global.timeout_seconds);
    let mut host = ComboHost::new(machine, Instant::now());

    let mut idle_poll = tokio::time::interval(config.global.idle_poll_interval());
    idle_poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "hadoken daemon started (timeout {:.2}s)",
        host.machine().timeout_seconds()
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = key_events.recv() => {
                let Some(event) = event else {
                    tracing::warn!("All input devices closed");
                    break;
                };
                let outcome = host.handle_key(event, Instant::now());
                report(&outcome);
            }
            _ = idle_poll.tick() => {
                host.poll_idle(Instant::now());
            }
            _ = &mut shutdown => {
                break;
            }
        }
    }

    tracing::info!("Shutting down...");
    for reader in readers {
        reader.abort();
    }

    Ok(())
}
