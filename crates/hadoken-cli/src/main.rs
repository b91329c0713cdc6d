//! hadoken CLI
//!
//! Configuration, inspection and offline testing tool for hadoken.

mod check;
mod replay;

use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hadoken_config::{Config, DEFAULT_CONFIG_PATH};
use hadoken_engine::script::Script;
use hadoken_engine::{ComboMachine, ComboTable, Outcome};
use miette::IntoDiagnostic;

/// Hold used for the charged combo in the demo, in seconds
const DEMO_CHARGE_HOLD: f64 = 2.5;

#[derive(Parser, Debug)]
#[command(name = "hadoken")]
#[command(about = "Fighting game combo recognizer")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration file
    Validate,

    /// List available input devices
    Devices,

    /// List the recognized combos
    Combos,

    /// Play every combo through the recognizer and report the results
    Check {
        /// Also check the charged variant of every combo
        #[arg(long)]
        charged: bool,
    },

    /// Run a short scripted demo
    Demo,

    /// Replay newline-delimited JSON events and print the outcomes
    Replay {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
}

fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Expand tilde in config path
    let config_path: PathBuf = shellexpand::tilde(&cli.config).into_owned().into();

    match cli.command {
        Commands::Validate => cmd_validate(&config_path),
        Commands::Devices => cmd_devices(),
        Commands::Combos => cmd_combos(),
        Commands::Check { charged } => cmd_check(&config_path, charged),
        Commands::Demo => cmd_demo(&config_path),
        Commands::Replay { file } => cmd_replay(&config_path, file.as_deref()),
    }
}

/// Load the configuration, or the defaults when the file does not exist
fn load_config_or_default(config_path: &Path) -> miette::Result<Config> {
    if !config_path.exists() {
        tracing::debug!(
            "No configuration at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }
    Ok(hadoken_config::parse_config(config_path)?)
}

fn print_outcome(outcome: &Outcome) -> miette::Result<()> {
    println!("{}", serde_json::to_string(outcome).into_diagnostic()?);
    Ok(())
}

fn cmd_validate(config_path: &Path) -> miette::Result<()> {
    println!("Validating configuration: {}", config_path.display());

    let config = hadoken_config::parse_config(config_path)?;

    println!("Configuration is valid!");
    println!("  Log level: {}", config.global.log_level.as_filter());
    println!("  Timeout: {:.3}s", config.global.timeout_seconds);
    println!("  Idle poll: {}ms", config.global.idle_poll_ms);
    if config.devices.is_empty() {
        println!("  Devices: all keyboards");
    } else {
        println!("  Devices: {}", config.devices.len());
        for device in &config.devices {
            println!(
                "    - {}{}",
                device.label(),
                if device.grab { " (grab)" } else { "" }
            );
        }
    }
    Ok(())
}

fn cmd_devices() -> miette::Result<()> {
    println!("Available input devices:\n");

    for entry in std::fs::read_dir("/dev/input").into_diagnostic()? {
        let entry = entry.into_diagnostic()?;
        let path = entry.path();

        if !path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("event"))
            .unwrap_or(false)
        {
            continue;
        }

        let device = match evdev::Device::open(&path) {
            Ok(device) => device,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let name = device.name().unwrap_or("Unknown");
        let id = device.input_id();
        let is_keyboard = device.supported_events().contains(evdev::EventType::KEY)
            && device
                .supported_keys()
                .map(|keys| keys.contains(evdev::Key::KEY_A))
                .unwrap_or(false);

        println!(
            "  {} [{}]",
            name,
            if is_keyboard { "keyboard" } else { "other" }
        );
        println!("    Path: {}", path.display());
        println!("    ID: {:04x}:{:04x}", id.vendor(), id.product());
        println!();
    }

    Ok(())
}

fn cmd_combos() -> miette::Result<()> {
    let table = ComboTable::builtin();
    let width = table
        .definitions()
        .iter()
        .map(|d| d.name.len())
        .max()
        .unwrap_or(0);

    println!("Combos ({}):\n", table.len());
    for definition in table.definitions() {
        let glyphs: Vec<&str> = definition
            .glyphs()
            .map(|g| if g == " " { "SPACE" } else { g })
            .collect();
        println!("  {:width$}  {}", definition.name, glyphs.join(" "), width = width);
    }
    Ok(())
}

fn cmd_check(config_path: &Path, charged: bool) -> miette::Result<()> {
    let config = load_config_or_default(config_path)?;
    let table = ComboTable::builtin();

    let results = check::run_checks(&table, charged, config.global.timeout_seconds);
    for result in &results {
        println!(
            "{} - {}{}",
            if result.passed { "OK" } else { "FAIL" },
            result.name,
            if result.charged { " (charged)" } else { "" }
        );
    }

    let passed = results.iter().filter(|r| r.passed).count();
    println!("\nTotal passed: {}/{}", passed, results.len());

    if passed != results.len() {
        miette::bail!("{} combo check(s) failed", results.len() - passed);
    }
    Ok(())
}

fn cmd_demo(config_path: &Path) -> miette::Result<()> {
    let config = load_config_or_default(config_path)?;
    let table = ComboTable::builtin();
    let find = |name: &str| {
        table
            .get(name)
            .ok_or_else(|| miette::miette!("Combo '{}' is not defined", name))
    };

    let script = Script::new()
        .combo(find("Hadoken")?, DEMO_CHARGE_HOLD)
        .wait(0.5)
        .combo(find("Shoryuken")?, 0.1);

    let mut machine = ComboMachine::new(config.global.timeout_seconds);
    println!("Running demo (timeout {:.2}s)\n", machine.timeout_seconds());

    for event in script.events() {
        let outcome = machine.handle_event(event);
        match &outcome {
            Outcome::Empty => continue,
            Outcome::Matched(m) => println!("[{:5.2}s] Detected -> {}", event.timestamp, m),
            Outcome::Error { error } => println!("[{:5.2}s] {}", event.timestamp, error),
        }
        print_outcome(&outcome)?;
    }
    Ok(())
}

fn cmd_replay(config_path: &Path, file: Option<&Path>) -> miette::Result<()> {
    let config = load_config_or_default(config_path)?;
    let mut machine = ComboMachine::new(config.global.timeout_seconds);

    let mut stdout = std::io::stdout().lock();

    let written = match file {
        Some(path) => {
            let file = std::fs::File::open(path)
                .map_err(|e| miette::miette!("Failed to open {}: {}", path.display(), e))?;
            replay::replay(BufReader::new(file), &mut machine, &mut stdout)?
        }
        None => replay::replay(std::io::stdin().lock(), &mut machine, &mut stdout)?,
    };
    tracing::debug!("Replay finished with {} outcome(s)", written);

    Ok(())
}
