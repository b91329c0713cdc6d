//! Configuration data model

use std::time::Duration;

/// Default location of the configuration file, before tilde expansion
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/hadoken/config.kdl";

/// Largest accepted `timeout-seconds`, one hour
pub const MAX_TIMEOUT_SECONDS: f64 = 3600.0;

/// Root configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: GlobalConfig,
    pub devices: Vec<DeviceConfig>,
}

/// Global settings
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
    /// Maximum gap between two presses of the same combo, in seconds
    pub timeout_seconds: f64,
    /// How often the daemon checks for an idle input stream, in milliseconds
    pub idle_poll_ms: u64,
}

impl GlobalConfig {
    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            timeout_seconds: 1.0,
            idle_poll_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The level as a `tracing` filter directive
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// An input device to read button events from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device name to match (from evdev)
    pub name: Option<String>,
    /// Vendor:Product ID to match (e.g., "3434:0361")
    pub vendor_product: Option<String>,
    /// Grab the device for exclusive access
    pub grab: bool,
}

impl DeviceConfig {
    /// Check whether an evdev device with the given identity matches this entry.
    ///
    /// Every field that is set must match; vendor:product comparison is
    /// case-insensitive.
    pub fn matches(&self, name: &str, vendor_product: &str) -> bool {
        let name_matches = self.name.as_deref().map_or(true, |n| n == name);
        let id_matches = self
            .vendor_product
            .as_deref()
            .map_or(true, |vp| vp.eq_ignore_ascii_case(vendor_product));
        name_matches && id_matches
    }

    /// Human readable label for log messages
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.vendor_product.as_deref())
            .unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_matches_by_name() {
        let device = DeviceConfig {
            name: Some("Test Keyboard".to_string()),
            ..Default::default()
        };
        assert!(device.matches("Test Keyboard", "0001:0001"));
        assert!(!device.matches("Other Keyboard", "0001:0001"));
    }

    #[test]
    fn test_device_matches_by_vendor_product() {
        let device = DeviceConfig {
            vendor_product: Some("3434:03A1".to_string()),
            ..Default::default()
        };
        assert!(device.matches("Anything", "3434:03a1"));
        assert!(!device.matches("Anything", "3434:0361"));
    }

    #[test]
    fn test_device_matches_requires_all_fields() {
        let device = DeviceConfig {
            name: Some("Test Keyboard".to_string()),
            vendor_product: Some("3434:0361".to_string()),
            grab: false,
        };
        assert!(device.matches("Test Keyboard", "3434:0361"));
        assert!(!device.matches("Test Keyboard", "0001:0001"));
    }

    #[test]
    fn test_log_level_round_trip() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let parsed: LogLevel = level.parse().unwrap();
            assert_eq!(parsed.as_filter(), level);
        }
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_defaults() {
        let global = GlobalConfig::default();
        assert_eq!(global.timeout_seconds, 1.0);
        assert_eq!(global.idle_poll_interval(), Duration::from_millis(10));
        assert_eq!(global.log_level, LogLevel::Info);
    }
}
