//! KDL configuration parser

use std::path::Path;

use crate::error::ConfigError;
use crate::model::*;

/// Parse a configuration file from the given path
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse configuration from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // kdl uses an older miette version, so we need to extract offset/len manually
        let offset = e.span.offset();
        let len = e.span.len();
        let span = miette::SourceSpan::from((offset, len));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "global" => {
                config.global = parse_global(node)?;
            }
            "device" => {
                config.devices.push(parse_device(node)?);
            }
            name => {
                tracing::warn!("Unknown top-level node: {}", name);
            }
        }
    }

    Ok(config)
}

fn first_entry(node: &kdl::KdlNode) -> Option<&kdl::KdlValue> {
    node.entries().first().map(|e| e.value())
}

fn parse_global(node: &kdl::KdlNode) -> Result<GlobalConfig, ConfigError> {
    let mut global = GlobalConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "log-level" => {
                    if let Some(val) = first_entry(child).and_then(|v| v.as_string()) {
                        global.log_level = val
                            .parse()
                            .map_err(|e| ConfigError::Invalid { message: e })?;
                    }
                }
                "timeout-seconds" => {
                    let value = first_entry(child)
                        .and_then(|v| v.as_f64().or_else(|| v.as_i64().map(|i| i as f64)));
                    match value {
                        Some(secs) if secs > 0.0 && secs <= MAX_TIMEOUT_SECONDS => {
                            global.timeout_seconds = secs;
                        }
                        _ => {
                            return Err(ConfigError::Invalid {
                                message: format!(
                                    "timeout-seconds must be a positive number of at most {}",
                                    MAX_TIMEOUT_SECONDS
                                ),
                            });
                        }
                    }
                }
                "idle-poll-ms" => match first_entry(child).and_then(|v| v.as_i64()) {
                    Some(ms) if ms > 0 => global.idle_poll_ms = ms as u64,
                    _ => {
                        return Err(ConfigError::Invalid {
                            message: "idle-poll-ms must be a positive integer".to_string(),
                        });
                    }
                },
                name => {
                    tracing::warn!("Unknown global config option: {}", name);
                }
            }
        }
    }

    Ok(global)
}

fn parse_device(node: &kdl::KdlNode) -> Result<DeviceConfig, ConfigError> {
    let mut device = DeviceConfig {
        name: first_entry(node)
            .and_then(|v| v.as_string())
            .map(|s| s.to_string()),
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "vendor-product" => {
                    device.vendor_product = first_entry(child)
                        .and_then(|v| v.as_string())
                        .map(|s| s.to_string());
                }
                "grab" => match first_entry(child).and_then(|v| v.as_bool()) {
                    Some(grab) => device.grab = grab,
                    None => {
                        return Err(ConfigError::Invalid {
                            message: format!(
                                "grab for device '{}' must be true or false",
                                device.label()
                            ),
                        });
                    }
                },
                name => {
                    tracing::warn!("Unknown device config option: {}", name);
                }
            }
        }
    }

    if device.name.is_none() && device.vendor_product.is_none() {
        return Err(ConfigError::MissingField {
            field: "device name or vendor-product (e.g., `device \"My Keyboard\" { ... }`)"
                .to_string(),
        });
    }

    Ok(device)
}
