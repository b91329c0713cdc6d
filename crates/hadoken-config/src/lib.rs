//! Configuration parsing for hadoken
//!
//! This crate handles parsing the KDL configuration file shared by the
//! daemon and the command-line tool.

mod error;
mod model;
mod parser;

pub use error::ConfigError;
pub use model::*;
pub use parser::{parse_config, parse_config_str};
