//! Shared infrastructure for the FETAP crates.
//!
//! Holds the pieces every binary needs exactly once: the error type used by
//! the infrastructure layer, the tracing subscriber setup and the layered
//! configuration loader (defaults, TOML file, `FETAP__*` environment).

pub mod config;
pub mod errors;
pub mod logging;

pub use config::{load_config, ConfigSource};
pub use errors::types::{Error, Result};
pub use logging::{log_welcome, parse_log_level, setup_logging, LoggingConfig};
