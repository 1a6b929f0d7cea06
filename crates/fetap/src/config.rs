//! Daemon configuration
//!
//! One TOML file with a section per component, overridable through
//! `FETAP__<SECTION>__<KEY>` environment variables:
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [sip]
//! extra_args = ["--config-file=/etc/fetap/account.cfg"]
//!
//! [phone_book]
//! path = "/var/lib/fetap/phone_book.json"
//! fuzzy_lookup = true
//! ```

use anyhow::Context;
use fetap_call_engine::DialPolicy;
use fetap_hardware_core::HardwareConfig;
use fetap_infra_common::{load_config, ConfigSource, LoggingConfig};
use fetap_phone_book::PhoneBookConfig;
use fetap_sip_supervisor::SupervisorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Used when `--config` is not given; may be absent
pub const DEFAULT_CONFIG_FILE: &str = "fetap.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FetapConfig {
    pub logging: LoggingConfig,
    pub hardware: HardwareConfig,
    pub sip: SupervisorConfig,
    pub phone_book: PhoneBookConfig,
    pub dialing: DialPolicy,
}

impl FetapConfig {
    /// Load from `path` and the environment
    ///
    /// An explicitly named file must exist, the default one is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let source = ConfigSource::default().with_file(&file, required);
        load_config(&source)
            .with_context(|| format!("Failed to load configuration from {}", file.display()))
    }
}
