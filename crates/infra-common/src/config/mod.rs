//! Layered configuration loading
//!
//! Values are resolved in three layers, later layers win:
//!
//! 1. the `Default` impls of the target structs (`#[serde(default)]`),
//! 2. an optional TOML file,
//! 3. environment variables such as `FETAP__SIP__COMMAND_TIMEOUT_MS`.

use crate::errors::types::Result;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Where configuration is read from
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// TOML file to merge, if any
    pub file: Option<PathBuf>,
    /// Fail when `file` does not exist
    pub file_required: bool,
    /// Prefix of the environment variables to merge
    pub env_prefix: String,
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self {
            file: None,
            file_required: false,
            env_prefix: "FETAP".to_string(),
        }
    }
}

impl ConfigSource {
    pub fn with_file(mut self, path: impl Into<PathBuf>, required: bool) -> Self {
        self.file = Some(path.into());
        self.file_required = required;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }
}

/// Load and deserialize a configuration tree from `source`
pub fn load_config<T: DeserializeOwned>(source: &ConfigSource) -> Result<T> {
    let mut builder = config::Config::builder();

    if let Some(path) = &source.file {
        tracing::debug!("Merging configuration file {}", path.display());
        builder = builder.add_source(
            config::File::from(path.as_path())
                .format(config::FileFormat::Toml)
                .required(source.file_required),
        );
    }

    builder = builder.add_source(
        config::Environment::with_prefix(&source.env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder.build()?;
    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serial_test::serial;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        inner: Inner,
    }

    #[derive(Debug, Deserialize)]
    #[serde(default)]
    struct Inner {
        timeout_ms: u64,
        enabled: bool,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "default".to_string(),
                inner: Inner::default(),
            }
        }
    }

    impl Default for Inner {
        fn default() -> Self {
            Self {
                timeout_ms: 10_000,
                enabled: false,
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_sources() {
        let source = ConfigSource::default().with_env_prefix("FETAPTEST_EMPTY");
        let sample: Sample = load_config(&source).unwrap();
        assert_eq!(sample.name, "default");
        assert_eq!(sample.inner.timeout_ms, 10_000);
    }

    #[test]
    #[serial]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "name = \"from-file\"\n[inner]\nenabled = true").unwrap();

        let source = ConfigSource::default()
            .with_file(file.path(), true)
            .with_env_prefix("FETAPTEST_FILE");
        let sample: Sample = load_config(&source).unwrap();

        assert_eq!(sample.name, "from-file");
        assert!(sample.inner.enabled);
        assert_eq!(sample.inner.timeout_ms, 10_000);
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[inner]\ntimeout_ms = 5").unwrap();

        std::env::set_var("FETAPTEST_ENV__INNER__TIMEOUT_MS", "250");
        let source = ConfigSource::default()
            .with_file(file.path(), true)
            .with_env_prefix("FETAPTEST_ENV");
        let sample: Sample = load_config(&source).unwrap();
        std::env::remove_var("FETAPTEST_ENV__INNER__TIMEOUT_MS");

        assert_eq!(sample.inner.timeout_ms, 250);
    }

    #[test]
    #[serial]
    fn missing_optional_file_is_ignored() {
        let source = ConfigSource::default()
            .with_file("/nonexistent/fetap.toml", false)
            .with_env_prefix("FETAPTEST_MISSING");
        let sample: Sample = load_config(&source).unwrap();
        assert_eq!(sample.name, "default");
    }

    #[test]
    #[serial]
    fn missing_required_file_fails() {
        let source = ConfigSource::default()
            .with_file("/nonexistent/fetap.toml", true)
            .with_env_prefix("FETAPTEST_REQUIRED");
        assert!(load_config::<Sample>(&source).is_err());
    }
}
