//! Voice client configuration

use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Release build of pjsua for the Raspberry Pi
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://github.com/mmEissen/pjsip-rpi-release/releases/download/v2.14.1/pjsua";

/// How the pjsua process is obtained, launched and polled
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Location of the pjsua executable, downloaded here when missing
    pub binary_path: PathBuf,
    pub download_url: String,
    /// Run through `stdbuf -o0`, pjsua's output is block buffered on a pipe
    pub unbuffered: bool,
    /// Arguments that put pjsua into a parseable shell mode
    pub args: Vec<String>,
    /// Site specific arguments, typically `--config-file=<account.cfg>`
    pub extra_args: Vec<String>,
    pub command_timeout_ms: u64,
    pub startup_timeout_ms: u64,
    /// Idle time between two `call list` polls
    pub poll_interval_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("pjsua"),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            unbuffered: true,
            args: vec![
                "--use-cli".to_string(),
                "--max-calls=3".to_string(),
                "--no-tones".to_string(),
                "--no-color".to_string(),
                "--log-level=0".to_string(),
            ],
            extra_args: Vec::new(),
            command_timeout_ms: 10_000,
            startup_timeout_ms: 10_000,
            poll_interval_ms: 100,
        }
    }
}

impl SupervisorConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Anchor a relative `binary_path` at the working directory
    ///
    /// Both `stdbuf` and a direct spawn resolve bare program names through
    /// `PATH`, never through the working directory.
    pub fn with_absolute_binary_path(mut self) -> io::Result<Self> {
        if self.binary_path.is_relative() {
            self.binary_path = std::env::current_dir()?.join(&self.binary_path);
        }
        Ok(self)
    }

    /// Program and argument vector used to spawn the voice client
    pub fn command_line(&self) -> (PathBuf, Vec<String>) {
        let mut args = Vec::new();
        let program = if self.unbuffered {
            args.push("-o0".to_string());
            args.push(self.binary_path.to_string_lossy().into_owned());
            PathBuf::from("stdbuf")
        } else {
            self.binary_path.clone()
        };
        args.extend(self.args.iter().cloned());
        args.extend(self.extra_args.iter().cloned());
        (program, args)
    }
}
