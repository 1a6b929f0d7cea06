//! Subcommand implementations

pub mod hardware_test;
pub mod phone_book;
pub mod run;

use fetap_hardware_core::Gpio;
use std::sync::Arc;

/// The board's GPIO, when this build supports it
#[cfg(feature = "rpi")]
pub fn open_gpio() -> anyhow::Result<Arc<dyn Gpio>> {
    use anyhow::Context;
    let gpio = fetap_hardware_core::RppalGpio::new().context("Failed to open GPIO")?;
    Ok(Arc::new(gpio))
}

#[cfg(not(feature = "rpi"))]
pub fn open_gpio() -> anyhow::Result<Arc<dyn Gpio>> {
    anyhow::bail!("Built without GPIO support, rebuild with `--features rpi` or use `--simulate`")
}
