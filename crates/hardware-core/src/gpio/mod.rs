//! GPIO capability
//!
//! The bridge never talks to a concrete driver. Backends implement [`Gpio`]:
//! [`SimulatedGpio`] keeps pins in memory (tests, desk development) and
//! `RppalGpio` drives a Raspberry Pi when the `rpi` feature is enabled.

mod simulated;
#[cfg(feature = "rpi")]
mod rpi;

pub use simulated::SimulatedGpio;
#[cfg(feature = "rpi")]
pub use rpi::RppalGpio;

use crate::error::HardwareResult;
use serde::Deserialize;
use std::time::Duration;

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

/// Internal bias resistor of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Which transitions an input reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

impl Edge {
    /// Whether a transition into `level` qualifies
    pub fn accepts(self, level: Level) -> bool {
        match self {
            Edge::Both => true,
            Edge::Rising => level == Level::High,
            Edge::Falling => level == Level::Low,
        }
    }
}

/// Edge notification, receives the level sampled after the edge
///
/// Runs on the driver's delivery thread, never on the caller of `watch_edges`.
pub type EdgeCallback = Box<dyn Fn(Level) + Send + Sync + 'static>;

/// Pin-level access the hardware bridge needs
pub trait Gpio: Send + Sync {
    /// Configure `pin` as an input with the given bias
    fn setup_input(&self, pin: u8, pull: Pull) -> HardwareResult<()>;

    /// Configure `pin` as an output driven to `initial`
    fn setup_output(&self, pin: u8, initial: Level) -> HardwareResult<()>;

    /// Register a debounced edge callback on an input
    ///
    /// Edges arriving less than `debounce` after the last reported one are
    /// dropped by the driver.
    fn watch_edges(
        &self,
        pin: u8,
        edge: Edge,
        debounce: Duration,
        callback: EdgeCallback,
    ) -> HardwareResult<()>;

    /// Current level of a configured pin
    fn read(&self, pin: u8) -> HardwareResult<Level>;

    /// Drive an output
    fn write(&self, pin: u8, level: Level) -> HardwareResult<()>;

    /// Drop every callback and return all pins to their reset state
    fn release_all(&self) -> HardwareResult<()>;
}
