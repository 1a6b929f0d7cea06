//! # FETAP hardware core
//!
//! Bridges the rotary phone's contacts to logical signals and drives its bell.
//!
//! ```text
//!  hook switch ──┐
//!  dial active ──┼─▶ Gpio (debounced edges) ─▶ HardwareBridge ─▶ HardwareEventHandler
//!  dial pulse  ──┘
//!
//!  Ringer ─▶ Gpio::write(ring pin)   (own cancellable task)
//! ```
//!
//! The GPIO itself is a capability ([`Gpio`]) so the same bridge runs against
//! a Raspberry Pi (`rpi` feature) or the in-memory [`SimulatedGpio`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod gpio;
pub mod ringer;

pub use bridge::{HardwareBridge, HardwareEventHandler, HardwareSignal};
pub use config::{HardwareConfig, RingPattern};
pub use error::{HardwareError, HardwareResult};
pub use gpio::{Edge, EdgeCallback, Gpio, Level, Pull, SimulatedGpio};
#[cfg(feature = "rpi")]
pub use gpio::RppalGpio;
pub use ringer::Ringer;
