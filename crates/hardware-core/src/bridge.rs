//! Physical signals to logical phone signals
//!
//! Each monitored input gets a debounced edge callback whose only job is to
//! hand one [`HardwareSignal`] to the registered [`HardwareEventHandler`].
//! Nothing is mutated in callback context.

use crate::config::HardwareConfig;
use crate::error::HardwareResult;
use crate::gpio::{Edge, Gpio, Level, Pull};
use crate::ringer::Ringer;
use std::sync::Arc;
use tracing::{debug, info};

/// Logical signal decoded from one qualifying edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareSignal {
    ReceiverUp,
    ReceiverDown,
    DialActivate,
    DialDeactivate,
    DialPulse,
}

/// Receiver of decoded signals, called from driver callback threads
pub trait HardwareEventHandler: Send + Sync + 'static {
    fn on_signal(&self, signal: HardwareSignal);
}

/// Owns the pins of the phone and its ringer
pub struct HardwareBridge {
    gpio: Arc<dyn Gpio>,
    config: HardwareConfig,
    ringer: Arc<Ringer>,
}

impl HardwareBridge {
    pub fn new(gpio: Arc<dyn Gpio>, config: HardwareConfig) -> Self {
        let ringer = Arc::new(Ringer::new(
            Arc::clone(&gpio),
            config.ring_pin,
            config.ring.clone(),
        ));
        Self {
            gpio,
            config,
            ringer,
        }
    }

    pub fn ringer(&self) -> Arc<Ringer> {
        Arc::clone(&self.ringer)
    }

    pub fn config(&self) -> &HardwareConfig {
        &self.config
    }

    /// Configure every pin and start delivering signals to `handler`
    ///
    /// Inputs are pulled down and the ring output starts low. Any failure
    /// here means the phone cannot work and should abort startup.
    pub fn setup(&self, handler: Arc<dyn HardwareEventHandler>) -> HardwareResult<()> {
        let config = &self.config;

        self.gpio.setup_output(config.ring_pin, Level::Low)?;

        self.gpio.setup_input(config.receiver_pin, Pull::Down)?;
        let receiver_handler = Arc::clone(&handler);
        self.gpio.watch_edges(
            config.receiver_pin,
            Edge::Both,
            config.receiver_debounce(),
            Box::new(move |level| {
                // The level is sampled after the edge. It may already have
                // bounced again, the mechanical timings leave enough margin.
                receiver_handler.on_signal(match level {
                    Level::High => HardwareSignal::ReceiverUp,
                    Level::Low => HardwareSignal::ReceiverDown,
                });
            }),
        )?;

        self.gpio.setup_input(config.dial_active_pin, Pull::Down)?;
        let dial_handler = Arc::clone(&handler);
        self.gpio.watch_edges(
            config.dial_active_pin,
            Edge::Both,
            config.dial_active_debounce(),
            Box::new(move |level| {
                dial_handler.on_signal(match level {
                    Level::High => HardwareSignal::DialActivate,
                    Level::Low => HardwareSignal::DialDeactivate,
                });
            }),
        )?;

        self.gpio.setup_input(config.dial_pulse_pin, Pull::Down)?;
        let pulse_handler = handler;
        self.gpio.watch_edges(
            config.dial_pulse_pin,
            config.pulse_edge,
            config.dial_pulse_debounce(),
            Box::new(move |_| pulse_handler.on_signal(HardwareSignal::DialPulse)),
        )?;

        info!(
            "Hardware ready (receiver={}, dial_active={}, dial_pulse={}, ring={})",
            config.receiver_pin, config.dial_active_pin, config.dial_pulse_pin, config.ring_pin
        );
        Ok(())
    }

    /// Stop the ringer and release every pin
    pub async fn cleanup(&self) -> HardwareResult<()> {
        self.ringer.stop_ringing().await?;
        self.gpio.release_all()?;
        debug!("GPIO released");
        Ok(())
    }
}
