use super::{Edge, EdgeCallback, Gpio, Level, Pull};
use crate::error::{HardwareError, HardwareResult};
use parking_lot::Mutex;
use rppal::gpio::{self as pi, InputPin, OutputPin, Trigger};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Raspberry Pi backend on top of `rppal` (BCM pin numbering)
///
/// Interrupt callbacks run on rppal's interrupt thread. The level handed to
/// the callback is taken from the edge direction rppal reports.
pub struct RppalGpio {
    gpio: pi::Gpio,
    inputs: Mutex<HashMap<u8, InputPin>>,
    outputs: Mutex<HashMap<u8, OutputPin>>,
}

impl RppalGpio {
    pub fn new() -> HardwareResult<Self> {
        let gpio = pi::Gpio::new().map_err(|e| HardwareError::unavailable(e.to_string()))?;
        Ok(Self {
            gpio,
            inputs: Mutex::new(HashMap::new()),
            outputs: Mutex::new(HashMap::new()),
        })
    }
}

fn from_pi(level: pi::Level) -> Level {
    match level {
        pi::Level::High => Level::High,
        pi::Level::Low => Level::Low,
    }
}

fn trigger_for(edge: Edge) -> Trigger {
    match edge {
        Edge::Rising => Trigger::RisingEdge,
        Edge::Falling => Trigger::FallingEdge,
        Edge::Both => Trigger::Both,
    }
}

impl Gpio for RppalGpio {
    fn setup_input(&self, pin: u8, pull: Pull) -> HardwareResult<()> {
        let raw = self.gpio.get(pin).map_err(|e| HardwareError::gpio(pin, e.to_string()))?;
        let input = match pull {
            Pull::Down => raw.into_input_pulldown(),
            Pull::Up => raw.into_input_pullup(),
            Pull::None => raw.into_input(),
        };
        self.inputs.lock().insert(pin, input);
        Ok(())
    }

    fn setup_output(&self, pin: u8, initial: Level) -> HardwareResult<()> {
        let raw = self.gpio.get(pin).map_err(|e| HardwareError::gpio(pin, e.to_string()))?;
        let output = match initial {
            Level::Low => raw.into_output_low(),
            Level::High => raw.into_output_high(),
        };
        self.outputs.lock().insert(pin, output);
        Ok(())
    }

    fn watch_edges(
        &self,
        pin: u8,
        edge: Edge,
        debounce: Duration,
        callback: EdgeCallback,
    ) -> HardwareResult<()> {
        let mut inputs = self.inputs.lock();
        let input = inputs
            .get_mut(&pin)
            .ok_or(HardwareError::PinNotConfigured { pin, expected: "input" })?;

        input
            .set_async_interrupt(trigger_for(edge), Some(debounce), move |event: pi::Event| {
                let level = match event.trigger {
                    Trigger::RisingEdge => Level::High,
                    Trigger::FallingEdge => Level::Low,
                    _ => return,
                };
                callback(level);
            })
            .map_err(|e| HardwareError::gpio(pin, e.to_string()))?;

        debug!("Watching pin {} for {:?} edges (debounce {:?})", pin, edge, debounce);
        Ok(())
    }

    fn read(&self, pin: u8) -> HardwareResult<Level> {
        if let Some(input) = self.inputs.lock().get(&pin) {
            return Ok(from_pi(input.read()));
        }
        Err(HardwareError::PinNotConfigured { pin, expected: "input" })
    }

    fn write(&self, pin: u8, level: Level) -> HardwareResult<()> {
        let mut outputs = self.outputs.lock();
        let output = outputs
            .get_mut(&pin)
            .ok_or(HardwareError::PinNotConfigured { pin, expected: "output" })?;
        match level {
            Level::High => output.set_high(),
            Level::Low => output.set_low(),
        }
        Ok(())
    }

    fn release_all(&self) -> HardwareResult<()> {
        let mut inputs = self.inputs.lock();
        for (pin, input) in inputs.iter_mut() {
            if let Err(e) = input.clear_async_interrupt() {
                debug!("Failed to clear interrupt on pin {}: {}", pin, e);
            }
        }
        inputs.clear();
        self.outputs.lock().clear();
        Ok(())
    }
}
