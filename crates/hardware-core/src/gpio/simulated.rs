use super::{Edge, EdgeCallback, Gpio, Level, Pull};
use crate::error::{HardwareError, HardwareResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

type SharedCallback = Arc<dyn Fn(Level) + Send + Sync + 'static>;

struct Watch {
    edge: Edge,
    debounce: Duration,
    last_fired: Option<Instant>,
    callback: SharedCallback,
}

struct Input {
    level: Level,
    pull: Pull,
    watch: Option<Watch>,
}

#[derive(Default)]
struct State {
    inputs: HashMap<u8, Input>,
    outputs: HashMap<u8, Level>,
    history: HashMap<u8, Vec<Level>>,
    released: bool,
}

/// In-memory GPIO backend
///
/// Inputs are driven with [`SimulatedGpio::set_input`]; the driver applies the
/// registered debounce and invokes callbacks on the calling thread. Every
/// output write is kept so tests can inspect the waveform.
pub struct SimulatedGpio {
    state: Mutex<State>,
    available: bool,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            available: true,
        }
    }

    /// A backend whose setup always fails, as on a host without GPIO
    pub fn unavailable() -> Self {
        Self {
            state: Mutex::new(State::default()),
            available: false,
        }
    }

    /// Drive an input to `level`, firing its callback on a qualifying edge
    pub fn set_input(&self, pin: u8, level: Level) -> HardwareResult<()> {
        let callback = {
            let mut state = self.state.lock();
            let input = state
                .inputs
                .get_mut(&pin)
                .ok_or(HardwareError::PinNotConfigured { pin, expected: "input" })?;

            if input.level == level {
                return Ok(());
            }
            input.level = level;

            let Some(watch) = input.watch.as_mut() else {
                return Ok(());
            };
            if !watch.edge.accepts(level) {
                return Ok(());
            }

            let now = Instant::now();
            if let Some(last) = watch.last_fired {
                if now.duration_since(last) < watch.debounce {
                    trace!("pin {} edge to {:?} suppressed by debounce", pin, level);
                    return Ok(());
                }
            }
            watch.last_fired = Some(now);
            Arc::clone(&watch.callback)
        };

        callback(level);
        Ok(())
    }

    /// One full pulse on an input: high then low
    pub fn pulse(&self, pin: u8) -> HardwareResult<()> {
        self.set_input(pin, Level::High)?;
        self.set_input(pin, Level::Low)
    }

    pub fn pull(&self, pin: u8) -> Option<Pull> {
        self.state.lock().inputs.get(&pin).map(|input| input.pull)
    }

    pub fn output_level(&self, pin: u8) -> Option<Level> {
        self.state.lock().outputs.get(&pin).copied()
    }

    /// Every level written to `pin` since it was configured
    pub fn output_history(&self, pin: u8) -> Vec<Level> {
        self.state.lock().history.get(&pin).cloned().unwrap_or_default()
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    fn ensure_available(&self) -> HardwareResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(HardwareError::unavailable("simulated GPIO configured as unavailable"))
        }
    }
}

impl Gpio for SimulatedGpio {
    fn setup_input(&self, pin: u8, pull: Pull) -> HardwareResult<()> {
        self.ensure_available()?;
        let level = match pull {
            Pull::Up => Level::High,
            Pull::Down | Pull::None => Level::Low,
        };
        let mut state = self.state.lock();
        state.released = false;
        state.inputs.insert(
            pin,
            Input {
                level,
                pull,
                watch: None,
            },
        );
        Ok(())
    }

    fn setup_output(&self, pin: u8, initial: Level) -> HardwareResult<()> {
        self.ensure_available()?;
        let mut state = self.state.lock();
        state.released = false;
        state.outputs.insert(pin, initial);
        state.history.insert(pin, Vec::new());
        Ok(())
    }

    fn watch_edges(
        &self,
        pin: u8,
        edge: Edge,
        debounce: Duration,
        callback: EdgeCallback,
    ) -> HardwareResult<()> {
        let mut state = self.state.lock();
        let input = state
            .inputs
            .get_mut(&pin)
            .ok_or(HardwareError::PinNotConfigured { pin, expected: "input" })?;
        input.watch = Some(Watch {
            edge,
            debounce,
            last_fired: None,
            callback: Arc::from(callback),
        });
        Ok(())
    }

    fn read(&self, pin: u8) -> HardwareResult<Level> {
        let state = self.state.lock();
        if let Some(input) = state.inputs.get(&pin) {
            return Ok(input.level);
        }
        state
            .outputs
            .get(&pin)
            .copied()
            .ok_or(HardwareError::PinNotConfigured { pin, expected: "input or output" })
    }

    fn write(&self, pin: u8, level: Level) -> HardwareResult<()> {
        let mut state = self.state.lock();
        match state.outputs.get_mut(&pin) {
            Some(current) => *current = level,
            None => return Err(HardwareError::PinNotConfigured { pin, expected: "output" }),
        }
        state.history.entry(pin).or_default().push(level);
        Ok(())
    }

    fn release_all(&self) -> HardwareResult<()> {
        let mut state = self.state.lock();
        state.inputs.clear();
        state.outputs.clear();
        state.released = true;
        Ok(())
    }
}
