//! Bell driver
//!
//! Ringing runs on its own task so the controller never waits on the cadence.
//! The task is stopped through a [`CancellationToken`] and joined, which lets
//! [`Ringer::stop_ringing`] promise a silent bell once it returns.
//!
//! ```rust
//! use fetap_hardware_core::{Gpio, Level, RingPattern, Ringer, SimulatedGpio};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let gpio = Arc::new(SimulatedGpio::new());
//! gpio.setup_output(17, Level::Low).unwrap();
//!
//! let ringer = Ringer::new(gpio.clone(), 17, RingPattern::default());
//! ringer.start_ringing().unwrap();
//! assert!(ringer.is_ringing());
//!
//! ringer.stop_ringing().await.unwrap();
//! assert_eq!(gpio.output_level(17), Some(Level::Low));
//! # })
//! ```

use crate::config::RingPattern;
use crate::error::{HardwareError, HardwareResult};
use crate::gpio::{Gpio, Level};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct RingTask {
    cancel: CancellationToken,
    handle: JoinHandle<HardwareResult<()>>,
}

/// Drives the ring output with a repeating cadence
pub struct Ringer {
    gpio: Arc<dyn Gpio>,
    pin: u8,
    pattern: RingPattern,
    active: Mutex<Option<RingTask>>,
}

impl Ringer {
    pub fn new(gpio: Arc<dyn Gpio>, pin: u8, pattern: RingPattern) -> Self {
        Self {
            gpio,
            pin,
            pattern,
            active: Mutex::new(None),
        }
    }

    /// Start the ring cycle unless it is already running
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_ringing(&self) -> HardwareResult<()> {
        let mut active = self.active.lock();
        if let Some(task) = active.as_ref() {
            if !task.handle.is_finished() {
                debug!("Ringer already active");
                return Ok(());
            }
            warn!("Previous ring task ended on its own, restarting");
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(ring_loop(
            Arc::clone(&self.gpio),
            self.pin,
            self.pattern.clone(),
            cancel.clone(),
        ));
        *active = Some(RingTask { cancel, handle });
        info!("Ringing started");
        Ok(())
    }

    /// Stop ringing and wait until the output is low
    ///
    /// A no-op when the ringer is idle.
    pub async fn stop_ringing(&self) -> HardwareResult<()> {
        let task = self.active.lock().take();
        let Some(task) = task else {
            return Ok(());
        };

        task.cancel.cancel();
        let joined = task.handle.await;
        self.gpio.write(self.pin, Level::Low)?;
        info!("Ringing stopped");
        joined.map_err(|e| HardwareError::RingerTask {
            message: e.to_string(),
        })?
    }

    pub fn is_ringing(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .map_or(false, |task| !task.handle.is_finished())
    }

    /// Ring exactly one group, used by the hardware self test
    pub async fn ring_once(&self) -> HardwareResult<()> {
        let cancel = CancellationToken::new();
        ring_group(self.gpio.as_ref(), self.pin, &self.pattern, &cancel).await?;
        self.gpio.write(self.pin, Level::Low)
    }
}

/// Sleep for `duration`, returning `true` if cancelled first
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

/// One group of bursts; `Ok(true)` when interrupted by cancellation
async fn ring_group(
    gpio: &dyn Gpio,
    pin: u8,
    pattern: &RingPattern,
    cancel: &CancellationToken,
) -> HardwareResult<bool> {
    for burst in 0..pattern.repeats {
        for _ in 0..pattern.ticks_per_burst() {
            gpio.write(pin, Level::High)?;
            if sleep_or_cancel(pattern.on(), cancel).await {
                return Ok(true);
            }
            gpio.write(pin, Level::Low)?;
            if sleep_or_cancel(pattern.off(), cancel).await {
                return Ok(true);
            }
        }

        let gap = if burst + 1 < pattern.repeats {
            pattern.pause()
        } else {
            pattern.long_pause()
        };
        if sleep_or_cancel(gap, cancel).await {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn ring_loop(
    gpio: Arc<dyn Gpio>,
    pin: u8,
    pattern: RingPattern,
    cancel: CancellationToken,
) -> HardwareResult<()> {
    // An empty pattern would spin without ever yielding
    if pattern.repeats == 0 || pattern.ticks_per_burst() == 0 {
        cancel.cancelled().await;
        return gpio.write(pin, Level::Low);
    }

    loop {
        if ring_group(gpio.as_ref(), pin, &pattern, &cancel).await? {
            break;
        }
    }
    gpio.write(pin, Level::Low)
}
