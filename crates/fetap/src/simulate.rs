//! Scripted hardware for running without a telephone attached
//!
//! Each input line is one command:
//!
//! ```text
//! up            lift the receiver
//! down          hang up
//! dial 5551234  turn the dial once per digit
//! ring          simulate an inbound call
//! ```
//!
//! Edges are spaced past the configured debounce windows so the bridge sees
//! them exactly like real contacts.

use anyhow::{bail, Context};
use fetap_call_engine::{EventQueue, PhoneEvent};
use fetap_hardware_core::{HardwareConfig, Level, SimulatedGpio};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

/// Extra delay after each edge on top of its debounce window
const SETTLE_MARGIN: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCommand {
    Up,
    Down,
    Dial(Vec<u8>),
    Ring,
}

impl FromStr for SimCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = match words.next() {
            Some("up") => SimCommand::Up,
            Some("down") => SimCommand::Down,
            Some("ring") => SimCommand::Ring,
            Some("dial") => {
                let digits = words.next().context("`dial` needs digits")?;
                let digits = digits
                    .chars()
                    .map(|c| c.to_digit(10).map(|d| d as u8))
                    .collect::<Option<Vec<u8>>>()
                    .with_context(|| format!("Not a digit sequence: {:?}", digits))?;
                SimCommand::Dial(digits)
            }
            Some(other) => bail!("Unknown command {:?}", other),
            None => bail!("Empty command"),
        };
        if let Some(extra) = words.next() {
            bail!("Unexpected argument {:?}", extra);
        }
        Ok(command)
    }
}

/// Feed commands from `input` into the simulated pins until it ends
pub async fn drive<R>(
    gpio: Arc<SimulatedGpio>,
    queue: EventQueue,
    hardware: HardwareConfig,
    input: R,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<SimCommand>() {
            Ok(command) => perform(&gpio, &queue, &hardware, command).await?,
            Err(e) => warn!("Ignoring {:?}: {}", line, e),
        }
    }
    debug!("Simulation input ended");
    Ok(())
}

async fn perform(
    gpio: &SimulatedGpio,
    queue: &EventQueue,
    hardware: &HardwareConfig,
    command: SimCommand,
) -> anyhow::Result<()> {
    debug!("Simulating {:?}", command);
    match command {
        SimCommand::Up => {
            gpio.set_input(hardware.receiver_pin, Level::High)?;
            settle(hardware.receiver_debounce()).await;
        }
        SimCommand::Down => {
            gpio.set_input(hardware.receiver_pin, Level::Low)?;
            settle(hardware.receiver_debounce()).await;
        }
        SimCommand::Ring => {
            queue.push(PhoneEvent::IncomingCall);
        }
        SimCommand::Dial(digits) => {
            for digit in digits {
                let pulses = if digit == 0 { 10 } else { digit };
                gpio.set_input(hardware.dial_active_pin, Level::High)?;
                settle(hardware.dial_active_debounce()).await;
                for _ in 0..pulses {
                    gpio.pulse(hardware.dial_pulse_pin)?;
                    settle(hardware.dial_pulse_debounce()).await;
                }
                gpio.set_input(hardware.dial_active_pin, Level::Low)?;
                settle(hardware.dial_active_debounce()).await;
            }
        }
    }
    Ok(())
}

async fn settle(debounce: Duration) {
    tokio::time::sleep(debounce + SETTLE_MARGIN).await;
}
