//! `fetap hardware-test`: check the wiring
//!
//! Rings one ring group so the bell can be heard, then decodes the dial and
//! prints every digit until interrupted.

use crate::config::FetapConfig;
use crate::shutdown;
use anyhow::Context;
use fetap_call_engine::DialingProgress;
use fetap_hardware_core::{HardwareBridge, HardwareEventHandler, HardwareSignal};
use std::sync::Arc;
use tokio::sync::mpsc;

struct SignalSink(mpsc::UnboundedSender<HardwareSignal>);

impl HardwareEventHandler for SignalSink {
    fn on_signal(&self, signal: HardwareSignal) {
        let _ = self.0.send(signal);
    }
}

pub async fn execute(config: FetapConfig) -> anyhow::Result<()> {
    let gpio = super::open_gpio()?;
    let bridge = HardwareBridge::new(gpio, config.hardware);
    let (sender, mut signals) = mpsc::unbounded_channel();
    bridge
        .setup(Arc::new(SignalSink(sender)))
        .context("Failed to set up GPIO")?;

    println!("Ringing once...");
    bridge.ringer().ring_once().await.context("Ringer failed")?;
    println!("Dial some digits, Ctrl-C to stop");

    let mut progress = DialingProgress::new();
    let mut interrupted = std::pin::pin!(shutdown::signal());
    loop {
        tokio::select! {
            _ = &mut interrupted => break,
            signal = signals.recv() => match signal {
                Some(HardwareSignal::DialActivate) => progress.reset_pulses(),
                Some(HardwareSignal::DialPulse) => progress.count_pulse(),
                Some(HardwareSignal::DialDeactivate) => {
                    if let Some(digit) = progress.append_digit() {
                        println!("{}", digit);
                    }
                }
                Some(HardwareSignal::ReceiverUp) => println!("Receiver lifted"),
                Some(HardwareSignal::ReceiverDown) => println!("Receiver down"),
                None => break,
            },
        }
    }

    bridge.cleanup().await.context("GPIO cleanup failed")?;
    Ok(())
}
