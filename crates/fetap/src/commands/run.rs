//! `fetap run`: the telephone daemon

use crate::config::FetapConfig;
use crate::{shutdown, simulate};
use anyhow::Context;
use fetap_call_engine::{CallController, EventQueue};
use fetap_hardware_core::{Gpio, HardwareBridge, SimulatedGpio};
use fetap_phone_book::PhoneBook;
use fetap_sip_supervisor::{SipSupervisor, TokioLauncher};
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn execute(config: FetapConfig, simulate: bool) -> anyhow::Result<()> {
    let simulated = simulate.then(|| Arc::new(SimulatedGpio::new()));
    let gpio: Arc<dyn Gpio> = match &simulated {
        Some(gpio) => gpio.clone() as Arc<dyn Gpio>,
        None => super::open_gpio()?,
    };

    let phone_book = PhoneBook::from_config(&config.phone_book).with_context(|| {
        format!(
            "Failed to open phone book {}",
            config.phone_book.path.display()
        )
    })?;
    info!("Phone book at {}", phone_book.path().display());

    let (queue, events) = EventQueue::channel();

    let bridge = HardwareBridge::new(gpio, config.hardware.clone());
    bridge
        .setup(Arc::new(queue.clone()))
        .context("Failed to set up GPIO")?;

    let supervisor = match SipSupervisor::start(
        config.sip.clone(),
        &TokioLauncher,
        Arc::new(queue.clone()),
    )
    .await
    {
        Ok(supervisor) => Arc::new(supervisor),
        Err(e) => {
            release(&bridge).await;
            return Err(e).context("Failed to start voice client");
        }
    };

    let mut controller = CallController::new(
        bridge.ringer(),
        supervisor.clone(),
        Arc::new(phone_book),
        config.dialing.clone(),
    );

    let script = simulated.map(|gpio| {
        info!("Simulating hardware, reading commands from stdin");
        tokio::spawn(simulate::drive(
            gpio,
            queue.clone(),
            config.hardware.clone(),
            tokio::io::stdin(),
        ))
    });

    let outcome = tokio::select! {
        result = controller.run(events) => result.context("Call controller stopped"),
        result = supervisor.wait() => result.context("Voice client stopped"),
        _ = shutdown::signal() => Ok(()),
    };

    if let Err(ref e) = outcome {
        error!("{:#}", e);
    }
    info!("Shutting down in state {}", controller.state());

    if let Some(script) = script {
        script.abort();
    }
    release(&bridge).await;
    if let Err(e) = supervisor.stop().await {
        warn!("Voice client did not stop cleanly: {}", e);
    }

    outcome
}

async fn release(bridge: &HardwareBridge) {
    if let Err(e) = bridge.cleanup().await {
        warn!("GPIO cleanup failed: {}", e);
    }
}
