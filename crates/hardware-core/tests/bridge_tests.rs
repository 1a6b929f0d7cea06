use fetap_hardware_core::{
    HardwareBridge, HardwareConfig, HardwareError, HardwareEventHandler, HardwareSignal, Level,
    Pull, SimulatedGpio,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingHandler {
    signals: Mutex<Vec<HardwareSignal>>,
}

impl RecordingHandler {
    fn take(&self) -> Vec<HardwareSignal> {
        std::mem::take(&mut *self.signals.lock().unwrap())
    }
}

impl HardwareEventHandler for RecordingHandler {
    fn on_signal(&self, signal: HardwareSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

fn setup(config: HardwareConfig) -> (Arc<SimulatedGpio>, HardwareBridge, Arc<RecordingHandler>) {
    let gpio = Arc::new(SimulatedGpio::new());
    let bridge = HardwareBridge::new(gpio.clone(), config);
    let handler = Arc::new(RecordingHandler::default());
    bridge.setup(handler.clone()).unwrap();
    (gpio, bridge, handler)
}

#[test]
fn setup_pulls_inputs_down_and_silences_ringer() {
    let config = HardwareConfig::default();
    let (gpio, _bridge, _handler) = setup(config.clone());

    assert_eq!(gpio.pull(config.receiver_pin), Some(Pull::Down));
    assert_eq!(gpio.pull(config.dial_active_pin), Some(Pull::Down));
    assert_eq!(gpio.pull(config.dial_pulse_pin), Some(Pull::Down));
    assert_eq!(gpio.output_level(config.ring_pin), Some(Level::Low));
}

#[test]
fn receiver_level_selects_event() {
    let config = HardwareConfig::default().without_debounce();
    let (gpio, _bridge, handler) = setup(config.clone());

    gpio.set_input(config.receiver_pin, Level::High).unwrap();
    gpio.set_input(config.receiver_pin, Level::Low).unwrap();

    assert_eq!(
        handler.take(),
        vec![HardwareSignal::ReceiverUp, HardwareSignal::ReceiverDown]
    );
}

#[test]
fn dial_rotation_emits_activation_and_pulses() {
    let config = HardwareConfig::default().without_debounce();
    let (gpio, _bridge, handler) = setup(config.clone());

    gpio.set_input(config.dial_active_pin, Level::High).unwrap();
    for _ in 0..3 {
        gpio.pulse(config.dial_pulse_pin).unwrap();
    }
    gpio.set_input(config.dial_active_pin, Level::Low).unwrap();

    assert_eq!(
        handler.take(),
        vec![
            HardwareSignal::DialActivate,
            HardwareSignal::DialPulse,
            HardwareSignal::DialPulse,
            HardwareSignal::DialPulse,
            HardwareSignal::DialDeactivate,
        ]
    );
}

#[test]
fn falling_edge_wiring_counts_on_release() {
    let mut config = HardwareConfig::default().without_debounce();
    config.pulse_edge = fetap_hardware_core::Edge::Falling;
    let (gpio, _bridge, handler) = setup(config.clone());

    gpio.set_input(config.dial_pulse_pin, Level::High).unwrap();
    assert!(handler.take().is_empty());
    gpio.set_input(config.dial_pulse_pin, Level::Low).unwrap();
    assert_eq!(handler.take(), vec![HardwareSignal::DialPulse]);
}

#[test]
fn contact_bounce_is_collapsed() {
    let mut config = HardwareConfig::default();
    config.dial_pulse_debounce_ms = 40;
    let (gpio, _bridge, handler) = setup(config.clone());

    // three bounces of the same make
    for _ in 0..3 {
        gpio.pulse(config.dial_pulse_pin).unwrap();
    }
    assert_eq!(handler.take(), vec![HardwareSignal::DialPulse]);

    std::thread::sleep(Duration::from_millis(60));
    gpio.pulse(config.dial_pulse_pin).unwrap();
    assert_eq!(handler.take(), vec![HardwareSignal::DialPulse]);
}

#[test]
fn unavailable_gpio_fails_setup() {
    let gpio = Arc::new(SimulatedGpio::unavailable());
    let bridge = HardwareBridge::new(gpio, HardwareConfig::default());
    let handler = Arc::new(RecordingHandler::default());

    assert!(matches!(
        bridge.setup(handler),
        Err(HardwareError::Unavailable { .. })
    ));
}

#[tokio::test]
async fn cleanup_releases_pins() {
    let (gpio, bridge, _handler) = setup(HardwareConfig::default());

    bridge.cleanup().await.unwrap();

    assert!(gpio.is_released());
}
