//! Pin assignment, debounce windows and ring cadence

use crate::gpio::Edge;
use serde::Deserialize;
use std::time::Duration;

/// Hardware wiring of the phone (BCM numbering)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Hook switch, high while the receiver is lifted
    pub receiver_pin: u8,
    /// Dial-active switch, high while the dial is off its rest
    pub dial_active_pin: u8,
    /// Pulse contact of the dial
    pub dial_pulse_pin: u8,
    /// Ringer driver output
    pub ring_pin: u8,
    pub receiver_debounce_ms: u64,
    pub dial_active_debounce_ms: u64,
    pub dial_pulse_debounce_ms: u64,
    /// Which pulse-contact edge counts as one pulse, depends on wiring polarity
    pub pulse_edge: Edge,
    pub ring: RingPattern,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            receiver_pin: 26,
            dial_active_pin: 22,
            dial_pulse_pin: 27,
            ring_pin: 17,
            receiver_debounce_ms: 50,
            dial_active_debounce_ms: 100,
            dial_pulse_debounce_ms: 40,
            pulse_edge: Edge::Rising,
            ring: RingPattern::default(),
        }
    }
}

impl HardwareConfig {
    pub fn receiver_debounce(&self) -> Duration {
        Duration::from_millis(self.receiver_debounce_ms)
    }

    pub fn dial_active_debounce(&self) -> Duration {
        Duration::from_millis(self.dial_active_debounce_ms)
    }

    pub fn dial_pulse_debounce(&self) -> Duration {
        Duration::from_millis(self.dial_pulse_debounce_ms)
    }

    /// Same wiring with every debounce window disabled
    pub fn without_debounce(mut self) -> Self {
        self.receiver_debounce_ms = 0;
        self.dial_active_debounce_ms = 0;
        self.dial_pulse_debounce_ms = 0;
        self
    }
}

/// Ring cadence
///
/// One group is `repeats` bursts. Each burst toggles the bell coil with
/// `on_ms`/`off_ms` ticks for `burst_ms`, bursts are separated by `pause_ms`
/// and the group is followed by `long_pause_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RingPattern {
    pub on_ms: u64,
    pub off_ms: u64,
    pub burst_ms: u64,
    pub pause_ms: u64,
    pub repeats: u32,
    pub long_pause_ms: u64,
}

impl Default for RingPattern {
    fn default() -> Self {
        Self {
            on_ms: 10,
            off_ms: 10,
            burst_ms: 1_000,
            pause_ms: 1_000,
            repeats: 3,
            long_pause_ms: 4_000,
        }
    }
}

impl RingPattern {
    /// Number of on/off ticks that fill one burst
    pub fn ticks_per_burst(&self) -> u64 {
        let tick = self.on_ms + self.off_ms;
        if tick == 0 {
            return 0;
        }
        self.burst_ms / tick
    }

    pub fn on(&self) -> Duration {
        Duration::from_millis(self.on_ms)
    }

    pub fn off(&self) -> Duration {
        Duration::from_millis(self.off_ms)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn long_pause(&self) -> Duration {
        Duration::from_millis(self.long_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_burst_has_fifty_ticks() {
        assert_eq!(RingPattern::default().ticks_per_burst(), 50);
    }

    #[test]
    fn zero_length_tick_yields_no_ticks() {
        let pattern = RingPattern {
            on_ms: 0,
            off_ms: 0,
            ..Default::default()
        };
        assert_eq!(pattern.ticks_per_burst(), 0);
    }
}
