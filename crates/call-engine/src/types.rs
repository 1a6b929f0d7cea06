//! States, events and dialing progress of the telephone

use fetap_hardware_core::HardwareSignal;
use std::fmt;

/// Where the telephone is in its call lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallState {
    /// Receiver on hook, nothing happening
    #[default]
    Idle,
    /// Inbound call, bell ringing
    Ringing,
    /// Receiver lifted, waiting for the dial to move
    AwaitingDialInput,
    /// Dial is returning, pulses are being counted
    DialActive,
    /// Number complete, call being set up
    Connecting,
    InCall,
    /// Remote side hung up, receiver still lifted
    Disconnected,
}

impl CallState {
    pub const ALL: [CallState; 7] = [
        CallState::Idle,
        CallState::Ringing,
        CallState::AwaitingDialInput,
        CallState::DialActive,
        CallState::Connecting,
        CallState::InCall,
        CallState::Disconnected,
    ];
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything that can happen to the telephone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhoneEvent {
    ReceiverUp,
    ReceiverDown,
    DialActivate,
    DialDeactivate,
    DialPulse,
    IncomingCall,
    CallConnected,
    CounterPartyHangUp,
}

impl PhoneEvent {
    pub const ALL: [PhoneEvent; 8] = [
        PhoneEvent::ReceiverUp,
        PhoneEvent::ReceiverDown,
        PhoneEvent::DialActivate,
        PhoneEvent::DialDeactivate,
        PhoneEvent::DialPulse,
        PhoneEvent::IncomingCall,
        PhoneEvent::CallConnected,
        PhoneEvent::CounterPartyHangUp,
    ];
}

impl fmt::Display for PhoneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<HardwareSignal> for PhoneEvent {
    fn from(signal: HardwareSignal) -> Self {
        match signal {
            HardwareSignal::ReceiverUp => PhoneEvent::ReceiverUp,
            HardwareSignal::ReceiverDown => PhoneEvent::ReceiverDown,
            HardwareSignal::DialActivate => PhoneEvent::DialActivate,
            HardwareSignal::DialDeactivate => PhoneEvent::DialDeactivate,
            HardwareSignal::DialPulse => PhoneEvent::DialPulse,
        }
    }
}

/// Digits dialed so far plus the pulses of the digit in progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialingProgress {
    /// `None` until the first pulse of the current digit
    pulses: Option<u8>,
    digits: Vec<u8>,
    call_placed: bool,
}

impl DialingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Digit the current pulse count decodes to, if any pulse was seen
    pub fn pending_digit(&self) -> Option<u8> {
        self.pulses
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Whether a call was placed for the dialed number
    pub fn call_placed(&self) -> bool {
        self.call_placed
    }

    /// Length of the number once the pending digit is appended
    pub fn len_with_pending(&self) -> usize {
        self.digits.len() + usize::from(self.pulses.is_some())
    }

    /// First digit of the number once the pending digit is appended
    pub fn first_digit_with_pending(&self) -> Option<u8> {
        self.digits.first().copied().or(self.pulses)
    }

    pub fn reset_pulses(&mut self) {
        self.pulses = None;
    }

    /// Ten pulses dial `0`
    pub fn count_pulse(&mut self) {
        self.pulses = Some(self.pulses.map_or(1, |p| (p + 1) % 10));
    }

    /// Move the pending digit onto the number
    pub fn append_digit(&mut self) -> Option<u8> {
        let digit = self.pulses.take()?;
        self.digits.push(digit);
        Some(digit)
    }

    pub(crate) fn mark_call_placed(&mut self) {
        self.call_placed = true;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
