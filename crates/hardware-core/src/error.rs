//! Error types for the hardware layer

use thiserror::Error;

/// Result type for hardware operations
pub type HardwareResult<T> = Result<T, HardwareError>;

/// Errors raised by GPIO backends, the bridge and the ringer
#[derive(Debug, Error)]
pub enum HardwareError {
    /// The GPIO peripheral could not be acquired
    #[error("GPIO unavailable: {message}")]
    Unavailable { message: String },

    /// A pin was used before being configured
    #[error("Pin {pin} is not configured as {expected}")]
    PinNotConfigured { pin: u8, expected: &'static str },

    /// Backend-specific failure
    #[error("GPIO error on pin {pin}: {message}")]
    Gpio { pin: u8, message: String },

    /// The ringer task panicked or was aborted
    #[error("Ringer task failed: {message}")]
    RingerTask { message: String },
}

impl HardwareError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a backend error for `pin`
    pub fn gpio(pin: u8, message: impl Into<String>) -> Self {
        Self::Gpio {
            pin,
            message: message.into(),
        }
    }
}
