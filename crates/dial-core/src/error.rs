//! Error types for number construction

use thiserror::Error;

/// Result type for dial-core operations
pub type DialResult<T> = Result<T, DialError>;

/// Validation failures when building a [`crate::PhoneNumber`] or [`crate::PulseCounts`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialError {
    /// Wrong number of entries
    #[error("Phone numbers must have exactly {expected} digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A pulse count below zero
    #[error("All pulse counts must be >= 0, got {value} at position {position}")]
    NegativePulseCount { position: usize, value: i64 },

    /// A pulse count no dial could produce
    #[error("Pulse count {value} at position {position} is out of range")]
    PulseCountTooLarge { position: usize, value: i64 },

    /// A digit outside 0..=9
    #[error("All digits must be in the range 0 to 9, got {value} at position {position}")]
    DigitOutOfRange { position: usize, value: i64 },

    /// A character that is not a decimal digit
    #[error("Invalid digit character {character:?} at position {position}")]
    InvalidCharacter { position: usize, character: char },
}
