//! Phone numbers and the pulse trains that dial them
//!
//! A rotary dial encodes digit `n` as `n` pulses, except `0` which takes ten.
//! [`PhoneNumber`] is what the phone book stores, [`PulseCounts`] is what the
//! hardware actually observed.

use crate::error::{DialError, DialResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits in every number of the numbering plan
pub const NUMBER_LENGTH: usize = 7;

/// Pulses produced by dialing `0`
pub const PULSES_FOR_ZERO: u32 = 10;

/// Pulses counted per digit position of one dialed number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PulseCounts([u32; NUMBER_LENGTH]);

impl PulseCounts {
    /// Build from exactly [`NUMBER_LENGTH`] non-negative counts
    pub fn new<I>(counts: I) -> DialResult<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let values: Vec<i64> = counts.into_iter().collect();
        if values.len() != NUMBER_LENGTH {
            return Err(DialError::InvalidLength {
                expected: NUMBER_LENGTH,
                actual: values.len(),
            });
        }

        let mut out = [0u32; NUMBER_LENGTH];
        for (position, value) in values.into_iter().enumerate() {
            if value < 0 {
                return Err(DialError::NegativePulseCount { position, value });
            }
            out[position] = u32::try_from(value)
                .map_err(|_| DialError::PulseCountTooLarge { position, value })?;
        }
        Ok(Self(out))
    }

    pub fn as_array(&self) -> &[u32; NUMBER_LENGTH] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

/// A complete number in the numbering plan, digits `0..=9`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber([u8; NUMBER_LENGTH]);

impl PhoneNumber {
    /// Build from exactly [`NUMBER_LENGTH`] digits in `0..=9`
    pub fn new<I>(digits: I) -> DialResult<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let values: Vec<i64> = digits.into_iter().collect();
        if values.len() != NUMBER_LENGTH {
            return Err(DialError::InvalidLength {
                expected: NUMBER_LENGTH,
                actual: values.len(),
            });
        }

        let mut out = [0u8; NUMBER_LENGTH];
        for (position, value) in values.into_iter().enumerate() {
            if !(0..=9).contains(&value) {
                return Err(DialError::DigitOutOfRange { position, value });
            }
            out[position] = value as u8;
        }
        Ok(Self(out))
    }

    /// Build from already decoded dial digits
    pub fn from_digits(digits: &[u8]) -> DialResult<Self> {
        Self::new(digits.iter().map(|d| i64::from(*d)))
    }

    pub fn digits(&self) -> &[u8; NUMBER_LENGTH] {
        &self.0
    }

    /// The pulse train that dials this number
    pub fn to_pulse_counts(&self) -> PulseCounts {
        let mut counts = [0u32; NUMBER_LENGTH];
        for (count, digit) in counts.iter_mut().zip(self.0.iter()) {
            *count = match digit {
                0 => PULSES_FOR_ZERO,
                d => u32::from(*d),
            };
        }
        PulseCounts(counts)
    }
}

impl FromStr for PhoneNumber {
    type Err = DialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut digits = Vec::with_capacity(NUMBER_LENGTH);
        for (position, character) in s.chars().enumerate() {
            match character.to_digit(10) {
                Some(d) => digits.push(i64::from(d)),
                None => return Err(DialError::InvalidCharacter { position, character }),
            }
        }
        Self::new(digits)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PhoneNumber> for String {
    fn from(number: PhoneNumber) -> Self {
        number.to_string()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in self.0 {
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}
