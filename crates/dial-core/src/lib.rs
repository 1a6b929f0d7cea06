//! # FETAP dial core
//!
//! The number model of the rotary phone. A dialed digit is only ever seen as
//! a count of pulses, so every number can be viewed two ways:
//!
//! ```text
//!   PhoneNumber "0987654"  ──to_pulse_counts──▶  PulseCounts [10, 9, 8, 7, 6, 5, 4]
//! ```
//!
//! The [`resolver`] compares pulse trains with an L1 metric so a number can be
//! found even when a few pulses were miscounted.
//!
//! ```rust
//! use fetap_dial_core::{find_closest_phone_numbers, PhoneNumber, PulseCounts, MIN_DISTANCE};
//!
//! let book: Vec<PhoneNumber> = vec!["5555555".parse().unwrap(), "0000000".parse().unwrap()];
//! let observed = PulseCounts::new([5, 5, 5, 5, 6, 5, 4]).unwrap();
//!
//! let matches = find_closest_phone_numbers(&observed, &book, MIN_DISTANCE);
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].0.to_string(), "5555555");
//! ```

pub mod error;
pub mod number;
pub mod resolver;

pub use error::{DialError, DialResult};
pub use number::{PhoneNumber, PulseCounts, NUMBER_LENGTH, PULSES_FOR_ZERO};
pub use resolver::{
    find_closest_phone_numbers, find_similar_numbers, resolve_unique, signal_distance,
    MIN_DISTANCE,
};
