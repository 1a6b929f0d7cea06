//! Fault-tolerant matching of observed pulse trains against known numbers
//!
//! Old dials and worn contacts miscount pulses now and then. Rather than
//! requiring an exact match, the resolver measures how many pulses would have
//! to be miscounted to turn one pulse train into another and accepts every
//! candidate within a threshold.

use crate::number::{PhoneNumber, PulseCounts};

/// Default tolerance, roughly one miscounted pulse per digit
pub const MIN_DISTANCE: u32 = 7;

/// Total number of miscounted pulses separating two pulse trains
///
/// The L1 distance of the two vectors: symmetric, and zero only for identical
/// pulse trains. Saturates at `u32::MAX`.
pub fn signal_distance(left: &PulseCounts, right: &PulseCounts) -> u32 {
    left.iter()
        .zip(right.iter())
        .map(|(l, r)| l.abs_diff(r))
        .fold(0u32, u32::saturating_add)
}

/// Every candidate whose pulse train lies within `threshold` of `observed`
///
/// Results keep candidate order and carry the distance. An empty result means
/// nothing matched.
pub fn find_closest_phone_numbers(
    observed: &PulseCounts,
    candidates: &[PhoneNumber],
    threshold: u32,
) -> Vec<(PhoneNumber, u32)> {
    candidates
        .iter()
        .map(|number| (*number, signal_distance(observed, &number.to_pulse_counts())))
        .filter(|(_, distance)| *distance <= threshold)
        .collect()
}

/// Existing numbers that could be confused with `new_number`
///
/// Used when registering a number: two entries closer than twice the lookup
/// tolerance would make fuzzy lookups ambiguous.
pub fn find_similar_numbers(
    new_number: &PhoneNumber,
    existing: &[PhoneNumber],
    min_distance: u32,
) -> Vec<(PhoneNumber, u32)> {
    find_closest_phone_numbers(
        &new_number.to_pulse_counts(),
        existing,
        min_distance.saturating_mul(2),
    )
}

/// The single best candidate within `threshold`, if one exists and is unambiguous
pub fn resolve_unique(
    observed: &PulseCounts,
    candidates: &[PhoneNumber],
    threshold: u32,
) -> Option<(PhoneNumber, u32)> {
    let matches = find_closest_phone_numbers(observed, candidates, threshold);
    let best = matches.iter().map(|(_, distance)| *distance).min()?;
    let mut closest = matches.into_iter().filter(|(_, distance)| *distance == best);
    let first = closest.next()?;
    match closest.next() {
        Some(_) => None,
        None => Some(first),
    }
}
