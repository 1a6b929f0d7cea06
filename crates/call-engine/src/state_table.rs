//! The transition table of the telephone
//!
//! Every legal move is one [`Rule`]. [`transition`] picks the first rule that
//! matches the current state and event and whose guard holds. Events with no
//! matching rule are not transitions at all.

use crate::types::{CallState, DialingProgress, PhoneEvent};
use serde::Deserialize;
use std::fmt::Write;

/// Side effects of a transition, applied in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StartRinger,
    StopRinger,
    AcceptCall,
    ResetPulses,
    CountPulse,
    AppendDigit,
    /// Look the number up and dial it if known
    PlaceCall,
    ClearNumber,
    HangUpAll,
}

impl Action {
    pub fn describe(&self) -> &'static str {
        match self {
            Action::StartRinger => "start ringer",
            Action::StopRinger => "stop ringer",
            Action::AcceptCall => "accept call",
            Action::ResetPulses => "reset pulses",
            Action::CountPulse => "count pulse",
            Action::AppendDigit => "append digit",
            Action::PlaceCall => "place call",
            Action::ClearNumber => "clear number",
            Action::HangUpAll => "hang up",
        }
    }
}

/// Rules for when a dialed number is complete
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DialPolicy {
    pub number_length: usize,
    /// Numbers starting with `0` never complete
    pub reserve_zero_prefix: bool,
}

impl Default for DialPolicy {
    fn default() -> Self {
        Self {
            number_length: fetap_dial_core::NUMBER_LENGTH,
            reserve_zero_prefix: false,
        }
    }
}

impl DialPolicy {
    /// Whether appending the pending digit completes the number
    pub fn completes(&self, progress: &DialingProgress) -> bool {
        if progress.len_with_pending() < self.number_length {
            return false;
        }
        !(self.reserve_zero_prefix && progress.first_digit_with_pending() == Some(0))
    }
}

/// Predicate a rule needs in addition to state and event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    NumberIncomplete,
    NumberComplete,
    CallPlaced,
    NoCallPlaced,
}

impl Guard {
    pub fn holds(&self, progress: &DialingProgress, policy: &DialPolicy) -> bool {
        match self {
            Guard::NumberIncomplete => !policy.completes(progress),
            Guard::NumberComplete => policy.completes(progress),
            Guard::CallPlaced => progress.call_placed(),
            Guard::NoCallPlaced => !progress.call_placed(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Guard::NumberIncomplete => "number incomplete",
            Guard::NumberComplete => "number complete",
            Guard::CallPlaced => "call placed",
            Guard::NoCallPlaced => "no call placed",
        }
    }
}

/// One row of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub from: CallState,
    pub event: PhoneEvent,
    pub guard: Option<Guard>,
    pub to: CallState,
    pub actions: &'static [Action],
}

/// Outcome of a legal event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub to: CallState,
    pub actions: Vec<Action>,
}

const fn rule(
    from: CallState,
    event: PhoneEvent,
    guard: Option<Guard>,
    to: CallState,
    actions: &'static [Action],
) -> Rule {
    Rule {
        from,
        event,
        guard,
        to,
        actions,
    }
}

use Action::*;
use CallState::*;
use PhoneEvent::*;

static RULES: &[Rule] = &[
    rule(Idle, ReceiverUp, None, AwaitingDialInput, &[]),
    rule(Ringing, ReceiverUp, None, InCall, &[StopRinger, AcceptCall]),
    rule(AwaitingDialInput, DialActivate, None, DialActive, &[ResetPulses]),
    rule(DialActive, DialPulse, None, DialActive, &[CountPulse]),
    rule(
        DialActive,
        DialDeactivate,
        Some(Guard::NumberIncomplete),
        AwaitingDialInput,
        &[AppendDigit],
    ),
    rule(
        DialActive,
        DialDeactivate,
        Some(Guard::NumberComplete),
        Connecting,
        &[AppendDigit, PlaceCall],
    ),
    rule(Connecting, CallConnected, None, InCall, &[]),
    rule(InCall, ReceiverDown, None, Idle, &[ClearNumber, HangUpAll]),
    rule(AwaitingDialInput, ReceiverDown, None, Idle, &[ClearNumber]),
    rule(
        Connecting,
        ReceiverDown,
        Some(Guard::CallPlaced),
        Idle,
        &[ClearNumber, HangUpAll],
    ),
    rule(
        Connecting,
        ReceiverDown,
        Some(Guard::NoCallPlaced),
        Idle,
        &[ClearNumber],
    ),
    rule(DialActive, ReceiverDown, None, Idle, &[ClearNumber]),
    rule(Disconnected, ReceiverDown, None, Idle, &[ClearNumber]),
    rule(InCall, CounterPartyHangUp, None, Disconnected, &[]),
    rule(Connecting, CounterPartyHangUp, None, Disconnected, &[]),
    rule(Idle, IncomingCall, None, Ringing, &[StartRinger]),
    rule(Ringing, CounterPartyHangUp, None, Idle, &[StopRinger]),
];

/// Resolve `event` in `state`, `None` when it is not a legal transition
pub fn transition(
    state: CallState,
    event: PhoneEvent,
    progress: &DialingProgress,
    policy: &DialPolicy,
) -> Option<Transition> {
    RULES
        .iter()
        .find(|rule| {
            rule.from == state
                && rule.event == event
                && rule.guard.map_or(true, |g| g.holds(progress, policy))
        })
        .map(|rule| Transition {
            to: rule.to,
            actions: rule.actions.to_vec(),
        })
}

/// Every rule of the table
pub fn transition_table() -> &'static [Rule] {
    RULES
}

/// Render the table as a Graphviz digraph
pub fn render_dot() -> String {
    let mut dot = String::from("digraph fetap {\n    rankdir=LR;\n    node [shape=box];\n");
    for state in CallState::ALL {
        let _ = writeln!(dot, "    \"{}\";", state);
    }
    for rule in RULES {
        let mut label = rule.event.to_string();
        if let Some(guard) = rule.guard {
            let _ = write!(label, " [{}]", guard.describe());
        }
        if !rule.actions.is_empty() {
            let actions: Vec<&str> = rule.actions.iter().map(Action::describe).collect();
            let _ = write!(label, "\\n/ {}", actions.join(", "));
        }
        let _ = writeln!(
            dot,
            "    \"{}\" -> \"{}\" [label=\"{}\"];",
            rule.from, rule.to, label
        );
    }
    dot.push_str("}\n");
    dot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialed(digits: usize, pending: bool) -> DialingProgress {
        let mut progress = DialingProgress::new();
        for _ in 0..digits {
            progress.count_pulse();
            progress.append_digit();
        }
        if pending {
            progress.count_pulse();
        }
        progress
    }

    fn step(state: CallState, event: PhoneEvent) -> Option<Transition> {
        transition(state, event, &DialingProgress::new(), &DialPolicy::default())
    }

    #[test]
    fn unguarded_rows() {
        let cases = [
            (Idle, ReceiverUp, AwaitingDialInput, vec![]),
            (Ringing, ReceiverUp, InCall, vec![StopRinger, AcceptCall]),
            (AwaitingDialInput, DialActivate, DialActive, vec![ResetPulses]),
            (DialActive, DialPulse, DialActive, vec![CountPulse]),
            (Connecting, CallConnected, InCall, vec![]),
            (InCall, ReceiverDown, Idle, vec![ClearNumber, HangUpAll]),
            (AwaitingDialInput, ReceiverDown, Idle, vec![ClearNumber]),
            (DialActive, ReceiverDown, Idle, vec![ClearNumber]),
            (Disconnected, ReceiverDown, Idle, vec![ClearNumber]),
            (InCall, CounterPartyHangUp, Disconnected, vec![]),
            (Connecting, CounterPartyHangUp, Disconnected, vec![]),
            (Idle, IncomingCall, Ringing, vec![StartRinger]),
            (Ringing, CounterPartyHangUp, Idle, vec![StopRinger]),
        ];

        for (from, event, to, actions) in cases {
            assert_eq!(
                step(from, event),
                Some(Transition { to, actions }),
                "{from} on {event}"
            );
        }
    }

    #[test]
    fn deactivation_with_incomplete_number_awaits_more_digits() {
        let progress = dialed(5, true);
        let t = transition(DialActive, DialDeactivate, &progress, &DialPolicy::default()).unwrap();
        assert_eq!(t.to, AwaitingDialInput);
        assert_eq!(t.actions, vec![AppendDigit]);
    }

    #[test]
    fn deactivation_completing_the_number_connects() {
        let progress = dialed(6, true);
        let t = transition(DialActive, DialDeactivate, &progress, &DialPolicy::default()).unwrap();
        assert_eq!(t.to, Connecting);
        assert_eq!(t.actions, vec![AppendDigit, PlaceCall]);
    }

    #[test]
    fn deactivation_without_pulse_does_not_complete() {
        let progress = dialed(6, false);
        let t = transition(DialActive, DialDeactivate, &progress, &DialPolicy::default()).unwrap();
        assert_eq!(t.to, AwaitingDialInput);
    }

    #[test]
    fn hangup_after_placing_a_call_hangs_up() {
        let policy = DialPolicy::default();
        let mut progress = dialed(7, false);
        assert_eq!(
            transition(Connecting, ReceiverDown, &progress, &policy)
                .unwrap()
                .actions,
            vec![ClearNumber]
        );

        progress.mark_call_placed();
        assert_eq!(
            transition(Connecting, ReceiverDown, &progress, &policy)
                .unwrap()
                .actions,
            vec![ClearNumber, HangUpAll]
        );
    }

    #[test]
    fn zero_prefix_can_be_reserved() {
        let policy = DialPolicy {
            number_length: 2,
            reserve_zero_prefix: true,
        };
        let mut progress = DialingProgress::new();
        for _ in 0..10 {
            progress.count_pulse();
        }
        progress.append_digit();
        progress.count_pulse();

        assert!(!policy.completes(&progress));
        assert!(DialPolicy {
            reserve_zero_prefix: false,
            ..policy.clone()
        }
        .completes(&progress));
    }

    #[test]
    fn illegal_events_have_no_transition() {
        assert_eq!(step(DialActive, IncomingCall), None);
        assert_eq!(step(Idle, ReceiverDown), None);
        assert_eq!(step(InCall, DialPulse), None);
        assert_eq!(step(Disconnected, CallConnected), None);
        assert_eq!(step(Ringing, DialActivate), None);
    }

    #[test]
    fn every_legal_pair_is_in_the_table() {
        let policy = DialPolicy::default();
        let samples = [dialed(0, true), dialed(6, true), {
            let mut p = dialed(7, false);
            p.mark_call_placed();
            p
        }];

        for state in CallState::ALL {
            for event in PhoneEvent::ALL {
                let legal = samples
                    .iter()
                    .any(|p| transition(state, event, p, &policy).is_some());
                let listed = transition_table()
                    .iter()
                    .any(|r| r.from == state && r.event == event);
                assert_eq!(legal, listed, "{state} on {event}");
            }
        }
    }

    #[test]
    fn dot_lists_every_rule() {
        let dot = render_dot();
        assert!(dot.starts_with("digraph fetap {"));
        assert!(dot.contains(
            "\"DialActive\" -> \"Connecting\" [label=\"DialDeactivate [number complete]\\n/ append digit, place call\"];"
        ));
        assert_eq!(dot.matches(" -> ").count(), transition_table().len());
    }
}
