//! The call controller
//!
//! Owns the call state and the dialing progress. Events are handled strictly
//! one at a time: the transition is resolved from the table, its actions are
//! awaited in order, then the new state is published.

use crate::control::{CallControl, RingerControl};
use crate::error::ControllerResult;
use crate::queue::EventReceiver;
use crate::state_table::{transition, Action, DialPolicy};
use crate::types::{CallState, DialingProgress, PhoneEvent};
use fetap_dial_core::PhoneNumber;
use fetap_phone_book::AddressLookup;
use fetap_sip_supervisor::SupervisorResult;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drives ringer and voice client from telephone events
pub struct CallController {
    state: CallState,
    progress: DialingProgress,
    policy: DialPolicy,
    ringer: Arc<dyn RingerControl>,
    calls: Arc<dyn CallControl>,
    lookup: Arc<dyn AddressLookup>,
    published: watch::Sender<CallState>,
}

impl CallController {
    pub fn new(
        ringer: Arc<dyn RingerControl>,
        calls: Arc<dyn CallControl>,
        lookup: Arc<dyn AddressLookup>,
        policy: DialPolicy,
    ) -> Self {
        let (published, _) = watch::channel(CallState::Idle);
        Self {
            state: CallState::Idle,
            progress: DialingProgress::new(),
            policy,
            ringer,
            calls,
            lookup,
            published,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn dialing(&self) -> &DialingProgress {
        &self.progress
    }

    /// Observe every state change
    pub fn subscribe(&self) -> watch::Receiver<CallState> {
        self.published.subscribe()
    }

    /// Apply one event
    ///
    /// Returns `Ok(false)` when the event is not legal in the current state;
    /// it is then dropped without side effects. Errors come from the
    /// collaborators and are fatal.
    pub async fn handle_event(&mut self, event: PhoneEvent) -> ControllerResult<bool> {
        let Some(next) = transition(self.state, event, &self.progress, &self.policy) else {
            warn!("Discarding {} in state {}", event, self.state);
            return Ok(false);
        };

        debug!("{} --{}--> {}", self.state, event, next.to);
        for action in &next.actions {
            self.apply(*action).await?;
        }

        if next.to != self.state {
            info!("Call state {} -> {}", self.state, next.to);
        }
        self.state = next.to;
        self.published.send_replace(next.to);
        Ok(true)
    }

    /// Process events until every producer is gone or a collaborator fails
    pub async fn run(&mut self, mut events: EventReceiver) -> ControllerResult<()> {
        info!("Call controller running in state {}", self.state);
        while let Some(event) = events.recv().await {
            self.handle_event(event).await?;
        }
        info!("Event queue closed, call controller stopping");
        Ok(())
    }

    async fn apply(&mut self, action: Action) -> ControllerResult<()> {
        match action {
            Action::StartRinger => self.ringer.start_ringing().await?,
            Action::StopRinger => self.ringer.stop_ringing().await?,
            Action::AcceptCall => {
                let result = self.calls.accept_call().await;
                tolerate_timeout(action, result)?;
            }
            Action::ResetPulses => self.progress.reset_pulses(),
            Action::CountPulse => self.progress.count_pulse(),
            Action::AppendDigit => {
                if let Some(digit) = self.progress.append_digit() {
                    debug!("Dialed {}, number so far {:?}", digit, self.progress.digits());
                }
            }
            Action::PlaceCall => self.place_call().await?,
            Action::ClearNumber => self.progress.clear(),
            Action::HangUpAll => {
                let result = self.calls.hangup_all().await;
                tolerate_timeout(action, result)?;
            }
        }
        Ok(())
    }

    async fn place_call(&mut self) -> ControllerResult<()> {
        let number = match PhoneNumber::from_digits(self.progress.digits()) {
            Ok(number) => number,
            Err(e) => {
                warn!("Dialed digits {:?} are not a number: {}", self.progress.digits(), e);
                return Ok(());
            }
        };

        // The lookup takes a file lock and reads from disk
        let lookup = Arc::clone(&self.lookup);
        let found = tokio::task::spawn_blocking(move || lookup.get_address(&number)).await?;
        let Some(address) = found? else {
            info!("No phone book entry for {}", number);
            return Ok(());
        };

        info!("Dialing {} ({})", number, address);
        self.progress.mark_call_placed();
        let result = self.calls.call(&address).await;
        tolerate_timeout(Action::PlaceCall, result)
    }
}

/// Command timeouts leave the call alone, the next poll shows what happened
fn tolerate_timeout(action: Action, result: SupervisorResult<()>) -> ControllerResult<()> {
    match result {
        Err(e) if !e.is_fatal() => {
            warn!("{} did not complete: {}", action.describe(), e);
            Ok(())
        }
        other => Ok(other?),
    }
}
