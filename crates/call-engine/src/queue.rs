//! The event queue feeding the controller
//!
//! GPIO callbacks and the supervisor run on their own threads and tasks. All
//! they do is push onto this queue; the controller is the only consumer.

use crate::types::PhoneEvent;
use fetap_hardware_core::{HardwareEventHandler, HardwareSignal};
use fetap_sip_supervisor::CallEventHandler;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Receiving end consumed by [`CallController::run`](crate::CallController::run)
pub type EventReceiver = mpsc::UnboundedReceiver<PhoneEvent>;

/// Producer handle of the controller's FIFO event queue
#[derive(Debug, Clone)]
pub struct EventQueue {
    sender: mpsc::UnboundedSender<PhoneEvent>,
}

impl EventQueue {
    pub fn channel() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Enqueue `event`, returns `false` once the controller has stopped
    pub fn push(&self, event: PhoneEvent) -> bool {
        trace!("Queueing {}", event);
        match self.sender.send(event) {
            Ok(()) => true,
            Err(_) => {
                debug!("Controller stopped, dropping {}", event);
                false
            }
        }
    }
}

impl HardwareEventHandler for EventQueue {
    fn on_signal(&self, signal: HardwareSignal) {
        self.push(signal.into());
    }
}

impl CallEventHandler for EventQueue {
    fn on_incoming_call(&self) {
        self.push(PhoneEvent::IncomingCall);
    }

    fn on_call_connected(&self) {
        self.push(PhoneEvent::CallConnected);
    }

    fn on_call_hangup(&self) {
        self.push(PhoneEvent::CounterPartyHangUp);
    }
}
