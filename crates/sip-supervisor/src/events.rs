//! Call event notifications

/// Receives call state changes inferred from the voice client
///
/// Invoked from the supervising task. Implementations should only record or
/// forward the event.
pub trait CallEventHandler: Send + Sync + 'static {
    /// A new inbound call is ringing
    fn on_incoming_call(&self);

    /// A call has been confirmed by both sides
    fn on_call_connected(&self);

    /// The last call ended or an attempt was abandoned
    fn on_call_hangup(&self);
}

/// Handler that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallEventHandler;

impl CallEventHandler for NoopCallEventHandler {
    fn on_incoming_call(&self) {}
    fn on_call_connected(&self) {}
    fn on_call_hangup(&self) {}
}
