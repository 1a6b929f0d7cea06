//! Collaborators the controller drives

use async_trait::async_trait;
use fetap_hardware_core::{HardwareResult, Ringer};
use fetap_sip_supervisor::{SipSupervisor, SupervisorResult};

/// The bell
#[async_trait]
pub trait RingerControl: Send + Sync {
    async fn start_ringing(&self) -> HardwareResult<()>;

    /// Returns once the bell is silent
    async fn stop_ringing(&self) -> HardwareResult<()>;
}

/// The voice client
#[async_trait]
pub trait CallControl: Send + Sync {
    /// Dial a SIP address without scheme
    async fn call(&self, address: &str) -> SupervisorResult<()>;

    async fn accept_call(&self) -> SupervisorResult<()>;

    async fn hangup_all(&self) -> SupervisorResult<()>;
}

#[async_trait]
impl RingerControl for Ringer {
    async fn start_ringing(&self) -> HardwareResult<()> {
        Ringer::start_ringing(self)
    }

    async fn stop_ringing(&self) -> HardwareResult<()> {
        Ringer::stop_ringing(self).await
    }
}

#[async_trait]
impl CallControl for SipSupervisor {
    async fn call(&self, address: &str) -> SupervisorResult<()> {
        SipSupervisor::call(self, address).await.map(drop)
    }

    async fn accept_call(&self) -> SupervisorResult<()> {
        SipSupervisor::accept_call(self).await.map(drop)
    }

    async fn hangup_all(&self) -> SupervisorResult<()> {
        SipSupervisor::hangup_all(self).await.map(drop)
    }
}
