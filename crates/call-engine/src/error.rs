//! Error types for the call controller

use fetap_hardware_core::HardwareError;
use fetap_phone_book::PhoneBookError;
use fetap_sip_supervisor::SupervisorError;
use thiserror::Error;
use tokio::task::JoinError;

/// Result type for controller operations
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Collaborator failures that stop the controller
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Ringer failed: {0}")]
    Ringer(#[from] HardwareError),

    #[error("Voice client failed: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Phone book failed: {0}")]
    PhoneBook(#[from] PhoneBookError),

    #[error("Phone book lookup did not complete: {0}")]
    LookupTask(#[from] JoinError),
}
