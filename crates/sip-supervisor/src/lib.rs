//! # fetap-sip-supervisor
//!
//! Drives a `pjsua` child process through its interactive command shell and
//! turns its textual output into call events.
//!
//! Commands from any task are serialized through one supervising task, which
//! also polls `call list` to infer whether a call is ringing, being set up or
//! connected. Changes are reported to a [`CallEventHandler`].
//!
//! ```no_run
//! use fetap_sip_supervisor::{NoopCallEventHandler, SipSupervisor, SupervisorConfig, TokioLauncher};
//! use std::sync::Arc;
//!
//! # async fn example() -> fetap_sip_supervisor::SupervisorResult<()> {
//! let supervisor = SipSupervisor::start(
//!     SupervisorConfig::default(),
//!     &TokioLauncher,
//!     Arc::new(NoopCallEventHandler),
//! )
//! .await?;
//! supervisor.call("alice@example.org").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod process;
pub mod protocol;
pub mod provision;
pub mod supervisor;

pub use config::{SupervisorConfig, DEFAULT_DOWNLOAD_URL};
pub use error::{SupervisorError, SupervisorResult};
pub use events::{CallEventHandler, NoopCallEventHandler};
pub use process::{ProcessLauncher, ProcessMonitor, ProcessStatus, TokioLauncher, VoiceProcess};
pub use protocol::{infer_call_state, PromptFramer, SupervisorCallState};
pub use provision::ensure_binary;
pub use supervisor::SipSupervisor;
