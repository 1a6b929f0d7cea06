//! # fetap-call-engine
//!
//! The brain of the telephone. Hardware signals and voice client
//! notifications are funnelled through one [`EventQueue`] into the
//! [`CallController`], which walks the transition table and drives the
//! ringer, the voice client and the phone book.
//!
//! ```text
//!   GPIO callbacks ──┐
//!                    ├──▶ EventQueue ──▶ CallController ──▶ Ringer
//!   SipSupervisor ───┘                         │      └───▶ SipSupervisor
//!                                              └──────────▶ PhoneBook
//! ```
//!
//! The table itself is plain data, see [`transition_table`] and
//! [`render_dot`].

pub mod control;
pub mod controller;
pub mod error;
pub mod queue;
pub mod state_table;
pub mod types;

pub use control::{CallControl, RingerControl};
pub use controller::CallController;
pub use error::{ControllerError, ControllerResult};
pub use queue::{EventQueue, EventReceiver};
pub use state_table::{
    render_dot, transition, transition_table, Action, DialPolicy, Guard, Rule, Transition,
};
pub use types::{CallState, DialingProgress, PhoneEvent};
