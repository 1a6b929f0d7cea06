//! # fetap-phone-book
//!
//! Persistent mapping between seven digit numbers and the SIP addresses they
//! dial. The call controller consumes it through [`AddressLookup`], the
//! `phone-book` command edits it.

pub mod book;
pub mod config;
pub mod error;
mod lock;

pub use book::{AddressLookup, PhoneBook};
pub use config::PhoneBookConfig;
pub use error::{PhoneBookError, PhoneBookResult};
