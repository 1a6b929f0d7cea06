//! # fetap
//!
//! Composition root of the rotary telephone. Wires GPIO, voice client, phone
//! book and call controller together and exposes them as a command line tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod shutdown;
pub mod simulate;

pub use config::FetapConfig;
