//! Command line interface

use crate::commands;
use crate::config::FetapConfig;
use clap::{Parser, Subcommand};
use fetap_dial_core::PhoneNumber;
use fetap_infra_common::{log_welcome, setup_logging};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Rotary telephone SIP endpoint", long_about = None)]
pub struct Cli {
    /// Configuration file [default: fetap.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the telephone until interrupted
    Run {
        /// Use in-memory GPIO driven by commands on stdin
        /// (`up`, `down`, `dial <digits>`, `ring`)
        #[arg(long)]
        simulate: bool,
    },
    /// Ring once, then print every dialed digit
    HardwareTest,
    /// Print the call state machine as a Graphviz digraph
    StateGraph,
    /// Inspect or edit the phone book
    PhoneBook {
        #[command(subcommand)]
        action: PhoneBookCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum PhoneBookCommand {
    /// Print every entry
    List,
    /// Assign a number to a SIP address
    Add {
        number: PhoneNumber,
        /// SIP address without the `sip:` scheme
        address: String,
        /// Accept a number that is easily misdialed into an existing one
        #[arg(long)]
        force: bool,
    },
    /// Delete a number
    Remove { number: PhoneNumber },
}

impl Cli {
    pub async fn execute(self) -> anyhow::Result<()> {
        if matches!(self.command, Command::StateGraph) {
            print!("{}", fetap_call_engine::render_dot());
            return Ok(());
        }

        let mut config = FetapConfig::load(self.config.as_deref())?;
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }

        setup_logging(&config.logging)?;
        log_welcome(&config.logging.app_name, env!("CARGO_PKG_VERSION"));

        match self.command {
            Command::Run { simulate } => commands::run::execute(config, simulate).await,
            Command::HardwareTest => commands::hardware_test::execute(config).await,
            Command::PhoneBook { action } => commands::phone_book::execute(&config, action),
            Command::StateGraph => Ok(()),
        }
    }
}
