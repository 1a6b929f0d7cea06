//! Entry point of the `fetap` daemon

use clap::Parser;
use fetap::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
