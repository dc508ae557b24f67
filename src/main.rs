//! Main entry point for the kotki CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing::error;

use kotki_front::cli::commands::{self, CliArgs};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    let args = CliArgs::parse();
    kotki_front::logging::init(env!("CARGO_CRATE_NAME"), args.debug);

    if let Err(e) = commands::run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
