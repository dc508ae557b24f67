//! Web front-end: HTTP API and index page

#![forbid(unsafe_code)]

use clap::{ArgAction, Parser};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use kotki_front::server::api::run_server;
use kotki_front::{HttpEngine, Registry, Translator, WebSettings, WhatlangDetector};

/// Exposes kotki via HTTP web interface and provides an API.
#[derive(Parser, Debug)]
#[command(name = "kotki-web", version, about, disable_help_flag = true)]
struct Args {
    /// Bind host (default: HOST or 127.0.0.1)
    #[arg(short = 'h', long)]
    host: Option<String>,

    /// Bind port (default: PORT or 7000)
    #[arg(short, long)]
    port: Option<u16>,

    /// Debug logging
    #[arg(short, long)]
    debug: bool,

    /// Path to registry.json. Leave empty to auto-detect translation models
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Args::parse();
    let mut settings = WebSettings::from_env()?;

    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if args.registry.is_some() {
        settings.kotki_registry = args.registry;
    }
    settings.debug |= args.debug;

    kotki_front::logging::init(env!("CARGO_CRATE_NAME"), settings.debug);
    info!("content limit: {} characters", settings.api_content_limit);

    // loaded once, read-only from here on
    let registry = Arc::new(Registry::scan(settings.kotki_registry.as_deref())?);
    let translator = Translator::new(
        registry,
        Arc::new(WhatlangDetector::new()),
        Arc::new(HttpEngine::from_env()?),
    );

    run_server(&settings, translator).await
}
