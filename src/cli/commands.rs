//! CLI argument definitions and handlers

use clap::Parser;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::detect::WhatlangDetector;
use crate::core::engine::HttpEngine;
use crate::core::errors::{KotkiError, Result};
use crate::core::models::{TranslationRequest, AUTO_MODEL};
use crate::core::registry::Registry;
use crate::core::service::Translator;

/// Sentinel `--input` value that reads standard input
pub const STDIN_SENTINEL: &str = "-";

/// Translate some text.
///
/// Every invocation loads the model registry again; long-running callers
/// should use the web front-end instead.
#[derive(Parser, Debug, Clone)]
#[command(name = "kotki", version, about, long_about)]
pub struct CliArgs {
    /// Text to translate ('-' reads standard input)
    #[arg(short, long, required_unless_present = "list")]
    pub input: Option<String>,

    /// Model name, use -l to list. 'auto' guesses the input language
    #[arg(short, long, default_value = AUTO_MODEL)]
    pub model: String,

    /// Path to registry.json. Leave empty to auto-detect translation models
    #[arg(short, long)]
    pub registry: Option<PathBuf>,

    /// List available models
    #[arg(short, long)]
    pub list: bool,

    /// Print debug log
    #[arg(short, long)]
    pub debug: bool,
}

/// Resolve `--input`, reading `stdin` for the `-` sentinel
pub fn read_input<R: Read>(input: &str, mut stdin: R) -> Result<String> {
    if input == STDIN_SENTINEL {
        debug!("reading from stdin because '-' was supplied");
        let mut buf = String::new();
        stdin.read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(input.to_string())
}

/// Write the registry as indented JSON sorted by model id
pub fn handle_list<W: Write>(registry: &Registry, out: &mut W) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, formatter);
    registry.list_models().serialize(&mut ser)?;
    writeln!(out)?;
    Ok(())
}

/// Translate `text` and write the result verbatim
pub async fn handle_translate<W: Write>(
    translator: &Translator,
    text: String,
    model: &str,
    out: &mut W,
) -> Result<()> {
    let request = TranslationRequest::new(text).with_model(model);
    let outcome = translator.translate(&request).await?;
    out.write_all(outcome.translation.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Run the CLI against the real registry, detector and engine
pub async fn run(args: CliArgs) -> Result<()> {
    let stdout = std::io::stdout();

    if args.list {
        debug!("--list supplied, listing model entries");
        let registry = Registry::scan(args.registry.as_deref())?;
        return handle_list(&registry, &mut stdout.lock());
    }

    let input = args.input.as_deref().unwrap_or_default();
    let text = read_input(input, std::io::stdin().lock())?;
    if text.is_empty() {
        return Err(KotkiError::EmptyInput);
    }

    let registry = Registry::scan(args.registry.as_deref())?;
    info!("{} models available", registry.len());

    let translator = Translator::new(
        Arc::new(registry),
        Arc::new(WhatlangDetector::new()),
        Arc::new(HttpEngine::from_env()?),
    );

    handle_translate(&translator, text, &args.model, &mut stdout.lock()).await
}
