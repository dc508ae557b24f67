//! kotki front-ends
//!
//! Command-line and HTTP front-ends over the kotki translation engine. Model
//! selection (explicit or by source language detection), registry validation
//! and output formatting live here; translation itself is delegated to an
//! [`Engine`].

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod cpuflags;
pub mod logging;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    config::{EngineConfig, WebSettings},
    detect::{Detector, WhatlangDetector},
    engine::{Engine, HttpEngine},
    errors::{KotkiError, Result},
    models::{ModelId, TranslationOutcome, TranslationRequest},
    registry::Registry,
    service::Translator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
