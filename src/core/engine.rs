//! Translation engine seam and its HTTP client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::EngineConfig;
use crate::core::errors::{KotkiError, Result};
use crate::core::models::ModelId;

/// The external translation engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Translate `text` with the given model, returning the engine output
    async fn translate(&self, text: &str, model: &ModelId) -> Result<String>;
}

#[derive(Serialize)]
struct EngineRequest<'a> {
    model: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct EngineResponse {
    translation: String,
}

/// Engine reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    config: Arc<EngineConfig>,
}

impl HttpEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config: Arc::new(config),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env()?)
    }
}

#[async_trait]
impl Engine for HttpEngine {
    async fn translate(&self, text: &str, model: &ModelId) -> Result<String> {
        debug!("engine request: model={} chars={}", model, text.chars().count());

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&EngineRequest {
                model: model.as_str(),
                text,
            })
            .send()
            .await
            .map_err(|e| KotkiError::Engine {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("engine returned {}: {}", status, error_text);
            return Err(KotkiError::Engine {
                message: format!("{} - {}", status.as_u16(), error_text),
            });
        }

        let body: EngineResponse = response.json().await.map_err(|e| KotkiError::Engine {
            message: format!("invalid response: {}", e),
        })?;

        Ok(strip_list_marker(body.translation))
    }
}

/// Marian output occasionally starts with a stray `- `
fn strip_list_marker(translation: String) -> String {
    match translation.strip_prefix("- ") {
        Some(rest) => rest.to_string(),
        None => translation,
    }
}
