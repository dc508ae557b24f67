//! Configuration management

use config::{Config, Environment};
use rand::RngCore;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::errors::{KotkiError, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_CONTENT_LIMIT: usize = 2500;
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:7001/translate";

/// Whole-request body cap for the web app
pub const MAX_BODY_BYTES: usize = 50 * 1000 * 1000;

/// Settings for the translation engine client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub endpoint: String,
    /// `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENGINE_URL.to_string(),
            timeout: None,
        }
    }
}

impl EngineConfig {
    /// Load from `KOTKI_ENGINE_URL` and `KOTKI_ENGINE_TIMEOUT_MS`
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("KOTKI_ENGINE_URL")
            .unwrap_or_else(|_| DEFAULT_ENGINE_URL.to_string());

        let timeout = match std::env::var("KOTKI_ENGINE_TIMEOUT_MS") {
            Ok(ms) => Some(Duration::from_millis(ms.parse::<u64>().map_err(|e| {
                KotkiError::Config {
                    message: format!("KOTKI_ENGINE_TIMEOUT_MS: {}", e),
                }
            })?)),
            Err(_) => None,
        };

        let config = Self { endpoint, timeout };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(KotkiError::Config {
                message: "engine endpoint is required".to_string(),
            });
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(KotkiError::Config {
                message: "engine timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Web front-end settings, read from `DEBUG`, `HOST`, `PORT`, `APP_SECRET`,
/// `KOTKI_REGISTRY` and `API_CONTENT_LIMIT`
#[derive(Clone, Deserialize)]
pub struct WebSettings {
    pub debug: bool,
    pub host: String,
    pub port: u16,
    #[serde(default = "random_secret")]
    pub app_secret: String,
    #[serde(default)]
    pub kotki_registry: Option<PathBuf>,
    /// Maximum characters accepted in `translate`
    pub api_content_limit: usize,
}

impl fmt::Debug for WebSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSettings")
            .field("debug", &self.debug)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("app_secret", &"<redacted>")
            .field("kotki_registry", &self.kotki_registry)
            .field("api_content_limit", &self.api_content_limit)
            .finish()
    }
}

impl WebSettings {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(env: Environment) -> Result<Self> {
        let settings: Self = Config::builder()
            .set_default("debug", false)?
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("api_content_limit", DEFAULT_CONTENT_LIMIT as i64)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(KotkiError::Config {
                message: "HOST must not be empty".to_string(),
            });
        }

        if self.api_content_limit == 0 {
            return Err(KotkiError::Config {
                message: "API_CONTENT_LIMIT must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
