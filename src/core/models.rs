//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel model value that asks for language detection
pub const AUTO_MODEL: &str = "auto";

/// Target language appended to a detected source code
pub const TARGET_LANG: &str = "en";

/// Model identifier, e.g. `fren` (French to English)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Compose `{source}{target}`
    pub fn from_pair(source: &str, target: &str) -> Self {
        Self(format!("{}{}", source, target))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into source and target codes; `None` unless four ASCII chars
    pub fn pair(&self) -> Option<(&str, &str)> {
        if self.0.len() == 4 && self.0.is_ascii() {
            Some(self.0.split_at(2))
        } else {
            None
        }
    }

    /// Source and target codes are the same language
    pub fn is_identity(&self) -> bool {
        matches!(self.pair(), Some((from, to)) if from == to)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A model entry loaded from a registry description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: ModelId,
    /// Directory of the registry file, with trailing slash
    pub cwd: String,
    pub model: String,
    pub lex: String,
    pub vocab: String,
}

impl ModelEntry {
    /// Flat listing form, as printed by `--list`
    pub fn to_listing(&self) -> BTreeMap<String, String> {
        let mut rtn = BTreeMap::new();
        rtn.insert("name".to_string(), self.name.to_string());
        rtn.insert("cwd".to_string(), self.cwd.clone());
        rtn.insert("version".to_string(), String::new());
        rtn.insert("model".to_string(), self.model.clone());
        rtn.insert("lex".to_string(), self.lex.clone());
        rtn.insert("vocab".to_string(), self.vocab.clone());
        rtn.insert(
            "description".to_string(),
            crate::core::lang::describe_model(&self.name).unwrap_or_default(),
        );
        rtn
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub model: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Explicit model, ignoring empty values and the `auto` sentinel
    pub fn explicit_model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty() && *m != AUTO_MODEL)
    }
}

/// Detected source language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub code: String,
    pub name: Option<String>,
}

/// Translation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub translation: String,
    pub model: ModelId,
    pub detected: Option<Detection>,
}
