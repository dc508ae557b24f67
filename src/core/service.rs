//! Model resolution, validation and translation

use std::sync::Arc;
use tracing::{debug, info};

use crate::core::detect::Detector;
use crate::core::engine::Engine;
use crate::core::errors::{KotkiError, Result};
use crate::core::lang::language_name;
use crate::core::models::{
    Detection, ModelId, TranslationOutcome, TranslationRequest, TARGET_LANG,
};
use crate::core::registry::Registry;

/// Resolved model plus the detection that produced it, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub model: ModelId,
    pub detected: Option<Detection>,
}

/// Translation front door shared by the CLI and the web API
#[derive(Clone)]
pub struct Translator {
    registry: Arc<Registry>,
    detector: Arc<dyn Detector>,
    engine: Arc<dyn Engine>,
}

impl Translator {
    pub fn new(
        registry: Arc<Registry>,
        detector: Arc<dyn Detector>,
        engine: Arc<dyn Engine>,
    ) -> Self {
        Self {
            registry,
            detector,
            engine,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Pick the model: the explicit one, or `{detected}{TARGET_LANG}`
    pub fn resolve(&self, request: &TranslationRequest) -> Result<Resolution> {
        if let Some(model) = request.explicit_model() {
            return Ok(Resolution {
                model: ModelId::new(model),
                detected: None,
            });
        }

        let code = self.detector.detect(&request.text)?;
        let model = ModelId::from_pair(&code, TARGET_LANG);
        debug!("guessing input language: {}; model: '{}'", code, model);

        Ok(Resolution {
            model,
            detected: Some(Detection {
                name: language_name(&code).map(str::to_string),
                code,
            }),
        })
    }

    /// Run `text` through `model`, echoing it when both halves match
    pub async fn invoke(&self, text: &str, model: &ModelId) -> Result<String> {
        if model.is_identity() {
            debug!("model '{}' translates to itself, echoing input", model);
            return Ok(text.to_string());
        }

        self.engine.translate(text, model).await
    }

    /// Resolve, validate and translate
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationOutcome> {
        if request.text.is_empty() {
            return Err(KotkiError::EmptyInput);
        }

        debug!("input count: {}", request.text.chars().count());

        let Resolution { model, detected } = self.resolve(request)?;

        if !model.is_identity() {
            self.registry.validate(&model, detected.is_some())?;
        }

        let translation = self.invoke(&request.text, &model).await?;
        info!("translated {} characters with '{}'", request.text.chars().count(), model);

        Ok(TranslationOutcome {
            translation,
            model,
            detected,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::ModelEntry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Detector returning a fixed code, counting calls
    pub(crate) struct StubDetector {
        pub code: Option<&'static str>,
        pub calls: AtomicUsize,
    }

    impl StubDetector {
        pub(crate) fn new(code: Option<&'static str>) -> Self {
            Self {
                code,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Detector for StubDetector {
        fn detect(&self, _text: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.code.map(str::to_string).ok_or(KotkiError::Detection {
                message: "stub".to_string(),
            })
        }
    }

    /// Engine tagging output with the model id, counting calls
    pub(crate) struct StubEngine {
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl StubEngine {
        pub(crate) fn new() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Engine for StubEngine {
        async fn translate(&self, text: &str, model: &ModelId) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(KotkiError::Engine {
                    message: "engine exploded".to_string(),
                });
            }
            Ok(format!("[{}] {}", model, text))
        }
    }

    pub(crate) fn registry_with(ids: &[&str]) -> Registry {
        Registry::from_entries(ids.iter().map(|id| ModelEntry {
            name: ModelId::new(*id),
            cwd: "/models/".to_string(),
            model: format!("/models/model.{}.bin", id),
            lex: format!("/models/lex.{}.bin", id),
            vocab: format!("/models/vocab.{}.spm", id),
        }))
    }

    fn translator(
        ids: &[&str],
        detector: Arc<StubDetector>,
        engine: Arc<StubEngine>,
    ) -> Translator {
        Translator::new(Arc::new(registry_with(ids)), detector, engine)
    }

    #[tokio::test]
    async fn test_detected_model_is_translated() {
        let detector = Arc::new(StubDetector::new(Some("fr")));
        let engine = Arc::new(StubEngine::new());
        let t = translator(&["fren", "deen"], detector.clone(), engine.clone());

        let outcome = t
            .translate(&TranslationRequest::new("Bonjour le monde"))
            .await
            .unwrap();

        assert_eq!(outcome.model.as_str(), "fren");
        assert_eq!(outcome.translation, "[fren] Bonjour le monde");
        assert_eq!(
            outcome.detected,
            Some(Detection {
                code: "fr".to_string(),
                name: Some("French".to_string()),
            })
        );
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_detected_model_missing_from_registry() {
        let detector = Arc::new(StubDetector::new(Some("fr")));
        let engine = Arc::new(StubEngine::new());
        let t = translator(&["deen"], detector, engine.clone());

        let err = t
            .translate(&TranslationRequest::new("Bonjour le monde"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Auto-detect error: unknown translation model id 'fren'"
        );
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explicit_model_skips_detection() {
        let detector = Arc::new(StubDetector::new(Some("fr")));
        let engine = Arc::new(StubEngine::new());
        let t = translator(&["deen"], detector.clone(), engine);

        for model in ["deen", "xxyy", "whatever"] {
            let request = TranslationRequest::new("Hallo Welt").with_model(model);
            let resolution = t.resolve(&request).unwrap();
            assert_eq!(resolution.model.as_str(), model);
            assert_eq!(resolution.detected, None);
        }
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);

        let outcome = tokio_test::assert_ok!(
            t.translate(&TranslationRequest::new("Hallo Welt").with_model("deen"))
                .await
        );
        assert_eq!(outcome.translation, "[deen] Hallo Welt");
    }

    #[tokio::test]
    async fn test_auto_sentinel_triggers_detection() {
        let detector = Arc::new(StubDetector::new(Some("de")));
        let engine = Arc::new(StubEngine::new());
        let t = translator(&["deen"], detector.clone(), engine);

        let request = TranslationRequest::new("Hallo Welt").with_model("auto");
        assert_eq!(t.resolve(&request).unwrap().model.as_str(), "deen");
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_unknown_model() {
        let engine = Arc::new(StubEngine::new());
        let t = translator(&["fren"], Arc::new(StubDetector::new(None)), engine.clone());

        let err = t
            .translate(&TranslationRequest::new("text").with_model("xxyy"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            KotkiError::ModelNotFound { auto_detected: false, .. }
        ));
        assert_eq!(err.to_string(), "unknown translation model id 'xxyy'");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identity_model_echoes_input() {
        let engine = Arc::new(StubEngine::new());
        // identity does not need a registry entry
        let t = translator(&[], Arc::new(StubDetector::new(None)), engine.clone());

        let outcome = t
            .translate(&TranslationRequest::new("Hello world").with_model("enen"))
            .await
            .unwrap();
        assert_eq!(outcome.translation, "Hello world");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_detected_target_language_echoes_input() {
        let detector = Arc::new(StubDetector::new(Some("en")));
        let engine = Arc::new(StubEngine::new());
        let t = translator(&[], detector, engine.clone());

        let outcome = t
            .translate(&TranslationRequest::new("Hello world"))
            .await
            .unwrap();
        assert_eq!(outcome.model.as_str(), "enen");
        assert_eq!(outcome.translation, "Hello world");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let detector = Arc::new(StubDetector::new(Some("fr")));
        let engine = Arc::new(StubEngine::new());
        let t = translator(&["fren"], detector.clone(), engine);

        assert!(matches!(
            t.translate(&TranslationRequest::new("")).await,
            Err(KotkiError::EmptyInput)
        ));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_detection_failure_is_not_retried() {
        let detector = Arc::new(StubDetector::new(None));
        let engine = Arc::new(StubEngine::new());
        let t = translator(&["fren"], detector.clone(), engine);

        assert!(matches!(
            t.translate(&TranslationRequest::new("???")).await,
            Err(KotkiError::Detection { .. })
        ));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_error_propagates() {
        let engine = Arc::new(StubEngine::failing());
        let t = translator(&["fren"], Arc::new(StubDetector::new(Some("fr"))), engine.clone());

        let err = t
            .translate(&TranslationRequest::new("Bonjour"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Translation engine error: engine exploded");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }
}
