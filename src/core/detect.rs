//! Source language detection

use tracing::debug;
use whatlang::Lang;

use crate::core::errors::{KotkiError, Result};

/// Identifies the language of a piece of text
pub trait Detector: Send + Sync {
    /// Two-letter ISO 639-1 code of `text`
    fn detect(&self, text: &str) -> Result<String>;
}

/// Whatlang-based language detector
pub struct WhatlangDetector {
    detector: whatlang::Detector,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: whatlang::Detector::new(),
        }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(KotkiError::Detection {
                message: "no features in text".to_string(),
            });
        }

        let info = self
            .detector
            .detect(text)
            .ok_or_else(|| KotkiError::Detection {
                message: "language could not be determined".to_string(),
            })?;

        debug!(
            "whatlang: {} (confidence {:.2}, reliable: {})",
            info.lang().code(),
            info.confidence(),
            info.is_reliable()
        );

        Ok(iso_639_1(info.lang()).to_string())
    }
}

fn iso_639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Afr => "af",
        Lang::Aka => "ak",
        Lang::Amh => "am",
        Lang::Ara => "ar",
        Lang::Aze => "az",
        Lang::Bel => "be",
        Lang::Ben => "bn",
        Lang::Bul => "bg",
        Lang::Cat => "ca",
        Lang::Ces => "cs",
        Lang::Cmn => "zh",
        Lang::Dan => "da",
        Lang::Deu => "de",
        Lang::Ell => "el",
        Lang::Eng => "en",
        Lang::Epo => "eo",
        Lang::Est => "et",
        Lang::Fin => "fi",
        Lang::Fra => "fr",
        Lang::Guj => "gu",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Hrv => "hr",
        Lang::Hun => "hu",
        Lang::Hye => "hy",
        Lang::Ind => "id",
        Lang::Ita => "it",
        Lang::Jav => "jv",
        Lang::Jpn => "ja",
        Lang::Kan => "kn",
        Lang::Kat => "ka",
        Lang::Khm => "km",
        Lang::Kor => "ko",
        Lang::Lat => "la",
        Lang::Lav => "lv",
        Lang::Lit => "lt",
        Lang::Mal => "ml",
        Lang::Mar => "mr",
        Lang::Mkd => "mk",
        Lang::Mya => "my",
        Lang::Nep => "ne",
        Lang::Nld => "nl",
        Lang::Nob => "nb",
        Lang::Ori => "or",
        Lang::Pan => "pa",
        Lang::Pes => "fa",
        Lang::Pol => "pl",
        Lang::Por => "pt",
        Lang::Ron => "ro",
        Lang::Rus => "ru",
        Lang::Sin => "si",
        Lang::Slk => "sk",
        Lang::Slv => "sl",
        Lang::Sna => "sn",
        Lang::Spa => "es",
        Lang::Srp => "sr",
        Lang::Swe => "sv",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Tgl => "tl",
        Lang::Tha => "th",
        Lang::Tuk => "tk",
        Lang::Tur => "tr",
        Lang::Ukr => "uk",
        Lang::Urd => "ur",
        Lang::Uzb => "uz",
        Lang::Vie => "vi",
        Lang::Yid => "yi",
        Lang::Zul => "zu",
    }
}
