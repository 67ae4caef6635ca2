//! Resolution of a turn's language from noisy signals.

use crate::defaults;
use crate::language::detect::LanguageDetector;
use crate::language::{Language, is_letter, normalize_language};
use tracing::debug;

/// Fraction of letters that are basic Latin letters (A-Z, a-z).
///
/// Combining marks are not letters. Returns `None` when the text has no
/// letters.
pub fn latin_fraction(text: &str) -> Option<f32> {
    let (letters, latin) = text
        .chars()
        .filter(|&c| is_letter(c))
        .fold((0usize, 0usize), |(letters, latin), c| {
            (letters + 1, latin + usize::from(c.is_ascii_alphabetic()))
        });
    if letters == 0 {
        None
    } else {
        Some(latin as f32 / letters as f32)
    }
}

/// Turns a detected or forced language signal into one supported language.
///
/// Order of precedence:
/// 1. a forced language always wins;
/// 2. otherwise the STT-reported code, or the detector's guess on the text;
///    detector failure means the default language;
/// 3. a non-default result is overridden to the default when the text is
///    mostly basic Latin letters;
/// 4. unsupported codes become the default.
pub struct LanguageResolver {
    default: Language,
    latin_threshold: f32,
    detector: Box<dyn LanguageDetector>,
}

impl std::fmt::Debug for LanguageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageResolver")
            .field("default", &self.default)
            .field("latin_threshold", &self.latin_threshold)
            .field("detector", &self.detector.name())
            .finish()
    }
}

impl LanguageResolver {
    pub fn new(default: Language, detector: Box<dyn LanguageDetector>) -> Self {
        Self {
            default,
            latin_threshold: defaults::LATIN_OVERRIDE_THRESHOLD,
            detector,
        }
    }

    /// Set the Latin-script override threshold (strictly-greater-than comparison).
    pub fn with_latin_threshold(mut self, threshold: f32) -> Self {
        self.latin_threshold = threshold;
        self
    }

    pub fn default_language(&self) -> Language {
        self.default
    }

    pub fn latin_threshold(&self) -> f32 {
        self.latin_threshold
    }

    /// Resolve the language of `text`.
    ///
    /// `reported` is the STT engine's raw code, if any. An empty report counts
    /// as absent. Never fails.
    pub fn resolve(&self, text: &str, reported: Option<&str>, forced: Option<Language>) -> Language {
        if let Some(forced) = forced {
            debug!(language = %forced, "language forced");
            return forced;
        }

        let signal = match reported.map(str::trim).filter(|code| !code.is_empty()) {
            Some(code) => code.to_string(),
            None => match self.detector.detect(text) {
                Ok(code) => code,
                Err(e) => {
                    debug!(
                        detector = self.detector.name(),
                        error = %e,
                        "language detection failed, using default"
                    );
                    return self.default;
                }
            },
        };

        let language = normalize_language(&signal, self.default);
        if language != self.default && self.is_mostly_latin(text) {
            debug!(
                signal = %signal,
                default = %self.default,
                "mostly Latin text, overriding detected language"
            );
            return self.default;
        }

        debug!(signal = %signal, language = %language, "language resolved");
        language
    }

    fn is_mostly_latin(&self, text: &str) -> bool {
        latin_fraction(text).is_some_and(|fraction| fraction > self.latin_threshold)
    }
}
