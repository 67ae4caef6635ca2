//! Text-only language detection.
//!
//! Used when the upstream signal (STT engine) does not report a language, and
//! for typed turns. The built-in [`ScriptDetector`] classifies by Unicode
//! script and, for Latin text, by a handful of Spanish cues.

use crate::error::{Result, VoicedeskError};
use crate::language::is_letter;

/// Trait for detecting the language of a piece of text.
///
/// Returns a raw code (`"es"`, `"zh-cn"`, `"und"`, ...). Callers normalize it.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`.
    ///
    /// Returns an error when the detector cannot decide (e.g. no letters).
    fn detect(&self, text: &str) -> Result<String>;

    /// Name of the detector for logging.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Devanagari,
    Tamil,
    Arabic,
    Cyrillic,
    Greek,
    Hebrew,
    Han,
    Kana,
    Hangul,
    Other,
}

impl Script {
    fn of(ch: char) -> Script {
        match ch as u32 {
            0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
            0x0900..=0x097F | 0xA8E0..=0xA8FF => Script::Devanagari,
            0x0B80..=0x0BFF => Script::Tamil,
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF
            | 0xFE70..=0xFEFF => Script::Arabic,
            0x0400..=0x052F => Script::Cyrillic,
            0x0370..=0x03FF => Script::Greek,
            0x0590..=0x05FF => Script::Hebrew,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => Script::Han,
            0x3040..=0x30FF => Script::Kana,
            0xAC00..=0xD7AF | 0x1100..=0x11FF => Script::Hangul,
            _ => Script::Other,
        }
    }

    fn code(self) -> &'static str {
        match self {
            Script::Latin => "en",
            Script::Devanagari => "hi",
            Script::Tamil => "ta",
            Script::Arabic => "ar",
            Script::Cyrillic => "ru",
            Script::Greek => "el",
            Script::Hebrew => "he",
            Script::Han => "zh",
            Script::Kana => "ja",
            Script::Hangul => "ko",
            Script::Other => "und",
        }
    }
}

const SPANISH_MARKS: &[char] = &['ñ', '¿', '¡', 'á', 'é', 'í', 'ó', 'ú', 'ü'];

const SPANISH_WORDS: &[&str] = &[
    "hola", "el", "la", "los", "las", "que", "qué", "de", "del", "por", "para", "hay", "está",
    "mi", "buenos", "buenas", "gracias", "dónde", "donde", "cómo", "como", "quiero", "necesito",
    "alguien", "usted", "tengo", "cuenta", "saldo", "reembolso", "producto", "háblame", "sobre",
];

const ENGLISH_WORDS: &[&str] = &[
    "the", "is", "my", "where", "what", "how", "i", "you", "to", "and", "hello", "hi", "a", "of",
    "please", "there", "anyone", "about", "me", "tell",
];

/// Script-based language detector.
///
/// Picks the script with the most letters. Latin text is reported as Spanish
/// when Spanish cues outnumber English ones, English otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn new() -> Self {
        Self
    }

    fn latin_language(text: &str) -> &'static str {
        let lowered = text.to_lowercase();
        let mut spanish = lowered.chars().filter(|c| SPANISH_MARKS.contains(c)).count();
        let mut english = 0usize;
        for word in lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
        {
            if SPANISH_WORDS.contains(&word) {
                spanish += 1;
            }
            if ENGLISH_WORDS.contains(&word) {
                english += 1;
            }
        }
        if spanish > english { "es" } else { "en" }
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Result<String> {
        let mut counts: Vec<(Script, usize)> = Vec::new();
        for ch in text.chars().filter(|&c| is_letter(c)) {
            let script = Script::of(ch);
            match counts.iter_mut().find(|(s, _)| *s == script) {
                Some((_, n)) => *n += 1,
                None => counts.push((script, 1)),
            }
        }

        // First script seen wins ties
        let dominant = counts
            .iter()
            .fold(None::<(Script, usize)>, |best, &(script, n)| match best {
                Some((_, best_n)) if best_n >= n => best,
                _ => Some((script, n)),
            });

        match dominant {
            None => Err(VoicedeskError::LanguageDetection {
                message: "no alphabetic characters to detect from".to_string(),
            }),
            Some((Script::Latin, _)) => Ok(Self::latin_language(text).to_string()),
            Some((script, _)) => Ok(script.code().to_string()),
        }
    }

    fn name(&self) -> &str {
        "script"
    }
}

/// Detector that always returns the same answer, for tests.
#[derive(Debug, Clone)]
pub struct FixedDetector {
    answer: Option<String>,
}

impl FixedDetector {
    /// Detector that always reports `code`.
    pub fn new(code: &str) -> Self {
        Self {
            answer: Some(code.to_string()),
        }
    }

    /// Detector that always fails.
    pub fn failing() -> Self {
        Self { answer: None }
    }
}

impl LanguageDetector for FixedDetector {
    fn detect(&self, _text: &str) -> Result<String> {
        self.answer
            .clone()
            .ok_or_else(|| VoicedeskError::LanguageDetection {
                message: "fixed detector configured to fail".to_string(),
            })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
