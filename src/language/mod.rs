//! Supported languages and code normalization.
//!
//! The set of languages is a closed enumeration shared by the resolver, the
//! classifier, the response tables and the synthesis chain. Any raw code coming
//! from a detector or an STT engine goes through [`normalize_language`] before
//! it reaches those components.

pub mod detect;
pub mod resolver;

use crate::defaults;
use crate::error::{Result, VoicedeskError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_general_category::{GeneralCategory, get_general_category};

/// A supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Es,
    Ta,
    Ar,
}

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Hi,
        Language::Es,
        Language::Ta,
        Language::Ar,
    ];

    /// Two-letter code, e.g. `"hi"`.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Es => "es",
            Language::Ta => "ta",
            Language::Ar => "ar",
        }
    }

    /// English name of the language.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Es => "Spanish",
            Language::Ta => "Tamil",
            Language::Ar => "Arabic",
        }
    }

    /// Look up an exact two-letter code (case-insensitive, surrounding whitespace ignored).
    pub fn from_code(code: &str) -> Option<Language> {
        let code = code.trim();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }
}

impl Default for Language {
    fn default() -> Self {
        // The constant is one of the variants above
        Language::from_code(defaults::DEFAULT_LANGUAGE).unwrap_or(Language::En)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| {
            format!(
                "unsupported language '{}' (supported: {})",
                s.trim(),
                supported_codes().join(", ")
            )
        })
    }
}

/// Whether `c` is a letter (Unicode general category `L*`).
///
/// Narrower than [`char::is_alphabetic`], which also accepts combining vowel
/// signs such as `ी` (U+0940) and `ா` (U+0BBE).
pub fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Codes of every supported language.
pub fn supported_codes() -> Vec<&'static str> {
    Language::ALL.iter().map(|l| l.code()).collect()
}

/// Reduce a raw language signal to a supported language.
///
/// Takes the first two characters, lowercased (`"es-MX"` → `es`, `"Hindi"` →
/// `hi`), and maps anything outside the supported set to `default`.
pub fn normalize_language(code: &str, default: Language) -> Language {
    let prefix: String = code.trim().chars().take(2).collect::<String>().to_lowercase();
    Language::from_code(&prefix).unwrap_or(default)
}

/// Parse a forced-language setting.
///
/// `"auto"` and the empty string mean "not forced". Anything else must be a
/// supported code.
pub fn parse_forced(value: &str) -> Result<Option<Language>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(defaults::AUTO_LANGUAGE) {
        return Ok(None);
    }
    Language::from_str(value)
        .map(Some)
        .map_err(|message| VoicedeskError::ConfigInvalidValue {
            key: "language".to_string(),
            message,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_exclude_combining_marks() {
        assert!(is_letter('a'));
        assert!(is_letter('क'));
        assert!(is_letter('வ'));
        assert!(is_letter('م'));
        assert!(!is_letter('\u{0940}'));
        assert!(!is_letter('\u{0BBE}'));
        assert!(!is_letter('7'));
        assert!(!is_letter(' '));
    }

    #[test]
    fn codes_round_trip_through_from_code() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn from_code_is_case_insensitive() {
        assert_eq!(Language::from_code("AR"), Some(Language::Ar));
        assert_eq!(Language::from_code(" es "), Some(Language::Es));
    }

    #[test]
    fn from_code_rejects_unsupported() {
        assert_eq!(Language::from_code("de"), None);
        assert_eq!(Language::from_code(""), None);
        assert_eq!(Language::from_code("english"), None);
    }

    #[test]
    fn default_language_is_english() {
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn normalize_truncates_region_suffix() {
        assert_eq!(normalize_language("es-MX", Language::En), Language::Es);
        assert_eq!(normalize_language("zh-cn", Language::En), Language::En);
        assert_eq!(normalize_language("TA", Language::En), Language::Ta);
    }

    #[test]
    fn normalize_truncates_long_names() {
        assert_eq!(normalize_language("hindi", Language::En), Language::Hi);
        assert_eq!(normalize_language("arabic", Language::En), Language::Ar);
    }

    #[test]
    fn normalize_maps_unsupported_to_default() {
        assert_eq!(normalize_language("de", Language::En), Language::En);
        assert_eq!(normalize_language("fr", Language::Es), Language::Es);
        assert_eq!(normalize_language("", Language::Hi), Language::Hi);
        assert_eq!(normalize_language("   ", Language::En), Language::En);
    }

    #[test]
    fn normalize_handles_multibyte_input() {
        assert_eq!(normalize_language("हिन्दी", Language::En), Language::En);
    }

    #[test]
    fn parse_forced_auto_means_none() {
        assert_eq!(parse_forced("auto").unwrap(), None);
        assert_eq!(parse_forced("AUTO").unwrap(), None);
        assert_eq!(parse_forced("").unwrap(), None);
    }

    #[test]
    fn parse_forced_accepts_supported() {
        assert_eq!(parse_forced("ar").unwrap(), Some(Language::Ar));
    }

    #[test]
    fn parse_forced_rejects_unsupported() {
        let err = parse_forced("de").unwrap_err();
        assert!(err.to_string().contains("unsupported language 'de'"));
    }

    #[test]
    fn serde_uses_lowercase_codes() {
        let json = serde_json::to_string(&Language::Ta).unwrap();
        assert_eq!(json, "\"ta\"");
        let parsed: Language = serde_json::from_str("\"hi\"").unwrap();
        assert_eq!(parsed, Language::Hi);
    }

    #[test]
    fn display_prints_code() {
        assert_eq!(Language::Es.to_string(), "es");
        assert_eq!(Language::Es.display_name(), "Spanish");
    }
}
