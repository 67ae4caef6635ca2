//! Localized canned responses.

use crate::defaults;
use crate::error::{Result, VoicedeskError};
use crate::language::Language;
use tracing::debug;

type StaticTemplates = &'static [(&'static str, &'static [(Language, &'static str)])];

const BUILTIN: StaticTemplates = &[
    (
        "greeting",
        &[
            (Language::En, "Hello! How can I help you today?"),
            (Language::Hi, "नमस्ते! मैं आपकी कैसे सहायता कर सकता/सकती हूँ?"),
            (Language::Es, "¡Hola! ¿En qué puedo ayudarte hoy?"),
            (Language::Ta, "வணக்கம்! இன்று உங்களுக்கு எப்படி உதவலாம்?"),
            (Language::Ar, "مرحباً! كيف يمكنني مساعدتك اليوم؟"),
        ],
    ),
    (
        "refund_status",
        &[
            (
                Language::En,
                "I can help with refunds. Could you share your order ID?",
            ),
            (
                Language::Hi,
                "मैं रिफंड में सहायता कर सकता/सकती हूँ। कृपया अपना ऑर्डर आईडी बताएं।",
            ),
            (
                Language::Es,
                "Puedo ayudarte con reembolsos. ¿Puedes compartir tu ID de pedido?",
            ),
            (
                Language::Ta,
                "ரீஃபண்ட் தொடர்பாக உதவ முடியும். உங்கள் ஆர்டர் ஐடியை பகிரவும்.",
            ),
            (
                Language::Ar,
                "يمكنني المساعدة في الاسترداد. هل يمكنك مشاركة رقم طلبك؟",
            ),
        ],
    ),
    (
        "account_balance",
        &[
            (
                Language::En,
                "To check your balance, please verify your account number.",
            ),
            (
                Language::Hi,
                "बैलेंस देखने के लिए, कृपया अपना खाता नंबर सत्यापित करें।",
            ),
            (
                Language::Es,
                "Para verificar tu saldo, por favor valida tu número de cuenta.",
            ),
            (
                Language::Ta,
                "இருப்பை பார்க்க, தயவுசெய்து உங்கள் கணக்கு எண்ணை சரிபார்க்கவும்.",
            ),
            (Language::Ar, "للتحقق من رصيدك، يرجى تأكيد رقم حسابك."),
        ],
    ),
    (
        "product_info",
        &[
            (
                Language::En,
                "Sure, which product or plan would you like to know about?",
            ),
            (
                Language::Hi,
                "ज़रूर, किस उत्पाद या योजना के बारे में जानना चाहेंगे?",
            ),
            (
                Language::Es,
                "Claro, ¿sobre qué producto o plan te gustaría saber?",
            ),
            (
                Language::Ta,
                "நிச்சயமாக, எந்த தயாரிப்பு அல்லது திட்டம் பற்றி அறிய விரும்புகிறீர்கள்?",
            ),
            (
                Language::Ar,
                "بالتأكيد، عن أي منتج أو خطة تود معرفة المزيد؟",
            ),
        ],
    ),
    (
        "fallback",
        &[
            (Language::En, "Sorry, I didn't get that. Could you rephrase?"),
            (
                Language::Hi,
                "क्षमा करें, मैं समझ नहीं पाया/पाई। कृपया दोबारा कहें।",
            ),
            (Language::Es, "Lo siento, no entendí. ¿Podrías reformular?"),
            (
                Language::Ta,
                "மன்னிக்கவும், எனக்கு புரியவில்லை. தயவுசெய்து மறுபரிசீலனை செய்யவா?",
            ),
            (Language::Ar, "عذراً، لم أفهم. هل يمكنك إعادة الصياغة؟"),
        ],
    ),
];

/// Table of localized strings per (intent, language).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTemplates {
    rows: Vec<(String, Vec<(Language, String)>)>,
}

impl ResponseTemplates {
    /// The curated customer-support replies.
    pub fn builtin() -> Self {
        Self {
            rows: BUILTIN
                .iter()
                .map(|(intent, strings)| {
                    (
                        intent.to_string(),
                        strings
                            .iter()
                            .map(|(lang, text)| (*lang, text.to_string()))
                            .collect(),
                    )
                })
                .collect(),
        }
    }

    /// Build a table from `(intent, language, text)` rows. Later rows for the
    /// same key replace earlier ones.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Language, &'a str)>,
    {
        let mut templates = Self { rows: Vec::new() };
        for (intent, language, text) in rows {
            let idx = match templates.rows.iter().position(|(i, _)| i == intent) {
                Some(idx) => idx,
                None => {
                    templates.rows.push((intent.to_string(), Vec::new()));
                    templates.rows.len() - 1
                }
            };
            let strings = &mut templates.rows[idx].1;
            match strings.iter_mut().find(|(lang, _)| *lang == language) {
                Some((_, existing)) => *existing = text.to_string(),
                None => strings.push((language, text.to_string())),
            }
        }
        templates
    }

    /// Exact lookup, no fallbacks.
    pub fn get(&self, intent: &str, language: Language) -> Option<&str> {
        self.rows
            .iter()
            .find(|(i, _)| i == intent)
            .and_then(|(_, strings)| strings.iter().find(|(lang, _)| *lang == language))
            .map(|(_, text)| text.as_str())
    }

    pub fn contains_intent(&self, intent: &str) -> bool {
        self.rows.iter().any(|(i, _)| i == intent)
    }

    /// Intent names in table order.
    pub fn intents(&self) -> Vec<&str> {
        self.rows.iter().map(|(i, _)| i.as_str()).collect()
    }
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Picks the reply text for a classified turn.
///
/// Unknown intents become the fallback intent; a language missing for an
/// intent uses the default language's string for that intent.
#[derive(Debug, Clone)]
pub struct ResponseSelector {
    templates: ResponseTemplates,
    default: Language,
}

impl ResponseSelector {
    /// Create a selector over `templates`.
    ///
    /// # Errors
    /// Returns `ConfigInvalidValue` if the table has no fallback string in the
    /// default language, or if any intent lacks a default-language string.
    pub fn new(templates: ResponseTemplates, default: Language) -> Result<Self> {
        if templates.get(defaults::FALLBACK_INTENT, default).is_none() {
            return Err(VoicedeskError::ConfigInvalidValue {
                key: "responses".to_string(),
                message: format!(
                    "missing '{}' response in default language '{}'",
                    defaults::FALLBACK_INTENT,
                    default
                ),
            });
        }
        if let Some(intent) = templates
            .intents()
            .into_iter()
            .find(|intent| templates.get(intent, default).is_none())
        {
            return Err(VoicedeskError::ConfigInvalidValue {
                key: "responses".to_string(),
                message: format!(
                    "intent '{}' has no response in default language '{}'",
                    intent, default
                ),
            });
        }
        Ok(Self { templates, default })
    }

    /// Selector over the built-in table.
    pub fn builtin(default: Language) -> Self {
        Self {
            templates: ResponseTemplates::builtin(),
            default,
        }
    }

    pub fn templates(&self) -> &ResponseTemplates {
        &self.templates
    }

    /// Reply text for `intent` in `language`. Never fails.
    pub fn select(&self, intent: &str, language: Language) -> &str {
        let intent = if self.templates.contains_intent(intent) {
            intent
        } else {
            debug!(intent, "unknown intent, using fallback response");
            defaults::FALLBACK_INTENT
        };

        if let Some(text) = self.templates.get(intent, language) {
            return text;
        }
        debug!(intent, language = %language, "no localized response, using default language");
        self.templates
            .get(intent, self.default)
            .or_else(|| {
                self.templates
                    .get(defaults::FALLBACK_INTENT, self.default)
            })
            // Only reachable through `builtin` with a default the table lacks
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_intent_and_language_has_a_response() {
        let selector = ResponseSelector::builtin(Language::En);
        for intent in ["greeting", "refund_status", "account_balance", "product_info", "fallback"] {
            for lang in Language::ALL {
                assert!(!selector.select(intent, lang).is_empty(), "{intent}/{lang}");
            }
        }
    }

    #[test]
    fn builtin_table_passes_validation_for_every_default() {
        for lang in Language::ALL {
            assert!(ResponseSelector::new(ResponseTemplates::builtin(), lang).is_ok());
        }
    }

    #[test]
    fn selects_localized_string() {
        let selector = ResponseSelector::builtin(Language::En);
        assert_eq!(
            selector.select("greeting", Language::Es),
            "¡Hola! ¿En qué puedo ayudarte hoy?"
        );
        assert_eq!(
            selector.select("fallback", Language::En),
            "Sorry, I didn't get that. Could you rephrase?"
        );
    }

    #[test]
    fn unknown_intent_uses_fallback() {
        let selector = ResponseSelector::builtin(Language::En);
        assert_eq!(
            selector.select("cancel_order", Language::Es),
            "Lo siento, no entendí. ¿Podrías reformular?"
        );
    }

    #[test]
    fn missing_language_uses_default_language_string() {
        let templates = ResponseTemplates::from_rows([
            ("greeting", Language::En, "Hello"),
            ("greeting", Language::Es, "Hola"),
            ("fallback", Language::En, "Sorry"),
        ]);
        let selector = ResponseSelector::new(templates, Language::En).unwrap();
        assert_eq!(selector.select("greeting", Language::Ta), "Hello");
        assert_eq!(selector.select("nope", Language::Ar), "Sorry");
        assert_eq!(selector.select("greeting", Language::Es), "Hola");
    }

    #[test]
    fn table_without_default_fallback_is_rejected() {
        let templates = ResponseTemplates::from_rows([
            ("greeting", Language::En, "Hello"),
            ("fallback", Language::Es, "Lo siento"),
        ]);
        let err = ResponseSelector::new(templates, Language::En).unwrap_err();
        assert!(err.to_string().contains("missing 'fallback' response"));
    }

    #[test]
    fn table_with_intent_missing_default_is_rejected() {
        let templates = ResponseTemplates::from_rows([
            ("greeting", Language::Es, "Hola"),
            ("fallback", Language::En, "Sorry"),
        ]);
        let err = ResponseSelector::new(templates, Language::En).unwrap_err();
        assert!(err.to_string().contains("intent 'greeting'"));
    }

    #[test]
    fn from_rows_replaces_duplicates() {
        let templates = ResponseTemplates::from_rows([
            ("fallback", Language::En, "first"),
            ("fallback", Language::En, "second"),
        ]);
        assert_eq!(templates.get("fallback", Language::En), Some("second"));
    }
}
