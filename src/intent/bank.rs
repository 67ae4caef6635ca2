//! The curated multilingual intent bank.
//!
//! A small, immutable table of example utterances per (intent, language). The
//! classifier embeds it once and matches incoming utterances against it.

use crate::language::Language;
use serde::Serialize;

/// One example utterance of an intent in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentBankEntry {
    pub intent: String,
    pub language: Language,
    pub example: String,
    /// Position of the example within its (intent, language) list.
    pub ordinal: usize,
}

/// Examples for one intent, grouped by language.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IntentExamples {
    intent: String,
    by_language: Vec<(Language, Vec<String>)>,
}

/// Static table of (intent, language, example) triples.
///
/// Entries are flattened in insertion order: intents in table order, then
/// languages in table order, then examples in order. The classifier's
/// tie-break relies on this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentBank {
    intents: Vec<IntentExamples>,
}

type StaticTable = &'static [(&'static str, &'static [(Language, &'static [&'static str])])];

const BUILTIN: StaticTable = &[
    (
        "greeting",
        &[
            (
                Language::En,
                &["hi", "hello", "good morning", "hey", "is anyone there"],
            ),
            (Language::Hi, &["नमस्ते", "हाय", "क्या कोई है"]),
            (Language::Es, &["hola", "buenos días", "hola, hay alguien"]),
            (Language::Ta, &["வணக்கம்", "ஹாய்"]),
            (Language::Ar, &["مرحبا", "أهلاً", "صباح الخير"]),
        ],
    ),
    (
        "refund_status",
        &[
            (
                Language::En,
                &[
                    "refund status",
                    "where is my refund",
                    "refund request",
                    "my refund details",
                ],
            ),
            (Language::Hi, &["रिफंड की स्थिति", "मेरा रिफंड कहाँ है"]),
            (
                Language::Es,
                &["estado del reembolso", "dónde está mi reembolso"],
            ),
            (
                Language::Ta,
                &["பணம் திருப்பி அளித்த நிலை", "என் ரீஃபண்ட் எங்கே"],
            ),
            (Language::Ar, &["حالة الاسترداد", "أين استردادي"]),
        ],
    ),
    (
        "account_balance",
        &[
            (
                Language::En,
                &["account balance", "current balance", "how much money"],
            ),
            (Language::Hi, &["खाते का बैलेंस", "मौजूदा बैलेंस"]),
            (Language::Es, &["saldo de la cuenta", "saldo actual"]),
            (Language::Ta, &["கணக்கு இருப்பு", "தற்போதைய இருப்பு"]),
            (Language::Ar, &["رصيد الحساب", "الرصيد الحالي"]),
        ],
    ),
    (
        "product_info",
        &[
            (
                Language::En,
                &[
                    "product information",
                    "tell me about the plan",
                    "features",
                ],
            ),
            (
                Language::Hi,
                &["उत्पाद की जानकारी", "योजना बताइए", "विशेषताएँ"],
            ),
            (
                Language::Es,
                &[
                    "información del producto",
                    "háblame del plan",
                    "características",
                ],
            ),
            (
                Language::Ta,
                &[
                    "தயாரிப்பு தகவல்",
                    "திட்டம் பற்றி சொல்லுங்கள்",
                    "அம்சங்கள்",
                ],
            ),
            (
                Language::Ar,
                &["معلومات المنتج", "أخبرني عن الخطة", "الميزات"],
            ),
        ],
    ),
];

impl IntentBank {
    /// The curated customer-support bank.
    pub fn builtin() -> Self {
        let mut bank = Self::empty();
        for (intent, languages) in BUILTIN {
            for (language, examples) in *languages {
                bank.push(intent, *language, examples);
            }
        }
        bank
    }

    fn empty() -> Self {
        Self {
            intents: Vec::new(),
        }
    }

    /// Build a bank from `(intent, language, examples)` rows.
    ///
    /// Rows for the same intent or language are merged in order of appearance.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Language, &'a [&'a str])>,
    {
        let mut bank = Self::empty();
        for (intent, language, examples) in rows {
            bank.push(intent, language, examples);
        }
        bank
    }

    fn push(&mut self, intent: &str, language: Language, examples: &[&str]) {
        let idx = match self.intents.iter().position(|i| i.intent == intent) {
            Some(idx) => idx,
            None => {
                self.intents.push(IntentExamples {
                    intent: intent.to_string(),
                    by_language: Vec::new(),
                });
                self.intents.len() - 1
            }
        };
        let group = &mut self.intents[idx].by_language;
        let list = match group.iter().position(|(lang, _)| *lang == language) {
            Some(pos) => &mut group[pos].1,
            None => {
                group.push((language, Vec::new()));
                let last = group.len() - 1;
                &mut group[last].1
            }
        };
        list.extend(examples.iter().map(|e| e.to_string()));
    }

    /// All entries, flattened in insertion order.
    pub fn entries(&self) -> Vec<IntentBankEntry> {
        self.intents
            .iter()
            .flat_map(|group| {
                group.by_language.iter().flat_map(move |(language, examples)| {
                    examples
                        .iter()
                        .enumerate()
                        .map(move |(ordinal, example)| IntentBankEntry {
                            intent: group.intent.clone(),
                            language: *language,
                            example: example.clone(),
                            ordinal,
                        })
                })
            })
            .collect()
    }

    /// Intent names in table order.
    pub fn intents(&self) -> Vec<&str> {
        self.intents.iter().map(|i| i.intent.as_str()).collect()
    }

    /// Examples of `intent` in `language`, empty when absent.
    pub fn examples(&self, intent: &str, language: Language) -> &[String] {
        self.intents
            .iter()
            .find(|i| i.intent == intent)
            .and_then(|i| i.by_language.iter().find(|(lang, _)| *lang == language))
            .map(|(_, examples)| examples.as_slice())
            .unwrap_or(&[])
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.intents
            .iter()
            .flat_map(|i| i.by_language.iter())
            .map(|(_, examples)| examples.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (intent, language) pairs with no examples.
    ///
    /// Every intent is expected to have examples in every supported language;
    /// a gap silently turns classification in that language into fallback.
    pub fn missing_examples(&self) -> Vec<(String, Language)> {
        self.intents
            .iter()
            .flat_map(|group| {
                Language::ALL
                    .into_iter()
                    .filter(|lang| self.examples(&group.intent, *lang).is_empty())
                    .map(|lang| (group.intent.clone(), lang))
            })
            .collect()
    }
}

impl Default for IntentBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_four_intents_in_order() {
        let bank = IntentBank::builtin();
        assert_eq!(
            bank.intents(),
            vec!["greeting", "refund_status", "account_balance", "product_info"]
        );
    }

    #[test]
    fn builtin_is_complete_for_every_language() {
        assert!(IntentBank::builtin().missing_examples().is_empty());
    }

    #[test]
    fn builtin_never_uses_fallback_as_an_intent() {
        assert!(!IntentBank::builtin().intents().contains(&"fallback"));
    }

    #[test]
    fn entries_are_structurally_identical_across_calls() {
        let bank = IntentBank::builtin();
        assert_eq!(bank.entries(), bank.entries());
        assert_eq!(IntentBank::builtin().entries(), IntentBank::builtin().entries());
    }

    #[test]
    fn entries_are_flattened_in_insertion_order() {
        let entries = IntentBank::builtin().entries();
        assert_eq!(entries.len(), IntentBank::builtin().len());

        let first = &entries[0];
        assert_eq!(first.intent, "greeting");
        assert_eq!(first.language, Language::En);
        assert_eq!(first.example, "hi");
        assert_eq!(first.ordinal, 0);

        let fifth = &entries[4];
        assert_eq!(fifth.example, "is anyone there");
        assert_eq!(fifth.ordinal, 4);

        let sixth = &entries[5];
        assert_eq!(sixth.language, Language::Hi);
        assert_eq!(sixth.ordinal, 0);
    }

    #[test]
    fn examples_lookup() {
        let bank = IntentBank::builtin();
        assert_eq!(
            bank.examples("greeting", Language::Es),
            &["hola", "buenos días", "hola, hay alguien"]
        );
        assert!(bank.examples("unknown", Language::Es).is_empty());
    }

    #[test]
    fn from_rows_merges_repeated_keys() {
        let bank = IntentBank::from_rows([
            ("greeting", Language::En, &["hi"][..]),
            ("greeting", Language::En, &["hello"][..]),
            ("greeting", Language::Es, &["hola"][..]),
        ]);
        assert_eq!(bank.intents(), vec!["greeting"]);
        assert_eq!(bank.examples("greeting", Language::En), &["hi", "hello"]);
        assert_eq!(bank.len(), 3);
    }

    #[test]
    fn incomplete_bank_reports_missing_pairs() {
        let bank = IntentBank::from_rows([("greeting", Language::En, &["hi"][..])]);
        let missing = bank.missing_examples();
        assert_eq!(missing.len(), 4);
        assert!(missing.contains(&("greeting".to_string(), Language::Ar)));
        assert!(!missing.contains(&("greeting".to_string(), Language::En)));
    }

    #[test]
    fn empty_bank() {
        let bank = IntentBank::from_rows(std::iter::empty());
        assert!(bank.is_empty());
        assert!(bank.entries().is_empty());
    }
}
