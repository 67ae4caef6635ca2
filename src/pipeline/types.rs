//! Data types for one conversational turn.

use crate::language::Language;
use crate::tts::chain::{Advisory, SynthesisOutput};
use serde::Serialize;

/// Where an utterance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Typed,
    Spoken,
}

/// Customer input for one turn. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utterance {
    pub text: String,
    pub origin: Origin,
    /// Language reported by the speech-to-text engine, raw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_language: Option<String>,
}

impl Utterance {
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Typed,
            reported_language: None,
        }
    }

    pub fn spoken(text: impl Into<String>, reported_language: Option<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Spoken,
            reported_language,
        }
    }
}

/// Text side of a turn: language, intent and the selected response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub language: Language,
    pub intent: String,
    /// Best same-language similarity, absent when nothing was scored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub text: String,
}

/// A completed, voiced turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub utterance: Utterance,
    pub reply: Reply,
    pub synthesis: SynthesisOutput,
}

impl TurnOutcome {
    /// WAV bytes of the spoken reply.
    pub fn audio(&self) -> &[u8] {
        &self.synthesis.wav
    }

    /// Degraded-quality notices raised while voicing the reply.
    pub fn advisories(&self) -> &[Advisory] {
        &self.synthesis.advisories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_utterance_has_no_reported_language() {
        let utterance = Utterance::typed("hello");
        assert_eq!(utterance.origin, Origin::Typed);
        assert_eq!(utterance.reported_language, None);
    }

    #[test]
    fn reply_serializes_language_code() {
        let reply = Reply {
            language: Language::Hi,
            intent: "greeting".to_string(),
            score: None,
            text: "नमस्ते".to_string(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["language"], "hi");
        assert!(json.get("score").is_none());
    }
}
