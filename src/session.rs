//! Session transcript.
//!
//! A session owns one ordered transcript. It opens with the assistant greeting
//! and only ever grows by appending a user turn followed by the assistant's
//! answer.

use crate::defaults;
use crate::error::{Result, VoicedeskError};
use crate::language::Language;
use crate::pipeline::orchestrator::Orchestrator;
use crate::pipeline::types::{TurnOutcome, Utterance};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// WAV bytes of the recording or the spoken reply; never serialized.
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
    /// Size of `audio`, recorded in exports instead of the bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl Turn {
    fn greeting() -> Self {
        Self {
            role: Role::Assistant,
            text: defaults::SESSION_GREETING.to_string(),
            audio: None,
            audio_bytes: None,
            language: None,
            intent: None,
        }
    }

    /// `audio` is the recording of a spoken turn.
    fn user(utterance: &Utterance, audio: Option<Vec<u8>>) -> Self {
        Self {
            role: Role::User,
            text: utterance.text.clone(),
            audio_bytes: audio.as_ref().map(Vec::len),
            audio,
            language: None,
            intent: None,
        }
    }

    fn assistant(text: &str, language: Language, intent: &str, audio: Option<Vec<u8>>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.to_string(),
            audio_bytes: audio.as_ref().map(Vec::len),
            audio,
            language: Some(language),
            intent: Some(intent.to_string()),
        }
    }
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Transcript holding only the greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::greeting()],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Pretty JSON with audio replaced by its byte length.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VoicedeskError::Other(format!("transcript export: {}", e)))
    }

    /// Write [`to_json`](Self::to_json) to `path`.
    pub fn export(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), turns = self.turns.len(), "transcript exported");
        Ok(())
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// A conversation: an orchestrator plus the transcript it appends to.
#[derive(Debug)]
pub struct Session<'a> {
    orchestrator: &'a Orchestrator,
    forced: Option<Language>,
    transcript: Transcript,
}

impl<'a> Session<'a> {
    pub fn new(orchestrator: &'a Orchestrator, forced: Option<Language>) -> Self {
        Self {
            orchestrator,
            forced,
            transcript: Transcript::new(),
        }
    }

    pub fn forced_language(&self) -> Option<Language> {
        self.forced
    }

    pub fn set_forced_language(&mut self, forced: Option<Language>) {
        self.forced = forced;
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run a typed turn.
    pub fn say(&mut self, text: &str) -> Result<TurnOutcome> {
        self.turn(Utterance::typed(text), None)
    }

    /// Run a spoken turn from WAV bytes.
    ///
    /// The recording is kept on the user turn. Nothing is appended when the
    /// audio cannot be transcribed.
    pub fn listen(&mut self, wav: &[u8]) -> Result<TurnOutcome> {
        let utterance = self.orchestrator.transcribe(wav, self.forced)?;
        self.turn(utterance, Some(wav.to_vec()))
    }

    /// Append the user turn and the assistant's answer.
    ///
    /// On a terminal synthesis failure the assistant's text is still recorded,
    /// without audio, and the error is returned so the caller can show the
    /// turn as failed.
    fn turn(&mut self, utterance: Utterance, recording: Option<Vec<u8>>) -> Result<TurnOutcome> {
        self.transcript.push(Turn::user(&utterance, recording));
        let reply = self.orchestrator.respond(&utterance, self.forced);

        match self.orchestrator.voice(&reply) {
            Ok(synthesis) => {
                self.transcript.push(Turn::assistant(
                    &reply.text,
                    reply.language,
                    &reply.intent,
                    Some(synthesis.wav.clone()),
                ));
                Ok(TurnOutcome {
                    utterance,
                    reply,
                    synthesis,
                })
            }
            Err(e) => {
                warn!(error = %e, intent = %reply.intent, "turn failed at synthesis");
                self.transcript.push(Turn::assistant(
                    &reply.text,
                    reply.language,
                    &reply.intent,
                    None,
                ));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::bank::IntentBank;
    use crate::intent::classifier::IntentClassifier;
    use crate::intent::embedding::HashingEmbedder;
    use crate::language::detect::ScriptDetector;
    use crate::language::resolver::LanguageResolver;
    use crate::response::ResponseSelector;
    use crate::stt::transcriber::MockTranscriber;
    use crate::tts::chain::{SynthesisChain, SynthesisTier, TierKind};
    use crate::tts::synthesizer::MockSynthesizer;
    use tempfile::TempDir;

    fn orchestrator(synth: MockSynthesizer) -> Orchestrator {
        Orchestrator::new(
            LanguageResolver::new(Language::En, Box::new(ScriptDetector::new())),
            IntentClassifier::new(&IntentBank::builtin(), Box::new(HashingEmbedder::default()))
                .unwrap(),
            ResponseSelector::builtin(Language::En),
            SynthesisChain::new(
                vec![SynthesisTier::new(TierKind::VoiceCloning, Box::new(synth))],
                Language::En,
            ),
        )
    }

    #[test]
    fn transcript_starts_with_greeting() {
        let transcript = Transcript::new();
        assert_eq!(transcript.len(), 1);
        let first = &transcript.turns()[0];
        assert_eq!(first.role, Role::Assistant);
        assert_eq!(
            first.text,
            "Hello! Speak or type your question to get started."
        );
    }

    #[test]
    fn turns_are_appended_user_then_assistant() {
        let orch = orchestrator(MockSynthesizer::new("xtts"));
        let mut session = Session::new(&orch, None);

        session.say("hello").unwrap();
        session.say("where is my refund").unwrap();

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 5);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].text, "hello");
        assert_eq!(turns[2].role, Role::Assistant);
        assert_eq!(turns[2].intent.as_deref(), Some("greeting"));
        assert_eq!(turns[2].language, Some(Language::En));
        assert!(turns[2].audio.is_some());
        assert_eq!(turns[4].intent.as_deref(), Some("refund_status"));
    }

    #[test]
    fn synthesis_failure_records_text_without_audio() {
        let orch = orchestrator(MockSynthesizer::new("xtts").with_failure());
        let mut session = Session::new(&orch, None);

        let err = session.say("hello").unwrap_err();
        assert!(err.is_terminal_synthesis_failure());

        let last = session.transcript().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text, "Hello! How can I help you today?");
        assert!(last.audio.is_none());
        assert_eq!(session.transcript().len(), 3);
    }

    #[test]
    fn forced_language_applies_to_every_turn() {
        let orch = orchestrator(MockSynthesizer::new("xtts"));
        let mut session = Session::new(&orch, Some(Language::Es));
        let outcome = session.say("hola").unwrap();
        assert_eq!(outcome.reply.language, Language::Es);

        session.set_forced_language(None);
        let outcome = session.say("hola").unwrap();
        assert_eq!(outcome.reply.language, Language::En);
    }

    #[test]
    fn untranscribable_audio_appends_nothing() {
        let orch = orchestrator(MockSynthesizer::new("xtts"))
            .with_transcriber(Box::new(MockTranscriber::new("whisper").with_failure()));
        let mut session = Session::new(&orch, None);
        let wav = crate::audio::encode_wav(&[0.0; 160], 16000).unwrap();

        assert!(session.listen(&wav).is_err());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn export_omits_audio_and_records_length() {
        let orch = orchestrator(MockSynthesizer::new("xtts"));
        let mut session = Session::new(&orch, None);
        let outcome = session.say("hello").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&session.transcript().to_json().unwrap()).unwrap();
        let turns = json["turns"].as_array().unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0]["role"], "assistant");
        assert_eq!(turns[1]["role"], "user");
        assert!(turns[1].get("intent").is_none());
        assert!(turns[2].get("audio").is_none());
        assert_eq!(turns[2]["audio_bytes"], outcome.audio().len());
        assert_eq!(turns[2]["language"], "en");
        assert_eq!(turns[2]["intent"], "greeting");
    }

    #[test]
    fn spoken_turn_keeps_the_recording() {
        let orch = orchestrator(MockSynthesizer::new("xtts"))
            .with_transcriber(Box::new(MockTranscriber::new("whisper").with_response("hello")));
        let mut session = Session::new(&orch, None);
        let wav = crate::audio::encode_wav(&[0.0; 160], 16000).unwrap();

        session.listen(&wav).unwrap();
        session.say("hello").unwrap();

        let turns = session.transcript().turns();
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].audio.as_deref(), Some(wav.as_slice()));
        assert_eq!(turns[1].audio_bytes, Some(wav.len()));
        assert!(turns[3].audio.is_none());

        let json: serde_json::Value =
            serde_json::from_str(&session.transcript().to_json().unwrap()).unwrap();
        let exported = json["turns"].as_array().unwrap();
        assert_eq!(exported[1]["audio_bytes"], wav.len());
        assert!(exported[1].get("audio").is_none());
        assert!(exported[3].get("audio_bytes").is_none());
    }

    #[test]
    fn export_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.json");
        Transcript::new().export(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("get started"));
    }
}
