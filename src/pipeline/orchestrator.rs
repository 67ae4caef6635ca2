//! Per-turn pipeline: language, intent, response, voice.

use crate::audio::wav::decode_for_stt;
use crate::error::{Result, VoicedeskError};
use crate::intent::classifier::IntentClassifier;
use crate::language::Language;
use crate::language::resolver::LanguageResolver;
use crate::pipeline::types::{Reply, TurnOutcome, Utterance};
use crate::response::ResponseSelector;
use crate::stt::transcriber::Transcriber;
use crate::tts::chain::{SynthesisChain, SynthesisOutput};
use crate::tts::synthesizer::SpeakerReference;
use tracing::{debug, info, warn};

/// Runs turns through resolver → classifier → selector → synthesis chain.
///
/// Every component is built once and shared read-only by all turns.
pub struct Orchestrator {
    resolver: LanguageResolver,
    classifier: IntentClassifier,
    selector: ResponseSelector,
    chain: SynthesisChain,
    transcriber: Option<Box<dyn Transcriber>>,
    speaker: Option<SpeakerReference>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("resolver", &self.resolver)
            .field("classifier", &self.classifier)
            .field("chain", &self.chain)
            .field(
                "transcriber",
                &self.transcriber.as_ref().map(|t| t.model_name()),
            )
            .field("speaker", &self.speaker)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        resolver: LanguageResolver,
        classifier: IntentClassifier,
        selector: ResponseSelector,
        chain: SynthesisChain,
    ) -> Self {
        Self {
            resolver,
            classifier,
            selector,
            chain,
            transcriber: None,
            speaker: None,
        }
    }

    /// Enable the audio path.
    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Reference voice handed to the synthesis tiers that clone.
    pub fn with_speaker(mut self, speaker: Option<SpeakerReference>) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn speaker(&self) -> Option<&SpeakerReference> {
        self.speaker.as_ref()
    }

    pub fn has_transcriber(&self) -> bool {
        self.transcriber.is_some()
    }

    pub fn selector(&self) -> &ResponseSelector {
        &self.selector
    }

    /// Decode WAV bytes and transcribe them into an utterance.
    ///
    /// # Errors
    /// Fails if no transcriber is configured, the audio cannot be decoded, or
    /// the engine fails.
    pub fn transcribe(&self, wav: &[u8], forced: Option<Language>) -> Result<Utterance> {
        let transcriber =
            self.transcriber
                .as_ref()
                .ok_or_else(|| VoicedeskError::Transcription {
                    message: "no speech-to-text engine configured".to_string(),
                })?;

        let samples = decode_for_stt(wav)?;
        let transcription = transcriber.transcribe(&samples, forced)?;
        let text = transcription.text();
        debug!(
            model = transcriber.model_name(),
            chars = text.len(),
            reported = ?transcription.language,
            "audio transcribed"
        );
        Ok(Utterance::spoken(text, transcription.language))
    }

    /// Resolve, classify and pick the response. Never fails.
    pub fn respond(&self, utterance: &Utterance, forced: Option<Language>) -> Reply {
        let language = self.resolver.resolve(
            &utterance.text,
            utterance.reported_language.as_deref(),
            forced,
        );
        let classification = self.classifier.classify(&utterance.text, language);
        let text = self.selector.select(&classification.intent, language);

        info!(
            language = %language,
            intent = %classification.intent,
            score = ?classification.score,
            "turn understood"
        );

        Reply {
            language,
            intent: classification.intent,
            score: classification.score,
            text: text.to_string(),
        }
    }

    /// Speak a reply through the synthesis chain.
    ///
    /// # Errors
    /// Only terminal synthesis failures: every tier failed, or a tier produced
    /// an empty waveform.
    pub fn voice(&self, reply: &Reply) -> Result<SynthesisOutput> {
        self.chain
            .synthesize(&reply.text, self.speaker.as_ref(), reply.language)
            .inspect_err(|e| warn!(error = %e, "reply could not be voiced"))
    }

    /// Full turn for typed text.
    pub fn run_text_turn(&self, text: &str, forced: Option<Language>) -> Result<TurnOutcome> {
        self.run_turn(Utterance::typed(text), forced)
    }

    /// Full turn for recorded audio (WAV bytes of any rate or channel count).
    pub fn run_audio_turn(&self, wav: &[u8], forced: Option<Language>) -> Result<TurnOutcome> {
        let utterance = self.transcribe(wav, forced)?;
        self.run_turn(utterance, forced)
    }

    /// Full turn for an utterance that is already in hand.
    pub fn run_turn(&self, utterance: Utterance, forced: Option<Language>) -> Result<TurnOutcome> {
        let reply = self.respond(&utterance, forced);
        let synthesis = self.voice(&reply)?;
        Ok(TurnOutcome {
            utterance,
            reply,
            synthesis,
        })
    }
}
