//! Tiered speech synthesis.
//!
//! Tiers are tried in order until one produces audio:
//!
//! 1. voice cloning: multilingual, speaks in the reference speaker's voice
//! 2. multilingual: any supported language, cloning not guaranteed
//! 3. single voice: one fixed voice, driven without speaker or language
//!
//! Falling through a tier emits an [`Advisory`]. An empty waveform from any
//! tier stops the chain.

use crate::audio::wav::encode_wav;
use crate::defaults;
use crate::error::{Result, VoicedeskError};
use crate::language::{Language, normalize_language};
use crate::tts::synthesizer::{SpeakerReference, SpeechSynthesizer, Waveform};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Capability class of a synthesis tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    VoiceCloning,
    Multilingual,
    SingleVoice,
}

impl TierKind {
    /// Whether the tier receives the speaker reference and language.
    pub fn takes_voice_and_language(self) -> bool {
        !matches!(self, TierKind::SingleVoice)
    }

    fn label(self) -> &'static str {
        match self {
            TierKind::VoiceCloning => "voice cloning",
            TierKind::Multilingual => "multilingual",
            TierKind::SingleVoice => "single voice",
        }
    }
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

type SynthesizerFactory = Box<dyn Fn() -> Result<Box<dyn SpeechSynthesizer>> + Send + Sync>;

enum Backend {
    Loaded(Box<dyn SpeechSynthesizer>),
    /// Constructed on every attempt; construction failure counts as a tier failure.
    Deferred {
        name: String,
        factory: SynthesizerFactory,
    },
}

/// One entry of a [`SynthesisChain`].
pub struct SynthesisTier {
    kind: TierKind,
    backend: Backend,
}

impl std::fmt::Debug for SynthesisTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisTier")
            .field("kind", &self.kind)
            .field("backend", &self.backend_name())
            .finish()
    }
}

impl SynthesisTier {
    pub fn new(kind: TierKind, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        Self {
            kind,
            backend: Backend::Loaded(synthesizer),
        }
    }

    /// Tier whose backend is built right before each attempt.
    pub fn deferred<F>(kind: TierKind, name: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn SpeechSynthesizer>> + Send + Sync + 'static,
    {
        Self {
            kind,
            backend: Backend::Deferred {
                name: name.to_string(),
                factory: Box::new(factory),
            },
        }
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    pub fn backend_name(&self) -> &str {
        match &self.backend {
            Backend::Loaded(synth) => synth.name(),
            Backend::Deferred { name, .. } => name,
        }
    }

    fn attempt(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        language: Language,
    ) -> Result<Waveform> {
        let (speaker, language) = if self.kind.takes_voice_and_language() {
            (speaker, Some(language))
        } else {
            (None, None)
        };

        match &self.backend {
            Backend::Loaded(synth) => synth.synthesize(text, speaker, language),
            Backend::Deferred { factory, .. } => factory()?.synthesize(text, speaker, language),
        }
    }
}

/// Notice that a tier failed and the next one is being tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub tier: TierKind,
    pub backend: String,
    pub message: String,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} synthesis ({}) unavailable, trying next tier: {}",
            self.tier, self.backend, self.message
        )
    }
}

/// Successful synthesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisOutput {
    /// 16-bit PCM mono WAV.
    #[serde(skip)]
    pub wav: Vec<u8>,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub tier: TierKind,
    pub backend: String,
    /// One entry per tier that failed before this one.
    pub advisories: Vec<Advisory>,
}

impl SynthesisOutput {
    pub fn duration_secs(&self) -> f32 {
        self.sample_count as f32 / self.sample_rate as f32
    }
}

/// Ordered fallback over synthesis tiers.
#[derive(Debug)]
pub struct SynthesisChain {
    tiers: Vec<SynthesisTier>,
    default: Language,
    default_sample_rate: u32,
}

impl SynthesisChain {
    pub fn new(tiers: Vec<SynthesisTier>, default: Language) -> Self {
        Self {
            tiers,
            default,
            default_sample_rate: defaults::SYNTHESIS_SAMPLE_RATE,
        }
    }

    /// Rate used when a backend does not report one.
    pub fn with_default_sample_rate(mut self, sample_rate: u32) -> Self {
        self.default_sample_rate = sample_rate;
        self
    }

    pub fn tiers(&self) -> &[SynthesisTier] {
        &self.tiers
    }

    pub fn default_language(&self) -> Language {
        self.default
    }

    /// Synthesize `text`, walking the tiers in order.
    ///
    /// # Errors
    /// - `EmptyWaveform` if any tier returns no samples (no further tiers tried)
    /// - `SynthesisExhausted` if every tier fails
    /// - `AudioEncode` if the waveform cannot be written as WAV
    pub fn synthesize(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        language: Language,
    ) -> Result<SynthesisOutput> {
        let mut advisories = Vec::new();
        let mut attempts = Vec::new();

        for tier in &self.tiers {
            let backend = tier.backend_name().to_string();
            debug!(tier = %tier.kind, backend = %backend, language = %language, "synthesis attempt");

            let waveform = match tier.attempt(text, speaker, language) {
                Ok(waveform) => waveform,
                Err(e) => {
                    warn!(tier = %tier.kind, backend = %backend, error = %e, "synthesis tier failed");
                    attempts.push(format!("{} ({}): {}", tier.kind, backend, e));
                    advisories.push(Advisory {
                        tier: tier.kind,
                        backend,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if waveform.is_empty() {
                return Err(VoicedeskError::EmptyWaveform { backend });
            }

            let sample_rate = waveform
                .sample_rate
                .filter(|&rate| rate > 0)
                .unwrap_or(self.default_sample_rate);
            let wav = encode_wav(&waveform.samples, sample_rate)?;

            info!(
                tier = %tier.kind,
                backend = %backend,
                samples = waveform.samples.len(),
                sample_rate,
                "synthesis complete"
            );

            return Ok(SynthesisOutput {
                wav,
                sample_rate,
                sample_count: waveform.samples.len(),
                tier: tier.kind,
                backend,
                advisories,
            });
        }

        Err(VoicedeskError::SynthesisExhausted { attempts })
    }

    /// Like [`synthesize`](Self::synthesize) for an untyped language code.
    ///
    /// Codes outside the supported set use the chain's default language.
    pub fn synthesize_for_code(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        code: &str,
    ) -> Result<SynthesisOutput> {
        self.synthesize(text, speaker, normalize_language(code, self.default))
    }
}
