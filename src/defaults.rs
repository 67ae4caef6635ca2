//! Default configuration constants for voicedesk.
//!
//! Shared by the config layer and the components that fall back to them when
//! constructed without a config.

/// Sample rate expected by the speech-to-text engine.
///
/// All incoming audio is down-mixed and resampled to 16kHz mono before it
/// reaches the transcriber.
pub const STT_SAMPLE_RATE: u32 = 16000;

/// Sample rate assumed for synthesized audio when a backend does not report one.
pub const SYNTHESIS_SAMPLE_RATE: u32 = 22050;

/// Default language code.
///
/// Used whenever detection fails, the detected code is unsupported, or a
/// mostly-Latin utterance trips the script override.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Language value that means "detect automatically" in config and CLI.
pub const AUTO_LANGUAGE: &str = "auto";

/// Fraction of basic Latin letters above which a non-default detection is
/// overridden to the default language.
///
/// Short romanized utterances are often misdetected as non-Latin languages.
pub const LATIN_OVERRIDE_THRESHOLD: f32 = 0.7;

/// Minimum cosine similarity for an intent match. Scores equal to this value
/// are accepted.
pub const MIN_INTENT_SCORE: f32 = 0.5;

/// Reserved intent returned when nothing matches confidently.
pub const FALLBACK_INTENT: &str = "fallback";

/// Dimension of the built-in hashing embedder.
pub const EMBEDDING_DIM: usize = 1024;

/// Speaker reference used when none is configured and the file exists.
pub const SPEAKER_REFERENCE: &str = "harvard.wav";

/// First assistant line of every session transcript.
pub const SESSION_GREETING: &str = "Hello! Speak or type your question to get started.";

/// Whisper model loaded for the audio path when none is configured.
///
/// Must be a multilingual model; `.en` models cannot report other languages.
pub const STT_MODEL_PATH: &str = "models/ggml-small.bin";
