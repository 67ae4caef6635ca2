use crate::error::{Result, VoicedeskError};
use crate::language::Language;
use std::sync::{Arc, Mutex};

/// One piece of recognized speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Output of a speech-to-text pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcription {
    /// Segments in spoken order.
    pub segments: Vec<Segment>,
    /// Language the engine reported, as its raw code.
    pub language: Option<String>,
}

impl Transcription {
    /// Segment texts joined with single spaces, trimmed.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    /// * `forced` - Language to decode in, `None` to let the engine detect it
    fn transcribe(&self, audio: &[i16], forced: Option<Language>) -> Result<Transcription>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16], forced: Option<Language>) -> Result<Transcription> {
        (**self).transcribe(audio, forced)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock transcriber for testing
#[derive(Debug)]
pub struct MockTranscriber {
    model_name: String,
    segments: Vec<String>,
    language: Option<String>,
    should_fail: bool,
    forced_seen: Mutex<Vec<Option<Language>>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: vec!["mock transcription".to_string()],
            language: None,
            should_fail: false,
            forced_seen: Mutex::new(Vec::new()),
        }
    }

    /// Configure the mock to return a single segment
    pub fn with_response(self, response: &str) -> Self {
        self.with_segments(&[response])
    }

    /// Configure the mock to return several segments
    pub fn with_segments(mut self, segments: &[&str]) -> Self {
        self.segments = segments.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Configure the language the mock reports
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Forced languages received so far, in call order.
    pub fn forced_languages(&self) -> Vec<Option<Language>> {
        self.forced_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[i16], forced: Option<Language>) -> Result<Transcription> {
        self.forced_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(forced);

        if self.should_fail {
            return Err(VoicedeskError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }
        Ok(Transcription {
            segments: self.segments.iter().map(Segment::new).collect(),
            language: forced.map(|l| l.code().to_string()).or_else(|| self.language.clone()),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
