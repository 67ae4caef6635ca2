use crate::error::{Result, VoicedeskError};
use crate::language::Language;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Raw output of a synthesis backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Output rate, when the backend exposes it.
    pub sample_rate: Option<u32>,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: Option<u32>) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Reference recording of the voice to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerReference {
    path: PathBuf,
}

impl SpeakerReference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reference at `path`, only if the file exists.
    pub fn existing(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        path.is_file().then_some(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Trait for speech synthesis backends.
///
/// `language` is `None` for backends driven without a language (single-voice
/// models). Implementations may fail on an unsupported language, a missing
/// speaker reference or any internal error.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        language: Option<Language>,
    ) -> Result<Waveform>;

    /// Name of the backend for logging and advisories.
    fn name(&self) -> &str;
}

impl<T: SpeechSynthesizer> SpeechSynthesizer for Arc<T> {
    fn synthesize(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        language: Option<Language>,
    ) -> Result<Waveform> {
        (**self).synthesize(text, speaker, language)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Arguments of one recorded call to a [`MockSynthesizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisCall {
    pub text: String,
    pub speaker: Option<PathBuf>,
    pub language: Option<Language>,
}

/// Mock synthesizer for testing.
#[derive(Debug)]
pub struct MockSynthesizer {
    name: String,
    samples: Vec<f32>,
    sample_rate: Option<u32>,
    should_fail: bool,
    calls: Mutex<Vec<SynthesisCall>>,
}

impl MockSynthesizer {
    /// Mock that returns 100 samples of a quiet tone at 24kHz.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            samples: (0..100).map(|i| (i as f32 * 0.1).sin() * 0.1).collect(),
            sample_rate: Some(24000),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_samples(mut self, samples: Vec<f32>) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: Option<u32>) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        language: Option<Language>,
    ) -> Result<Waveform> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SynthesisCall {
                text: text.to_string(),
                speaker: speaker.map(|s| s.path().to_path_buf()),
                language,
            });

        if self.should_fail {
            return Err(VoicedeskError::SynthesisFailed {
                message: format!("{}: mock synthesis failure", self.name),
            });
        }
        Ok(Waveform::new(self.samples.clone(), self.sample_rate))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn speaker_reference_existing_requires_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(SpeakerReference::existing(file.path()).is_some());
        assert!(SpeakerReference::existing("/nonexistent/voicedesk/ref.wav").is_none());
    }

    #[test]
    fn mock_records_calls() {
        let mock = MockSynthesizer::new("mock");
        let speaker = SpeakerReference::new("/tmp/ref.wav");
        mock.synthesize("hola", Some(&speaker), Some(Language::Es))
            .unwrap();
        mock.synthesize("hello", None, None).unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].language, Some(Language::Es));
        assert_eq!(calls[0].speaker, Some(PathBuf::from("/tmp/ref.wav")));
        assert_eq!(calls[1].speaker, None);
    }

    #[test]
    fn mock_failure_still_records_call() {
        let mock = MockSynthesizer::new("broken").with_failure();
        assert!(mock.synthesize("x", None, Some(Language::En)).is_err());
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn synthesizer_trait_is_object_safe() {
        let synth: Box<dyn SpeechSynthesizer> = Box::new(MockSynthesizer::new("boxed"));
        assert_eq!(synth.name(), "boxed");
        let wave = synth.synthesize("hi", None, Some(Language::En)).unwrap();
        assert_eq!(wave.samples.len(), 100);
        assert_eq!(wave.sample_rate, Some(24000));
    }
}
