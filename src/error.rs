//! Error types for voicedesk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoicedeskError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio container errors
    #[error("Failed to decode audio: {message}")]
    AudioDecode { message: String },

    #[error("Failed to encode audio: {message}")]
    AudioEncode { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Understanding errors
    #[error("Language detection failed: {message}")]
    LanguageDetection { message: String },

    #[error("Embedding failed: {message}")]
    Embedding { message: String },

    // Synthesis errors
    #[error("Synthesis tool not found: {tool}")]
    SynthesisToolNotFound { tool: String },

    #[error("Synthesis failed: {message}")]
    SynthesisFailed { message: String },

    #[error("Synthesis produced an empty waveform ({backend})")]
    EmptyWaveform { backend: String },

    #[error("All synthesis tiers failed: {}", attempts.join("; "))]
    SynthesisExhausted { attempts: Vec<String> },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl VoicedeskError {
    /// Whether this error ends a turn without a voiced reply.
    pub fn is_terminal_synthesis_failure(&self) -> bool {
        matches!(
            self,
            VoicedeskError::SynthesisExhausted { .. } | VoicedeskError::EmptyWaveform { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoicedeskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_invalid_value_display() {
        let error = VoicedeskError::ConfigInvalidValue {
            key: "intent.min_score".to_string(),
            message: "must be between -1 and 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for intent.min_score: must be between -1 and 1"
        );
    }

    #[test]
    fn test_audio_decode_display() {
        let error = VoicedeskError::AudioDecode {
            message: "no RIFF tag found".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to decode audio: no RIFF tag found");
    }

    #[test]
    fn test_synthesis_tool_not_found_display() {
        let error = VoicedeskError::SynthesisToolNotFound {
            tool: "tts".to_string(),
        };
        assert_eq!(error.to_string(), "Synthesis tool not found: tts");
    }

    #[test]
    fn test_synthesis_exhausted_lists_attempts() {
        let error = VoicedeskError::SynthesisExhausted {
            attempts: vec![
                "xtts: missing speaker".to_string(),
                "your_tts: crashed".to_string(),
                "tacotron2: not installed".to_string(),
            ],
        };
        assert_eq!(
            error.to_string(),
            "All synthesis tiers failed: xtts: missing speaker; your_tts: crashed; tacotron2: not installed"
        );
    }

    #[test]
    fn test_empty_waveform_display() {
        let error = VoicedeskError::EmptyWaveform {
            backend: "tacotron2".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Synthesis produced an empty waveform (tacotron2)"
        );
    }

    #[test]
    fn test_terminal_synthesis_failure_classification() {
        assert!(VoicedeskError::SynthesisExhausted { attempts: vec![] }.is_terminal_synthesis_failure());
        assert!(
            VoicedeskError::EmptyWaveform {
                backend: "x".to_string()
            }
            .is_terminal_synthesis_failure()
        );
        assert!(
            !VoicedeskError::SynthesisFailed {
                message: "tier one".to_string()
            }
            .is_terminal_synthesis_failure()
        );
        assert!(!VoicedeskError::Other("x".to_string()).is_terminal_synthesis_failure());
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: VoicedeskError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: VoicedeskError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: VoicedeskError = io_error.into();
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<VoicedeskError>();
        assert_sync::<VoicedeskError>();
    }
}
