use crate::defaults;
use crate::error::{Result, VoicedeskError};
use crate::language::{Language, parse_forced};
use crate::tts::command::CommandSpec;
use crate::tts::synthesizer::SpeakerReference;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub language: LanguageConfig,
    pub intent: IntentConfig,
    pub synthesis: SynthesisConfig,
    pub stt: SttConfig,
}

/// Language resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguageConfig {
    /// Default language code
    pub default: String,
    /// "auto" or a supported code that every turn is forced to
    pub forced: String,
    pub latin_override_threshold: f32,
}

/// Intent classification configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntentConfig {
    pub min_score: f32,
}

/// Speech synthesis configuration
///
/// A tier table given in the file replaces that tier's command entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisConfig {
    pub default_sample_rate: u32,
    /// Reference recording for voice cloning; ignored when missing on disk
    pub speaker_reference: Option<PathBuf>,
    pub cloning: CommandSpec,
    pub multilingual: CommandSpec,
    pub basic: CommandSpec,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model_path: PathBuf,
    /// Inference threads, 0 = auto
    pub threads: usize,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: defaults::DEFAULT_LANGUAGE.to_string(),
            forced: defaults::AUTO_LANGUAGE.to_string(),
            latin_override_threshold: defaults::LATIN_OVERRIDE_THRESHOLD,
        }
    }
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            min_score: defaults::MIN_INTENT_SCORE,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_sample_rate: defaults::SYNTHESIS_SAMPLE_RATE,
            speaker_reference: Some(PathBuf::from(defaults::SPEAKER_REFERENCE)),
            cloning: CommandSpec::xtts(),
            multilingual: CommandSpec::your_tts(),
            basic: CommandSpec::tacotron2(),
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(defaults::STT_MODEL_PATH),
            threads: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VoicedeskError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::from_toml_str(&contents)?)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if matches!(
                    e.downcast_ref::<VoicedeskError>(),
                    Some(VoicedeskError::ConfigFileNotFound { .. })
                ) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOICEDESK_LANGUAGE → language.forced
    /// - VOICEDESK_SPEAKER → synthesis.speaker_reference
    /// - VOICEDESK_STT_MODEL → stt.model_path
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("VOICEDESK_LANGUAGE")
            && !language.is_empty()
        {
            self.language.forced = language;
        }

        if let Ok(speaker) = std::env::var("VOICEDESK_SPEAKER")
            && !speaker.is_empty()
        {
            self.synthesis.speaker_reference = Some(PathBuf::from(speaker));
        }

        if let Ok(model) = std::env::var("VOICEDESK_STT_MODEL")
            && !model.is_empty()
        {
            self.stt.model_path = PathBuf::from(model);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voicedesk/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voicedesk")
            .join("config.toml")
    }

    /// Check every value the pipeline depends on.
    pub fn validate(&self) -> Result<()> {
        self.default_language()?;
        self.forced_language()?;

        let threshold = self.language.latin_override_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(invalid(
                "language.latin_override_threshold",
                format!("must be between 0 and 1, got {}", threshold),
            ));
        }

        let min_score = self.intent.min_score;
        if !(-1.0..=1.0).contains(&min_score) {
            return Err(invalid(
                "intent.min_score",
                format!("must be between -1 and 1, got {}", min_score),
            ));
        }

        if self.synthesis.default_sample_rate == 0 {
            return Err(invalid(
                "synthesis.default_sample_rate",
                "must be positive".to_string(),
            ));
        }

        self.synthesis.cloning.validate("synthesis.cloning")?;
        self.synthesis.multilingual.validate("synthesis.multilingual")?;
        self.synthesis.basic.validate("synthesis.basic")?;
        Ok(())
    }

    /// The configured default language.
    pub fn default_language(&self) -> Result<Language> {
        Language::from_code(&self.language.default).ok_or_else(|| {
            invalid(
                "language.default",
                format!(
                    "unsupported language '{}' (supported: {})",
                    self.language.default,
                    crate::language::supported_codes().join(", ")
                ),
            )
        })
    }

    /// The forced language, `None` for automatic detection.
    pub fn forced_language(&self) -> Result<Option<Language>> {
        parse_forced(&self.language.forced).map_err(|e| match e {
            VoicedeskError::ConfigInvalidValue { message, .. } => {
                invalid("language.forced", message)
            }
            other => other,
        })
    }

    /// Speaker reference, if configured and present on disk.
    pub fn speaker(&self) -> Option<SpeakerReference> {
        self.synthesis
            .speaker_reference
            .as_ref()
            .and_then(|path| SpeakerReference::existing(path.clone()))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VoicedeskError::ConfigParse {
            message: e.to_string(),
        })
    }
}

fn invalid(key: &str, message: String) -> VoicedeskError {
    VoicedeskError::ConfigInvalidValue {
        key: key.to_string(),
        message,
    }
}
