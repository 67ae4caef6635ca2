//! Composition root.
//!
//! Builds every pipeline component once from a [`Config`] and hands them to
//! the [`Orchestrator`].

use crate::config::Config;
use crate::error::Result;
use crate::intent::bank::IntentBank;
use crate::intent::classifier::IntentClassifier;
use crate::intent::embedding::HashingEmbedder;
use crate::language::Language;
use crate::language::detect::ScriptDetector;
use crate::language::resolver::LanguageResolver;
use crate::pipeline::orchestrator::Orchestrator;
use crate::response::{ResponseSelector, ResponseTemplates};
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};
use crate::tts::chain::{SynthesisChain, SynthesisTier, TierKind};
use crate::tts::command::{CommandExecutor, CommandSynthesizer};
use crate::tts::synthesizer::SpeechSynthesizer;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings that command-line flags may override on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `Some(None)` clears a forced language set in the config.
    pub forced: Option<Option<Language>>,
    pub speaker: Option<std::path::PathBuf>,
}

impl Overrides {
    /// Apply to `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(forced) = self.forced {
            config.language.forced = forced
                .map_or(crate::defaults::AUTO_LANGUAGE, Language::code)
                .to_string();
        }
        if let Some(speaker) = &self.speaker {
            config.synthesis.speaker_reference = Some(speaker.clone());
        }
        config
    }
}

/// Three-tier chain over the configured commands.
///
/// The multilingual tier is built right before each attempt.
pub fn build_synthesis_chain(
    config: &Config,
    default: Language,
    executor: Arc<dyn CommandExecutor>,
) -> Result<SynthesisChain> {
    let cloning = CommandSynthesizer::new(config.synthesis.cloning.clone(), executor.clone())?;
    let basic = CommandSynthesizer::new(config.synthesis.basic.clone(), executor.clone())?;

    let multilingual_spec = config.synthesis.multilingual.clone();
    multilingual_spec.validate("synthesis.multilingual")?;
    let multilingual_name = multilingual_spec.display_name().to_string();
    let multilingual = SynthesisTier::deferred(TierKind::Multilingual, &multilingual_name, move || {
        CommandSynthesizer::new(multilingual_spec.clone(), executor.clone())
            .map(|synth| Box::new(synth) as Box<dyn SpeechSynthesizer>)
    });

    Ok(SynthesisChain::new(
        vec![
            SynthesisTier::new(TierKind::VoiceCloning, Box::new(cloning)),
            multilingual,
            SynthesisTier::new(TierKind::SingleVoice, Box::new(basic)),
        ],
        default,
    )
    .with_default_sample_rate(config.synthesis.default_sample_rate))
}

/// Build the text-path pipeline from a validated config.
///
/// The built-in bank is embedded here, once.
pub fn build_orchestrator(config: &Config, executor: Arc<dyn CommandExecutor>) -> Result<Orchestrator> {
    config.validate()?;
    let default = config.default_language()?;

    let resolver = LanguageResolver::new(default, Box::new(ScriptDetector::new()))
        .with_latin_threshold(config.language.latin_override_threshold);

    let bank = IntentBank::builtin();
    for (intent, language) in bank.missing_examples() {
        warn!(intent = %intent, language = %language, "intent bank has no examples");
    }
    let classifier = IntentClassifier::new(&bank, Box::new(HashingEmbedder::default()))?
        .with_min_score(config.intent.min_score);

    let selector = ResponseSelector::new(ResponseTemplates::builtin(), default)?;
    let chain = build_synthesis_chain(config, default, executor)?;

    let speaker = config.speaker();
    match (&speaker, &config.synthesis.speaker_reference) {
        (Some(s), _) => info!(path = %s.path().display(), "using speaker reference"),
        (None, Some(path)) => debug!(path = %path.display(), "speaker reference not found, synthesizing without one"),
        (None, None) => {}
    }

    Ok(Orchestrator::new(resolver, classifier, selector, chain).with_speaker(speaker))
}

/// Load the speech-to-text engine named in the config.
pub fn build_transcriber(config: &Config) -> Result<WhisperTranscriber> {
    WhisperTranscriber::new(WhisperConfig {
        model_path: config.stt.model_path.clone(),
        threads: (config.stt.threads > 0).then_some(config.stt.threads),
    })
}
