//! Synthesis backends driven by external programs.
//!
//! Each backend is a command template (e.g. the Coqui `tts` CLI) that writes a
//! WAV file either to stdout or to a path given through `{output}`.
//!
//! Placeholders substituted in `args` and `speaker_args`:
//! - `{text}`: the text to speak
//! - `{language}`: two-letter language code
//! - `{speaker}`: path of the reference recording
//! - `{output}`: path of a scratch WAV file the program writes to
//!
//! `speaker_args` are appended only when a speaker reference is available.
//! The `CommandExecutor` trait keeps the backend testable without the programs.

use crate::audio::wav::decode_wav;
use crate::error::{Result, VoicedeskError};
use crate::language::Language;
use crate::tts::synthesizer::{SpeakerReference, SpeechSynthesizer, Waveform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tracing::debug;

const TEXT: &str = "{text}";
const LANGUAGE: &str = "{language}";
const SPEAKER: &str = "{speaker}";
const OUTPUT: &str = "{output}";

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments and extra environment variables.
    ///
    /// Returns the raw stdout on success, an error if the command fails or is
    /// not found.
    fn execute(&self, program: &str, args: &[String], env: &BTreeMap<String, String>)
    -> Result<Vec<u8>>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>> {
        let output = Command::new(program)
            .args(args)
            .envs(env)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VoicedeskError::SynthesisToolNotFound {
                        tool: program.to_string(),
                    }
                } else {
                    VoicedeskError::SynthesisFailed {
                        message: format!("Failed to execute {}: {}", program, e),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoicedeskError::SynthesisFailed {
                message: format!(
                    "{} failed with status {:?}: {}",
                    program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(output.stdout)
    }
}

/// Command template for one synthesis backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CommandSpec {
    /// Display name used in logs and advisories.
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub speaker_args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    fn coqui(name: &str, model: &str, multilingual: bool) -> Self {
        let mut args = vec![
            "--model_name".to_string(),
            model.to_string(),
            "--text".to_string(),
            TEXT.to_string(),
        ];
        if multilingual {
            args.extend(["--language_idx".to_string(), LANGUAGE.to_string()]);
        }
        args.extend(["--out_path".to_string(), OUTPUT.to_string()]);

        let speaker_args = if multilingual {
            vec!["--speaker_wav".to_string(), SPEAKER.to_string()]
        } else {
            Vec::new()
        };

        Self {
            name: name.to_string(),
            program: "tts".to_string(),
            args,
            speaker_args,
            env: BTreeMap::from([("COQUI_TOS_AGREED".to_string(), "1".to_string())]),
        }
    }

    /// XTTS v2: multilingual with voice cloning.
    pub fn xtts() -> Self {
        Self::coqui("xtts_v2", "tts_models/multilingual/multi-dataset/xtts_v2", true)
    }

    /// YourTTS: multilingual, cloning not guaranteed.
    pub fn your_tts() -> Self {
        Self::coqui(
            "your_tts",
            "tts_models/multilingual/multi-dataset/your_tts",
            true,
        )
    }

    /// Tacotron2 trained on LJSpeech: one English voice.
    pub fn tacotron2() -> Self {
        Self::coqui("tacotron2-DDC", "tts_models/en/ljspeech/tacotron2-DDC", false)
    }

    /// Whether the program writes to `{output}` instead of stdout.
    pub fn writes_file(&self) -> bool {
        self.args
            .iter()
            .chain(&self.speaker_args)
            .any(|a| a.contains(OUTPUT))
    }

    /// Check that the template can be run at all.
    pub fn validate(&self, key: &str) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(VoicedeskError::ConfigInvalidValue {
                key: format!("{}.program", key),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `name`, or the program when unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.program
        } else {
            &self.name
        }
    }
}

/// Synthesizer backed by a [`CommandSpec`].
pub struct CommandSynthesizer {
    spec: CommandSpec,
    executor: Arc<dyn CommandExecutor>,
}

impl std::fmt::Debug for CommandSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSynthesizer")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl CommandSynthesizer {
    /// # Errors
    /// Returns `ConfigInvalidValue` if the command has no program.
    pub fn new(spec: CommandSpec, executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        spec.validate("synthesis")?;
        Ok(Self { spec, executor })
    }

    fn render_args(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        language: Option<Language>,
        output: Option<&str>,
    ) -> Result<Vec<String>> {
        let speaker_path = speaker.map(|s| s.path().to_string_lossy().into_owned());
        let templates = self.spec.args.iter().chain(if speaker.is_some() {
            self.spec.speaker_args.iter()
        } else {
            [].iter()
        });

        templates
            .map(|template| {
                render_template(template, |key| match key {
                    TEXT => Ok(Some(text.to_string())),
                    LANGUAGE => language
                        .map(|l| Some(l.code().to_string()))
                        .ok_or_else(|| VoicedeskError::SynthesisFailed {
                            message: format!("{} needs a language", self.spec.display_name()),
                        }),
                    SPEAKER => Ok(speaker_path.clone()),
                    OUTPUT => Ok(output.map(str::to_string)),
                    _ => Ok(None),
                })
            })
            .collect()
    }
}

/// Expand `{key}` placeholders in one left-to-right pass.
///
/// `lookup` receives the whole placeholder, braces included. Substituted
/// values are never re-scanned; placeholders it leaves as `None` are copied
/// through verbatim.
fn render_template(
    template: &str,
    lookup: impl Fn(&str) -> Result<Option<String>>,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if !after[..close].contains('{') => {
                let placeholder = &rest[open..open + close + 2];
                match lookup(placeholder)? {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(placeholder),
                }
                rest = &after[close + 1..];
            }
            Some(_) => {
                out.push('{');
                rest = after;
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        speaker: Option<&SpeakerReference>,
        language: Option<Language>,
    ) -> Result<Waveform> {
        let bytes = if self.spec.writes_file() {
            let scratch = tempfile::Builder::new()
                .prefix("voicedesk-")
                .suffix(".wav")
                .tempfile()?;
            let output = scratch.path().to_string_lossy().into_owned();
            let args = self.render_args(text, speaker, language, Some(&output))?;
            debug!(backend = self.name(), program = %self.spec.program, "running synthesis command");
            self.executor
                .execute(&self.spec.program, &args, &self.spec.env)?;
            std::fs::read(scratch.path())?
        } else {
            let args = self.render_args(text, speaker, language, None)?;
            debug!(backend = self.name(), program = %self.spec.program, "running synthesis command");
            self.executor
                .execute(&self.spec.program, &args, &self.spec.env)?
        };

        let decoded = decode_wav(&bytes).map_err(|e| VoicedeskError::SynthesisFailed {
            message: format!("{} produced unreadable audio: {}", self.name(), e),
        })?;
        Ok(Waveform::new(decoded.samples, Some(decoded.sample_rate)))
    }

    fn name(&self) -> &str {
        self.spec.display_name()
    }
}

/// One recorded invocation of a [`MockCommandExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// Mock executor for testing.
///
/// Returns canned WAV bytes on stdout, or writes them to the first argument
/// ending in `.wav` when configured to act like a file-writing program.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    output: Vec<u8>,
    write_to_wav_arg: bool,
    missing_tool: bool,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockCommandExecutor {
    pub fn new(output: Vec<u8>) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    pub fn writing_files(mut self) -> Self {
        self.write_to_wav_arg = true;
        self
    }

    pub fn with_missing_tool(mut self) -> Self {
        self.missing_tool = true;
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
                env: env.clone(),
            });

        if self.missing_tool {
            return Err(VoicedeskError::SynthesisToolNotFound {
                tool: program.to_string(),
            });
        }
        if self.write_to_wav_arg {
            if let Some(path) = args.iter().find(|a| a.ends_with(".wav")) {
                std::fs::write(path, &self.output)?;
            }
            return Ok(Vec::new());
        }
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::encode_wav;

    fn tone() -> Vec<u8> {
        encode_wav(&[0.1, 0.2, 0.3, 0.2], 22050).unwrap()
    }

    fn stdout_spec() -> CommandSpec {
        CommandSpec {
            name: "espeak".to_string(),
            program: "espeak-ng".to_string(),
            args: vec![
                "--stdout".to_string(),
                "-v".to_string(),
                "{language}".to_string(),
                "{text}".to_string(),
            ],
            speaker_args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn stdout_backend_decodes_wav() {
        let executor = Arc::new(MockCommandExecutor::new(tone()));
        let synth = CommandSynthesizer::new(stdout_spec(), executor.clone()).unwrap();

        let wave = synth.synthesize("hola", None, Some(Language::Es)).unwrap();
        assert_eq!(wave.samples.len(), 4);
        assert_eq!(wave.sample_rate, Some(22050));

        let calls = executor.invocations();
        assert_eq!(calls[0].program, "espeak-ng");
        assert_eq!(calls[0].args, vec!["--stdout", "-v", "es", "hola"]);
    }

    #[test]
    fn file_backend_reads_output_path() {
        let executor = Arc::new(MockCommandExecutor::new(tone()).writing_files());
        let synth = CommandSynthesizer::new(CommandSpec::tacotron2(), executor.clone()).unwrap();

        let wave = synth.synthesize("hello", None, None).unwrap();
        assert_eq!(wave.samples.len(), 4);

        let call = &executor.invocations()[0];
        assert_eq!(call.program, "tts");
        assert!(call.args.contains(&"tts_models/en/ljspeech/tacotron2-DDC".to_string()));
        assert!(call.args.iter().any(|a| a.ends_with(".wav")));
        assert_eq!(call.env.get("COQUI_TOS_AGREED").map(String::as_str), Some("1"));
    }

    #[test]
    fn speaker_args_only_with_speaker() {
        let executor = Arc::new(MockCommandExecutor::new(tone()).writing_files());
        let synth = CommandSynthesizer::new(CommandSpec::xtts(), executor.clone()).unwrap();
        let speaker = SpeakerReference::new("/voices/agent.wav");

        synth.synthesize("hi", Some(&speaker), Some(Language::Hi)).unwrap();
        synth.synthesize("hi", None, Some(Language::Hi)).unwrap();

        let calls = executor.invocations();
        let with = &calls[0].args;
        let idx = with.iter().position(|a| a == "--speaker_wav").unwrap();
        assert_eq!(with[idx + 1], "/voices/agent.wav");
        assert!(with.windows(2).any(|w| w[0] == "--language_idx" && w[1] == "hi"));
        assert!(!calls[1].args.contains(&"--speaker_wav".to_string()));
    }

    #[test]
    fn language_placeholder_without_language_fails() {
        let executor = Arc::new(MockCommandExecutor::new(tone()));
        let synth = CommandSynthesizer::new(stdout_spec(), executor.clone()).unwrap();
        assert!(synth.synthesize("hello", None, None).is_err());
        assert!(executor.invocations().is_empty());
    }

    #[test]
    fn reply_text_is_not_expanded_again() {
        let executor = Arc::new(MockCommandExecutor::new(tone()).writing_files());
        let synth = CommandSynthesizer::new(CommandSpec::tacotron2(), executor.clone()).unwrap();

        synth
            .synthesize("say {language} and {output} literally", None, None)
            .unwrap();

        let args = &executor.invocations()[0].args;
        let idx = args.iter().position(|a| a == "--text").unwrap();
        assert_eq!(args[idx + 1], "say {language} and {output} literally");
    }

    #[test]
    fn render_template_keeps_unknown_and_unclosed_braces() {
        let rendered = render_template("{{text}-{voice}-{text", |key| {
            Ok((key == "{text}").then(|| "hi".to_string()))
        })
        .unwrap();
        assert_eq!(rendered, "{hi-{voice}-{text");
    }

    #[test]
    fn missing_program_is_reported() {
        let executor = Arc::new(MockCommandExecutor::new(tone()).with_missing_tool());
        let synth = CommandSynthesizer::new(stdout_spec(), executor).unwrap();
        assert!(matches!(
            synth.synthesize("hello", None, Some(Language::En)),
            Err(VoicedeskError::SynthesisToolNotFound { .. })
        ));
    }

    #[test]
    fn unreadable_output_is_a_synthesis_failure() {
        let executor = Arc::new(MockCommandExecutor::new(b"not a wav".to_vec()));
        let synth = CommandSynthesizer::new(stdout_spec(), executor).unwrap();
        match synth.synthesize("hello", None, Some(Language::En)) {
            Err(VoicedeskError::SynthesisFailed { message }) => {
                assert!(message.contains("unreadable audio"));
            }
            other => panic!("Expected SynthesisFailed, got {:?}", other),
        }
    }

    #[test]
    fn empty_program_is_rejected() {
        let spec = CommandSpec::default();
        let executor = Arc::new(MockCommandExecutor::new(Vec::new()));
        assert!(CommandSynthesizer::new(spec, executor).is_err());
    }

    #[test]
    fn default_specs_follow_model_line_up() {
        assert!(CommandSpec::xtts().writes_file());
        assert!(!CommandSpec::tacotron2().speaker_args.iter().any(|a| a.contains("{speaker}")));
        assert!(!CommandSpec::tacotron2().args.iter().any(|a| a.contains("{language}")));
        assert_eq!(CommandSpec::your_tts().name, "your_tts");
    }

    #[test]
    fn system_executor_reports_missing_tool() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute(
            "voicedesk-no-such-program-12345",
            &[],
            &BTreeMap::new(),
        );
        assert!(matches!(
            result,
            Err(VoicedeskError::SynthesisToolNotFound { .. })
        ));
    }
}
