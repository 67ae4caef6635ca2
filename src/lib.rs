//! voicedesk - Multilingual voice customer support
//!
//! Resolves the customer's language, matches their question to an intent,
//! picks a localized answer and voices it through a tiered synthesis chain.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod intent;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod response;
pub mod session;
pub mod stt;
pub mod tts;

// Core traits (engines the pipeline is built from)
pub use intent::Embedder;
pub use language::detect::LanguageDetector;
pub use stt::transcriber::Transcriber;
pub use tts::command::{CommandExecutor, SystemCommandExecutor};
pub use tts::synthesizer::SpeechSynthesizer;

// Pipeline
pub use pipeline::{Orchestrator, Reply, TurnOutcome, Utterance};
pub use session::{Session, Transcript};

// Error handling
pub use error::{Result, VoicedeskError};

// Config
pub use config::Config;
pub use language::Language;

/// Build version string with optional git commit hash.
///
/// Returns `"0.0.1+abc1234"` when git hash is available, `"0.0.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        // In a git repo build, GIT_HASH is set → expect "0.0.1+<hash>"
        // In CI without git, expect plain "0.0.1"
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(
                hash_part.len(),
                7,
                "Git hash should be 7 chars, got: {}",
                hash_part
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
