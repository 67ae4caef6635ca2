//! Command-line interface for voicedesk
//!
//! Provides argument parsing using clap derive macros.

use crate::language::{Language, parse_forced};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Multilingual voice customer support
#[derive(Parser, Debug)]
#[command(
    name = "voicedesk",
    version,
    about = "Multilingual voice customer support: typed or spoken questions, voiced answers"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Force the reply language instead of detecting it: auto, en, hi, es, ta, ar
    #[arg(long, global = true, value_name = "LANG", value_parser = parse_language)]
    pub language: Option<ForcedLanguage>,

    /// Reference voice (WAV) for voice cloning
    #[arg(long, global = true, value_name = "WAV")]
    pub speaker: Option<PathBuf>,

    /// Directory for reply audio files
    #[arg(long, global = true, value_name = "DIR", default_value = "replies")]
    pub out_dir: PathBuf,

    /// Export the session transcript as JSON on exit
    #[arg(long, global = true, value_name = "PATH")]
    pub transcript: Option<PathBuf>,
}

/// Value of `--language`: `auto` or a supported code.
///
/// Kept distinct from an absent flag so `--language auto` can override a
/// forced language from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedLanguage(pub Option<Language>);

fn parse_language(s: &str) -> Result<ForcedLanguage, String> {
    parse_forced(s).map(ForcedLanguage).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one typed question
    Say {
        /// Customer question
        text: String,
    },

    /// Answer one recorded question (WAV file)
    Listen {
        /// WAV file of any sample rate and channel count
        wav: PathBuf,
    },

    /// Interactive session on stdin (`/listen <WAV>` for audio, `/language <LANG>`, `/quit`)
    Chat,

    /// List supported languages
    Languages,

    /// List intents and flag incomplete bank entries
    Intents,

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
