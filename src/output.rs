//! Terminal rendering of turns and reply audio files.
//! Shared by `voicedesk say`, `listen` and `chat`.

use crate::error::Result;
use crate::pipeline::types::{Origin, TurnOutcome};
use crate::tts::chain::Advisory;
use std::path::{Path, PathBuf};

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Wrap `text` in `color` when `enabled`.
fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Render one completed turn:
///
/// ```text
/// Detected language: es
/// Intent: greeting
/// ¡Hola! ¿En qué puedo ayudarte hoy?
/// ```
///
/// Spoken turns show the transcription first; advisories follow the reply.
pub fn render_turn(outcome: &TurnOutcome, color: bool) -> String {
    let mut out = String::new();

    if outcome.utterance.origin == Origin::Spoken {
        let heard = if outcome.utterance.text.is_empty() {
            "(silence)"
        } else {
            outcome.utterance.text.as_str()
        };
        out.push_str(&paint(&format!("Heard: {heard}"), DIM, color));
        out.push('\n');
    }

    out.push_str(&format!(
        "Detected language: {}\n",
        outcome.reply.language.code()
    ));
    let intent = match outcome.reply.score {
        Some(score) => format!("Intent: {} ({:.2})", outcome.reply.intent, score),
        None => format!("Intent: {}", outcome.reply.intent),
    };
    out.push_str(&paint(&intent, DIM, color));
    out.push('\n');
    out.push_str(&paint(&outcome.reply.text, GREEN, color));
    out.push('\n');

    for advisory in outcome.advisories() {
        out.push_str(&render_advisory(advisory, color));
        out.push('\n');
    }
    out
}

/// One advisory line.
pub fn render_advisory(advisory: &Advisory, color: bool) -> String {
    paint(&format!("note: {advisory}"), YELLOW, color)
}

/// One error line for a failed turn.
pub fn render_failure(error: &dyn std::fmt::Display, color: bool) -> String {
    paint(&format!("error: {error}"), RED, color)
}

/// Write the reply audio of turn `index` into `dir` as `reply-NNN.wav`.
///
/// Creates `dir` when missing.
pub fn write_reply_wav(dir: &Path, index: usize, outcome: &TurnOutcome) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("reply-{index:03}.wav"));
    std::fs::write(&path, outcome.audio())?;
    Ok(path)
}
