use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::io::{BufRead, IsTerminal};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voicedesk::app::{Overrides, build_orchestrator, build_transcriber};
use voicedesk::cli::{Cli, Commands, ConfigAction};
use voicedesk::config::Config;
use voicedesk::intent::IntentBank;
use voicedesk::language::{Language, parse_forced};
use voicedesk::output::{render_failure, render_turn, write_reply_wav};
use voicedesk::pipeline::{Orchestrator, TurnOutcome};
use voicedesk::session::Session;
use voicedesk::tts::command::SystemCommandExecutor;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match &cli.command {
        Commands::Say { text } => {
            let (orchestrator, forced) = prepare(&cli, false)?;
            let mut session = Session::new(&orchestrator, forced);
            let result = session.say(text);
            let ok = finish_turn(&cli, 1, result);
            export_transcript(&cli, &session)?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Listen { wav } => {
            let (orchestrator, forced) = prepare(&cli, true)?;
            let bytes = std::fs::read(wav)
                .with_context(|| format!("Failed to read audio from {}", wav.display()))?;
            let mut session = Session::new(&orchestrator, forced);
            let result = session.listen(&bytes);
            let ok = finish_turn(&cli, 1, result);
            export_transcript(&cli, &session)?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Chat => {
            let (orchestrator, forced) = prepare(&cli, true)?;
            run_chat(&cli, &orchestrator, forced)?;
        }
        Commands::Languages => list_languages(),
        Commands::Intents => list_intents(),
        Commands::Config { action } => handle_config_command(action, &cli)?,
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "voicedesk",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Map `-q`/`-v` to a log level; `RUST_LOG` takes precedence.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/voicedesk/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

/// Effective config: file, then environment, then command-line flags.
fn effective_config(cli: &Cli) -> Result<Config> {
    let overrides = Overrides {
        forced: cli.language.map(|l| l.0),
        speaker: cli.speaker.clone(),
    };
    Ok(overrides.apply(load_config(cli.config.as_deref())?))
}

/// Build the orchestrator, with speech-to-text when `audio` is set.
fn prepare(cli: &Cli, audio: bool) -> Result<(Orchestrator, Option<Language>)> {
    let config = effective_config(cli)?;
    let forced = config.forced_language()?;
    let mut orchestrator = build_orchestrator(&config, Arc::new(SystemCommandExecutor))?;

    if audio {
        match build_transcriber(&config) {
            Ok(transcriber) => orchestrator = orchestrator.with_transcriber(Box::new(transcriber)),
            Err(e) => {
                if matches!(cli.command, Commands::Listen { .. }) {
                    return Err(e.into());
                }
                tracing::warn!(error = %e, "speech-to-text unavailable, /listen disabled");
            }
        }
    }

    Ok((orchestrator, forced))
}

/// Print a turn and save its audio, or report why it failed.
///
/// Returns whether the turn was voiced.
fn finish_turn(cli: &Cli, index: usize, result: voicedesk::Result<TurnOutcome>) -> bool {
    let color = std::io::stdout().is_terminal();
    match result {
        Ok(outcome) => {
            if cli.quiet {
                println!("{}", outcome.reply.text);
            } else {
                print!("{}", render_turn(&outcome, color));
            }
            match write_reply_wav(&cli.out_dir, index, &outcome) {
                Ok(path) => {
                    if !cli.quiet {
                        println!("{} {}", "Audio:".dimmed(), path.display());
                    }
                }
                Err(e) => eprintln!("{}", render_failure(&e, color)),
            }
            true
        }
        Err(e) => {
            eprintln!("{}", render_failure(&e, std::io::stderr().is_terminal()));
            false
        }
    }
}

/// Line-oriented session on stdin.
fn run_chat(cli: &Cli, orchestrator: &Orchestrator, forced: Option<Language>) -> Result<()> {
    let mut session = Session::new(orchestrator, forced);
    let interactive = std::io::stdin().is_terminal();

    if let Some(greeting) = session.transcript().last() {
        println!("{}", greeting.text.green());
    }
    if interactive {
        eprintln!(
            "{}",
            "Type a question, /listen <WAV>, /language <LANG>, or /quit".dimmed()
        );
    }

    let mut index = 0;
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit" | "/exit", _) => break,
            ("/language", value) => match parse_forced(value) {
                Ok(language) => {
                    session.set_forced_language(language);
                    let shown = language.map_or("auto", Language::code);
                    println!("{} {}", "Language:".dimmed(), shown);
                }
                Err(e) => eprintln!("{}", render_failure(&e, interactive)),
            },
            ("/listen", path) => {
                let path = path.trim();
                match std::fs::read(path) {
                    Ok(bytes) => {
                        index += 1;
                        let result = session.listen(&bytes);
                        finish_turn(cli, index, result);
                    }
                    Err(e) => eprintln!("{}", render_failure(&format!("{path}: {e}"), interactive)),
                }
            }
            _ => {
                index += 1;
                let result = session.say(line);
                finish_turn(cli, index, result);
            }
        }
    }

    export_transcript(cli, &session)
}

fn export_transcript(cli: &Cli, session: &Session<'_>) -> Result<()> {
    if let Some(path) = &cli.transcript {
        session
            .transcript()
            .export(path)
            .with_context(|| format!("Failed to export transcript to {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{} {}", "Transcript:".dimmed(), path.display());
        }
    }
    Ok(())
}

fn list_languages() {
    println!("Supported languages:");
    for language in Language::ALL {
        println!("  {}  {}", language.code().bold(), language.display_name());
    }
}

fn list_intents() {
    let bank = IntentBank::builtin();
    let missing = bank.missing_examples();

    println!("Intents ({} examples):", bank.len());
    for intent in bank.intents() {
        let counts: Vec<String> = Language::ALL
            .iter()
            .map(|&language| format!("{}:{}", language.code(), bank.examples(intent, language).len()))
            .collect();
        println!("  {:<16} {}", intent.bold(), counts.join(" ").dimmed());
    }

    if missing.is_empty() {
        println!("{}", "Every intent has examples in every language".green());
    } else {
        for (intent, language) in missing {
            println!(
                "  {} {} has no {} examples",
                "incomplete:".yellow(),
                intent,
                language.code()
            );
        }
    }
}

/// Handle configuration commands.
fn handle_config_command(action: &ConfigAction, cli: &Cli) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = effective_config(cli)?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Path => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
