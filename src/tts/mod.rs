//! Text-to-speech: backends and the tiered fallback chain.

pub mod chain;
pub mod command;
pub mod synthesizer;

pub use chain::{Advisory, SynthesisChain, SynthesisOutput, SynthesisTier, TierKind};
pub use command::{CommandExecutor, CommandSpec, CommandSynthesizer, SystemCommandExecutor};
pub use synthesizer::{SpeakerReference, SpeechSynthesizer, Waveform};
