//! Turn pipeline.
//!
//! One turn runs strictly in order: language resolution, intent
//! classification, response selection, then tiered synthesis. Components are
//! built once and passed into the [`Orchestrator`]; turns never mutate them.

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::{Origin, Reply, TurnOutcome, Utterance};
