//! Intent bank and embedding-based classification.

pub mod bank;
pub mod classifier;
pub mod embedding;

pub use bank::{IntentBank, IntentBankEntry};
pub use classifier::{Classification, IntentClassifier};
pub use embedding::{Embedder, Embedding, HashingEmbedder};
