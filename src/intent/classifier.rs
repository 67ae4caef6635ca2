//! Embedding-based intent classification.

use crate::defaults;
use crate::error::Result;
use crate::intent::bank::IntentBank;
use crate::intent::embedding::{Embedder, Embedding};
use crate::language::Language;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of classifying one utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// A bank intent, or [`defaults::FALLBACK_INTENT`].
    pub intent: String,
    /// Best same-language similarity, when any candidate was scored.
    pub score: Option<f32>,
}

impl Classification {
    fn fallback(score: Option<f32>) -> Self {
        Self {
            intent: defaults::FALLBACK_INTENT.to_string(),
            score,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.intent == defaults::FALLBACK_INTENT
    }
}

struct BankVector {
    intent: String,
    language: Language,
    embedding: Embedding,
}

/// Classifies utterances against a pre-embedded intent bank.
///
/// The bank is embedded once at construction and kept for the lifetime of the
/// classifier. Each utterance is embedded on demand and compared only with
/// bank entries of the same language.
pub struct IntentClassifier {
    embedder: Box<dyn Embedder>,
    vectors: Vec<BankVector>,
    min_score: f32,
}

impl std::fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("embedder", &self.embedder.model_name())
            .field("vectors", &format_args!("[{} entries]", self.vectors.len()))
            .field("min_score", &self.min_score)
            .finish()
    }
}

impl IntentClassifier {
    /// Embed every bank entry in one batch.
    ///
    /// # Errors
    /// Returns the embedder's error if the batch cannot be encoded, or an
    /// embedding error if it returns the wrong number of vectors.
    pub fn new(bank: &IntentBank, embedder: Box<dyn Embedder>) -> Result<Self> {
        let entries = bank.entries();
        let texts: Vec<&str> = entries.iter().map(|e| e.example.as_str()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.encode(&texts)?
        };

        if embeddings.len() != entries.len() {
            return Err(crate::error::VoicedeskError::Embedding {
                message: format!(
                    "expected {} bank embeddings, got {}",
                    entries.len(),
                    embeddings.len()
                ),
            });
        }

        let vectors = entries
            .into_iter()
            .zip(embeddings)
            .map(|(entry, embedding)| BankVector {
                intent: entry.intent,
                language: entry.language,
                embedding,
            })
            .collect::<Vec<_>>();

        info!(
            model = embedder.model_name(),
            entries = vectors.len(),
            "intent bank embedded"
        );

        Ok(Self {
            embedder,
            vectors,
            min_score: defaults::MIN_INTENT_SCORE,
        })
    }

    /// Set the minimum accepted similarity (inclusive).
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    /// Number of embedded bank entries.
    pub fn bank_size(&self) -> usize {
        self.vectors.len()
    }

    /// Classify `text` in `language`.
    ///
    /// Empty or whitespace-only text is fallback without touching the
    /// embedder. So is a language with no bank entries, a best score below
    /// the minimum, or an embedder failure. Ties keep the earliest bank entry.
    pub fn classify(&self, text: &str, language: Language) -> Classification {
        if text.trim().is_empty() {
            debug!("empty utterance, fallback intent");
            return Classification::fallback(None);
        }

        let query = match self.embedder.encode(&[text]) {
            Ok(mut embeddings) if embeddings.len() == 1 => embeddings.remove(0),
            Ok(embeddings) => {
                warn!(
                    count = embeddings.len(),
                    "embedder returned wrong number of vectors, fallback intent"
                );
                return Classification::fallback(None);
            }
            Err(e) => {
                warn!(error = %e, "utterance embedding failed, fallback intent");
                return Classification::fallback(None);
            }
        };

        let mut best: Option<(&str, f32)> = None;
        for candidate in self.vectors.iter().filter(|v| v.language == language) {
            let score = query.cosine(&candidate.embedding);
            if score.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((candidate.intent.as_str(), score));
            }
        }

        match best {
            None => {
                debug!(language = %language, "no bank entries for language, fallback intent");
                Classification::fallback(None)
            }
            Some((_, score)) if score < self.min_score => {
                debug!(
                    language = %language,
                    score,
                    min_score = self.min_score,
                    "best match below threshold, fallback intent"
                );
                Classification::fallback(Some(score))
            }
            Some((intent, score)) => {
                debug!(language = %language, intent, score, "intent matched");
                Classification {
                    intent: intent.to_string(),
                    score: Some(score),
                }
            }
        }
    }
}
