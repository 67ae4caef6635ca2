//! Sentence embedding engine contract and the built-in offline engine.

use crate::defaults;
use crate::error::{Result, VoicedeskError};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A unit-length embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Wrap a raw vector, scaling it to unit length.
    ///
    /// A zero vector stays zero; its similarity to anything is 0.
    pub fn normalized(mut values: Vec<f32>) -> Self {
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Cosine similarity with another embedding.
    ///
    /// Both sides are unit length, so this is the dot product. Vectors of
    /// different dimension score 0.
    pub fn cosine(&self, other: &Embedding) -> f32 {
        if self.0.len() != other.0.len() {
            return 0.0;
        }
        self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum()
    }
}

/// Trait for sentence embedding engines.
///
/// Must be deterministic for identical input and model version.
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts. Output order matches input order.
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Name of the model, for logging.
    fn model_name(&self) -> &str;
}

impl<T: Embedder> Embedder for Arc<T> {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).encode(texts)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Character n-gram hashing embedder.
///
/// Lowercases the text, pads each word with boundary markers and hashes its
/// character 1- to 3-grams into a fixed number of buckets (FNV-1a). Cheap,
/// offline and deterministic; close spellings land close together, unrelated
/// strings stay far apart.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn fnv1a(chars: &[char]) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for ch in chars {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
        }
        hash
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let mut values = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let padded: Vec<char> = std::iter::once('<')
                .chain(word.chars())
                .chain(std::iter::once('>'))
                .collect();
            for n in 1..=3 {
                // Weight longer n-grams higher; they carry most of the identity
                let weight = n as f32;
                for gram in padded.windows(n) {
                    if n == 1 && (gram[0] == '<' || gram[0] == '>') {
                        continue;
                    }
                    let bucket = (Self::fnv1a(gram) % self.dim as u64) as usize;
                    values[bucket] += weight;
                }
            }
        }
        Embedding::normalized(values)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(defaults::EMBEDDING_DIM)
    }
}

impl Embedder for HashingEmbedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_name(&self) -> &str {
        "char-ngram-hash"
    }
}

/// Embedder with a fixed vector per text, for tests.
///
/// Unknown texts fail with an embedding error. Counts how many texts it has
/// encoded so tests can assert it was (or was not) called.
#[derive(Debug, Default)]
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl TableEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vector for `text` (normalized on encode).
    pub fn with(mut self, text: &str, vector: &[f32]) -> Self {
        self.table.insert(text.to_string(), vector.to_vec());
        self
    }

    /// Number of texts encoded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for TableEmbedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        texts
            .iter()
            .map(|text| {
                self.table
                    .get(*text)
                    .map(|v| Embedding::normalized(v.clone()))
                    .ok_or_else(|| VoicedeskError::Embedding {
                        message: format!("no vector registered for '{}'", text),
                    })
            })
            .collect()
    }

    fn model_name(&self) -> &str {
        "table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_has_unit_length() {
        let e = Embedding::normalized(vec![3.0, 4.0]);
        assert_eq!(e.as_slice(), &[0.6, 0.8]);
    }

    #[test]
    fn zero_vector_stays_zero() {
        let e = Embedding::normalized(vec![0.0, 0.0]);
        assert_eq!(e.as_slice(), &[0.0, 0.0]);
        assert_eq!(e.cosine(&Embedding::normalized(vec![1.0, 0.0])), 0.0);
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let a = Embedding::normalized(vec![1.0, 2.0, 3.0]);
        assert!((a.cosine(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = Embedding::normalized(vec![1.0, 0.0]);
        let b = Embedding::normalized(vec![0.0, 5.0]);
        assert_eq!(a.cosine(&b), 0.0);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        let a = Embedding::normalized(vec![2.0, 0.0]);
        let b = Embedding::normalized(vec![-1.0, 0.0]);
        assert_eq!(a.cosine(&b), -1.0);
    }

    #[test]
    fn cosine_of_mismatched_dimensions_is_zero() {
        let a = Embedding::normalized(vec![1.0, 0.0]);
        let b = Embedding::normalized(vec![1.0, 0.0, 0.0]);
        assert_eq!(a.cosine(&b), 0.0);
    }

    #[test]
    fn hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::default();
        let a = embedder.encode(&["where is my refund"]).unwrap();
        let b = embedder.encode(&["where is my refund"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].dim(), defaults::EMBEDDING_DIM);
    }

    #[test]
    fn hashing_embedder_outputs_unit_vectors() {
        let embedder = HashingEmbedder::default();
        for e in embedder.encode(&["hola", "नमस्ते", "مرحبا"]).unwrap() {
            let norm: f32 = e.as_slice().iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn hashing_embedder_ignores_case_and_punctuation() {
        let embedder = HashingEmbedder::default();
        let e = embedder.encode(&["Hola, hay alguien?", "hola hay alguien"]).unwrap();
        assert!((e[0].cosine(&e[1]) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hashing_embedder_separates_unrelated_text() {
        let embedder = HashingEmbedder::default();
        let e = embedder
            .encode(&["where is my refund", "my refund details", "xyzzy plugh"])
            .unwrap();
        assert!(e[0].cosine(&e[1]) > e[0].cosine(&e[2]));
        assert!(e[0].cosine(&e[2]) < 0.5);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        let e = embedder.encode(&[""]).unwrap();
        assert!(e[0].as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn table_embedder_counts_calls() {
        let embedder = TableEmbedder::new().with("a", &[1.0, 0.0]);
        assert_eq!(embedder.calls(), 0);
        embedder.encode(&["a", "a"]).unwrap();
        assert_eq!(embedder.calls(), 2);
    }

    #[test]
    fn table_embedder_fails_for_unknown_text() {
        let embedder = TableEmbedder::new();
        assert!(embedder.encode(&["missing"]).is_err());
    }

    #[test]
    fn embedder_trait_is_object_safe() {
        let embedder: Box<dyn Embedder> = Box::new(HashingEmbedder::default());
        assert_eq!(embedder.model_name(), "char-ngram-hash");
    }
}
