//! Keyphrase ranking by embedding similarity to the source text.

use async_trait::async_trait;
use lru::LruCache;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::embeddings::Embedder;
use crate::error::{FeedbackError, Result};
use crate::lexicon::STOP_WORDS;
use crate::utils::cosine_similarity;

/// Ranks candidate keyphrases of a text, most relevant first.
#[async_trait]
pub trait PhraseRanker: Send + Sync {
    async fn rank_phrases(&self, text: &str, top_k: usize) -> Result<Vec<String>>;
    fn name(&self) -> &str;
}

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// KeyBERT-style ranker: unigram and bigram candidates scored by cosine similarity
/// between the candidate embedding and the document embedding.
pub struct EmbeddingPhraseRanker {
    embedder: Arc<dyn Embedder>,
    cache: Option<Mutex<LruCache<String, Arc<Vec<f32>>>>>,
}

impl EmbeddingPhraseRanker {
    /// `cache_size` 0 disables the candidate embedding cache.
    pub fn new(embedder: Arc<dyn Embedder>, cache_size: usize) -> Self {
        let cache = NonZeroUsize::new(cache_size).map(|n| Mutex::new(LruCache::new(n)));
        Self { embedder, cache }
    }

    /// Embeddings for `phrases`, in order. Cache misses go to the embedder in one batch.
    async fn embed_candidates(&self, phrases: &[String]) -> Result<Vec<Arc<Vec<f32>>>> {
        let mut found: Vec<Option<Arc<Vec<f32>>>> = match &self.cache {
            Some(cache) => {
                let mut cache = cache.lock().map_err(poisoned)?;
                phrases.iter().map(|p| cache.get(p).cloned()).collect()
            }
            None => vec![None; phrases.len()],
        };

        let misses: Vec<String> = phrases
            .iter()
            .zip(&found)
            .filter(|(_, hit)| hit.is_none())
            .map(|(p, _)| p.clone())
            .collect();
        if !misses.is_empty() {
            let vectors = self
                .embedder
                .embed_batch(&misses)
                .await
                .map_err(|e| FeedbackError::Inference {
                    message: format!("embedding failed: {:#}", e),
                })?;
            if vectors.len() != misses.len() {
                return Err(FeedbackError::Inference {
                    message: format!(
                        "embedder returned {} vectors for {} phrases",
                        vectors.len(),
                        misses.len()
                    ),
                });
            }
            let mut fresh = misses.into_iter().zip(vectors.into_iter().map(Arc::new));
            for slot in found.iter_mut().filter(|slot| slot.is_none()) {
                if let Some((phrase, vector)) = fresh.next() {
                    if let Some(cache) = &self.cache {
                        cache.lock().map_err(poisoned)?.put(phrase, Arc::clone(&vector));
                    }
                    *slot = Some(vector);
                }
            }
        }

        Ok(found.into_iter().flatten().collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder
            .embed(text)
            .await
            .map_err(|e| FeedbackError::Inference {
                message: format!("embedding failed: {:#}", e),
            })
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> FeedbackError {
    FeedbackError::Internal {
        message: "embedding cache lock poisoned".to_string(),
    }
}

/// Lowercase unigrams and adjacent bigrams without stop words, in first-appearance order.
pub fn candidate_phrases(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w))
        .collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |phrase: String| {
        if seen.insert(phrase.clone()) {
            out.push(phrase);
        }
    };
    for (i, word) in words.iter().enumerate() {
        push(word.to_string());
        if let Some(next) = words.get(i + 1) {
            push(format!("{} {}", word, next));
        }
    }
    out
}

#[async_trait]
impl PhraseRanker for EmbeddingPhraseRanker {
    async fn rank_phrases(&self, text: &str, top_k: usize) -> Result<Vec<String>> {
        let candidates = candidate_phrases(text);
        if candidates.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let doc = self.embed(text).await?;
        let vectors = self.embed_candidates(&candidates).await?;
        let mut scored: Vec<(String, f32)> = candidates
            .into_iter()
            .zip(vectors)
            .map(|(phrase, vector)| {
                let score = cosine_similarity(&doc, &vector);
                (phrase, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);
        debug!("ranked {} phrases", scored.len());
        Ok(scored.into_iter().map(|(p, _)| p).collect())
    }

    fn name(&self) -> &str {
        "embedding"
    }
}
