use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::info;

use crate::config::ModelConfig;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, in order. Model-backed embedders batch the forward pass.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize;
}

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid word regex"));

/// Deterministic local embedder based on feature hashing of lowercase words.
///
/// Texts sharing words land close together, which is enough to rank candidate phrases
/// against their source document without any model files.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut out = vec![0.0f32; self.dims];
        let lowered = text.to_lowercase();
        for word in WORD.find_iter(&lowered) {
            let digest = blake3::hash(word.as_str().as_bytes());
            let bytes = digest.as_bytes();
            let mut idx = [0u8; 8];
            idx.copy_from_slice(&bytes[..8]);
            let slot = (u64::from_le_bytes(idx) % self.dims as u64) as usize;
            // top bit of the next byte picks the sign
            let sign = if bytes[8] & 0x80 == 0 { 1.0 } else { -1.0 };
            out[slot] += sign;
        }

        // Normalize to unit length to emulate real embeddings
        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut out {
                *v /= norm;
            }
        }
        out
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate(text))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Build the embedder selected by `phrase_backend`. `Ok(None)` when phrase ranking is off.
///
/// The BGE path reads model files and may download them, so call this off the async runtime.
pub fn create_embedder(config: &ModelConfig) -> Result<Option<Arc<dyn Embedder>>> {
    match config.phrase_backend.as_str() {
        "bge" => {
            let files = super::model_files::resolve(
                &config.embedding_model,
                config.embedding_model_dir.as_deref(),
                config.allow_download,
            )?;
            info!("Using BGE embeddings (model={})", config.embedding_model);
            Ok(Some(Arc::new(super::bge::BgeEmbedder::load(&files)?)))
        }
        "hash" => {
            info!(
                "Using hashed word embeddings (dims={})",
                config.embedding_dimensions
            );
            Ok(Some(Arc::new(HashEmbedder::new(config.embedding_dimensions))))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::cosine_similarity;

    #[tokio::test]
    async fn hash_embeddings_are_deterministic_and_unit_length() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("Clean room, friendly staff").await.unwrap();
        let b = embedder.embed("clean ROOM friendly staff").await.unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_words_score_higher_than_unrelated_ones() {
        let embedder = HashEmbedder::new(384);
        let doc = embedder
            .embed("the breakfast buffet was cold and the coffee was weak")
            .await
            .unwrap();
        let related = embedder.embed("breakfast buffet").await.unwrap();
        let unrelated = embedder.embed("parking garage").await.unwrap();
        assert!(cosine_similarity(&doc, &related) > cosine_similarity(&doc, &unrelated));
    }

    #[tokio::test]
    async fn punctuation_only_text_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new(8);
        let v = embedder.embed("?!").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn none_backend_builds_nothing() {
        let config = ModelConfig::rule_based();
        assert!(create_embedder(&config).unwrap().is_none());
    }
}
