//! Pluggable model capabilities.
//!
//! Each capability is resolved once at startup into [`Capability::Present`] or
//! [`Capability::Absent`]. A failed load is logged and becomes `Absent`; callers pick their
//! fallback by matching on the variant, never by catching per-call errors.

pub mod bge;
pub mod embeddings;
pub mod linguistic;
pub mod model_files;
pub mod phrases;
pub mod sentiment;

use crate::config::ModelConfig;
use std::sync::Arc;
use tracing::{info, warn};

pub use embeddings::{Embedder, HashEmbedder};
pub use linguistic::{
    EntityLabel, LinguisticParser, NamedEntity, ParsedText, ParsedToken, PartOfSpeech,
    RuleBasedParser,
};
pub use phrases::{EmbeddingPhraseRanker, PhraseRanker};
pub use sentiment::{ClassScore, SentimentBackend, XlmRobertaSentiment};

/// A backend that is either loaded and shareable, or known to be unavailable.
pub enum Capability<T: ?Sized> {
    Present(Arc<T>),
    Absent,
}

impl<T: ?Sized> Capability<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Capability::Present(_))
    }

    /// Turn the outcome of a one-time initialization into a variant.
    /// `Ok(None)` means the backend is switched off by configuration.
    pub fn from_init(name: &str, outcome: anyhow::Result<Option<Arc<T>>>) -> Self {
        match outcome {
            Ok(Some(backend)) => {
                info!("{} backend ready", name);
                Capability::Present(backend)
            }
            Ok(None) => {
                info!("{} backend disabled by configuration", name);
                Capability::Absent
            }
            Err(e) => {
                warn!(
                    "Failed to initialize {} backend: {:#}; continuing in fallback mode",
                    name, e
                );
                Capability::Absent
            }
        }
    }
}

impl<T: ?Sized> Clone for Capability<T> {
    fn clone(&self) -> Self {
        match self {
            Capability::Present(b) => Capability::Present(Arc::clone(b)),
            Capability::Absent => Capability::Absent,
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Present(_) => f.write_str("Present"),
            Capability::Absent => f.write_str("Absent"),
        }
    }
}

/// All capabilities the pipeline can use, resolved from configuration.
#[derive(Debug, Clone)]
pub struct BackendSet {
    pub sentiment: Capability<dyn SentimentBackend>,
    pub phrases: Capability<dyn PhraseRanker>,
    pub linguistic: Capability<dyn LinguisticParser>,
}

impl BackendSet {
    pub fn absent() -> Self {
        Self {
            sentiment: Capability::Absent,
            phrases: Capability::Absent,
            linguistic: Capability::Absent,
        }
    }

    /// Load every configured backend. Blocking: model files are read (and possibly
    /// downloaded) here, so async callers should run this on a blocking thread.
    pub fn initialize(config: &ModelConfig) -> Self {
        Self {
            sentiment: Capability::from_init("sentiment", init_sentiment(config)),
            phrases: Capability::from_init("phrase ranking", init_phrases(config)),
            linguistic: Capability::from_init("linguistic", init_linguistic(config)),
        }
    }
}

fn init_sentiment(config: &ModelConfig) -> anyhow::Result<Option<Arc<dyn SentimentBackend>>> {
    match config.sentiment_backend.as_str() {
        "candle" => {
            let files = model_files::resolve(
                &config.sentiment_model,
                config.sentiment_model_dir.as_deref(),
                config.allow_download,
            )?;
            info!("Loading sentiment model {}", config.sentiment_model);
            let model = XlmRobertaSentiment::load(&files, &config.sentiment_model)?;
            Ok(Some(Arc::new(model)))
        }
        _ => Ok(None),
    }
}

fn init_phrases(config: &ModelConfig) -> anyhow::Result<Option<Arc<dyn PhraseRanker>>> {
    let embedder = match embeddings::create_embedder(config)? {
        Some(embedder) => embedder,
        None => return Ok(None),
    };
    Ok(Some(Arc::new(EmbeddingPhraseRanker::new(
        embedder,
        config.embedding_cache_size,
    ))))
}

fn init_linguistic(config: &ModelConfig) -> anyhow::Result<Option<Arc<dyn LinguisticParser>>> {
    match config.linguistic_backend.as_str() {
        "rules" => Ok(Some(Arc::new(RuleBasedParser::new()))),
        _ => Ok(None),
    }
}
