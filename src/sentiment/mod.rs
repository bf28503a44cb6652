//! Sentiment scoring on a common `[-1, 1]` scale.

pub mod normalize;
pub mod polarity;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backends::{Capability, SentimentBackend};
use crate::error::{FeedbackError, Result};
use crate::types::SentimentLabel;
use crate::utils::{clamp_signed_unit, clamp_unit, round3};

pub use polarity::lexical_polarity;

/// Lexical polarity beyond which the fallback leaves neutral
const POLARITY_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentOutcome {
    pub sentiment: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl SentimentOutcome {
    pub fn neutral() -> Self {
        Self {
            sentiment: 0.0,
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }

    /// Clamp and round to output precision.
    pub fn rounded(self) -> Self {
        Self {
            sentiment: round3(clamp_signed_unit(self.sentiment)),
            label: self.label,
            confidence: round3(clamp_unit(self.confidence)),
        }
    }
}

/// Scores text with the configured classifier, or the lexicon heuristic when none is loaded.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    backend: Capability<dyn SentimentBackend>,
}

impl SentimentScorer {
    pub fn new(backend: Capability<dyn SentimentBackend>) -> Self {
        Self { backend }
    }

    pub fn lexical() -> Self {
        Self::new(Capability::Absent)
    }

    pub fn with_backend(backend: Arc<dyn SentimentBackend>) -> Self {
        Self::new(Capability::Present(backend))
    }

    pub fn uses_model(&self) -> bool {
        self.backend.is_present()
    }

    pub fn backend_name(&self) -> &str {
        match &self.backend {
            Capability::Present(b) => b.name(),
            Capability::Absent => "lexicon",
        }
    }

    /// Score `text`, surfacing backend failures.
    pub async fn try_score(&self, text: &str) -> Result<SentimentOutcome> {
        Ok(self.score_unrounded(text).await?.rounded())
    }

    /// Clamped to range but at full precision.
    pub(crate) async fn score_unrounded(&self, text: &str) -> Result<SentimentOutcome> {
        let outcome = match &self.backend {
            Capability::Present(backend) => {
                let scores = backend.classify(text).await?;
                let best = normalize::best_class(&scores).ok_or_else(|| {
                    FeedbackError::Inference {
                        message: "sentiment backend returned an empty distribution".to_string(),
                    }
                })?;
                let (sentiment, confidence) = normalize::to_scale(best);
                SentimentOutcome {
                    sentiment,
                    label: best.label,
                    confidence,
                }
            }
            Capability::Absent => from_polarity(lexical_polarity(text)),
        };
        debug!(
            "sentiment {:.3} ({}, confidence {:.3})",
            outcome.sentiment, outcome.label, outcome.confidence
        );
        Ok(SentimentOutcome {
            sentiment: clamp_signed_unit(outcome.sentiment),
            label: outcome.label,
            confidence: clamp_unit(outcome.confidence),
        })
    }

    /// Score `text`; any failure yields the neutral outcome.
    pub async fn score(&self, text: &str) -> SentimentOutcome {
        match self.try_score(text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Sentiment scoring failed: {}", e);
                SentimentOutcome::neutral()
            }
        }
    }
}

fn from_polarity(polarity: f64) -> SentimentOutcome {
    let polarity = clamp_signed_unit(polarity);
    let label = if polarity > POLARITY_MARGIN {
        SentimentLabel::Positive
    } else if polarity < -POLARITY_MARGIN {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };
    SentimentOutcome {
        sentiment: polarity,
        label,
        confidence: polarity.abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ClassScore;
    use async_trait::async_trait;

    struct FixedBackend(Vec<ClassScore>);

    #[async_trait]
    impl SentimentBackend for FixedBackend {
        async fn classify(&self, _text: &str) -> Result<Vec<ClassScore>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl SentimentBackend for FailingBackend {
        async fn classify(&self, _text: &str) -> Result<Vec<ClassScore>> {
            Err(FeedbackError::Inference {
                message: "device lost".to_string(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn lexical_fallback_scores_complaint() {
        let scorer = SentimentScorer::lexical();
        let out = scorer
            .score("This is terrible! The room was dirty and the service was awful. Very urgent issue!")
            .await;
        assert_eq!(out.label, SentimentLabel::Negative);
        assert_eq!(out.sentiment, -0.867);
        assert_eq!(out.confidence, 0.867);
    }

    #[tokio::test]
    async fn lexical_fallback_scores_praise() {
        let out = SentimentScorer::lexical()
            .score("The service was excellent and the room was very clean. Great experience!")
            .await;
        assert_eq!(out.label, SentimentLabel::Positive);
        assert_eq!(out.sentiment, 0.76);
    }

    #[tokio::test]
    async fn weak_polarity_is_neutral() {
        let out = SentimentScorer::lexical().score("Fine location but cold rooms").await;
        assert_eq!(out.label, SentimentLabel::Neutral);
        assert_eq!(out.sentiment, 0.05);
        assert_eq!(out.confidence, 0.05);
    }

    #[tokio::test]
    async fn model_distribution_is_normalized_and_rounded() {
        let scorer = SentimentScorer::with_backend(Arc::new(FixedBackend(vec![
            ClassScore::new(SentimentLabel::Negative, 0.05),
            ClassScore::new(SentimentLabel::Neutral, 0.15),
            ClassScore::new(SentimentLabel::Positive, 0.8),
        ])));
        assert!(scorer.uses_model());
        let out = scorer.score("lovely").await;
        assert_eq!(out.label, SentimentLabel::Positive);
        assert_eq!(out.sentiment, 1.0);
        assert_eq!(out.confidence, 0.8);
    }

    #[tokio::test]
    async fn backend_failure_is_surfaced_by_try_score_only() {
        let scorer = SentimentScorer::with_backend(Arc::new(FailingBackend));
        assert!(scorer.try_score("anything").await.is_err());
        assert_eq!(scorer.score("anything").await, SentimentOutcome::neutral());
    }

    #[tokio::test]
    async fn empty_distribution_is_an_inference_error() {
        let scorer = SentimentScorer::with_backend(Arc::new(FixedBackend(Vec::new())));
        let err = scorer.try_score("x").await.unwrap_err();
        assert!(matches!(err, FeedbackError::Inference { .. }));
    }
}
