//! Per-item analysis: sentiment and topics in parallel, then flagging.

use futures_util::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::backends::{BackendSet, Capability, RuleBasedParser};
use crate::config::{AnalysisConfig, Config};
use crate::error::FeedbackError;
use crate::flagging::FlaggingPolicy;
use crate::sentiment::{SentimentOutcome, SentimentScorer};
use crate::topics::{TopicExtraction, TopicExtractor};
use crate::types::{AnalysisResult, FeedbackInput};
use crate::utils::{clamp_signed_unit, clamp_unit};

/// Analyzes feedback items. Construct once, share by reference or `Arc`.
#[derive(Debug, Clone)]
pub struct FeedbackAnalyzer {
    scorer: Arc<SentimentScorer>,
    extractor: Arc<TopicExtractor>,
    policy: FlaggingPolicy,
    max_topics: usize,
    batch_concurrency: usize,
}

/// Which capabilities an analyzer is running with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendSummary {
    pub sentiment: String,
    pub phrase_ranking: bool,
    pub linguistic: bool,
}

impl FeedbackAnalyzer {
    pub fn new(
        scorer: SentimentScorer,
        extractor: TopicExtractor,
        policy: FlaggingPolicy,
        max_topics: usize,
    ) -> Self {
        Self {
            scorer: Arc::new(scorer),
            extractor: Arc::new(extractor),
            policy,
            max_topics: max_topics.max(1),
            batch_concurrency: 8,
        }
    }

    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    pub fn from_backends(backends: BackendSet, config: &AnalysisConfig) -> Self {
        Self::new(
            SentimentScorer::new(backends.sentiment),
            TopicExtractor::new(backends.phrases, backends.linguistic),
            FlaggingPolicy::from_config(config),
            config.max_topics,
        )
        .with_batch_concurrency(config.batch_concurrency)
    }

    /// Load the configured backends once and build the analyzer around them.
    /// Backends that fail to load leave their component in fallback mode.
    pub async fn initialize(config: &Config) -> Self {
        let models = config.models.clone();
        let backends =
            match tokio::task::spawn_blocking(move || BackendSet::initialize(&models)).await {
                Ok(backends) => backends,
                Err(e) => {
                    warn!("Backend initialization aborted: {}; using fallbacks", e);
                    BackendSet::absent()
                }
            };
        let analyzer = Self::from_backends(backends, &config.analysis);
        info!("Feedback analyzer ready: {:?}", analyzer.backend_summary());
        analyzer
    }

    /// Lexicon sentiment and the built-in parser; never touches model files.
    pub fn rule_based(config: &AnalysisConfig) -> Self {
        Self::from_backends(
            BackendSet {
                sentiment: Capability::Absent,
                phrases: Capability::Absent,
                linguistic: Capability::Present(Arc::new(RuleBasedParser::new())),
            },
            config,
        )
    }

    pub fn policy(&self) -> &FlaggingPolicy {
        &self.policy
    }

    pub fn max_topics(&self) -> usize {
        self.max_topics
    }

    pub fn backend_summary(&self) -> BackendSummary {
        let (phrase_ranking, linguistic) = self.extractor.strategies();
        BackendSummary {
            sentiment: self.scorer.backend_name().to_string(),
            phrase_ranking,
            linguistic,
        }
    }

    /// Analyze one item. Never fails: component errors are recorded in
    /// `processing_error` and that component falls back to its neutral output.
    pub async fn analyze(&self, input: &FeedbackInput) -> AnalysisResult {
        let text: Arc<str> = Arc::from(input.text.as_str());

        let scorer = Arc::clone(&self.scorer);
        let sentiment_text = Arc::clone(&text);
        let sentiment_task = tokio::spawn(async move { scorer.score_unrounded(&sentiment_text).await });

        let extractor = Arc::clone(&self.extractor);
        let topic_text = Arc::clone(&text);
        let max_topics = self.max_topics;
        let topic_task =
            tokio::spawn(async move { extractor.try_extract(&topic_text, max_topics).await });

        let (sentiment, topics) = tokio::join!(sentiment_task, topic_task);

        let mut builder = AnalysisBuilder::default();
        builder = match sentiment.map_err(FeedbackError::from).and_then(|r| r) {
            Ok(outcome) => builder.sentiment(outcome),
            Err(e) => builder.failure("sentiment", &e),
        };
        builder = match topics.map_err(FeedbackError::from).and_then(|r| r) {
            Ok(extraction) => builder.topics(extraction),
            Err(e) => builder.failure("topics", &e),
        };

        let result = builder.finish(&self.policy, &input.text);
        match result.processing_error() {
            Some(err) => error!("Feedback analysis degraded: {}", err),
            None => debug!(
                "analyzed feedback: sentiment={} flagged={} priority={}",
                result.sentiment(),
                result.flagged(),
                result.priority()
            ),
        }
        result
    }

    /// Analyze many items, at most `batch_concurrency` at a time. Output order matches input.
    pub async fn analyze_batch(&self, inputs: &[FeedbackInput]) -> Vec<AnalysisResult> {
        futures_util::stream::iter(inputs.iter().map(|input| self.analyze(input)))
            .buffered(self.batch_concurrency)
            .collect()
            .await
    }
}

/// Accumulates component outputs and emits one finished [`AnalysisResult`].
#[derive(Debug, Default)]
pub(crate) struct AnalysisBuilder {
    sentiment: Option<SentimentOutcome>,
    topics: Option<TopicExtraction>,
    errors: Vec<String>,
}

impl AnalysisBuilder {
    pub(crate) fn sentiment(mut self, outcome: SentimentOutcome) -> Self {
        self.sentiment = Some(outcome);
        self
    }

    pub(crate) fn topics(mut self, extraction: TopicExtraction) -> Self {
        self.topics = Some(extraction);
        self
    }

    pub(crate) fn failure(mut self, stage: &str, err: &FeedbackError) -> Self {
        self.errors.push(format!("{}: {}", stage, err));
        self
    }

    /// Flag and priority are derived here from the final sentiment, so a failed scorer
    /// still leaves the keyword rule in force.
    pub(crate) fn finish(self, policy: &FlaggingPolicy, text: &str) -> AnalysisResult {
        let raw = self.sentiment.unwrap_or_else(SentimentOutcome::neutral);
        let extraction = self.topics.unwrap_or_default();

        // the threshold sees the full-precision score, priority the reported one
        let flagged = policy.flag(text, clamp_signed_unit(raw.sentiment), raw.label);
        let outcome = raw.rounded();
        let sentiment = outcome.sentiment;
        let priority = policy.priority(flagged, sentiment);

        AnalysisResult {
            sentiment,
            sentiment_label: outcome.label,
            confidence: clamp_unit(outcome.confidence),
            topics: extraction.topics,
            topic_categories: extraction.categories,
            flagged,
            priority,
            processing_error: (!self.errors.is_empty()).then(|| self.errors.join("; ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeedbackChannel, Priority, SentimentLabel};

    fn input(text: &str) -> FeedbackInput {
        FeedbackInput::new(text, FeedbackChannel::Web).unwrap()
    }

    #[test]
    fn empty_builder_finishes_neutral() {
        let result = AnalysisBuilder::default().finish(&FlaggingPolicy::default(), "fine");
        assert_eq!(result.sentiment(), 0.0);
        assert_eq!(result.sentiment_label(), SentimentLabel::Neutral);
        assert!(result.topics().is_empty());
        assert!(!result.flagged());
        assert!(result.processing_error().is_none());
    }

    #[test]
    fn failures_are_joined_and_keywords_still_flag() {
        let err = FeedbackError::Inference {
            message: "boom".to_string(),
        };
        let result = AnalysisBuilder::default()
            .failure("sentiment", &err)
            .failure("topics", &err)
            .finish(&FlaggingPolicy::default(), "urgent: no hot water");
        assert!(result.flagged());
        assert_eq!(result.priority(), Priority::Normal);
        let msg = result.processing_error().unwrap();
        assert!(msg.starts_with("sentiment: Inference error: boom"));
        assert!(msg.contains("; topics:"));
    }

    fn negative(sentiment: f64) -> SentimentOutcome {
        SentimentOutcome {
            sentiment,
            label: SentimentLabel::Negative,
            confidence: 0.9,
        }
    }

    #[test]
    fn threshold_compares_before_rounding() {
        let policy = FlaggingPolicy::default();
        let near = AnalysisBuilder::default()
            .sentiment(negative(-0.69996))
            .finish(&policy, "cold shower");
        assert_eq!(near.sentiment(), -0.7);
        assert!(!near.flagged());
        assert_eq!(near.priority(), Priority::Normal);

        let past = AnalysisBuilder::default()
            .sentiment(negative(-0.70004))
            .finish(&policy, "cold shower");
        assert_eq!(past.sentiment(), -0.7);
        assert!(past.flagged());
        assert_eq!(past.priority(), Priority::High);
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let analyzer =
            FeedbackAnalyzer::rule_based(&AnalysisConfig::default()).with_batch_concurrency(2);
        let inputs = vec![
            input("Terrible, awful stay"),
            input("Excellent breakfast"),
            input("The pool was fine"),
        ];
        let results = analyzer.analyze_batch(&inputs).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].sentiment_label(), SentimentLabel::Negative);
        assert_eq!(results[1].sentiment_label(), SentimentLabel::Positive);
        assert!(results[2].topics().contains(&"pool".to_string()));
    }

    #[test]
    fn rule_based_summary_lists_parser_only() {
        let analyzer = FeedbackAnalyzer::rule_based(&AnalysisConfig::default());
        let summary = analyzer.backend_summary();
        assert_eq!(summary.sentiment, "lexicon");
        assert!(!summary.phrase_ranking);
        assert!(summary.linguistic);
    }
}
