//! Topic extraction: phrase ranking and linguistic candidates, cleaned, ranked and categorized.

pub mod categorize;
pub mod clean;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backends::linguistic::without_determiner;
use crate::backends::{
    Capability, EntityLabel, LinguisticParser, ParsedText, PartOfSpeech, PhraseRanker,
    RuleBasedParser,
};
use crate::error::Result;
use crate::types::TopicCategories;
use crate::utils::OrderedCounter;

pub use categorize::categorize;
pub use clean::clean_topic;

pub const DEFAULT_MAX_TOPICS: usize = 5;
/// Ranked phrases requested from the phrase strategy
pub const PHRASE_TOP_K: usize = 10;

const MAX_CHUNK_WORDS: usize = 2;
const MIN_CANDIDATE_CHARS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicExtraction {
    pub topics: Vec<String>,
    pub categories: TopicCategories,
    /// Deduplicated raw candidates before cleaning, for diagnostics
    pub all_topics: Vec<String>,
}

/// Combines the phrase and linguistic strategies. Either may be absent.
#[derive(Debug, Clone)]
pub struct TopicExtractor {
    phrases: Capability<dyn PhraseRanker>,
    parser: Capability<dyn LinguisticParser>,
}

impl TopicExtractor {
    pub fn new(
        phrases: Capability<dyn PhraseRanker>,
        parser: Capability<dyn LinguisticParser>,
    ) -> Self {
        Self { phrases, parser }
    }

    /// Linguistic strategy only, on the built-in parser.
    pub fn rule_based() -> Self {
        Self::new(
            Capability::Absent,
            Capability::Present(Arc::new(RuleBasedParser::new())),
        )
    }

    pub fn strategies(&self) -> (bool, bool) {
        (self.phrases.is_present(), self.parser.is_present())
    }

    /// Extract topics from every strategy that succeeds.
    ///
    /// A failing strategy contributes no candidates. The error is returned only when every
    /// present strategy failed.
    pub async fn try_extract(&self, text: &str, max_topics: usize) -> Result<TopicExtraction> {
        let mut candidates = Vec::new();
        let mut attempted = 0;
        let mut failures = Vec::new();

        if let Capability::Present(ranker) = &self.phrases {
            attempted += 1;
            match ranker.rank_phrases(text, PHRASE_TOP_K).await {
                Ok(phrases) => candidates.extend(phrases),
                Err(e) => {
                    warn!("Phrase ranking ({}) failed: {}", ranker.name(), e);
                    failures.push(e);
                }
            }
        }
        if let Capability::Present(parser) = &self.parser {
            attempted += 1;
            match parser.parse(text).await {
                Ok(parsed) => candidates.extend(linguistic_candidates(&parsed)),
                Err(e) => {
                    warn!("Linguistic parsing ({}) failed: {}", parser.name(), e);
                    failures.push(e);
                }
            }
        }

        if attempted > 0
            && failures.len() == attempted
            && let Some(e) = failures.pop()
        {
            return Err(e);
        }

        let mut counter = OrderedCounter::new();
        for candidate in &candidates {
            if let Some(topic) = clean_topic(candidate) {
                counter.add(&topic);
            }
        }
        let topics: Vec<String> = counter
            .most_common(max_topics)
            .into_iter()
            .map(|(topic, _)| topic)
            .collect();
        let categories = categorize(&topics);
        debug!(
            "extracted {} topics from {} candidates",
            topics.len(),
            candidates.len()
        );

        Ok(TopicExtraction {
            topics,
            categories,
            all_topics: dedup_in_order(candidates),
        })
    }

    /// Extract topics; any failure yields empty structures.
    pub async fn extract(&self, text: &str, max_topics: usize) -> TopicExtraction {
        match self.try_extract(text, max_topics).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Topic extraction failed: {}", e);
                TopicExtraction::default()
            }
        }
    }
}

/// Entities of the kinds worth reporting, short noun chunks, then noun and adjective lemmas.
fn linguistic_candidates(parsed: &ParsedText) -> Vec<String> {
    let entities = parsed
        .entities
        .iter()
        .filter(|e| {
            matches!(
                e.label,
                EntityLabel::Org | EntityLabel::Product | EntityLabel::Event | EntityLabel::Facility
            )
        })
        .map(|e| e.text.clone());

    let chunks = parsed
        .noun_chunks
        .iter()
        .filter(|c| {
            c.split_whitespace().count() <= MAX_CHUNK_WORDS
                && c.chars().count() > MIN_CANDIDATE_CHARS
        })
        .map(|c| without_determiner(c).to_string());

    let lemmas = parsed
        .tokens
        .iter()
        .filter(|t| {
            matches!(t.pos, PartOfSpeech::Noun | PartOfSpeech::Adjective)
                && !t.is_stop
                && !t.is_punct
                && t.text.chars().count() > MIN_CANDIDATE_CHARS
        })
        .map(|t| t.lemma.clone());

    dedup_in_order(entities.chain(chunks).chain(lemmas))
}

fn dedup_in_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{EmbeddingPhraseRanker, HashEmbedder};
    use crate::error::FeedbackError;
    use crate::types::TopicCategory;
    use async_trait::async_trait;

    struct FixedRanker(Vec<&'static str>);

    #[async_trait]
    impl PhraseRanker for FixedRanker {
        async fn rank_phrases(&self, _text: &str, top_k: usize) -> Result<Vec<String>> {
            Ok(self.0.iter().take(top_k).map(|s| s.to_string()).collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct BrokenParser;

    #[async_trait]
    impl LinguisticParser for BrokenParser {
        async fn parse(&self, _text: &str) -> Result<ParsedText> {
            Err(FeedbackError::Internal {
                message: "parser crashed".to_string(),
            })
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    const COMPLAINT: &str =
        "This is terrible! The room was dirty and the service was awful. Very urgent issue!";

    #[tokio::test]
    async fn rule_based_extraction_of_complaint() {
        let out = TopicExtractor::rule_based().extract(COMPLAINT, 5).await;
        assert_eq!(out.topics, vec!["room", "service", "terrible", "dirty", "awful"]);
        assert_eq!(out.categories[&TopicCategory::Room], vec!["room"]);
        assert_eq!(out.categories[&TopicCategory::Service], vec!["service"]);
        assert_eq!(out.categories[&TopicCategory::Cleanliness], vec!["dirty"]);
        assert_eq!(out.categories[&TopicCategory::Other], vec!["terrible", "awful"]);
        assert!(out.all_topics.contains(&"issue".to_string()));
    }

    #[tokio::test]
    async fn frequency_across_strategies_decides_rank() {
        let extractor = TopicExtractor::new(
            Capability::Present(Arc::new(FixedRanker(vec!["pool", "Pool!", "towels"]))),
            Capability::Present(Arc::new(RuleBasedParser::new())),
        );
        let out = extractor
            .extract("The room was fine but the pool was cold.", 3)
            .await;
        // "pool" appears twice from the ranker and once from the parser
        assert_eq!(out.topics[0], "pool");
        assert_eq!(out.topics.len(), 3);
    }

    #[test]
    fn long_chunks_are_measured_with_their_determiner() {
        let parsed = RuleBasedParser::new().parse_sync("The dirty room smelled, the bar was fine.");
        let candidates = linguistic_candidates(&parsed);
        assert!(!candidates.contains(&"dirty room".to_string()));
        assert!(candidates.contains(&"bar".to_string()));
        assert_eq!(candidates.iter().filter(|c| *c == "bar").count(), 1);
    }

    #[tokio::test]
    async fn max_topics_caps_output() {
        let out = TopicExtractor::rule_based().extract(COMPLAINT, 2).await;
        assert_eq!(out.topics.len(), 2);
    }

    #[tokio::test]
    async fn no_strategies_means_no_topics() {
        let extractor = TopicExtractor::new(Capability::Absent, Capability::Absent);
        let out = extractor.extract(COMPLAINT, 5).await;
        assert_eq!(out, TopicExtraction::default());
    }

    struct BrokenRanker;

    #[async_trait]
    impl PhraseRanker for BrokenRanker {
        async fn rank_phrases(&self, _text: &str, _top_k: usize) -> Result<Vec<String>> {
            Err(FeedbackError::Inference {
                message: "embedding failed".to_string(),
            })
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn failed_phrase_ranking_keeps_linguistic_topics() {
        let extractor = TopicExtractor::new(
            Capability::Present(Arc::new(BrokenRanker)),
            Capability::Present(Arc::new(RuleBasedParser::new())),
        );
        let out = extractor
            .try_extract("The room was dirty and the service was awful.", 5)
            .await
            .unwrap();
        assert_eq!(out.topics[..2], ["room", "service"]);
        assert!(out.categories.contains_key(&TopicCategory::Cleanliness));
    }

    #[tokio::test]
    async fn failed_parser_keeps_ranked_phrases() {
        let extractor = TopicExtractor::new(
            Capability::Present(Arc::new(FixedRanker(vec!["pool", "towels"]))),
            Capability::Present(Arc::new(BrokenParser)),
        );
        let out = extractor.try_extract(COMPLAINT, 5).await.unwrap();
        assert_eq!(out.topics, vec!["pool", "towels"]);
    }

    #[tokio::test]
    async fn every_strategy_failing_is_an_error() {
        let extractor = TopicExtractor::new(
            Capability::Present(Arc::new(BrokenRanker)),
            Capability::Present(Arc::new(BrokenParser)),
        );
        assert!(extractor.try_extract(COMPLAINT, 5).await.is_err());
    }

    #[tokio::test]
    async fn failing_strategy_surfaces_in_try_extract_only() {
        let extractor =
            TopicExtractor::new(Capability::Absent, Capability::Present(Arc::new(BrokenParser)));
        assert!(extractor.try_extract(COMPLAINT, 5).await.is_err());
        assert!(extractor.extract(COMPLAINT, 5).await.topics.is_empty());
    }

    #[tokio::test]
    async fn repeated_extraction_is_stable() {
        let extractor = TopicExtractor::new(
            Capability::Present(Arc::new(EmbeddingPhraseRanker::new(
                Arc::new(HashEmbedder::new(128)),
                32,
            ))),
            Capability::Present(Arc::new(RuleBasedParser::new())),
        );
        let a = extractor.extract(COMPLAINT, 5).await;
        let b = extractor.extract(COMPLAINT, 5).await;
        assert_eq!(a, b);
        assert!(a.topics.len() <= 5);
    }
}
