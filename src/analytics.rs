//! Corpus-level aggregation over a time window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FeedbackError, Result};
use crate::types::{AnalysisResult, SentimentLabel, StoredFeedback};
use crate::utils::{OrderedCounter, round3};

/// Topics reported in an [`AggregateReport`]
pub const TOP_TOPICS_LIMIT: usize = 10;

/// Anything the aggregator can read: a timestamped analysis outcome.
pub trait AnalyzedRecord {
    fn created_at(&self) -> DateTime<Utc>;
    fn sentiment(&self) -> Option<f64>;
    fn sentiment_label(&self) -> Option<SentimentLabel>;
    fn flagged(&self) -> bool;
    fn topics(&self) -> &[String];
}

impl AnalyzedRecord for (AnalysisResult, DateTime<Utc>) {
    fn created_at(&self) -> DateTime<Utc> {
        self.1
    }

    fn sentiment(&self) -> Option<f64> {
        Some(self.0.sentiment())
    }

    fn sentiment_label(&self) -> Option<SentimentLabel> {
        Some(self.0.sentiment_label())
    }

    fn flagged(&self) -> bool {
        self.0.flagged()
    }

    fn topics(&self) -> &[String] {
        self.0.topics()
    }
}

impl AnalyzedRecord for StoredFeedback {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn sentiment(&self) -> Option<f64> {
        self.sentiment
    }

    fn sentiment_label(&self) -> Option<SentimentLabel> {
        self.sentiment_label
    }

    fn flagged(&self) -> bool {
        self.flagged
    }

    fn topics(&self) -> &[String] {
        &self.topics
    }
}

impl<T: AnalyzedRecord + ?Sized> AnalyzedRecord for &T {
    fn created_at(&self) -> DateTime<Utc> {
        (**self).created_at()
    }

    fn sentiment(&self) -> Option<f64> {
        (**self).sentiment()
    }

    fn sentiment_label(&self) -> Option<SentimentLabel> {
        (**self).sentiment_label()
    }

    fn flagged(&self) -> bool {
        (**self).flagged()
    }

    fn topics(&self) -> &[String] {
        (**self).topics()
    }
}

/// Inclusive time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(FeedbackError::validation(format!(
                "report window starts at {} after it ends at {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// `[now - days, now]`
    pub fn trailing_days(days: u32, now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(i64::from(days)),
            end: now,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    pub topic: String,
    pub count: usize,
    pub sentiment_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub sentiment_distribution: SentimentDistribution,
    pub top_topics: Vec<TopicAnalysis>,
    pub flagged_count: usize,
    pub total_feedback: usize,
    pub average_sentiment: f64,
}

/// Unrounded partial state of an aggregation.
///
/// Tally partitions independently, `merge` them in input order, and `finish` once so
/// rounding is applied a single time.
#[derive(Debug, Clone, Default)]
pub struct AggregateTally {
    distribution: SentimentDistribution,
    sentiment_sum: f64,
    flagged: usize,
    topic_counts: OrderedCounter,
    topic_sentiments: HashMap<String, (f64, usize)>,
}

impl AggregateTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record. The caller has already applied the window.
    pub fn absorb<R: AnalyzedRecord + ?Sized>(&mut self, record: &R) {
        self.distribution.total += 1;
        // records without a label still count toward the total; treat them as neutral
        match record.sentiment_label().unwrap_or(SentimentLabel::Neutral) {
            SentimentLabel::Positive => self.distribution.positive += 1,
            SentimentLabel::Negative => self.distribution.negative += 1,
            SentimentLabel::Neutral => self.distribution.neutral += 1,
        }

        let sentiment = record.sentiment();
        self.sentiment_sum += sentiment.unwrap_or(0.0);
        if record.flagged() {
            self.flagged += 1;
        }

        for topic in record.topics() {
            self.topic_counts.add(topic);
            if let Some(value) = sentiment {
                let entry = self.topic_sentiments.entry(topic.clone()).or_default();
                entry.0 += value;
                entry.1 += 1;
            }
        }
    }

    pub fn merge(&mut self, other: &AggregateTally) {
        self.distribution.positive += other.distribution.positive;
        self.distribution.negative += other.distribution.negative;
        self.distribution.neutral += other.distribution.neutral;
        self.distribution.total += other.distribution.total;
        self.sentiment_sum += other.sentiment_sum;
        self.flagged += other.flagged;
        self.topic_counts.merge(&other.topic_counts);
        for (topic, (sum, n)) in &other.topic_sentiments {
            let entry = self.topic_sentiments.entry(topic.clone()).or_default();
            entry.0 += sum;
            entry.1 += n;
        }
    }

    pub fn total(&self) -> usize {
        self.distribution.total
    }

    pub fn finish(self, window: &ReportWindow) -> AggregateReport {
        let total = self.distribution.total;
        let average_sentiment = if total == 0 {
            0.0
        } else {
            round3(self.sentiment_sum / total as f64)
        };

        let top_topics = self
            .topic_counts
            .most_common(TOP_TOPICS_LIMIT)
            .into_iter()
            .map(|(topic, count)| {
                let sentiment_avg = match self.topic_sentiments.get(&topic) {
                    Some((sum, n)) if *n > 0 => round3(sum / *n as f64),
                    _ => 0.0,
                };
                TopicAnalysis {
                    topic,
                    count,
                    sentiment_avg,
                }
            })
            .collect();

        AggregateReport {
            period_start: window.start,
            period_end: window.end,
            sentiment_distribution: self.distribution,
            top_topics,
            flagged_count: self.flagged,
            total_feedback: total,
            average_sentiment,
        }
    }
}

/// Reduce the records inside `window` to a report.
pub fn aggregate<I>(records: I, window: &ReportWindow) -> AggregateReport
where
    I: IntoIterator,
    I::Item: AnalyzedRecord,
{
    let mut tally = AggregateTally::new();
    for record in records {
        if window.contains(record.created_at()) {
            tally.absorb(&record);
        }
    }
    tally.finish(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedbackChannel;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn stored(day: u32, sentiment: Option<f64>, flagged: bool, topics: &[&str]) -> StoredFeedback {
        let label = sentiment.map(|s| {
            if s > 0.0 {
                SentimentLabel::Positive
            } else if s < 0.0 {
                SentimentLabel::Negative
            } else {
                SentimentLabel::Neutral
            }
        });
        StoredFeedback {
            created_at: at(day),
            text: "x".to_string(),
            channel: FeedbackChannel::Web,
            location: None,
            booking_reference: None,
            sentiment,
            sentiment_label: label,
            confidence: sentiment.map(f64::abs),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            flagged,
            priority: Default::default(),
            processing_error: None,
        }
    }

    fn march() -> ReportWindow {
        ReportWindow::new(at(1), at(31)).unwrap()
    }

    #[test]
    fn empty_input_gives_zero_report() {
        let report = aggregate(Vec::<StoredFeedback>::new(), &march());
        assert_eq!(report.total_feedback, 0);
        assert_eq!(report.average_sentiment, 0.0);
        assert!(report.top_topics.is_empty());
        assert_eq!(report.flagged_count, 0);
        assert_eq!(report.sentiment_distribution, SentimentDistribution::default());
    }

    #[test]
    fn two_item_scenario() {
        let records = vec![
            stored(5, Some(0.6), false, &["room"]),
            stored(6, Some(-0.8), true, &["room", "service"]),
        ];
        let report = aggregate(&records, &march());
        assert_eq!(report.average_sentiment, -0.1);
        assert_eq!(report.flagged_count, 1);
        assert_eq!(report.top_topics[0].topic, "room");
        assert_eq!(report.top_topics[0].count, 2);
        assert_eq!(report.top_topics[0].sentiment_avg, -0.1);
        assert_eq!(report.top_topics[1].topic, "service");
        assert_eq!(report.top_topics[1].sentiment_avg, -0.8);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = ReportWindow::new(at(5), at(6)).unwrap();
        let records = vec![
            stored(4, Some(1.0), false, &[]),
            stored(5, Some(0.5), false, &[]),
            stored(6, Some(-0.5), false, &[]),
            stored(7, Some(1.0), false, &[]),
        ];
        let report = aggregate(&records, &window);
        assert_eq!(report.total_feedback, 2);
        assert_eq!(report.period_start, at(5));
    }

    #[test]
    fn missing_sentiment_counts_but_does_not_average_into_topics() {
        let records = vec![
            stored(5, None, false, &["pool"]),
            stored(6, Some(0.4), false, &["pool"]),
        ];
        let report = aggregate(&records, &march());
        let d = &report.sentiment_distribution;
        assert_eq!(d.positive + d.negative + d.neutral, d.total);
        assert_eq!(d.total, report.total_feedback);
        assert_eq!(report.average_sentiment, 0.2);
        assert_eq!(report.top_topics[0].sentiment_avg, 0.4);
    }

    #[test]
    fn topic_ties_keep_first_seen_order_and_limit_applies() {
        let topics: Vec<String> = (0..12).map(|i| format!("topic{i}")).collect();
        let refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        let records = vec![stored(5, Some(0.1), false, &refs)];
        let report = aggregate(&records, &march());
        assert_eq!(report.top_topics.len(), TOP_TOPICS_LIMIT);
        assert_eq!(report.top_topics[0].topic, "topic0");
        assert_eq!(report.top_topics[9].topic, "topic9");
    }

    #[test]
    fn merged_partitions_match_single_pass() {
        let records = vec![
            stored(2, Some(0.333), false, &["bar"]),
            stored(3, Some(0.333), true, &["bar", "spa"]),
            stored(4, Some(-0.111), false, &["spa"]),
        ];
        let window = march();
        let whole = aggregate(&records, &window);

        let mut left = AggregateTally::new();
        left.absorb(&records[0]);
        let mut right = AggregateTally::new();
        right.absorb(&records[1]);
        right.absorb(&records[2]);
        left.merge(&right);
        assert_eq!(left.finish(&window), whole);
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(ReportWindow::new(at(6), at(5)).is_err());
        let w = ReportWindow::trailing_days(30, at(31));
        assert_eq!(w.start(), at(1));
    }
}
