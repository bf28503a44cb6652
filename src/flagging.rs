//! Urgent-flag and priority rules.

use crate::config::{AnalysisConfig, DEFAULT_FLAGGED_KEYWORDS};
use crate::types::{Priority, SentimentLabel};

const URGENT_BELOW: f64 = -0.8;
const HIGH_BELOW: f64 = -0.5;

/// Decides whether feedback needs a human and how soon.
///
/// Two independent triggers raise the flag: a sentiment at or below the alert threshold, or
/// an urgent keyword anywhere in the text. Priority then scales with severity, so a
/// keyword hit on mildly negative text stays `normal`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggingPolicy {
    alert_threshold: f64,
    keywords: Vec<String>,
}

impl Default for FlaggingPolicy {
    fn default() -> Self {
        Self::new(-0.7, DEFAULT_FLAGGED_KEYWORDS.iter().copied())
    }
}

impl FlaggingPolicy {
    pub fn new<I, S>(alert_threshold: f64, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            alert_threshold,
            keywords,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.alert_threshold_sentiment, &config.flagged_keywords)
    }

    pub fn alert_threshold(&self) -> f64 {
        self.alert_threshold
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The label is accepted for symmetry with the scorer output; the rules only read the
    /// score and the text.
    pub fn flag(&self, text: &str, sentiment_score: f64, _sentiment_label: SentimentLabel) -> bool {
        if sentiment_score <= self.alert_threshold {
            return true;
        }
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn priority(&self, flagged: bool, sentiment_score: f64) -> Priority {
        if !flagged {
            Priority::Normal
        } else if sentiment_score <= URGENT_BELOW {
            Priority::Urgent
        } else if sentiment_score <= HIGH_BELOW {
            Priority::High
        } else {
            Priority::Normal
        }
    }
}
