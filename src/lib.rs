pub mod analytics;
pub mod analyzer;
pub mod backends;
pub mod config;
pub mod error;
pub mod flagging;
pub mod lexicon;
pub mod logging;
pub mod sentiment;
pub mod topics;
pub mod types;
pub mod utils;

pub use analytics::{AggregateReport, AggregateTally, AnalyzedRecord, ReportWindow, aggregate};
pub use analyzer::{BackendSummary, FeedbackAnalyzer};
pub use config::Config;
pub use error::{FeedbackError, Result};
pub use flagging::FlaggingPolicy;
pub use sentiment::{SentimentOutcome, SentimentScorer};
pub use topics::{TopicExtraction, TopicExtractor};
pub use types::{
    AnalysisResult, FeedbackChannel, FeedbackInput, Priority, SentimentLabel, StoredFeedback,
    TopicCategories, TopicCategory,
};
