//! Records flowing into and out of the analysis pipeline.

use crate::error::{FeedbackError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_TEXT_CHARS: usize = 5000;

/// Source channel of a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackChannel {
    Web,
    Email,
    Whatsapp,
    GoogleReviews,
    Tripadvisor,
    BookingCom,
    Direct,
}

impl FeedbackChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackChannel::Web => "web",
            FeedbackChannel::Email => "email",
            FeedbackChannel::Whatsapp => "whatsapp",
            FeedbackChannel::GoogleReviews => "google_reviews",
            FeedbackChannel::Tripadvisor => "tripadvisor",
            FeedbackChannel::BookingCom => "booking_com",
            FeedbackChannel::Direct => "direct",
        }
    }
}

impl std::fmt::Display for FeedbackChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single guest feedback item as handed to the pipeline.
///
/// `text` is trimmed and never empty once constructed through [`FeedbackInput::new`] or
/// checked with [`FeedbackInput::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInput {
    pub text: String,
    pub channel: FeedbackChannel,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl FeedbackInput {
    pub fn new(text: impl Into<String>, channel: FeedbackChannel) -> Result<Self> {
        let input = Self {
            text: text.into().trim().to_string(),
            channel,
            page: None,
            guest_name: None,
            booking_reference: None,
            location: None,
        };
        input.validate()?;
        Ok(input)
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn with_guest_name(mut self, name: impl Into<String>) -> Self {
        self.guest_name = Some(name.into());
        self
    }

    pub fn with_booking_reference(mut self, reference: impl Into<String>) -> Self {
        self.booking_reference = Some(reference.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Trim the text in place, then check it.
    pub fn normalized(mut self) -> Result<Self> {
        self.text = self.text.trim().to_string();
        self.validate()?;
        Ok(self)
    }

    /// Check the record against the intake limits.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(FeedbackError::validation("Feedback text cannot be empty"));
        }
        let chars = self.text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(FeedbackError::validation(format!(
                "Feedback text is {} characters, limit is {}",
                chars, MAX_TEXT_CHARS
            )));
        }
        let limits = [
            ("page", self.page.as_deref(), 200),
            ("guest_name", self.guest_name.as_deref(), 100),
            ("booking_reference", self.booking_reference.as_deref(), 100),
            ("location", self.location.as_deref(), 100),
        ];
        for (field, value, max) in limits {
            if let Some(v) = value
                && v.chars().count() > max
            {
                return Err(FeedbackError::validation(format!(
                    "{} exceeds {} characters",
                    field, max
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing severity tier. `Low` is only ever set by operators, never by analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed hospitality topic categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
    Service,
    Room,
    Food,
    Cleanliness,
    Location,
    Value,
    Booking,
    Facilities,
    Atmosphere,
    Other,
}

impl TopicCategory {
    /// Categories with keyword lists, in matching order. `Other` is the catch-all.
    pub const KEYWORDED: [TopicCategory; 9] = [
        TopicCategory::Service,
        TopicCategory::Room,
        TopicCategory::Food,
        TopicCategory::Cleanliness,
        TopicCategory::Location,
        TopicCategory::Value,
        TopicCategory::Booking,
        TopicCategory::Facilities,
        TopicCategory::Atmosphere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicCategory::Service => "service",
            TopicCategory::Room => "room",
            TopicCategory::Food => "food",
            TopicCategory::Cleanliness => "cleanliness",
            TopicCategory::Location => "location",
            TopicCategory::Value => "value",
            TopicCategory::Booking => "booking",
            TopicCategory::Facilities => "facilities",
            TopicCategory::Atmosphere => "atmosphere",
            TopicCategory::Other => "other",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            TopicCategory::Service => &[
                "service",
                "staff",
                "employee",
                "waiter",
                "waitress",
                "manager",
                "reception",
                "front desk",
            ],
            TopicCategory::Room => &[
                "room",
                "bedroom",
                "bathroom",
                "bed",
                "shower",
                "toilet",
                "amenities",
                "minibar",
            ],
            TopicCategory::Food => &[
                "food",
                "meal",
                "breakfast",
                "lunch",
                "dinner",
                "restaurant",
                "dining",
                "kitchen",
                "chef",
            ],
            TopicCategory::Cleanliness => &[
                "clean",
                "dirty",
                "hygiene",
                "sanitize",
                "tidy",
                "mess",
                "housekeeping",
            ],
            TopicCategory::Location => &[
                "location",
                "area",
                "neighborhood",
                "transport",
                "parking",
                "accessibility",
            ],
            TopicCategory::Value => &[
                "price",
                "cost",
                "expensive",
                "cheap",
                "value",
                "money",
                "worth",
                "budget",
            ],
            TopicCategory::Booking => &[
                "booking",
                "reservation",
                "check-in",
                "check-out",
                "website",
                "payment",
            ],
            TopicCategory::Facilities => &[
                "wifi", "internet", "pool", "gym", "spa", "elevator", "ac", "heating", "tv",
            ],
            TopicCategory::Atmosphere => &[
                "atmosphere",
                "ambiance",
                "noise",
                "quiet",
                "peaceful",
                "crowded",
                "busy",
            ],
            TopicCategory::Other => &[],
        }
    }
}

impl std::fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type TopicCategories = BTreeMap<TopicCategory, Vec<String>>;

/// Immutable outcome of analyzing one feedback item.
///
/// Only the analyzer's builder can produce one, so consumers never see a half-filled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub(crate) sentiment: f64,
    pub(crate) sentiment_label: SentimentLabel,
    pub(crate) confidence: f64,
    pub(crate) topics: Vec<String>,
    pub(crate) topic_categories: TopicCategories,
    pub(crate) flagged: bool,
    pub(crate) priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) processing_error: Option<String>,
}

impl AnalysisResult {
    pub fn sentiment(&self) -> f64 {
        self.sentiment
    }

    pub fn sentiment_label(&self) -> SentimentLabel {
        self.sentiment_label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn topic_categories(&self) -> &TopicCategories {
        &self.topic_categories
    }

    pub fn flagged(&self) -> bool {
        self.flagged
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn processing_error(&self) -> Option<&str> {
        self.processing_error.as_deref()
    }
}

/// Storage-shaped row: the input, its analysis and the ingest timestamp.
///
/// Sentiment fields are optional because rows can exist before analysis ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFeedback {
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub channel: FeedbackChannel,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub sentiment: Option<f64>,
    #[serde(default)]
    pub sentiment_label: Option<SentimentLabel>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub processing_error: Option<String>,
}

impl StoredFeedback {
    pub fn from_analysis(
        input: &FeedbackInput,
        analysis: &AnalysisResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            created_at,
            text: input.text.clone(),
            channel: input.channel,
            location: input.location.clone(),
            booking_reference: input.booking_reference.clone(),
            sentiment: Some(analysis.sentiment),
            sentiment_label: Some(analysis.sentiment_label),
            confidence: Some(analysis.confidence),
            topics: analysis.topics.clone(),
            flagged: analysis.flagged,
            priority: analysis.priority,
            processing_error: analysis.processing_error.clone(),
        }
    }
}
