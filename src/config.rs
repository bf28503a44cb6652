use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Urgent keywords flagged regardless of sentiment
pub const DEFAULT_FLAGGED_KEYWORDS: &[&str] = &[
    "urgent",
    "emergency",
    "terrible",
    "awful",
    "disgusting",
    "worst",
];

pub const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-small-en-v1.5";

/// Main configuration structure loaded from guest_signal.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub analytics: AnalyticsConfig,
    pub models: ModelConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Per-item analysis policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub alert_threshold_sentiment: f64,
    pub flagged_keywords: Vec<String>,
    pub max_topics: usize,
    pub batch_concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alert_threshold_sentiment: -0.7,
            flagged_keywords: DEFAULT_FLAGGED_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_topics: 5,
            batch_concurrency: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub window_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

/// Backend selection for the pluggable model capabilities
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// "candle" or "lexicon"
    pub sentiment_backend: String,
    pub sentiment_model: String,
    pub sentiment_model_dir: Option<PathBuf>,
    /// "bge", "hash" or "none"
    pub phrase_backend: String,
    pub embedding_model: String,
    pub embedding_model_dir: Option<PathBuf>,
    pub embedding_dimensions: usize,
    pub embedding_cache_size: usize,
    /// "rules" or "none"
    pub linguistic_backend: String,
    pub allow_download: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sentiment_backend: "candle".to_string(),
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            sentiment_model_dir: None,
            phrase_backend: "bge".to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_model_dir: None,
            embedding_dimensions: 384,
            embedding_cache_size: 2048,
            linguistic_backend: "rules".to_string(),
            allow_download: true,
        }
    }
}

impl ModelConfig {
    /// Everything model-backed switched off; only rule-based components remain.
    pub fn rule_based() -> Self {
        Self {
            sentiment_backend: "lexicon".to_string(),
            phrase_backend: "none".to_string(),
            linguistic_backend: "rules".to_string(),
            allow_download: false,
            ..Self::default()
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub log_json: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "guest_signal=info".to_string(),
            log_json: false,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "guest_signal=info".to_string()),
            log_json: std::env::var("GUEST_SIGNAL_LOG_JSON")
                .ok()
                .is_some_and(|v| v == "true" || v == "1"),
        }
    }
}

fn is_true(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses GUEST_SIGNAL_CONFIG environment variable or defaults to "guest_signal.toml"
    pub fn load() -> anyhow::Result<Self> {
        // 1) GUEST_SIGNAL_ENV_FILE if set, 2) ./.env
        if let Ok(env_path) = std::env::var("GUEST_SIGNAL_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = std::env::var("GUEST_SIGNAL_CONFIG")
            .unwrap_or_else(|_| "guest_signal.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply env-first overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GUEST_SIGNAL_ALERT_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.analysis.alert_threshold_sentiment = v;
            tracing::debug!("GUEST_SIGNAL_ALERT_THRESHOLD env override applied");
        }
        if let Some(v) = lookup("GUEST_SIGNAL_FLAGGED_KEYWORDS") {
            self.analysis.flagged_keywords = v.split(',').map(|s| s.to_string()).collect();
        }
        if let Some(v) = lookup("GUEST_SIGNAL_MAX_TOPICS").and_then(|v| v.parse().ok()) {
            self.analysis.max_topics = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_BATCH_CONCURRENCY").and_then(|v| v.parse().ok()) {
            self.analysis.batch_concurrency = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_WINDOW_DAYS").and_then(|v| v.parse().ok()) {
            self.analytics.window_days = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_SENTIMENT_BACKEND") {
            self.models.sentiment_backend = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_SENTIMENT_MODEL").filter(|m| !m.trim().is_empty()) {
            self.models.sentiment_model = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_SENTIMENT_MODEL_DIR") {
            self.models.sentiment_model_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GUEST_SIGNAL_PHRASE_BACKEND") {
            self.models.phrase_backend = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_EMBED_MODEL").filter(|m| !m.trim().is_empty()) {
            self.models.embedding_model = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_EMBED_MODEL_DIR") {
            self.models.embedding_model_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GUEST_SIGNAL_EMBED_CACHE").and_then(|v| v.parse().ok()) {
            self.models.embedding_cache_size = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_LINGUISTIC_BACKEND") {
            self.models.linguistic_backend = v;
        }
        if let Some(v) = lookup("GUEST_SIGNAL_ALLOW_DOWNLOAD") {
            self.models.allow_download = is_true(&v);
        }
    }

    /// Validate the configuration, clamping recoverable values
    pub fn validate(&mut self) -> anyhow::Result<()> {
        let threshold = self.analysis.alert_threshold_sentiment;
        if !(-1.0..=1.0).contains(&threshold) {
            anyhow::bail!(
                "alert_threshold_sentiment must be between -1.0 and 1.0, got {}",
                threshold
            );
        }

        self.analysis.flagged_keywords = self
            .analysis
            .flagged_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if self.analysis.max_topics == 0 {
            tracing::warn!("max_topics 0 is not usable, clamping to 1");
            self.analysis.max_topics = 1;
        } else if self.analysis.max_topics > 50 {
            tracing::warn!(
                "max_topics {} exceeds max 50, clamping to 50",
                self.analysis.max_topics
            );
            self.analysis.max_topics = 50;
        }

        if self.analysis.batch_concurrency == 0 {
            self.analysis.batch_concurrency = 1;
        }

        if self.analytics.window_days == 0 {
            tracing::warn!("analytics window_days 0 is not usable, using 30");
            self.analytics.window_days = 30;
        }

        self.models.sentiment_backend = self.models.sentiment_backend.trim().to_lowercase();
        self.models.phrase_backend = self.models.phrase_backend.trim().to_lowercase();
        self.models.linguistic_backend = self.models.linguistic_backend.trim().to_lowercase();

        if !matches!(self.models.sentiment_backend.as_str(), "candle" | "lexicon") {
            tracing::warn!(
                "Unknown sentiment backend '{}', the lexicon heuristic will be used",
                self.models.sentiment_backend
            );
        }
        if !matches!(self.models.phrase_backend.as_str(), "bge" | "hash" | "none") {
            tracing::warn!(
                "Unknown phrase backend '{}', phrase ranking disabled",
                self.models.phrase_backend
            );
        }
        if !matches!(self.models.linguistic_backend.as_str(), "rules" | "none") {
            tracing::warn!(
                "Unknown linguistic backend '{}', linguistic extraction disabled",
                self.models.linguistic_backend
            );
        }
        if self.models.phrase_backend == "bge" && self.models.embedding_dimensions != 384 {
            tracing::warn!(
                "BGE small model expects 384 dimensions, got {}",
                self.models.embedding_dimensions
            );
        }

        Ok(())
    }
}
