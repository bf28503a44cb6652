//! Domain-specific error types for guest-signal

use thiserror::Error;

/// Main error type for the feedback analysis pipeline
#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Model load error: {message}")]
    ModelLoad { message: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("Tokenizer error: {message}")]
    Tokenizer { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FeedbackError {
    pub fn validation(message: impl Into<String>) -> Self {
        FeedbackError::Validation {
            message: message.into(),
        }
    }

    pub fn model_load(message: impl Into<String>) -> Self {
        FeedbackError::ModelLoad {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for FeedbackError {
    fn from(err: anyhow::Error) -> Self {
        FeedbackError::Internal {
            message: format!("{err:#}"),
        }
    }
}

impl From<candle_core::Error> for FeedbackError {
    fn from(err: candle_core::Error) -> Self {
        FeedbackError::Inference {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FeedbackError {
    fn from(err: serde_json::Error) -> Self {
        FeedbackError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FeedbackError {
    fn from(err: toml::de::Error) -> Self {
        FeedbackError::Config {
            message: format!("Invalid TOML: {}", err),
        }
    }
}

impl From<std::io::Error> for FeedbackError {
    fn from(err: std::io::Error) -> Self {
        FeedbackError::Io {
            message: err.to_string(),
        }
    }
}

impl From<hf_hub::api::sync::ApiError> for FeedbackError {
    fn from(err: hf_hub::api::sync::ApiError) -> Self {
        FeedbackError::ModelLoad {
            message: format!("Hugging Face hub request failed: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for FeedbackError {
    fn from(err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            "analysis task panicked".to_string()
        } else {
            format!("analysis task did not complete: {}", err)
        };
        FeedbackError::Internal { message }
    }
}

/// Result type alias for guest-signal operations
pub type Result<T> = std::result::Result<T, FeedbackError>;
