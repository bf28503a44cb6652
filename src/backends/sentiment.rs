use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{D, DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config, XLMRobertaForSequenceClassification};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::model_files::ModelFiles;
use crate::types::SentimentLabel;

/// One entry of a classifier's probability distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub label: SentimentLabel,
    pub probability: f64,
}

impl ClassScore {
    pub fn new(label: SentimentLabel, probability: f64) -> Self {
        Self { label, probability }
    }
}

/// A three-class sentiment classifier.
///
/// `classify` returns the full distribution in the model's class order.
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    async fn classify(&self, text: &str) -> crate::error::Result<Vec<ClassScore>>;
    fn name(&self) -> &str;
}

const MAX_TOKENS: usize = 512;

/// RoBERTa-family sequence classifier. RoBERTa and XLM-RoBERTa checkpoints share candle's
/// `xlm_roberta` implementation.
///
/// Inference runs on the blocking pool.
pub struct XlmRobertaSentiment {
    inner: Arc<Classifier>,
    labels: Vec<SentimentLabel>,
    name: String,
}

struct Classifier {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
}

impl XlmRobertaSentiment {
    pub fn load(files: &ModelFiles, name: &str) -> Result<Self> {
        let device = Device::cuda_if_available(0)?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        let config_str =
            std::fs::read_to_string(&files.config).context("Failed to read config.json")?;
        let config: Config =
            serde_json::from_str(&config_str).context("Failed to parse config.json")?;
        let raw: serde_json::Value = serde_json::from_str(&config_str)?;
        let labels = labels_from_config(&raw);

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                std::slice::from_ref(&files.weights),
                DType::F32,
                &device,
            )?
        };
        let model = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)?;

        Ok(Self {
            inner: Arc::new(Classifier {
                model,
                tokenizer,
                device,
            }),
            labels,
            name: name.to_string(),
        })
    }
}

impl Classifier {
    fn run(&self, text: &str) -> crate::error::Result<Vec<f32>> {
        let encoding = self.tokenizer.encode(text, true).map_err(|e| {
            crate::error::FeedbackError::Tokenizer {
                message: e.to_string(),
            }
        })?;
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?;
        Ok(probs.squeeze(0)?.to_vec1::<f32>()?)
    }
}

#[async_trait]
impl SentimentBackend for XlmRobertaSentiment {
    async fn classify(&self, text: &str) -> crate::error::Result<Vec<ClassScore>> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let probs = tokio::task::spawn_blocking(move || inner.run(&text)).await??;
        debug!("sentiment distribution: {:?}", probs);
        Ok(self
            .labels
            .iter()
            .zip(probs)
            .map(|(label, p)| ClassScore::new(*label, p as f64))
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Map `id2label` from a classifier config onto sentiment labels, in class-index order.
/// Generic `LABEL_n` names follow the negative/neutral/positive convention.
fn labels_from_config(raw: &serde_json::Value) -> Vec<SentimentLabel> {
    let default = vec![
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
    ];
    let Some(map) = raw.get("id2label").and_then(|v| v.as_object()) else {
        return default;
    };

    let mut entries: Vec<(usize, SentimentLabel)> = map
        .iter()
        .filter_map(|(idx, name)| {
            let idx = idx.parse::<usize>().ok()?;
            Some((idx, label_for(name.as_str().unwrap_or_default())))
        })
        .collect();
    if entries.is_empty() {
        return default;
    }
    entries.sort_by_key(|(idx, _)| *idx);
    entries.into_iter().map(|(_, label)| label).collect()
}

fn label_for(name: &str) -> SentimentLabel {
    match name.to_ascii_lowercase().as_str() {
        "label_0" | "negative" | "neg" => SentimentLabel::Negative,
        "label_2" | "positive" | "pos" => SentimentLabel::Positive,
        _ => SentimentLabel::Neutral,
    }
}
