use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use std::sync::Arc;
use tokenizers::{Encoding, Tokenizer, TruncationParams};

use super::embeddings::Embedder;
use super::model_files::ModelFiles;

/// Texts per forward pass in `embed_batch`
const BATCH_SIZE: usize = 32;

/// BGE sentence embeddings on candle's BERT implementation, mean-pooled and normalized.
///
/// Forward passes run on the blocking pool.
pub struct BgeEmbedder {
    inner: Arc<BgeModel>,
    dims: usize,
}

struct BgeModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    pad_id: u32,
}

impl BgeEmbedder {
    pub fn load(files: &ModelFiles) -> Result<Self> {
        let device = Device::cuda_if_available(0)?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: 512,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        let config_str =
            std::fs::read_to_string(&files.config).context("Failed to read config.json")?;
        let config: Config =
            serde_json::from_str(&config_str).context("Failed to parse config.json")?;
        let raw: serde_json::Value = serde_json::from_str(&config_str)?;
        let dims = raw
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .context("config.json has no hidden_size")? as usize;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                std::slice::from_ref(&files.weights),
                candle_core::DType::F32,
                &device,
            )?
        };
        let model = BertModel::load(vb, &config)?;

        Ok(Self {
            inner: Arc::new(BgeModel {
                model,
                tokenizer,
                device,
                pad_id,
            }),
            dims,
        })
    }

    async fn run_blocking(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for chunk in texts.chunks(BATCH_SIZE) {
                out.extend(inner.forward(chunk)?);
            }
            Ok(out)
        })
        .await
        .map_err(|_| anyhow::anyhow!("Embedding task panicked"))?
    }
}

impl BgeModel {
    /// One padded forward pass over `texts`, returning one unit vector per text.
    fn forward(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let encodings: Vec<Encoding> = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;
        let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);
        if max_len == 0 {
            anyhow::bail!("Tokenizer produced no tokens");
        }

        let mut ids: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);
        let mut mask: Vec<f32> = Vec::with_capacity(encodings.len() * max_len);
        for encoding in &encodings {
            let mut row = encoding.get_ids().to_vec();
            row.resize(max_len, self.pad_id);
            ids.extend(row);
            let mut row: Vec<f32> = encoding
                .get_attention_mask()
                .iter()
                .map(|&x| x as f32)
                .collect();
            row.resize(max_len, 0.0);
            mask.extend(row);
        }

        let shape = (encodings.len(), max_len);
        let input_ids = Tensor::from_vec(ids, shape, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention = Tensor::from_vec(mask, shape, &self.device)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention))?;
        mean_pooling(&hidden, &attention)
    }
}

fn mean_pooling(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Vec<Vec<f32>>> {
    // [batch, seq] -> [batch, seq, 1]
    let mask_expanded = attention_mask.unsqueeze(2)?;
    let summed = embeddings.broadcast_mul(&mask_expanded)?.sum(1)?;
    let mask_sum = mask_expanded.sum(1)?;
    let mean = summed.broadcast_div(&mask_sum)?;

    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?;
    let normalized = mean.broadcast_div(&norm)?;
    Ok(normalized.to_vec2::<f32>()?)
}

#[async_trait]
impl Embedder for BgeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.run_blocking(vec![text.to_string()])
            .await?
            .pop()
            .context("Model returned no embedding")
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run_blocking(texts.to_vec()).await
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}
