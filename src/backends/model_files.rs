//! Locate transformer model files, locally or on the Hugging Face hub.

use std::path::{Path, PathBuf};

use crate::error::{FeedbackError, Result};

/// The three files a candle transformer needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Resolve model files. A local directory wins; otherwise the hub is used when
/// downloads are allowed.
pub fn resolve(repo_id: &str, local_dir: Option<&Path>, allow_download: bool) -> Result<ModelFiles> {
    if let Some(dir) = local_dir {
        let files = ModelFiles {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        };
        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.is_file() {
                return Err(FeedbackError::model_load(format!(
                    "Model file {} is missing",
                    path.display()
                )));
            }
        }
        return Ok(files);
    }

    if !allow_download {
        return Err(FeedbackError::model_load(format!(
            "No local directory configured for {} and downloads are disabled",
            repo_id
        )));
    }

    let api = hf_hub::api::sync::Api::new()?;
    let repo = api.model(repo_id.to_string());
    let fetch = |name: &str| {
        repo.get(name).map_err(|e| {
            FeedbackError::model_load(format!("Failed to fetch {} from {}: {}", name, repo_id, e))
        })
    };
    Ok(ModelFiles {
        config: fetch(CONFIG_FILE)?,
        tokenizer: fetch(TOKENIZER_FILE)?,
        weights: fetch(WEIGHTS_FILE)?,
    })
}
