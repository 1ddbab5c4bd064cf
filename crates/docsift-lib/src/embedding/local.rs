use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use fastembed::{
    InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles, UserDefinedEmbeddingModel,
};

use super::EmbeddingProvider;
use crate::config::{LOCAL_EMBEDDING_DIMENSION, LOCAL_MODEL_SUBDIR};

/// Offline embedder running GTE multilingual base int8 through fastembed.
///
/// The model is not thread-safe, so calls are serialised behind a mutex and
/// run on the blocking pool.
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl LocalEmbedder {
    /// Load the model from `model_dir/gte-multilingual-base/`.
    ///
    /// If the model files are not found, returns an error instructing the user
    /// to run `docsift model download`.
    pub fn new(model_dir: &Path) -> anyhow::Result<Self> {
        let base = model_dir.join(LOCAL_MODEL_SUBDIR);

        let onnx_bytes = fs::read(base.join("model_int8.onnx")).with_context(|| {
            format!(
                "Model not found at {}. Run 'docsift model download' first.",
                base.display()
            )
        })?;

        let tokenizer_files = TokenizerFiles {
            tokenizer_file: fs::read(base.join("tokenizer.json"))
                .context("Missing tokenizer.json")?,
            config_file: fs::read(base.join("config.json")).context("Missing config.json")?,
            special_tokens_map_file: fs::read(base.join("special_tokens_map.json"))
                .context("Missing special_tokens_map.json")?,
            tokenizer_config_file: fs::read(base.join("tokenizer_config.json"))
                .context("Missing tokenizer_config.json")?,
        };

        let user_model =
            UserDefinedEmbeddingModel::new(onnx_bytes, tokenizer_files).with_pooling(Pooling::Cls);

        let model =
            TextEmbedding::try_new_from_user_defined(user_model, InitOptionsUserDefined::default())
                .context("Failed to initialize GTE multilingual base int8 model")?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }

    /// Embedding dimension of the local model.
    #[must_use]
    pub const fn dimension() -> usize {
        LOCAL_EMBEDDING_DIMENSION
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<f32>> {
            let mut model = model
                .lock()
                .map_err(|_| anyhow::anyhow!("embedding model lock poisoned"))?;
            let embeddings = model
                .embed(vec![text], None)
                .context("Failed to embed text")?;
            embeddings
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("model returned no embedding"))
        })
        .await
        .context("Embedding task panicked")?
    }

    fn name(&self) -> &str {
        "local-gte"
    }
}

#[cfg(test)]
mod tests {
    use docsift_test_util::model::{model_dir, model_present};

    use super::*;

    #[test]
    fn embedding_dimension_is_768() {
        assert_eq!(LocalEmbedder::dimension(), 768);
    }

    #[test]
    fn missing_model_points_at_download_command() {
        let tmp = tempfile::tempdir().unwrap();
        let Err(err) = LocalEmbedder::new(tmp.path()) else {
            panic!("expected missing model error");
        };
        assert!(err.to_string().contains("docsift model download"));
    }

    #[tokio::test]
    #[ignore = "requires the model downloaded by `docsift model download`"]
    async fn embed_returns_model_dimension() {
        let root = model_dir();
        assert!(model_present(&root), "no model under {}", root.display());
        let embedder = LocalEmbedder::new(&root).unwrap();
        let embedding = embedder.embed("hello world").await.unwrap();
        assert_eq!(embedding.len(), 768);
    }
}
