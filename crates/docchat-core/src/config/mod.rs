mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::vault::{EMBEDDING_API_KEY, Secret, SecretProvider};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject settings that would make ingestion or retrieval misbehave.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunking.chunk_size == 0 {
            bail!("chunking.chunk_size must be greater than 0");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            bail!(
                "chunking.chunk_overlap ({}) must be less than chunking.chunk_size ({})",
                self.chunking.chunk_overlap,
                self.chunking.chunk_size
            );
        }
        if self.ingest.embed_concurrency == 0 {
            bail!("ingest.embed_concurrency must be greater than 0");
        }
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be greater than 0");
        }
        if self.embedding.timeout_secs == 0 {
            bail!("embedding.timeout_secs must be greater than 0");
        }
        if self.storage.backend == StorageBackend::Http && self.storage.base_url.trim().is_empty() {
            bail!("storage.base_url is required for the http storage backend");
        }
        if self.index.backend == IndexBackend::Qdrant && self.index.collection.trim().is_empty() {
            bail!("index.collection must not be empty");
        }
        Ok(())
    }

    /// Resolve API keys through `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret backend fails.
    pub async fn resolve_secrets(&mut self, provider: &dyn SecretProvider) -> anyhow::Result<()> {
        if let Some(val) = provider.get_secret(EMBEDDING_API_KEY).await? {
            self.secrets.embedding_api_key = Some(Secret::new(val));
        }
        Ok(())
    }
}
