//! Builds the shared clients once from configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use docchat_llm::AnyEmbedder;
use docchat_llm::huggingface::HuggingFaceEmbedder;
use docchat_llm::openai::OpenAiEmbedder;
use docchat_memory::document::{
    BlobStore, ExtensionExtractor, HttpBlobStore, LocalBlobStore, TextSplitter,
};
use docchat_memory::{InMemoryIndex, QdrantIndex, VectorIndex};

use crate::chat::{ChatParts, DocumentChat};
use crate::config::{Config, EmbeddingProvider, IndexBackend, StorageBackend};
use crate::vault::EnvSecrets;

pub const CONFIG_ENV: &str = "DOCCHAT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// `--config` wins, then `DOCCHAT_CONFIG`, then `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Load, resolve secrets from the environment, and validate.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or a setting is invalid.
pub async fn load_config(path: &Path) -> anyhow::Result<Config> {
    let mut config = Config::load(path)?;
    config.resolve_secrets(&EnvSecrets).await?;
    config.validate()?;
    Ok(config)
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the provider
/// requires an API key that is not set.
pub fn build_embedder(config: &Config) -> anyhow::Result<AnyEmbedder> {
    let client =
        docchat_llm::http::default_client(Duration::from_secs(config.embedding.timeout_secs))
            .context("failed to build embedding HTTP client")?;
    let api_key = config
        .secrets
        .embedding_api_key
        .as_ref()
        .map(|s| s.expose().to_owned());
    let base_url = config.embedding.base_url().to_owned();
    let model = config.embedding.model().to_owned();

    let embedder = match config.embedding.provider {
        EmbeddingProvider::HuggingFace => {
            if api_key.is_none() {
                tracing::warn!("no embedding API key set, huggingface requests are anonymous");
            }
            AnyEmbedder::HuggingFace(HuggingFaceEmbedder::new(
                client,
                api_key.unwrap_or_default(),
                base_url,
                model,
            ))
        }
        EmbeddingProvider::OpenAi => {
            let Some(api_key) = api_key else {
                bail!(
                    "{} is required for the openai embedding provider",
                    crate::vault::EMBEDDING_API_KEY
                );
            };
            AnyEmbedder::OpenAi(OpenAiEmbedder::new(client, api_key, base_url, model))
        }
    };
    tracing::info!(
        provider = config.embedding.provider.as_str(),
        model = config.embedding.model(),
        "embedding provider ready"
    );
    Ok(embedder)
}

/// The `memory` backend is process-local, so documents ingested by one
/// invocation are not visible to the next.
///
/// # Errors
///
/// Returns an error if the Qdrant client cannot be created.
pub fn build_index(config: &Config) -> anyhow::Result<Arc<dyn VectorIndex>> {
    match config.index.backend {
        IndexBackend::Qdrant => {
            let index = QdrantIndex::new(&config.index.qdrant_url, config.index.collection.clone())
                .with_context(|| {
                    format!("failed to connect to qdrant at {}", config.index.qdrant_url)
                })?;
            Ok(Arc::new(index))
        }
        IndexBackend::Memory => Ok(Arc::new(InMemoryIndex::new())),
    }
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_blob_store(config: &Config) -> anyhow::Result<Arc<dyn BlobStore>> {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Http => {
            let client = reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .user_agent(concat!("docchat/", env!("CARGO_PKG_VERSION")))
                .build()
                .context("failed to build storage HTTP client")?;
            Ok(Arc::new(HttpBlobStore::new(
                client,
                storage.base_url.clone(),
                storage.scratch_dir.clone(),
                storage.max_file_size,
            )))
        }
        StorageBackend::Local => Ok(Arc::new(LocalBlobStore::new(
            storage.root.clone(),
            storage.max_file_size,
        ))),
    }
}

/// Wire every component of a [`DocumentChat`] from `config`.
///
/// # Errors
///
/// Returns an error if any client fails to build.
pub fn build_chat(config: &Config) -> anyhow::Result<DocumentChat<AnyEmbedder>> {
    let embedder = build_embedder(config)?;
    Ok(DocumentChat::new(ChatParts {
        blobs: build_blob_store(config)?,
        extractor: Arc::new(ExtensionExtractor::with_max_file_size(
            config.storage.max_file_size,
        )),
        splitter: TextSplitter::new((&config.chunking).into()),
        embedder: Arc::new(embedder),
        index: build_index(config)?,
        ingest: (&config.ingest).into(),
        retrieval: (&config.retrieval).into(),
    }))
}
