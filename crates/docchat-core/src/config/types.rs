use std::path::PathBuf;

use docchat_memory::RetrievalConfig;
use docchat_memory::document::{DEFAULT_MAX_FILE_SIZE, IngestConfig, SplitterConfig};
use serde::{Deserialize, Serialize};

use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub ingest: IngestSection,
    #[serde(default)]
    pub retrieval: RetrievalSection,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Default, Clone)]
pub struct ResolvedSecrets {
    pub embedding_api_key: Option<Secret>,
}

/// Embedding backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    HuggingFace,
    OpenAi,
}

impl EmbeddingProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HuggingFace => "huggingface",
            Self::OpenAi => "openai",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::HuggingFace => docchat_llm::huggingface::DEFAULT_BASE_URL,
            Self::OpenAi => docchat_llm::openai::DEFAULT_BASE_URL,
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::HuggingFace => docchat_llm::huggingface::DEFAULT_MODEL,
            Self::OpenAi => docchat_llm::openai::DEFAULT_MODEL,
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,
    /// Falls back to the provider's public endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Falls back to the provider's default model when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            base_url: None,
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Qdrant,
    /// Process-local; contents are lost on exit.
    Memory,
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

fn default_collection() -> String {
    docchat_memory::qdrant_index::DEFAULT_COLLECTION.into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub backend: IndexBackend,
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Http,
    #[default]
    Local,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./documents")
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("docchat")
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket URL for the `http` backend, e.g. `https://{bucket}.s3.{region}.amazonaws.com`.
    #[serde(default)]
    pub base_url: String,
    /// Directory holding documents for the `local` backend.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            base_url: String::new(),
            root: default_storage_root(),
            scratch_dir: default_scratch_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub metadata_text_bytes: usize,
    pub strip_newlines: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        let defaults = SplitterConfig::default();
        Self {
            chunk_size: defaults.chunk_size,
            chunk_overlap: defaults.chunk_overlap,
            metadata_text_bytes: defaults.metadata_text_bytes,
            strip_newlines: defaults.strip_newlines,
        }
    }
}

impl From<&ChunkingConfig> for SplitterConfig {
    fn from(c: &ChunkingConfig) -> Self {
        Self {
            chunk_size: c.chunk_size,
            chunk_overlap: c.chunk_overlap,
            metadata_text_bytes: c.metadata_text_bytes,
            strip_newlines: c.strip_newlines,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestSection {
    pub embed_concurrency: usize,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            embed_concurrency: IngestConfig::default().embed_concurrency,
        }
    }
}

impl From<&IngestSection> for IngestConfig {
    fn from(c: &IngestSection) -> Self {
        Self {
            embed_concurrency: c.embed_concurrency,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalSection {
    pub top_k: usize,
    pub max_context_bytes: usize,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        let defaults = RetrievalConfig::default();
        Self {
            top_k: defaults.top_k,
            max_context_bytes: defaults.max_context_bytes,
        }
    }
}

impl From<&RetrievalSection> for RetrievalConfig {
    fn from(c: &RetrievalSection) -> Self {
        Self {
            top_k: c.top_k,
            max_context_bytes: c.max_context_bytes,
        }
    }
}
