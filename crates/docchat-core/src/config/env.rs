use std::path::PathBuf;

use super::Config;

/// Parse a lowercase enum value the same way the TOML loader does.
fn parse_enum<T: serde::de::DeserializeOwned>(key: &str, value: &str) -> Option<T> {
    match serde_json::from_value(serde_json::Value::String(value.to_owned())) {
        Ok(kind) => Some(kind),
        Err(_) => {
            tracing::warn!("ignoring invalid {key} value: {value}");
            None
        }
    }
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_embedding();
        self.apply_env_overrides_storage();
        self.apply_env_overrides_pipeline();
    }

    fn apply_env_overrides_embedding(&mut self) {
        if let Ok(v) = std::env::var("DOCCHAT_EMBEDDING_PROVIDER")
            && let Some(provider) = parse_enum("DOCCHAT_EMBEDDING_PROVIDER", &v)
        {
            self.embedding.provider = provider;
        }
        if let Ok(v) = std::env::var("DOCCHAT_EMBEDDING_BASE_URL") {
            self.embedding.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("DOCCHAT_EMBEDDING_MODEL") {
            self.embedding.model = Some(v);
        }
        if let Ok(v) = std::env::var("DOCCHAT_EMBEDDING_TIMEOUT_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.embedding.timeout_secs = secs;
        }
    }

    fn apply_env_overrides_storage(&mut self) {
        if let Ok(v) = std::env::var("DOCCHAT_INDEX_BACKEND")
            && let Some(backend) = parse_enum("DOCCHAT_INDEX_BACKEND", &v)
        {
            self.index.backend = backend;
        }
        if let Ok(v) = std::env::var("DOCCHAT_QDRANT_URL") {
            self.index.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("DOCCHAT_INDEX_COLLECTION") {
            self.index.collection = v;
        }
        if let Ok(v) = std::env::var("DOCCHAT_STORAGE_BACKEND")
            && let Some(backend) = parse_enum("DOCCHAT_STORAGE_BACKEND", &v)
        {
            self.storage.backend = backend;
        }
        if let Ok(v) = std::env::var("DOCCHAT_STORAGE_BASE_URL") {
            self.storage.base_url = v;
        }
        if let Ok(v) = std::env::var("DOCCHAT_STORAGE_ROOT") {
            self.storage.root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCCHAT_SCRATCH_DIR") {
            self.storage.scratch_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCCHAT_MAX_FILE_SIZE")
            && let Ok(bytes) = v.parse::<u64>()
        {
            self.storage.max_file_size = bytes;
        }
    }

    fn apply_env_overrides_pipeline(&mut self) {
        if let Ok(v) = std::env::var("DOCCHAT_CHUNK_SIZE")
            && let Ok(n) = v.parse::<usize>()
        {
            self.chunking.chunk_size = n;
        }
        if let Ok(v) = std::env::var("DOCCHAT_CHUNK_OVERLAP")
            && let Ok(n) = v.parse::<usize>()
        {
            self.chunking.chunk_overlap = n;
        }
        if let Ok(v) = std::env::var("DOCCHAT_EMBED_CONCURRENCY")
            && let Ok(n) = v.parse::<usize>()
        {
            self.ingest.embed_concurrency = n;
        }
        if let Ok(v) = std::env::var("DOCCHAT_TOP_K")
            && let Ok(n) = v.parse::<usize>()
        {
            self.retrieval.top_k = n;
        }
        if let Ok(v) = std::env::var("DOCCHAT_MAX_CONTEXT_BYTES")
            && let Ok(n) = v.parse::<usize>()
        {
            self.retrieval.max_context_bytes = n;
        }
    }
}
