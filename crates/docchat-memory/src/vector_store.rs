use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::document::types::{Chunk, ChunkMetadata};
use crate::namespace::Namespace;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("search error: {0}")]
    Search(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One embedded chunk ready for upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    /// Content hash of the untruncated chunk text.
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl VectorRecord {
    #[must_use]
    pub fn from_chunk(chunk: &Chunk, values: Vec<f32>) -> Self {
        Self {
            id: chunk.content_hash(),
            values,
            metadata: chunk.metadata.clone(),
        }
    }

    /// Metadata as a flat JSON map, the shape stored alongside the vector.
    ///
    /// # Errors
    ///
    /// Returns [`VectorStoreError::Serialization`] if the metadata cannot be encoded.
    pub fn metadata_map(&self) -> Result<HashMap<String, serde_json::Value>, VectorStoreError> {
        match serde_json::to_value(&self.metadata) {
            Ok(serde_json::Value::Object(map)) => Ok(map.into_iter().collect()),
            Ok(other) => Err(VectorStoreError::Serialization(format!(
                "expected metadata object, got {other}"
            ))),
            Err(e) => Err(VectorStoreError::Serialization(e.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    /// Empty unless metadata was requested.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl QueryMatch {
    /// Stored chunk text, or `""` when absent or not a string.
    #[must_use]
    pub fn text(&self) -> &str {
        self.metadata
            .get("text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    #[must_use]
    pub fn page_number(&self) -> Option<u32> {
        self.metadata
            .get("page_number")
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }
}

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Namespaced similarity index.
///
/// Every read and write is scoped to one [`Namespace`]; records written under
/// one namespace are never returned by a query against another.
pub trait VectorIndex: Send + Sync {
    /// Provision backing storage for vectors of `vector_size` dimensions. Idempotent.
    fn ensure_index(&self, vector_size: u64) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Insert or overwrite `records` by id within `namespace`. An empty batch is a no-op.
    fn upsert<'a>(
        &'a self,
        namespace: &'a Namespace,
        records: Vec<VectorRecord>,
    ) -> BoxFuture<'a, Result<(), VectorStoreError>>;

    /// Up to `top_k` records nearest to `vector` by cosine similarity, best first.
    ///
    /// An unknown or empty namespace yields an empty list.
    fn query<'a>(
        &'a self,
        namespace: &'a Namespace,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> BoxFuture<'a, Result<Vec<QueryMatch>, VectorStoreError>>;
}
