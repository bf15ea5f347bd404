use std::sync::Arc;

use docchat_llm::Embedder;
use docchat_memory::document::{
    BlobStore, IngestConfig, IngestReport, IngestionPipeline, PageExtractor, TextSplitter,
};
use docchat_memory::{ContextRetriever, RagError, RetrievalConfig, VectorIndex};

/// Retrieval outcome as seen by prompt assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContext {
    /// Matching passages were found.
    Found(String),
    /// The document has no passages close to the question.
    Empty,
    /// Retrieval failed; holds the reason.
    Unavailable(String),
}

/// Everything a chat session needs from one uploaded document.
pub struct DocumentChat<E> {
    pipeline: IngestionPipeline<E>,
    retriever: ContextRetriever<E>,
    blobs: Arc<dyn BlobStore>,
}

impl<E> std::fmt::Debug for DocumentChat<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentChat")
            .field("pipeline", &self.pipeline)
            .field("retriever", &self.retriever)
            .finish_non_exhaustive()
    }
}

/// Shared clients and tuning for a [`DocumentChat`].
pub struct ChatParts<E> {
    pub blobs: Arc<dyn BlobStore>,
    pub extractor: Arc<dyn PageExtractor>,
    pub splitter: TextSplitter,
    pub embedder: Arc<E>,
    pub index: Arc<dyn VectorIndex>,
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
}

impl<E: Embedder> DocumentChat<E> {
    #[must_use]
    pub fn new(parts: ChatParts<E>) -> Self {
        let pipeline = IngestionPipeline::new(
            Arc::clone(&parts.blobs),
            parts.extractor,
            parts.splitter,
            Arc::clone(&parts.embedder),
            Arc::clone(&parts.index),
        )
        .with_config(parts.ingest);
        let retriever = ContextRetriever::new(parts.embedder, parts.index, parts.retrieval);
        Self {
            pipeline,
            retriever,
            blobs: parts.blobs,
        }
    }

    /// Index the document stored under `identity`.
    ///
    /// # Errors
    ///
    /// Returns the [`RagError`] of the failed stage.
    pub async fn ingest(&self, identity: &str) -> Result<IngestReport, RagError> {
        self.pipeline.ingest(identity).await
    }

    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] or [`RagError::IndexQuery`].
    pub async fn retrieve_context(&self, query: &str, identity: &str) -> Result<String, RagError> {
        self.retriever.retrieve_context(query, identity).await
    }

    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] or [`RagError::IndexQuery`].
    pub async fn retrieve_context_with(
        &self,
        query: &str,
        identity: &str,
        top_k: usize,
        max_context_bytes: usize,
    ) -> Result<String, RagError> {
        self.retriever
            .retrieve_context_with(query, identity, top_k, max_context_bytes)
            .await
    }

    /// Context for a chat turn. Retrieval failures degrade to
    /// [`PromptContext::Unavailable`] instead of failing the turn.
    pub async fn prompt_context(&self, query: &str, identity: &str) -> PromptContext {
        match self.retriever.retrieve_context(query, identity).await {
            Ok(text) if text.trim().is_empty() => PromptContext::Empty,
            Ok(text) => PromptContext::Found(text),
            Err(e) => {
                tracing::warn!(identity, stage = e.stage(), "context retrieval failed: {e}");
                PromptContext::Unavailable(e.to_string())
            }
        }
    }

    #[must_use]
    pub fn object_url(&self, identity: &str) -> String {
        self.blobs.object_url(identity)
    }
}
