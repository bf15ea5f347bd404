use std::sync::Arc;

use docchat_llm::Embedder;

use crate::error::RagError;
use crate::namespace::Namespace;
use crate::text::truncate_to_bytes;
use crate::vector_store::{QueryMatch, VectorIndex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_context_bytes: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_bytes: 3000,
        }
    }
}

/// Context assembled for one question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetrievedContext {
    pub text: String,
    /// Number of matches the index returned.
    pub matches: usize,
    /// Whether `text` was cut to fit the byte budget.
    pub truncated: bool,
}

impl RetrievedContext {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Embeds a question and gathers the closest chunks of one document.
pub struct ContextRetriever<E> {
    embedder: Arc<E>,
    index: Arc<dyn VectorIndex>,
    config: RetrievalConfig,
}

impl<E> std::fmt::Debug for ContextRetriever<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRetriever")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: Embedder> ContextRetriever<E> {
    #[must_use]
    pub fn new(embedder: Arc<E>, index: Arc<dyn VectorIndex>, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Context for `query` from the document stored under `identity`, using the
    /// configured `top_k` and byte budget. Returns `""` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] or [`RagError::IndexQuery`].
    pub async fn retrieve_context(&self, query: &str, identity: &str) -> Result<String, RagError> {
        self.retrieve_context_with(
            query,
            identity,
            self.config.top_k,
            self.config.max_context_bytes,
        )
        .await
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
        Ok(self
            .retrieve(query, identity, top_k, max_context_bytes)
            .await?
            .text)
    }

    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] or [`RagError::IndexQuery`].
    #[tracing::instrument(skip(self, query), fields(namespace = tracing::field::Empty))]
    pub async fn retrieve(
        &self,
        query: &str,
        identity: &str,
        top_k: usize,
        max_context_bytes: usize,
    ) -> Result<RetrievedContext, RagError> {
        let namespace = Namespace::from_identity(identity);
        tracing::Span::current().record("namespace", namespace.as_str());
        if top_k == 0 {
            return Ok(RetrievedContext::default());
        }

        let vector = self.embedder.embed(query).await?;
        let matches = self
            .index
            .query(&namespace, vector, top_k as u64, true)
            .await
            .map_err(RagError::IndexQuery)?;

        let (text, truncated) = assemble_context(&matches, max_context_bytes);
        tracing::debug!(
            matches = matches.len(),
            bytes = text.len(),
            truncated,
            "context retrieved"
        );
        Ok(RetrievedContext {
            text,
            matches: matches.len(),
            truncated,
        })
    }
}

/// Join match texts with `\n` in the given order and cut to `max_bytes`.
///
/// Returns the context and whether it was truncated.
#[must_use]
pub fn assemble_context(matches: &[QueryMatch], max_bytes: usize) -> (String, bool) {
    let joined = matches
        .iter()
        .map(QueryMatch::text)
        .collect::<Vec<_>>()
        .join("\n");
    let kept = truncate_to_bytes(&joined, max_bytes);
    (kept.to_owned(), kept.len() < joined.len())
}
