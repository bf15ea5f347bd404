use docchat_llm::EmbeddingError;

use crate::document::error::{ExtractionError, FetchError};
use crate::vector_store::VectorStoreError;

/// Failure of an ingestion or retrieval run, tagged by the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("document fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index upsert failed: {0}")]
    IndexUpsert(#[source] VectorStoreError),

    #[error("index query failed: {0}")]
    IndexQuery(#[source] VectorStoreError),
}

impl RagError {
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Extraction(_) => "extraction",
            Self::Embedding(_) => "embedding",
            Self::IndexUpsert(_) => "index_upsert",
            Self::IndexQuery(_) => "index_query",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(
            RagError::from(FetchError::NotFound("a.pdf".into())).stage(),
            "fetch"
        );
        assert_eq!(RagError::from(ExtractionError::NoPages).stage(), "extraction");
        assert_eq!(
            RagError::from(EmbeddingError::Other("x".into())).stage(),
            "embedding"
        );
        assert_eq!(
            RagError::IndexUpsert(VectorStoreError::Upsert("x".into())).stage(),
            "index_upsert"
        );
        assert_eq!(
            RagError::IndexQuery(VectorStoreError::Search("x".into())).stage(),
            "index_query"
        );
    }

    #[test]
    fn display_includes_cause() {
        let err = RagError::IndexQuery(VectorStoreError::Search("timeout".into()));
        assert_eq!(err.to_string(), "index query failed: search error: timeout");
    }
}
