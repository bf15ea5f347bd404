use std::collections::HashSet;
use std::sync::Arc;

use docchat_llm::{Embedder, EmbeddingError};
use futures::{StreamExt, TryStreamExt};

use super::{BlobStore, Chunk, ExtractionError, PageExtractor, TextSplitter};
use crate::error::RagError;
use crate::namespace::Namespace;
use crate::vector_store::{VectorIndex, VectorRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Maximum embedding requests in flight during one ingestion.
    pub embed_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            embed_concurrency: 8,
        }
    }
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub namespace: Namespace,
    pub pages: usize,
    pub chunks: usize,
    /// Distinct records upserted; identical chunk texts share one record.
    pub records: usize,
}

/// Fetch, extract, chunk, embed, and upsert one document into its namespace.
pub struct IngestionPipeline<E> {
    blobs: Arc<dyn BlobStore>,
    extractor: Arc<dyn PageExtractor>,
    splitter: TextSplitter,
    embedder: Arc<E>,
    index: Arc<dyn VectorIndex>,
    config: IngestConfig,
}

impl<E> std::fmt::Debug for IngestionPipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("splitter", &self.splitter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: Embedder> IngestionPipeline<E> {
    #[must_use]
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        extractor: Arc<dyn PageExtractor>,
        splitter: TextSplitter,
        embedder: Arc<E>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            blobs,
            extractor,
            splitter,
            embedder,
            index,
            config: IngestConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full ingestion for the document stored under `identity`.
    ///
    /// Nothing is written to the index unless every chunk embedded successfully.
    ///
    /// # Errors
    ///
    /// Returns the [`RagError`] of the first stage that fails.
    #[tracing::instrument(skip(self), fields(namespace = tracing::field::Empty))]
    pub async fn ingest(&self, identity: &str) -> Result<IngestReport, RagError> {
        let namespace = Namespace::from_identity(identity);
        tracing::Span::current().record("namespace", namespace.as_str());

        let scratch = self.blobs.download(identity).await?;
        let pages = self.extractor.extract(scratch.path()).await?;
        scratch.remove().await;
        if pages.is_empty() {
            return Err(ExtractionError::NoPages.into());
        }

        let chunks: Vec<Chunk> = pages
            .iter()
            .flat_map(|page| self.splitter.split(page))
            .collect();
        tracing::debug!(pages = pages.len(), chunks = chunks.len(), "document chunked");

        let mut report = IngestReport {
            namespace,
            pages: pages.len(),
            chunks: chunks.len(),
            records: 0,
        };
        if chunks.is_empty() {
            tracing::info!(pages = report.pages, "document has no text, nothing to index");
            return Ok(report);
        }

        let records = dedup_by_id(self.embed_chunks(&chunks).await?);
        let Some(dimensions) = records.first().map(|r| r.values.len()) else {
            return Ok(report);
        };
        report.records = records.len();

        self.index
            .ensure_index(dimensions as u64)
            .await
            .map_err(RagError::IndexUpsert)?;
        self.index
            .upsert(&report.namespace, records)
            .await
            .map_err(RagError::IndexUpsert)?;

        tracing::info!(
            pages = report.pages,
            chunks = report.chunks,
            records = report.records,
            "document ingested"
        );
        Ok(report)
    }

    /// Embed `chunks` with bounded concurrency, preserving order.
    ///
    /// The first failure cancels the remaining requests.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmbeddingError`] encountered.
    pub async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<VectorRecord>, EmbeddingError> {
        let concurrency = self.config.embed_concurrency.max(1);
        futures::stream::iter(chunks.iter().map(|chunk| async move {
            let values = self.embedder.embed(&chunk.text).await?;
            Ok::<_, EmbeddingError>(VectorRecord::from_chunk(chunk, values))
        }))
        .buffered(concurrency)
        .try_collect()
        .await
    }
}

fn dedup_by_id(records: Vec<VectorRecord>) -> Vec<VectorRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use docchat_llm::mock::MockEmbedder;

    use super::*;
    use crate::document::types::Page;
    use crate::document::{FetchError, ScratchFile, SplitterConfig};
    use crate::in_memory_store::InMemoryIndex;
    use crate::vector_store::BoxFuture;

    struct FixedPages(Vec<Page>);

    impl PageExtractor for FixedPages {
        fn extract(&self, _path: &Path) -> BoxFuture<'_, Result<Vec<Page>, ExtractionError>> {
            let pages = self.0.clone();
            Box::pin(async move { Ok(pages) })
        }

        fn supported_extensions(&self) -> &[&str] {
            &["pdf"]
        }
    }

    struct NullBlobs;

    impl BlobStore for NullBlobs {
        fn download(&self, identity: &str) -> BoxFuture<'_, Result<ScratchFile, FetchError>> {
            let path = PathBuf::from(identity);
            Box::pin(async move { Ok(ScratchFile::borrowed(path)) })
        }

        fn object_url(&self, identity: &str) -> String {
            identity.to_owned()
        }
    }

    struct TempBlobs(PathBuf);

    impl BlobStore for TempBlobs {
        fn download(&self, _identity: &str) -> BoxFuture<'_, Result<ScratchFile, FetchError>> {
            let path = self.0.clone();
            Box::pin(async move { Ok(ScratchFile::temporary(path)) })
        }

        fn object_url(&self, identity: &str) -> String {
            identity.to_owned()
        }
    }

    fn pipeline(
        pages: Vec<Page>,
        embedder: MockEmbedder,
        index: Arc<InMemoryIndex>,
    ) -> IngestionPipeline<MockEmbedder> {
        IngestionPipeline::new(
            Arc::new(NullBlobs),
            Arc::new(FixedPages(pages)),
            TextSplitter::new(SplitterConfig::default()),
            Arc::new(embedder),
            index,
        )
    }

    fn page(number: u32, text: &str) -> Page {
        Page {
            number,
            text: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn no_pages_is_extraction_error() {
        let index = Arc::new(InMemoryIndex::new());
        let err = pipeline(vec![], MockEmbedder::default(), index)
            .ingest("a.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Extraction(ExtractionError::NoPages)));
    }

    #[tokio::test]
    async fn blank_pages_complete_with_zero_records() {
        let index = Arc::new(InMemoryIndex::new());
        let embedder = MockEmbedder::default();
        let report = pipeline(
            vec![page(1, "   "), page(2, "")],
            embedder.clone(),
            Arc::clone(&index),
        )
        .ingest("blank.pdf")
        .await
        .unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.chunks, 0);
        assert_eq!(report.records, 0);
        assert_eq!(embedder.calls(), 0);
        assert_eq!(index.len(&report.namespace), 0);
    }

    #[tokio::test]
    async fn duplicate_chunk_text_stored_once() {
        let index = Arc::new(InMemoryIndex::new());
        let report = pipeline(
            vec![page(1, "Same footer text."), page(2, "Same footer text.")],
            MockEmbedder::default(),
            Arc::clone(&index),
        )
        .ingest("dup.pdf")
        .await
        .unwrap();

        assert_eq!(report.chunks, 2);
        assert_eq!(report.records, 1);
        assert_eq!(index.len(&report.namespace), 1);
    }

    #[tokio::test]
    async fn scratch_copy_removed_after_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("doc-1.pdf");
        std::fs::write(&scratch, b"%PDF").unwrap();

        let report = IngestionPipeline::new(
            Arc::new(TempBlobs(scratch.clone())),
            Arc::new(FixedPages(vec![page(1, "Some text.")])),
            TextSplitter::new(SplitterConfig::default()),
            Arc::new(MockEmbedder::default()),
            Arc::new(InMemoryIndex::new()),
        )
        .ingest("doc.pdf")
        .await
        .unwrap();

        assert_eq!(report.records, 1);
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn embedding_error_propagates() {
        let index = Arc::new(InMemoryIndex::new());
        let err = pipeline(
            vec![page(1, "hello world")],
            MockEmbedder::failing(),
            Arc::clone(&index),
        )
        .ingest("a.pdf")
        .await
        .unwrap_err();

        assert!(matches!(err, RagError::Embedding(_)));
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let pages: Vec<Page> = (1..=12)
            .map(|n| page(n, &format!("Page {n} has its own distinct text.")))
            .collect();
        let embedder = MockEmbedder::default().with_delay(20);
        let index = Arc::new(InMemoryIndex::new());

        let report = pipeline(pages, embedder.clone(), index)
            .with_config(IngestConfig {
                embed_concurrency: 3,
            })
            .ingest("many.pdf")
            .await
            .unwrap();

        assert_eq!(report.records, 12);
        assert_eq!(embedder.calls(), 12);
        assert!(embedder.max_in_flight() <= 3);
        assert!(embedder.max_in_flight() > 1);
    }
}
