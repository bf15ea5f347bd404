use std::path::Path;

use super::super::{DEFAULT_MAX_FILE_SIZE, ExtractionError, Page};
use super::PageExtractor;
use crate::vector_store::BoxFuture;

/// Per-page PDF text extraction via `pdf-extract`, run on a blocking thread.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    pub max_file_size: u64,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl PageExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> BoxFuture<'_, Result<Vec<Page>, ExtractionError>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(ExtractionError::FileTooLarge(meta.len()));
            }

            let texts = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_by_pages(&path)
                    .map_err(|e| ExtractionError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| ExtractionError::Pdf(format!("parser task failed: {e}")))??;

            let pages = number_pages(texts);
            if pages.is_empty() {
                return Err(ExtractionError::NoPages);
            }
            tracing::debug!(pages = pages.len(), "extracted PDF text");
            Ok(pages)
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

pub(super) fn number_pages(texts: Vec<String>) -> Vec<Page> {
    (1u32..)
        .zip(texts)
        .map(|(number, text)| Page { number, text })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_numbered_from_one() {
        let pages = number_pages(vec!["a".into(), "b".into()]);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[1].number, 2);
        assert_eq!(pages[1].text, "b");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = PdfExtractor::default()
            .extract(Path::new("/nonexistent/doc.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[tokio::test]
    async fn oversized_file_rejected_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.pdf");
        std::fs::write(&file, vec![0u8; 64]).unwrap();

        let err = PdfExtractor { max_file_size: 16 }
            .extract(&file)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::FileTooLarge(64)));
    }

    #[tokio::test]
    async fn garbage_bytes_are_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("garbage.pdf");
        std::fs::write(&file, b"%PDF-garbage").unwrap();

        let err = PdfExtractor::default().extract(&file).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }
}
