mod pdf;
mod text;

use std::path::Path;
use std::sync::Arc;

pub use pdf::PdfExtractor;
pub use text::TextExtractor;

use super::error::ExtractionError;
use super::types::Page;
use crate::vector_store::BoxFuture;

/// Turns a local file into per-page text.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> BoxFuture<'_, Result<Vec<Page>, ExtractionError>>;

    fn supported_extensions(&self) -> &[&str];
}

/// Dispatches to the first extractor that claims the file's extension.
#[derive(Clone)]
pub struct ExtensionExtractor {
    extractors: Vec<Arc<dyn PageExtractor>>,
}

impl std::fmt::Debug for ExtensionExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionExtractor")
            .field("extractors", &self.extractors.len())
            .finish()
    }
}

impl ExtensionExtractor {
    #[must_use]
    pub fn new(extractors: Vec<Arc<dyn PageExtractor>>) -> Self {
        Self { extractors }
    }

    /// PDF and plain-text extractors sharing one size limit.
    #[must_use]
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self::new(vec![
            Arc::new(PdfExtractor { max_file_size }),
            Arc::new(TextExtractor { max_file_size }),
        ])
    }

    fn find(&self, extension: &str) -> Option<&Arc<dyn PageExtractor>> {
        self.extractors
            .iter()
            .find(|e| e.supported_extensions().contains(&extension))
    }
}

impl Default for ExtensionExtractor {
    fn default() -> Self {
        Self::with_max_file_size(super::DEFAULT_MAX_FILE_SIZE)
    }
}

impl PageExtractor for ExtensionExtractor {
    fn extract(&self, path: &Path) -> BoxFuture<'_, Result<Vec<Page>, ExtractionError>> {
        let path = path.to_path_buf();
        Box::pin(async move {
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            let Some(extractor) = self.find(&extension) else {
                return Err(ExtractionError::UnsupportedFormat(if extension.is_empty() {
                    path.display().to_string()
                } else {
                    extension
                }));
            };
            extractor.extract(&path).await
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf", "txt", "md", "markdown"]
    }
}
