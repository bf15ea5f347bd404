use std::path::Path;

use super::super::{DEFAULT_MAX_FILE_SIZE, ExtractionError, Page};
use super::PageExtractor;
use super::pdf::number_pages;
use crate::vector_store::BoxFuture;

/// Plain text and Markdown; form feeds (`\x0c`) separate pages.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    pub max_file_size: u64,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl PageExtractor for TextExtractor {
    fn extract(&self, path: &Path) -> BoxFuture<'_, Result<Vec<Page>, ExtractionError>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(ExtractionError::FileTooLarge(meta.len()));
            }

            let content = tokio::fs::read_to_string(&path).await?;
            Ok(number_pages(split_form_feeds(&content)))
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}

fn split_form_feeds(content: &str) -> Vec<String> {
    let mut pages: Vec<String> = content.split('\x0c').map(str::to_owned).collect();
    if pages.len() > 1 && pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}
