use std::future::Future;

use crate::error::EmbeddingError;

/// A hosted (or local) model that maps text to a fixed-length vector.
///
/// Implementations submit [`normalize_input`]-ed text and surface every upstream
/// failure as an [`EmbeddingError`]; there is no fallback vector and no retry.
pub trait Embedder: Send + Sync {
    /// Embed `text` into a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails, times out, or returns no vector.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    fn name(&self) -> &'static str;

    fn model(&self) -> &str;
}

/// Collapse literal newlines to spaces before text is sent to an embedding model.
#[must_use]
pub fn normalize_input(text: &str) -> String {
    text.replace('\n', " ")
}
