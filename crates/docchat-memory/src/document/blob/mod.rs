mod http;
mod local;

use std::path::{Component, Path, PathBuf};

pub use http::HttpBlobStore;
pub use local::LocalBlobStore;

use super::error::FetchError;
use crate::vector_store::BoxFuture;

/// Source of raw document bytes, addressed by document identity.
pub trait BlobStore: Send + Sync {
    /// Make the document available as a local file.
    fn download(&self, identity: &str) -> BoxFuture<'_, Result<ScratchFile, FetchError>>;

    /// Public location of the document, for display only.
    fn object_url(&self, identity: &str) -> String;
}

/// Local copy of a downloaded document.
///
/// Temporary copies are deleted when dropped, so a run cleans up after itself
/// whether it succeeds or fails.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    temporary: bool,
}

impl ScratchFile {
    #[must_use]
    pub fn temporary(path: PathBuf) -> Self {
        Self {
            path,
            temporary: true,
        }
    }

    /// A file owned by someone else; left in place on drop.
    #[must_use]
    pub fn borrowed(path: PathBuf) -> Self {
        Self {
            path,
            temporary: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Delete a temporary copy without blocking the runtime. Borrowed files
    /// are left in place.
    pub async fn remove(mut self) {
        if !self.temporary {
            return;
        }
        self.temporary = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed scratch file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to remove scratch file: {e}");
            }
        }
    }
}

// Fallback for early returns; the blocking unlink of one small file is
// acceptable on an executor thread.
impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.temporary {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed scratch file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to remove scratch file: {e}");
            }
        }
    }
}

/// Reject keys that are empty, absolute, or climb out of their root.
pub(crate) fn validate_key(identity: &str) -> Result<(), FetchError> {
    if identity.trim().is_empty() {
        return Err(FetchError::InvalidKey("empty key".into()));
    }
    let path = Path::new(identity);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(FetchError::InvalidKey(identity.to_owned()));
    }
    Ok(())
}
