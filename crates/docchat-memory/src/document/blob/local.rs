use std::path::PathBuf;

use super::{BlobStore, ScratchFile, validate_key};
use crate::document::error::FetchError;
use crate::vector_store::BoxFuture;

/// Documents stored as files under a root directory.
///
/// Downloads hand out the stored file itself, so nothing is copied or deleted.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    max_file_size: u64,
}

impl LocalBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            root: root.into(),
            max_file_size,
        }
    }
}

impl BlobStore for LocalBlobStore {
    fn download(&self, identity: &str) -> BoxFuture<'_, Result<ScratchFile, FetchError>> {
        let identity = identity.to_owned();
        Box::pin(async move {
            validate_key(&identity)?;
            let path = self.root.join(&identity);
            let meta = match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => return Err(FetchError::NotFound(identity)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(FetchError::NotFound(identity));
                }
                Err(e) => return Err(e.into()),
            };
            if meta.len() > self.max_file_size {
                return Err(FetchError::TooLarge(meta.len()));
            }
            Ok(ScratchFile::borrowed(path))
        })
    }

    fn object_url(&self, identity: &str) -> String {
        format!("file://{}", self.root.join(identity).display())
    }
}
