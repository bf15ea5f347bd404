use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::{BlobStore, ScratchFile, validate_key};
use crate::document::error::FetchError;
use crate::vector_store::BoxFuture;

/// Object storage reachable over plain HTTP GET, e.g. a public S3 bucket URL.
///
/// Each download is streamed to `{scratch_dir}/doc-{uuid}.{ext}` and removed
/// when the returned [`ScratchFile`] is dropped.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    scratch_dir: PathBuf,
    max_file_size: u64,
}

impl HttpBlobStore {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        mut base_url: String,
        scratch_dir: PathBuf,
        max_file_size: u64,
    ) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client,
            base_url,
            scratch_dir,
            max_file_size,
        }
    }

    fn location(&self, identity: &str) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidKey(format!("bad base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidKey(format!("bad base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(identity.split('/'));
        Ok(url)
    }

    fn scratch_path(&self, identity: &str) -> PathBuf {
        let ext = Path::new(identity)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("pdf");
        self.scratch_dir
            .join(format!("doc-{}.{ext}", uuid::Uuid::new_v4()))
    }
}

impl BlobStore for HttpBlobStore {
    fn download(&self, identity: &str) -> BoxFuture<'_, Result<ScratchFile, FetchError>> {
        let identity = identity.to_owned();
        Box::pin(async move {
            validate_key(&identity)?;
            let url = self.location(&identity)?;

            let mut response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transfer(e.to_string()))?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(identity));
            }
            if !status.is_success() {
                return Err(FetchError::Transfer(format!("{identity}: status {status}")));
            }
            if let Some(len) = response.content_length()
                && len > self.max_file_size
            {
                return Err(FetchError::TooLarge(len));
            }

            tokio::fs::create_dir_all(&self.scratch_dir).await?;
            let scratch = ScratchFile::temporary(self.scratch_path(&identity));
            let mut file = tokio::fs::File::create(scratch.path()).await?;

            let mut written: u64 = 0;
            while let Some(bytes) = response
                .chunk()
                .await
                .map_err(|e| FetchError::Transfer(e.to_string()))?
            {
                written += bytes.len() as u64;
                if written > self.max_file_size {
                    return Err(FetchError::TooLarge(written));
                }
                file.write_all(&bytes).await?;
            }
            file.flush().await?;

            tracing::debug!(
                identity = %identity,
                bytes = written,
                path = %scratch.path().display(),
                "downloaded document"
            );
            Ok(scratch)
        })
    }

    fn object_url(&self, identity: &str) -> String {
        self.location(identity)
            .map_or_else(|_| format!("{}/{identity}", self.base_url), String::from)
    }
}
