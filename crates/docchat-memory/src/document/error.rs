/// Failure to obtain the raw document bytes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid document key: {0}")]
    InvalidKey(String),

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("document too large: {0} bytes")]
    TooLarge(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to turn a downloaded file into pages of text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("document has no pages")]
    NoPages,
}
