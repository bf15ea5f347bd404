#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate limited by {provider}")]
    RateLimited { provider: &'static str },

    #[error("{provider} embedding request failed (status {status})")]
    Status { provider: &'static str, status: u16 },

    #[error("empty embedding response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("{0}")]
    Other(String),
}

impl EmbeddingError {
    /// Map a non-success HTTP status into the matching error variant.
    pub(crate) fn from_status(provider: &'static str, status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited { provider }
        } else {
            Self::Status {
                provider,
                status: status.as_u16(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;
