use std::fmt;

use serde::{Deserialize, Serialize};

use crate::embed::{Embedder, normalize_input};
use crate::error::EmbeddingError;

pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference";
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Hugging Face Inference `feature-extraction` pipeline client.
#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for HuggingFaceEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceEmbedder")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl HuggingFaceEmbedder {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        mut base_url: String,
        model: String,
    ) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}/pipeline/feature-extraction",
            self.base_url, self.model
        )
    }
}

impl Embedder for HuggingFaceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = normalize_input(text);
        let body = FeatureExtractionRequest { inputs: &input };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(model = %self.model, "Hugging Face embedding API error {status}: {text}");
            return Err(EmbeddingError::from_status("huggingface", status));
        }

        let parsed: FeatureExtractionResponse = serde_json::from_str(&text)?;
        parsed.into_vector().ok_or(EmbeddingError::EmptyResponse {
            provider: "huggingface",
        })
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

/// Sentence-transformer models return one pooled vector; raw encoders return
/// one row per token.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Pooled(Vec<f32>),
    Rows(Vec<Vec<f32>>),
}

impl FeatureExtractionResponse {
    fn into_vector(self) -> Option<Vec<f32>> {
        match self {
            Self::Pooled(v) if v.is_empty() => None,
            Self::Pooled(v) => Some(v),
            Self::Rows(mut rows) if rows.len() == 1 => rows.pop().filter(|r| !r.is_empty()),
            Self::Rows(rows) => mean_pool(&rows),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_pool(rows: &[Vec<f32>]) -> Option<Vec<f32>> {
    let dims = rows.first()?.len();
    if dims == 0 || rows.iter().any(|r| r.len() != dims) {
        return None;
    }
    let mut sum = vec![0.0f32; dims];
    for row in rows {
        for (acc, v) in sum.iter_mut().zip(row) {
            *acc += v;
        }
    }
    let n = rows.len() as f32;
    Some(sum.into_iter().map(|v| v / n).collect())
}
