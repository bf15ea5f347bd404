use std::fmt;

use serde::{Deserialize, Serialize};

use crate::embed::{Embedder, normalize_input};
use crate::error::EmbeddingError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Client for OpenAI-compatible `/embeddings` endpoints.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiEmbedder {
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
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = normalize_input(text);
        let body = EmbeddingRequest {
            input: &input,
            model: &self.model,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(model = %self.model, "OpenAI embedding API error {status}: {text}");
            return Err(EmbeddingError::from_status("openai", status));
        }

        let resp: EmbeddingResponse = serde_json::from_str(&text)?;

        resp.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or(EmbeddingError::EmptyResponse { provider: "openai" })
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn embedder(base_url: &str) -> OpenAiEmbedder {
        OpenAiEmbedder::new(
            reqwest::Client::new(),
            "sk-test-key".into(),
            base_url.into(),
            DEFAULT_MODEL.into(),
        )
    }

    #[test]
    fn new_stores_fields() {
        let e = embedder("https://api.openai.com/v1/");
        assert_eq!(e.base_url, "https://api.openai.com/v1");
        assert_eq!(e.model(), "text-embedding-3-small");
        assert_eq!(e.name(), "openai");
    }

    #[test]
    fn parse_embedding_response() {
        let json = r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#;
        let resp: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].embedding, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn embedding_request_serialization() {
        let req = EmbeddingRequest {
            input: "hello",
            model: "text-embedding-3-small",
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"model\":\"text-embedding-3-small\""));
        assert!(json.contains("\"input\":\"hello\""));
    }

    #[tokio::test]
    async fn embed_returns_first_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("authorization", "Bearer sk-test-key"))
            .and(body_json(serde_json::json!({
                "input": "What is the refund policy?",
                "model": "text-embedding-3-small"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.4, 0.5]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vector = embedder(&server.uri())
            .embed("What is the refund\npolicy?")
            .await
            .unwrap();
        assert_eq!(vector, vec![0.4, 0.5]);
    }

    #[tokio::test]
    async fn empty_data_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let err = embedder(&server.uri()).embed("x").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyResponse { provider: "openai" }));
    }

    #[tokio::test]
    async fn rate_limit_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = embedder(&server.uri()).embed("x").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::RateLimited { provider: "openai" }));
    }

    #[tokio::test]
    async fn embed_unreachable_endpoint_errors() {
        assert!(embedder("http://127.0.0.1:1").embed("test").await.is_err());
    }
}
