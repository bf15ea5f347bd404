use crate::embed::Embedder;
use crate::error::EmbeddingError;
use crate::huggingface::HuggingFaceEmbedder;
#[cfg(feature = "mock")]
use crate::mock::MockEmbedder;
use crate::openai::OpenAiEmbedder;

/// Generates a match over all `AnyEmbedder` variants, binding the inner embedder
/// and evaluating the given expression for each arm.
macro_rules! delegate_embedder {
    ($self:expr, |$e:ident| $expr:expr) => {
        match $self {
            AnyEmbedder::HuggingFace($e) => $expr,
            AnyEmbedder::OpenAi($e) => $expr,
            #[cfg(feature = "mock")]
            AnyEmbedder::Mock($e) => $expr,
        }
    };
}

/// Embedding backend selected at runtime from configuration.
#[derive(Debug, Clone)]
pub enum AnyEmbedder {
    HuggingFace(HuggingFaceEmbedder),
    OpenAi(OpenAiEmbedder),
    #[cfg(feature = "mock")]
    Mock(MockEmbedder),
}

impl Embedder for AnyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        delegate_embedder!(self, |e| e.embed(text).await)
    }

    fn name(&self) -> &'static str {
        delegate_embedder!(self, |e| e.name())
    }

    fn model(&self) -> &str {
        delegate_embedder!(self, |e| e.model())
    }
}
