//! Embedding clients turning text into fixed-length vectors.

pub mod any;
pub mod embed;
pub mod error;
pub mod http;
pub mod huggingface;
#[cfg(feature = "mock")]
pub mod mock;
pub mod openai;

pub use any::AnyEmbedder;
pub use embed::{Embedder, normalize_input};
pub use error::EmbeddingError;
