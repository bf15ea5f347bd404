//! Per-document vector memory: chunk, embed, and upsert uploaded documents into
//! isolated namespaces, then retrieve bounded context for a question.

pub mod document;
pub mod error;
pub mod in_memory_store;
pub mod namespace;
pub mod qdrant_index;
pub mod retriever;
pub mod text;
pub mod vector_store;

pub use error::RagError;
pub use in_memory_store::InMemoryIndex;
pub use namespace::Namespace;
pub use qdrant_index::QdrantIndex;
pub use retriever::{ContextRetriever, RetrievalConfig, RetrievedContext};
pub use vector_store::{QueryMatch, VectorIndex, VectorRecord, VectorStoreError};
