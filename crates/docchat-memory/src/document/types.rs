use serde::{Deserialize, Serialize};

use crate::text::content_hash;

/// Text of one page, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// Metadata stored next to each vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Chunk text, truncated to the configured byte ceiling.
    pub text: String,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Full chunk text; this is what gets embedded.
    pub text: String,
    pub page_number: u32,
    /// Position within the page.
    pub index: usize,
    /// Byte offsets into the normalized page text.
    pub start: usize,
    pub end: usize,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    #[must_use]
    pub fn content_hash(&self) -> String {
        content_hash(&self.text)
    }
}
