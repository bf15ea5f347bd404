pub mod blob;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod splitter;
pub mod types;

pub use blob::{BlobStore, HttpBlobStore, LocalBlobStore, ScratchFile};
pub use error::{ExtractionError, FetchError};
pub use loader::{ExtensionExtractor, PageExtractor, PdfExtractor, TextExtractor};
pub use pipeline::{IngestConfig, IngestReport, IngestionPipeline};
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, ChunkMetadata, Page};

/// Default maximum document size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
