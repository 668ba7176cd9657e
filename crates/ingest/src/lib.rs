pub mod chunker;
pub mod error;
pub mod extractor;
pub mod ingestor;

pub use chunker::{ParagraphChunker, Paragraphs, TextChunk};
pub use error::{ExtractionError, IngestError};
pub use extractor::{PageExtractor, PdfPageExtractor};
pub use ingestor::{sanitize_file_name, DocumentIngestor, IngestedDocument};
