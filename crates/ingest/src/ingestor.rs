use crate::chunker::{ParagraphChunker, TextChunk};
use crate::error::IngestError;
use crate::extractor::{PageExtractor, PdfPageExtractor};
use chat_core::IngestConfig;
use tracing::{debug, info, warn};

/// Result of a successful ingestion, ready to be persisted by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedDocument {
    pub name: String,
    pub page_count: usize,
    pub chunks: Vec<TextChunk>,
}

impl IngestedDocument {
    pub fn chunk_contents(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.content.clone()).collect()
    }
}

/// Strips any directory components and surrounding whitespace from an uploaded file name.
pub fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

pub struct DocumentIngestor {
    config: IngestConfig,
    chunker: ParagraphChunker,
    extractor: Box<dyn PageExtractor>,
}

impl std::fmt::Debug for DocumentIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIngestor")
            .field("config", &self.config)
            .field("chunker", &self.chunker)
            .field("extractor", &"PageExtractor<...>")
            .finish()
    }
}

impl DocumentIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self::with_extractor(config, Box::new(PdfPageExtractor))
    }

    pub fn with_extractor(config: IngestConfig, extractor: Box<dyn PageExtractor>) -> Self {
        let chunker = ParagraphChunker::new(config.min_chunk_chars);
        Self {
            config,
            chunker,
            extractor,
        }
    }

    /// Checks the upload's name and extension, returning the display name to store.
    pub fn validate_file_name(&self, file_name: &str) -> Result<String, IngestError> {
        let name = sanitize_file_name(file_name);
        if name.is_empty() {
            return Err(IngestError::EmptyFileName);
        }

        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        let allowed = self
            .config
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension));

        if !allowed {
            return Err(IngestError::InvalidFileType(
                extension,
                self.config.allowed_extensions.join(", "),
            ));
        }

        Ok(name)
    }

    /// Validates, extracts and chunks one upload. Nothing is persisted here.
    pub fn ingest(&self, file_name: &str, bytes: &[u8]) -> Result<IngestedDocument, IngestError> {
        let name = self.validate_file_name(file_name)?;

        let pages = match self.extractor.extract_pages(bytes) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(file_name = %name, error = %e, "Document could not be read");
                return Err(IngestError::NoTextExtracted);
            }
        };
        debug!(file_name = %name, pages = pages.len(), "Extracted pages");

        let chunks: Vec<TextChunk> = self
            .chunker
            .chunk_pages(pages.iter().map(String::as_str))
            .collect();

        if chunks.is_empty() {
            warn!(file_name = %name, pages = pages.len(), "No extractable text");
            return Err(IngestError::NoTextExtracted);
        }

        info!(
            file_name = %name,
            pages = pages.len(),
            chunk_count = chunks.len(),
            "Document chunked"
        );

        Ok(IngestedDocument {
            name,
            page_count: pages.len(),
            chunks,
        })
    }
}
