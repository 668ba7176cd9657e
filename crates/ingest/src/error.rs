use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("No file selected")]
    EmptyFileName,

    #[error("Invalid file type '{0}'. Allowed: {1}")]
    InvalidFileType(String, String),

    #[error("Could not extract text from document")]
    NoTextExtracted,
}

/// Raised by a [`crate::PageExtractor`] when the bytes cannot be read as a document.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to extract pages: {0}")]
pub struct ExtractionError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_error_messages() {
        assert_eq!(IngestError::EmptyFileName.to_string(), "No file selected");
        assert_eq!(
            IngestError::InvalidFileType("txt".to_string(), "pdf".to_string()).to_string(),
            "Invalid file type 'txt'. Allowed: pdf"
        );
        assert_eq!(
            IngestError::NoTextExtracted.to_string(),
            "Could not extract text from document"
        );
        assert_eq!(
            ExtractionError("bad xref".to_string()).to_string(),
            "Failed to extract pages: bad xref"
        );
    }
}
