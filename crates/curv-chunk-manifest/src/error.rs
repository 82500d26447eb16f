//! Error types for manifest construction, serialization, and validation.

use thiserror::Error;

/// Errors the manifest crate can surface.
#[derive(Error, Debug)]
pub enum Error {
    #[error("manifest validation failed: {message}")]
    Validation { message: String },

    #[error("chunk count mismatch: manifest declares {declared}, found {actual}")]
    ChunkCountMismatch { declared: usize, actual: usize },

    #[error("chunk index mismatch at position {position}: expected {expected}, found {found}")]
    ChunkIndexMismatch {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("chunk {index} byte length mismatch: byte_end - byte_start = {computed}, length field = {declared}")]
    ChunkLengthMismatch {
        index: usize,
        computed: u64,
        declared: u64,
    },

    #[error("chunk {index} content hash mismatch: expected {expected}, computed {found}")]
    ContentHashMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("document content hash mismatch: expected {expected}, computed {found}")]
    DocumentHashMismatch { expected: String, found: String },

    #[error("total_bytes mismatch: manifest declares {declared}, document is {actual} bytes")]
    TotalBytesMismatch { declared: u64, actual: u64 },

    #[error("config_hash mismatch: manifest declares {declared}, recomputed {recomputed}")]
    ConfigHashMismatch { declared: String, recomputed: String },

    #[error("manifest not found at {path}")]
    ManifestNotFound { path: String },

    #[error("invalid manifest path: {path}")]
    InvalidPath { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        Error::ManifestNotFound { path: path.into() }
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Error::InvalidPath { path: path.into() }
    }
}

/// Result type for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_helper_builds_expected_variant() {
        let err = Error::validation("missing field");
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.to_string(), "manifest validation failed: missing field");
    }

    #[test]
    fn manifest_not_found_formats_path() {
        let err = Error::manifest_not_found("/tmp/missing.json");
        assert_eq!(err.to_string(), "manifest not found at /tmp/missing.json");
    }

    #[test]
    fn chunk_count_mismatch_reports_both_values() {
        let err = Error::ChunkCountMismatch {
            declared: 3,
            actual: 2,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('2'));
    }
}
