//! Top-level application error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the `curv-chunk` binary and library.
///
/// Library-internal failures (`ChunkError`, manifest `Error`) are wrapped
/// rather than flattened, so a caller can match on their origin; I/O and
/// config-parse failures carry the offending path for diagnostics.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Chunk(#[from] curv_chunk_core::ChunkError),

    #[error(transparent)]
    Manifest(#[from] curv_chunk_manifest::Error),

    #[error("{0}")]
    Usage(String),
}

/// Result type for application-level operations.
pub type Result<T> = std::result::Result<T, AppError>;
