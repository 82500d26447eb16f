//! Error types for the chunking engine.

use thiserror::Error;

/// Errors the chunking engine can surface.
///
/// There are no transient or retriable failures here: the engine does no
/// I/O and allocation failures are not modeled. `ConfigInvalid` is reported
/// before any chunk is produced; `UsageViolation` is a programmer error
/// that poisons the streaming chunker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// Configuration failed validation (`min_bytes > max_bytes`, a negative
    /// weight, `overlap_bytes >= max_bytes`, etc).
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// `feed` called after `finalize`, or `finalize` called twice.
    #[error("usage violation: {0}")]
    UsageViolation(String),
}

/// Result type for chunking engine operations.
pub type Result<T> = std::result::Result<T, ChunkError>;
