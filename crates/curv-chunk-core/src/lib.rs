//! Stability-driven chunk boundary computation over byte streams.
//!
//! Partitions a byte stream into variable-length chunks by scoring every
//! candidate cut position with a weighted combination of normalized
//! signals (curvature, stability-margin, disharmony, structural boundary,
//! length deviation), then picking boundaries greedily. Three selectors
//! share the same signal/normalization/scoring core:
//!
//! - [`offline`]: a full-document pass with local-maximum search.
//! - [`streaming`]: an incremental state machine for data arriving in
//!   pushes of arbitrary size.
//! - [`hybrid`]: re-chunks only the region around an edit, replaying the
//!   rest of a previous partition verbatim.

pub mod config;
pub mod error;
pub mod hybrid;
pub mod normalizer;
pub mod offline;
pub mod score;
pub mod signals;
pub mod streaming;
pub mod types;

pub use config::{ChunkingConfig, HybridConfig};
pub use error::{ChunkError, Result};
pub use hybrid::{rechunk_hybrid, ChunkOrigin, EditWindow, HybridChunk};
pub use normalizer::{RollingNormalizer, SignalNormalizers};
pub use offline::{chunk_offline, chunk_offline_with_window};
pub use score::compute_cut_score;
pub use signals::{extract_signals, NormalizedSignals, RawSignals, DEFAULT_SIGNAL_WINDOW};
pub use streaming::StreamingChunker;
pub use types::{Candidate, Chunk};
