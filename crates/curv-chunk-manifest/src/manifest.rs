//! Deterministic chunk manifest: the durable, verifiable record of how a
//! document was partitioned (§6.2).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use curv_chunk_core::{Chunk, ChunkingConfig, NormalizedSignals, RawSignals};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Per-chunk metadata recorded in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub index: usize,
    pub byte_start: u64,
    pub byte_end: u64,
    pub length: u64,
    pub content_sha256: String,
    pub cut_score: f64,
    pub signals: RawSignals,
    pub normalized_signals: NormalizedSignals,
}

/// The full, ordered record of a document's partition into chunks.
///
/// Two manifests built from the same document bytes and the same
/// configuration are byte-for-byte identical except for `created_at`
/// (§6.2 P11): every other field is a pure function of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkManifest {
    pub doc_id: String,
    pub doc_content_sha256: String,
    pub total_bytes: u64,
    pub chunk_count: usize,
    pub config_hash: String,
    pub config: BTreeMap<String, String>,
    pub created_at: String,
    pub chunks: Vec<ChunkMetadata>,
}

impl ChunkManifest {
    /// Build a manifest from a document and the chunks computed over it.
    pub fn build(doc_id: impl Into<String>, data: &[u8], config: &ChunkingConfig, chunks: &[Chunk]) -> Self {
        let doc_content_sha256 = hex_digest(data);
        let config_hash = config.fingerprint();
        let config: BTreeMap<String, String> = config
            .canonical_map()
            .into_iter()
            .map(|(k, v)| (k, v.as_str().unwrap_or_default().to_string()))
            .collect();

        let chunk_metadata = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| ChunkMetadata {
                index,
                byte_start: chunk.byte_start,
                byte_end: chunk.byte_end,
                length: chunk.byte_end - chunk.byte_start,
                content_sha256: hex_digest(&chunk.content),
                cut_score: chunk.cut_score,
                signals: chunk.raw_signals,
                normalized_signals: chunk.normalized_signals,
            })
            .collect();

        Self {
            doc_id: doc_id.into(),
            doc_content_sha256,
            total_bytes: data.len() as u64,
            chunk_count: chunks.len(),
            config_hash,
            config,
            created_at: Utc::now().to_rfc3339(),
            chunks: chunk_metadata,
        }
    }

    /// Serialize to pretty-printed JSON and write to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a manifest previously written by [`ChunkManifest::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::manifest_not_found(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }

    /// Structural self-validation that does not require the original
    /// document: chunk count, index ordering, byte-length consistency, and
    /// the configuration fingerprint (§8 P4, P6).
    pub fn verify_structural(&self) -> Result<()> {
        if self.chunk_count != self.chunks.len() {
            return Err(Error::ChunkCountMismatch {
                declared: self.chunk_count,
                actual: self.chunks.len(),
            });
        }
        for (position, chunk) in self.chunks.iter().enumerate() {
            if chunk.index != position {
                return Err(Error::ChunkIndexMismatch {
                    position,
                    expected: position,
                    found: chunk.index,
                });
            }
            let computed = chunk.byte_end - chunk.byte_start;
            if computed != chunk.length {
                return Err(Error::ChunkLengthMismatch {
                    index: chunk.index,
                    computed,
                    declared: chunk.length,
                });
            }
        }
        self.verify_config_hash()
    }

    /// Cross-check a freshly computed chunk sequence against this manifest:
    /// same count, same offsets, same content hashes. Used to confirm a
    /// manifest still describes the partition a re-run of the chunker would
    /// produce, without re-deriving the manifest itself.
    pub fn verify_chunks(&self, chunks: &[Chunk]) -> std::result::Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if self.chunk_count != chunks.len() {
            problems.push(format!(
                "chunk count mismatch: manifest has {}, recomputed sequence has {}",
                self.chunk_count,
                chunks.len()
            ));
        }

        for (index, (meta, chunk)) in self.chunks.iter().zip(chunks.iter()).enumerate() {
            if meta.byte_start != chunk.byte_start || meta.byte_end != chunk.byte_end {
                problems.push(format!(
                    "chunk {index} offsets differ: manifest [{}, {}), recomputed [{}, {})",
                    meta.byte_start, meta.byte_end, chunk.byte_start, chunk.byte_end
                ));
            }
            let recomputed_hash = hex_digest(&chunk.content);
            if meta.content_sha256 != recomputed_hash {
                problems.push(format!(
                    "chunk {index} content hash differs: manifest {}, recomputed {}",
                    meta.content_sha256, recomputed_hash
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Recompute the configuration fingerprint from the embedded canonical
    /// map and compare it against the declared `config_hash` (§6.2 P6).
    pub fn verify_config_hash(&self) -> Result<()> {
        let canonical = self
            .config
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";");
        let digest = Sha256::digest(canonical.as_bytes());
        let recomputed = hex::encode(&digest[..8]);
        if recomputed != self.config_hash {
            return Err(Error::ConfigHashMismatch {
                declared: self.config_hash.clone(),
                recomputed,
            });
        }
        Ok(())
    }

    /// Full validation against the original document: structural checks
    /// plus the document hash and every per-chunk content hash (§8 P11).
    pub fn validate(&self, doc_bytes: &[u8]) -> Result<()> {
        self.verify_structural()?;

        if self.total_bytes != doc_bytes.len() as u64 {
            return Err(Error::TotalBytesMismatch {
                declared: self.total_bytes,
                actual: doc_bytes.len() as u64,
            });
        }
        let actual_doc_hash = hex_digest(doc_bytes);
        if actual_doc_hash != self.doc_content_sha256 {
            return Err(Error::DocumentHashMismatch {
                expected: self.doc_content_sha256.clone(),
                found: actual_doc_hash,
            });
        }

        self.verify_chunk_integrity(doc_bytes)
    }

    /// Recompute and compare each chunk's content hash against the slice
    /// of `doc_bytes` its offsets describe.
    pub fn verify_chunk_integrity(&self, doc_bytes: &[u8]) -> Result<()> {
        for chunk in &self.chunks {
            let start = chunk.byte_start as usize;
            let end = chunk.byte_end as usize;
            if end > doc_bytes.len() || start > end {
                return Err(Error::validation(format!(
                    "chunk {} byte range [{start}, {end}) is out of bounds for a {}-byte document",
                    chunk.index,
                    doc_bytes.len()
                )));
            }
            let expected = hex_digest(&doc_bytes[start..end]);
            if expected != chunk.content_sha256 {
                return Err(Error::ContentHashMismatch {
                    index: chunk.index,
                    expected: chunk.content_sha256.clone(),
                    found: expected,
                });
            }
        }
        Ok(())
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
