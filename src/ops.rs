//! Operations backing the CLI subcommands: chunk a file, hybrid-rechunk
//! against a previous manifest, and verify a manifest against its file.

use std::path::Path;

use curv_chunk_core::{chunk_offline_with_window, Chunk, EditWindow, StreamingChunker};
use curv_chunk_manifest::{ChunkManifest, ChunkMetadata};
use tracing::info;

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Which selector `curv-chunk chunk` should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMode {
    Offline,
    Streaming,
}

pub fn run_chunk(
    input_path: &Path,
    mode: ChunkMode,
    fragment_size: usize,
    doc_id: &str,
    manifest_path: Option<&Path>,
    config: &AppConfig,
) -> Result<Vec<Chunk>> {
    let data = read_file(input_path)?;
    info!(bytes = data.len(), mode = ?mode, "chunking file");

    let chunks = match mode {
        ChunkMode::Offline => chunk_offline_with_window(&data, &config.chunking, config.signal_window_bytes),
        ChunkMode::Streaming => {
            let mut chunker =
                StreamingChunker::with_signal_window(config.chunking.clone(), config.signal_window_bytes)?;
            let mut chunks = Vec::new();
            for block in data.chunks(fragment_size.max(1)) {
                chunks.extend(chunker.feed(block)?);
            }
            chunks.extend(chunker.finalize()?);
            chunks
        }
    };

    info!(chunk_count = chunks.len(), "chunking complete");

    if let Some(manifest_path) = manifest_path {
        let manifest = ChunkManifest::build(doc_id, &data, &config.chunking, &chunks);
        manifest.save(manifest_path).map_err(AppError::Manifest)?;
        info!(path = %manifest_path.display(), "manifest written");
    }

    Ok(chunks)
}

pub fn run_hybrid(
    input_path: &Path,
    prev_manifest_path: &Path,
    edit_start: u64,
    edit_end: u64,
    manifest_path: Option<&Path>,
    config: &AppConfig,
) -> Result<Vec<curv_chunk_core::HybridChunk>> {
    if edit_start > edit_end {
        return Err(AppError::Usage(format!(
            "edit-start ({edit_start}) must be <= edit-end ({edit_end})"
        )));
    }

    let data = read_file(input_path)?;
    let prev_manifest = ChunkManifest::load(prev_manifest_path).map_err(AppError::Manifest)?;
    let previous: Vec<Chunk> = prev_manifest
        .chunks
        .iter()
        .map(|meta| chunk_from_metadata(&data, meta))
        .collect();

    let edit_windows = vec![EditWindow {
        id: 0,
        start: edit_start,
        end: edit_end,
    }];

    let result = curv_chunk_core::rechunk_hybrid(&data, &previous, &edit_windows, &config.chunking, &config.hybrid);
    info!(chunk_count = result.len(), "hybrid re-chunk complete");

    if let Some(manifest_path) = manifest_path {
        let chunks: Vec<Chunk> = result.iter().map(|hc| hc.chunk.clone()).collect();
        let manifest = ChunkManifest::build(prev_manifest.doc_id.clone(), &data, &config.chunking, &chunks);
        manifest.save(manifest_path).map_err(AppError::Manifest)?;
        info!(path = %manifest_path.display(), "manifest written");
    }

    Ok(result)
}

pub fn run_verify(input_path: &Path, manifest_path: &Path) -> Result<()> {
    let data = read_file(input_path)?;
    let manifest = ChunkManifest::load(manifest_path).map_err(AppError::Manifest)?;
    manifest.validate(&data).map_err(AppError::Manifest)?;
    info!(path = %manifest_path.display(), "manifest verified");
    Ok(())
}

fn chunk_from_metadata(data: &[u8], meta: &ChunkMetadata) -> Chunk {
    let start = meta.byte_start as usize;
    let end = meta.byte_end as usize;
    Chunk {
        byte_start: meta.byte_start,
        byte_end: meta.byte_end,
        content: data[start..end].to_vec(),
        cut_score: meta.cut_score,
        raw_signals: meta.signals,
        normalized_signals: meta.normalized_signals,
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| AppError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}
