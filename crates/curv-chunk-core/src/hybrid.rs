//! Hybrid orchestrator (§4.6): re-chunk only the region around an edit,
//! replaying everything outside a guard band verbatim and covering the
//! guarded region with overlapping fixed-size micro-chunks.

use crate::config::{ChunkingConfig, HybridConfig};
use crate::normalizer::SignalNormalizers;
use crate::offline::chunk_offline_with_window;
use crate::score::compute_cut_score;
use crate::signals::{extract_signals, DEFAULT_SIGNAL_WINDOW};
use crate::types::Chunk;

/// A byte range, `[start, end)`, that was edited since the previous
/// partition was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditWindow {
    pub id: u64,
    pub start: u64,
    pub end: u64,
}

/// How a hybrid chunk came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOrigin {
    /// Unchanged from the previous partition; not touched by any guard
    /// band.
    Verbatim { original_index: usize },
    /// A fixed-size, overlapping chunk covering part of a guarded region.
    Micro {
        parent_chunk_index: usize,
        edit_window_id: u64,
    },
    /// No previous partition was supplied; the whole document was
    /// recomputed with the offline selector.
    Recomputed,
}

#[derive(Debug, Clone)]
pub struct HybridChunk {
    pub chunk: Chunk,
    pub origin: ChunkOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GuardedRange {
    start: u64,
    end: u64,
    window_id: u64,
}

/// Re-chunk `data` given its previous partition and the regions that were
/// edited since. If `previous` is empty, falls back to a full offline
/// recompute.
pub fn rechunk_hybrid(
    data: &[u8],
    previous: &[Chunk],
    edit_windows: &[EditWindow],
    config: &ChunkingConfig,
    hybrid_config: &HybridConfig,
) -> Vec<HybridChunk> {
    if previous.is_empty() {
        return chunk_offline_with_window(data, config, DEFAULT_SIGNAL_WINDOW)
            .into_iter()
            .map(|chunk| HybridChunk {
                chunk,
                origin: ChunkOrigin::Recomputed,
            })
            .collect();
    }

    let guarded = merge_guarded_ranges(edit_windows, hybrid_config.guard_band_bytes as u64, data.len() as u64);

    let mut result = Vec::new();

    for (idx, chunk) in previous.iter().enumerate() {
        if !overlaps_any(chunk.byte_start, chunk.byte_end, &guarded) {
            result.push(HybridChunk {
                chunk: chunk.clone(),
                origin: ChunkOrigin::Verbatim { original_index: idx },
            });
        }
    }

    for range in &guarded {
        result.extend(micro_chunk_range(
            data,
            range.start,
            range.end,
            range.window_id,
            previous,
            hybrid_config,
            config,
        ));
    }

    result.sort_by_key(|hc| hc.chunk.byte_start);
    result
}

/// Expand each edit window by the guard band and merge overlapping or
/// touching expansions into a minimal set of disjoint ranges.
fn merge_guarded_ranges(edit_windows: &[EditWindow], guard_band: u64, doc_len: u64) -> Vec<GuardedRange> {
    let mut expanded: Vec<GuardedRange> = edit_windows
        .iter()
        .map(|w| GuardedRange {
            start: w.start.saturating_sub(guard_band),
            end: (w.end + guard_band).min(doc_len),
            window_id: w.id,
        })
        .collect();
    expanded.sort_by_key(|r| r.start);

    let mut merged: Vec<GuardedRange> = Vec::new();
    for range in expanded.drain(..) {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

fn overlaps_any(start: u64, end: u64, ranges: &[GuardedRange]) -> bool {
    ranges.iter().any(|r| start < r.end && end > r.start)
}

/// Cover `[start, end)` with overlapping, fixed-size micro-chunks. Each
/// micro-chunk records the previous-partition chunk it replaces, looked up
/// against its own `[byte_start, byte_end)` rather than the guarded range
/// as a whole, since a range spanning several original chunks (after guard-
/// band expansion or merging adjacent edit windows) would otherwise stamp
/// the same parent onto micro-chunks that replace different chunks.
fn micro_chunk_range(
    data: &[u8],
    start: u64,
    end: u64,
    window_id: u64,
    previous: &[Chunk],
    hybrid_config: &HybridConfig,
    config: &ChunkingConfig,
) -> Vec<HybridChunk> {
    if start >= end {
        return Vec::new();
    }
    let step = (hybrid_config.micro_chunk_bytes - hybrid_config.micro_overlap_bytes).max(1) as u64;
    let mut normalizers = SignalNormalizers::new(config.commit_horizon_bytes, config.normalizer_min_samples);

    let mut chunks = Vec::new();
    let mut pos = start;
    while pos < end {
        let chunk_end = (pos + hybrid_config.micro_chunk_bytes as u64).min(end);
        let local_end = (chunk_end as usize).saturating_sub(1).min(data.len().saturating_sub(1));
        let raw = extract_signals(data, local_end, pos as usize, DEFAULT_SIGNAL_WINDOW);
        let norm = normalizers.normalize(&raw);
        let score = compute_cut_score(&norm, config);
        let parent_chunk_index = previous
            .iter()
            .position(|c| c.byte_start < chunk_end && c.byte_end > pos)
            .unwrap_or(0);

        chunks.push(HybridChunk {
            chunk: Chunk {
                byte_start: pos,
                byte_end: chunk_end,
                content: data[pos as usize..chunk_end as usize].to_vec(),
                cut_score: score,
                raw_signals: raw,
                normalized_signals: norm,
            },
            origin: ChunkOrigin::Micro {
                parent_chunk_index,
                edit_window_id: window_id,
            },
        });

        if chunk_end >= end {
            break;
        }
        pos += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::chunk_offline;

    fn data(n: usize) -> Vec<u8> {
        (0..n as u32).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn no_previous_partition_falls_back_to_offline() {
        let d = data(20_000);
        let config = ChunkingConfig::default();
        let hybrid_config = HybridConfig::default();
        let result = rechunk_hybrid(&d, &[], &[], &config, &hybrid_config);
        assert!(!result.is_empty());
        assert!(result.iter().all(|hc| matches!(hc.origin, ChunkOrigin::Recomputed)));
    }

    #[test]
    fn chunks_far_from_edit_are_replayed_verbatim() {
        let d = data(100_000);
        let config = ChunkingConfig::default();
        let hybrid_config = HybridConfig::default();
        let previous = chunk_offline(&d, &config);
        let edits = vec![EditWindow {
            id: 1,
            start: 50_000,
            end: 50_100,
        }];
        let result = rechunk_hybrid(&d, &previous, &edits, &config, &hybrid_config);

        let has_verbatim = result
            .iter()
            .any(|hc| matches!(hc.origin, ChunkOrigin::Verbatim { .. }) && hc.chunk.byte_end < 10_000);
        assert!(has_verbatim);

        let has_micro = result.iter().any(|hc| matches!(hc.origin, ChunkOrigin::Micro { .. }));
        assert!(has_micro);
    }

    #[test]
    fn micro_chunks_tag_their_edit_window() {
        let d = data(50_000);
        let config = ChunkingConfig::default();
        let hybrid_config = HybridConfig::default();
        let previous = chunk_offline(&d, &config);
        let edits = vec![EditWindow {
            id: 42,
            start: 10_000,
            end: 10_050,
        }];
        let result = rechunk_hybrid(&d, &previous, &edits, &config, &hybrid_config);
        let tagged: Vec<_> = result
            .iter()
            .filter_map(|hc| match hc.origin {
                ChunkOrigin::Micro { edit_window_id, .. } => Some(edit_window_id),
                _ => None,
            })
            .collect();
        assert!(!tagged.is_empty());
        assert!(tagged.iter().all(|&id| id == 42));
    }

    #[test]
    fn result_is_sorted_by_byte_start() {
        let d = data(80_000);
        let config = ChunkingConfig::default();
        let hybrid_config = HybridConfig::default();
        let previous = chunk_offline(&d, &config);
        let edits = vec![
            EditWindow {
                id: 1,
                start: 5_000,
                end: 5_100,
            },
            EditWindow {
                id: 2,
                start: 60_000,
                end: 60_100,
            },
        ];
        let result = rechunk_hybrid(&d, &previous, &edits, &config, &hybrid_config);
        for w in result.windows(2) {
            assert!(w[0].chunk.byte_start <= w[1].chunk.byte_start);
        }
    }

    #[test]
    fn overlapping_edit_windows_merge_into_one_guarded_region() {
        let d = data(30_000);
        let config = ChunkingConfig::default();
        let hybrid_config = HybridConfig::default();
        let previous = chunk_offline(&d, &config);
        let edits = vec![
            EditWindow {
                id: 1,
                start: 10_000,
                end: 10_050,
            },
            EditWindow {
                id: 2,
                start: 10_100,
                end: 10_150,
            },
        ];
        let result = rechunk_hybrid(&d, &previous, &edits, &config, &hybrid_config);
        assert!(!result.is_empty());
    }
}
