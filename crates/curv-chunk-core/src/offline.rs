//! Offline boundary selector (§4.4): a full left-to-right scan followed by
//! greedy, size-bounded local-maximum boundary selection.

use crate::config::ChunkingConfig;
use crate::normalizer::SignalNormalizers;
use crate::score::compute_cut_score;
use crate::signals::{extract_signals, NormalizedSignals, RawSignals, DEFAULT_SIGNAL_WINDOW};
use crate::types::Chunk;

/// One recorded position from the single left-to-right scoring pass.
#[derive(Debug, Clone)]
struct ScoredPosition {
    pos: usize,
    score: f64,
    raw: RawSignals,
    norm: NormalizedSignals,
}

/// Chunk a full document using the offline stability-driven algorithm,
/// with the default signal window (§4.1).
pub fn chunk_offline(data: &[u8], config: &ChunkingConfig) -> Vec<Chunk> {
    chunk_offline_with_window(data, config, DEFAULT_SIGNAL_WINDOW)
}

/// Chunk a full document with an explicit signal window width.
pub fn chunk_offline_with_window(data: &[u8], config: &ChunkingConfig, signal_window: usize) -> Vec<Chunk> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    if n <= config.min_bytes {
        return vec![Chunk {
            byte_start: 0,
            byte_end: n as u64,
            content: data.to_vec(),
            cut_score: 0.0,
            raw_signals: RawSignals::zeroed(n as u64),
            normalized_signals: NormalizedSignals::zeroed(n as u64),
        }];
    }

    // Single left-to-right pass. `chunk_start` is fixed at 0 for the whole
    // pass: boundaries are not known yet, so the L signal recorded here is
    // measured from the document start, not from the (still undetermined)
    // start of whatever chunk a position eventually lands in.
    let mut normalizers = SignalNormalizers::new(config.commit_horizon_bytes, config.normalizer_min_samples);
    let mut table = Vec::with_capacity(n);
    for pos in 0..n {
        let raw = extract_signals(data, pos, 0, signal_window);
        let norm = normalizers.normalize(&raw);
        let score = compute_cut_score(&norm, config);
        table.push(ScoredPosition { pos, score, raw, norm });
    }

    let min_distance = config.min_distance();
    let mut chunks = Vec::new();
    let mut current_start = 0usize;

    while current_start < n {
        let remaining = n - current_start;

        if remaining <= config.max_bytes {
            let mut best: Option<&ScoredPosition> = None;
            for sp in &table {
                if sp.pos > current_start && sp.pos <= n && sp.pos >= current_start + config.min_bytes {
                    let better = match best {
                        Some(b) => sp.score > b.score,
                        None => true,
                    };
                    if better {
                        best = Some(sp);
                    }
                }
            }
            let (score, raw, norm) = match best {
                Some(sp) => (sp.score, sp.raw, sp.norm),
                None => (
                    0.0,
                    RawSignals::zeroed(remaining as u64),
                    NormalizedSignals::zeroed(remaining as u64),
                ),
            };
            chunks.push(Chunk {
                byte_start: current_start as u64,
                byte_end: n as u64,
                content: data[current_start..n].to_vec(),
                cut_score: score,
                raw_signals: raw,
                normalized_signals: norm,
            });
            break;
        }

        let min_pos = current_start + config.min_bytes;
        let max_pos = (current_start + config.max_bytes).min(n);

        let candidates: Vec<&ScoredPosition> = table
            .iter()
            .filter(|sp| sp.pos >= min_pos && sp.pos <= max_pos)
            .collect();

        if candidates.is_empty() {
            // Should not occur with valid configuration; force a cut.
            let end_pos = max_pos;
            let raw = extract_signals(data, end_pos.min(n.saturating_sub(1)), current_start, signal_window);
            let norm = NormalizedSignals {
                k: 0.0,
                s: 0.0,
                d: 0.0,
                b: raw.b,
                l: (end_pos - current_start) as u64,
            };
            chunks.push(Chunk {
                byte_start: current_start as u64,
                byte_end: end_pos as u64,
                content: data[current_start..end_pos].to_vec(),
                cut_score: 0.0,
                raw_signals: raw,
                normalized_signals: norm,
            });
            current_start = end_pos.saturating_sub(config.overlap_bytes).max(current_start);
            continue;
        }

        let maxima = find_local_maxima(&candidates, min_distance);
        let best = if !maxima.is_empty() {
            pick_max_by_score(&maxima)
        } else {
            pick_max_by_score(&candidates)
        };

        let end_pos = best.pos;
        chunks.push(Chunk {
            byte_start: current_start as u64,
            byte_end: end_pos as u64,
            content: data[current_start..end_pos].to_vec(),
            cut_score: best.score,
            raw_signals: best.raw,
            normalized_signals: best.norm,
        });

        current_start = if config.overlap_bytes > 0 && end_pos < n {
            end_pos.saturating_sub(config.overlap_bytes).max(current_start)
        } else {
            end_pos
        };
    }

    chunks
}

/// Local maxima under a minimum-separation rule: a candidate is a local
/// maximum if no other candidate within `min_distance` has a strictly
/// greater score; among equal scores, only the earliest position
/// qualifies (later equal-scored candidates are suppressed).
fn find_local_maxima<'a>(
    candidates: &[&'a ScoredPosition],
    min_distance: usize,
) -> Vec<&'a ScoredPosition> {
    let mut maxima = Vec::new();
    for (i, sp) in candidates.iter().enumerate() {
        let mut is_maximum = true;
        for (j, other) in candidates.iter().enumerate() {
            if i == j {
                continue;
            }
            let distance = sp.pos.abs_diff(other.pos);
            if distance <= min_distance {
                if other.score > sp.score {
                    is_maximum = false;
                    break;
                }
                if other.score == sp.score && other.pos < sp.pos {
                    is_maximum = false;
                    break;
                }
            }
        }
        if is_maximum {
            maxima.push(*sp);
        }
    }
    maxima
}

/// Select the highest-scoring entry; on ties, the earliest position wins
/// (first occurrence, matching the list's ascending position order).
fn pick_max_by_score<'a>(entries: &[&'a ScoredPosition]) -> &'a ScoredPosition {
    let mut best = entries[0];
    for &sp in &entries[1..] {
        if sp.score > best.score {
            best = sp;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChunkingConfig {
        ChunkingConfig::default()
    }

    #[test]
    fn short_input_is_one_chunk() {
        let data = vec![0u8; 100];
        let chunks = chunk_offline(&data, &config());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].byte_start, 0);
        assert_eq!(chunks[0].byte_end, 100);
        assert_eq!(chunks[0].cut_score, 0.0);
        assert_eq!(chunks[0].raw_signals.l, 100);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks = chunk_offline(&[], &config());
        assert!(chunks.is_empty());
    }

    #[test]
    fn coverage_and_monotonicity_hold() {
        let data: Vec<u8> = (0..65_536u32).map(|i| (i * 2654435761u32 >> 24) as u8).collect();
        let cfg = config();
        let chunks = chunk_offline(&data, &cfg);
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].byte_start, 0);
        assert_eq!(chunks.last().unwrap().byte_end, data.len() as u64);
        for w in chunks.windows(2) {
            assert!(w[1].byte_start > w[0].byte_start, "byte_start must strictly increase");
        }
    }

    #[test]
    fn overlap_accounting_matches_s6() {
        let data: Vec<u8> = (0..65_536u32).map(|i| (i * 2654435761u32 >> 24) as u8).collect();
        let mut cfg = config();
        cfg.overlap_bytes = 64;
        let chunks = chunk_offline(&data, &cfg);
        for w in chunks.windows(2) {
            let (c0, c1) = (&w[0], &w[1]);
            if c0.byte_end >= 64 && c0.byte_end - 64 > c0.byte_start {
                assert_eq!(c1.byte_start, c0.byte_end - 64);
            } else {
                assert_eq!(c1.byte_start, c0.byte_end);
            }
        }
    }

    #[test]
    fn newline_dense_text_prefers_newline_boundaries() {
        let data = "a\n".repeat(1000).into_bytes();
        let mut cfg = config();
        cfg.min_bytes = 256;
        cfg.max_bytes = 4096;
        cfg.w_b = 2.0;
        let chunks = chunk_offline(&data, &cfg);
        let has_newline_boundary = chunks
            .iter()
            .any(|c| c.byte_end < data.len() as u64 && data[c.byte_end as usize - 1] == b'\n');
        assert!(has_newline_boundary);
    }

    #[test]
    fn deterministic_across_runs() {
        let data: Vec<u8> = (0..65_536u32).map(|i| (i * 2654435761u32 >> 24) as u8).collect();
        let cfg = config();
        let a = chunk_offline(&data, &cfg);
        let b = chunk_offline(&data, &cfg);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.byte_start, y.byte_start);
            assert_eq!(x.byte_end, y.byte_end);
            assert_eq!(x.cut_score.to_bits(), y.cut_score.to_bits());
        }
    }

    #[test]
    fn no_overlap_union_is_exact_coverage() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let mut cfg = config();
        cfg.overlap_bytes = 0;
        let chunks = chunk_offline(&data, &cfg);
        let mut expected_start = 0u64;
        for c in &chunks {
            assert_eq!(c.byte_start, expected_start);
            expected_start = c.byte_end;
        }
        assert_eq!(expected_start, data.len() as u64);
    }
}
