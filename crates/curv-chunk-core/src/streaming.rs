//! Streaming boundary selector (§4.5): an incremental state machine that
//! consumes bytes in arbitrary-sized pushes and emits chunks as boundaries
//! are committed.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::error::{ChunkError, Result};
use crate::normalizer::SignalNormalizers;
use crate::score::compute_cut_score;
use crate::signals::{extract_signals, NormalizedSignals, RawSignals, DEFAULT_SIGNAL_WINDOW};
use crate::types::{Candidate, Chunk};

/// Maximum number of recent candidates retained for fast boundary lookup.
/// Older candidates are dropped; the hard trigger falls back to a rescan of
/// the full current chunk when the ring has nothing in range.
const CANDIDATE_RING_CAPACITY: usize = 256;

/// Incremental, stateful chunker for data arriving in pushes of arbitrary
/// size.
///
/// Per-signal normalizer state is global to the stream and is never reset
/// on a chunk commit (§4.5 P10): the normalizer sees one continuous
/// history regardless of where chunk boundaries fall. The trailing byte
/// buffer and candidate bookkeeping, by contrast, are reset or trimmed at
/// every commit.
pub struct StreamingChunker {
    config: ChunkingConfig,
    signal_window: usize,
    normalizers: SignalNormalizers,

    buffer: Vec<u8>,
    /// Absolute stream offset of `buffer[0]`.
    global_offset: u64,
    /// Local (buffer-relative) offset where the current, uncommitted chunk
    /// begins.
    chunk_start: usize,
    /// Local offset of the next position not yet scored.
    next_local: usize,

    candidates: VecDeque<Candidate>,
    all_this_chunk: Vec<Candidate>,
    soft_trigger_count: u32,

    total_bytes_processed: u64,
    finalized: bool,
}

impl StreamingChunker {
    /// Create a new streaming chunker, validating `config` up front.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        Self::with_signal_window(config, DEFAULT_SIGNAL_WINDOW)
    }

    pub fn with_signal_window(config: ChunkingConfig, signal_window: usize) -> Result<Self> {
        config.validate()?;
        let normalizers = SignalNormalizers::new(config.commit_horizon_bytes, config.normalizer_min_samples);
        Ok(Self {
            config,
            signal_window,
            normalizers,
            buffer: Vec::new(),
            global_offset: 0,
            chunk_start: 0,
            next_local: 0,
            candidates: VecDeque::with_capacity(CANDIDATE_RING_CAPACITY),
            all_this_chunk: Vec::new(),
            soft_trigger_count: 0,
            total_bytes_processed: 0,
            finalized: false,
        })
    }

    /// Total bytes fed into this chunker so far, including `finalize`'s
    /// effect on bookkeeping (supplemental accessor).
    pub fn total_bytes_processed(&self) -> u64 {
        self.total_bytes_processed
    }

    /// Bytes currently held in the trailing buffer (supplemental accessor).
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Feed new bytes, returning zero or more newly committed chunks.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Chunk>> {
        if self.finalized {
            return Err(ChunkError::UsageViolation(
                "feed called after finalize".to_string(),
            ));
        }
        self.buffer.extend_from_slice(bytes);
        self.total_bytes_processed += bytes.len() as u64;
        Ok(self.drain_committable(false))
    }

    /// Flush any remaining buffered bytes as a final chunk and poison the
    /// chunker against further use.
    pub fn finalize(&mut self) -> Result<Vec<Chunk>> {
        if self.finalized {
            return Err(ChunkError::UsageViolation(
                "finalize called more than once".to_string(),
            ));
        }
        let mut chunks = self.drain_committable(true);
        self.finalized = true;

        if self.chunk_start < self.buffer.len() {
            let remaining = self.buffer.len() - self.chunk_start;
            // The tail chunk's signals and score are the final buffered
            // position's, not whichever position scored highest: finalize
            // emits one chunk spanning all remaining bytes, not a boundary
            // choice among them. `all_this_chunk` is scored in strictly
            // increasing order and cleared only on commit, so its last
            // entry is exactly the final position.
            let tail = self.all_this_chunk.last();
            let (score, raw, norm) = match tail {
                Some(c) => (c.score, c.raw_signals, c.normalized_signals),
                None => (
                    0.0,
                    RawSignals::zeroed(remaining as u64),
                    NormalizedSignals::zeroed(remaining as u64),
                ),
            };
            let byte_start = self.global_offset + self.chunk_start as u64;
            let byte_end = self.global_offset + self.buffer.len() as u64;
            chunks.push(Chunk {
                byte_start,
                byte_end,
                content: self.buffer[self.chunk_start..].to_vec(),
                cut_score: score,
                raw_signals: raw,
                normalized_signals: norm,
            });
        }
        Ok(chunks)
    }

    /// Score newly available positions and commit chunks as triggers fire.
    /// `finalizing` relaxes the lookahead requirement so trailing bytes
    /// that would otherwise need more data to score are scored anyway.
    fn drain_committable(&mut self, finalizing: bool) -> Vec<Chunk> {
        let half = self.signal_window / 2;
        let mut committed = Vec::new();

        loop {
            let processable_end = if finalizing {
                self.buffer.len()
            } else {
                self.buffer.len().saturating_sub(half)
            };

            while self.next_local < processable_end {
                let local_p = self.next_local;
                let raw = extract_signals(&self.buffer, local_p, self.chunk_start, self.signal_window);
                let norm = self.normalizers.normalize(&raw);
                let score = compute_cut_score(&norm, &self.config);
                let candidate = Candidate {
                    local_offset: local_p,
                    global_offset: self.global_offset + local_p as u64,
                    score,
                    raw_signals: raw,
                    normalized_signals: norm,
                };

                if self.candidates.len() == CANDIDATE_RING_CAPACITY {
                    self.candidates.pop_front();
                }
                self.candidates.push_back(candidate.clone());
                self.all_this_chunk.push(candidate.clone());

                self.next_local += 1;

                let length = local_p - self.chunk_start;

                // Finalization skips the soft trigger entirely: the tail is
                // always emitted as one chunk, never split early because a
                // sustained score happened to cross the threshold partway
                // through it. The hard trigger still applies, since a tail
                // longer than `max_bytes` must still be capped.
                if !finalizing {
                    if score >= self.config.soft_trigger_threshold {
                        self.soft_trigger_count += 1;
                    } else {
                        self.soft_trigger_count = 0;
                    }
                }

                if length + 1 >= self.config.max_bytes {
                    self.commit_hard_trigger(&mut committed);
                    break;
                }

                if !finalizing
                    && self.soft_trigger_count >= self.config.soft_trigger_sustain_steps
                    && length + 1 >= self.config.min_bytes
                {
                    self.commit_at(local_p + 1, score, raw, norm, &mut committed);
                    break;
                }
            }

            if self.next_local >= processable_end {
                break;
            }
        }

        self.compact_buffer();
        committed
    }

    /// Hard trigger: chunk has reached `max_bytes`. Pick the best boundary
    /// in `[chunk_start + min_bytes, chunk_start + max_bytes]` from the
    /// candidate ring; fall back to the full current-chunk history if the
    /// ring has nothing in range; force a cut at `max_bytes` as a last
    /// resort.
    fn commit_hard_trigger(&mut self, committed: &mut Vec<Chunk>) {
        let min_pos = self.chunk_start + self.config.min_bytes;
        let max_pos = (self.chunk_start + self.config.max_bytes).min(self.buffer.len());

        let from_ring: Vec<&Candidate> = self
            .candidates
            .iter()
            .filter(|c| c.local_offset >= min_pos && c.local_offset <= max_pos)
            .collect();
        let from_history: Vec<&Candidate> = self
            .all_this_chunk
            .iter()
            .filter(|c| c.local_offset >= min_pos && c.local_offset <= max_pos)
            .collect();

        let chosen = if !from_ring.is_empty() {
            Some(pick_best(&from_ring))
        } else if !from_history.is_empty() {
            Some(pick_best(&from_history))
        } else {
            None
        };

        match chosen {
            Some(c) => {
                let (end_pos, score, raw, norm) = (c.local_offset, c.score, c.raw_signals, c.normalized_signals);
                self.commit_at(end_pos, score, raw, norm, committed);
            }
            None => {
                let end_pos = max_pos.max(self.chunk_start + 1);
                let raw = RawSignals::zeroed((end_pos - self.chunk_start) as u64);
                let norm = NormalizedSignals::zeroed((end_pos - self.chunk_start) as u64);
                self.commit_at(end_pos, 0.0, raw, norm, committed);
            }
        }
    }

    /// Commit a chunk `[chunk_start, end_pos)`, advance the chunk start
    /// (honoring overlap), and reset per-chunk (not per-stream) state.
    fn commit_at(
        &mut self,
        end_pos: usize,
        score: f64,
        raw: RawSignals,
        norm: NormalizedSignals,
        committed: &mut Vec<Chunk>,
    ) {
        let byte_start = self.global_offset + self.chunk_start as u64;
        let byte_end = self.global_offset + end_pos as u64;
        committed.push(Chunk {
            byte_start,
            byte_end,
            content: self.buffer[self.chunk_start..end_pos].to_vec(),
            cut_score: score,
            raw_signals: raw,
            normalized_signals: norm,
        });

        let new_start = if self.config.overlap_bytes > 0 {
            end_pos.saturating_sub(self.config.overlap_bytes).max(self.chunk_start)
        } else {
            end_pos
        };
        self.chunk_start = new_start;
        self.soft_trigger_count = 0;
        self.candidates.clear();
        self.all_this_chunk.clear();
    }

    /// Drop buffered bytes strictly before `chunk_start`: they cannot be
    /// part of any future chunk.
    fn compact_buffer(&mut self) {
        if self.chunk_start == 0 {
            return;
        }
        self.buffer.drain(0..self.chunk_start);
        self.global_offset += self.chunk_start as u64;
        self.next_local -= self.chunk_start;
        self.chunk_start = 0;
    }
}

fn pick_best<'a>(entries: &[&'a Candidate]) -> &'a Candidate {
    let mut best = entries[0];
    for &c in &entries[1..] {
        if c.score > best.score {
            best = c;
        }
    }
    best
}
