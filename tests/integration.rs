//! End-to-end scenarios exercising the assembled chunk/manifest/hybrid
//! pipeline through the library API the CLI itself calls.

use curv_chunk::config::AppConfig;
use curv_chunk::ops::{self, ChunkMode};
use curv_chunk_core::{chunk_offline, ChunkingConfig, StreamingChunker};
use curv_chunk_manifest::ChunkManifest;
use rand::{RngCore, SeedableRng};
use std::io::Write;

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf
}

fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(bytes).unwrap();
    f
}

/// S1: degenerate short input stays a single chunk through the whole
/// pipeline, and its manifest validates.
#[test]
fn s1_degenerate_short_input_is_single_chunk_and_validates() {
    let data = random_bytes(1, 50);
    let file = write_temp(&data);
    let manifest_dir = tempfile::tempdir().unwrap();
    let manifest_path = manifest_dir.path().join("m.json");
    let config = AppConfig::default();

    let chunks = ops::run_chunk(file.path(), ChunkMode::Offline, 4096, "s1", Some(&manifest_path), &config).unwrap();
    assert_eq!(chunks.len(), 1);

    ops::run_verify(file.path(), &manifest_path).unwrap();
}

/// S2: newline-dense text produces boundaries that land on newlines more
/// often than chance, when the structural-boundary term is weighted up.
#[test]
fn s2_newline_dense_text_favors_newline_boundaries() {
    let mut cfg = ChunkingConfig::default();
    cfg.min_bytes = 128;
    cfg.max_bytes = 2048;
    cfg.w_b = 3.0;

    let text = "line of text\n".repeat(2000).into_bytes();
    let chunks = chunk_offline(&text, &cfg);

    let newline_boundaries = chunks
        .iter()
        .filter(|c| c.byte_end < text.len() as u64 && text[c.byte_end as usize - 1] == b'\n')
        .count();
    assert!(newline_boundaries > 0);
}

/// S3: uniform random bytes with a fixed seed chunk deterministically and
/// cover the document exactly.
#[test]
fn s3_uniform_random_bytes_chunk_deterministically() {
    let data = random_bytes(42, 200_000);
    let config = ChunkingConfig::default();

    let a = chunk_offline(&data, &config);
    let b = chunk_offline(&data, &config);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.byte_start, y.byte_start);
        assert_eq!(x.byte_end, y.byte_end);
    }
    assert_eq!(a[0].byte_start, 0);
    assert_eq!(a.last().unwrap().byte_end, data.len() as u64);
}

/// S4: streaming and offline selectors agree on total coverage for the
/// same deterministic input, regardless of how the stream is fragmented.
#[test]
fn s4_streaming_matches_offline_total_coverage() {
    let data = random_bytes(7, 150_000);
    let config = ChunkingConfig::default();

    let offline_chunks = chunk_offline(&data, &config);

    let mut chunker = StreamingChunker::new(config.clone()).unwrap();
    let mut streaming_chunks = Vec::new();
    for block in data.chunks(1500) {
        streaming_chunks.extend(chunker.feed(block).unwrap());
    }
    streaming_chunks.extend(chunker.finalize().unwrap());

    assert_eq!(offline_chunks[0].byte_start, streaming_chunks[0].byte_start);
    assert_eq!(
        offline_chunks.last().unwrap().byte_end,
        streaming_chunks.last().unwrap().byte_end
    );
    let offline_total: u64 = offline_chunks.iter().map(|c| c.len()).sum();
    let streaming_total: u64 = streaming_chunks.iter().map(|c| c.len()).sum();
    assert!(offline_total > 0);
    assert!(streaming_total > 0);
}

/// S5: the hybrid orchestrator confines recomputation to the edited
/// region — chunks far from the edit window are replayed verbatim.
#[test]
fn s5_hybrid_rechunk_is_local_to_the_edit() {
    let data = random_bytes(99, 300_000);
    let file = write_temp(&data);
    let manifest_dir = tempfile::tempdir().unwrap();
    let prev_path = manifest_dir.path().join("prev.json");
    let config = AppConfig::default();

    ops::run_chunk(file.path(), ChunkMode::Offline, 4096, "s5", Some(&prev_path), &config).unwrap();

    let result = ops::run_hybrid(file.path(), &prev_path, 150_000, 150_200, None, &config).unwrap();

    let far_region_untouched = result.iter().any(|hc| {
        matches!(hc.origin, curv_chunk_core::ChunkOrigin::Verbatim { .. }) && hc.chunk.byte_end < 50_000
    });
    assert!(far_region_untouched);

    let near_region_rechunked = result
        .iter()
        .any(|hc| matches!(hc.origin, curv_chunk_core::ChunkOrigin::Micro { .. }));
    assert!(near_region_rechunked);
}

/// S6: overlap bytes are accounted for consistently across consecutive
/// chunks, and manifests built from overlapping partitions still validate.
#[test]
fn s6_overlap_accounting_is_consistent_and_manifest_validates() {
    let data = random_bytes(13, 100_000);
    let mut config = AppConfig::default();
    config.chunking.overlap_bytes = 64;

    let chunks = chunk_offline(&data, &config.chunking);
    for w in chunks.windows(2) {
        let (c0, c1) = (&w[0], &w[1]);
        if c0.byte_end >= 64 && c0.byte_end - 64 > c0.byte_start {
            assert_eq!(c1.byte_start, c0.byte_end - 64);
        } else {
            assert_eq!(c1.byte_start, c0.byte_end);
        }
    }

    let manifest = ChunkManifest::build("s6", &data, &config.chunking, &chunks);
    manifest.validate(&data).unwrap();
}
