//! Pure signal extraction over a raw byte window (§4.1).

use serde::{Deserialize, Serialize};

/// Default signal window width in bytes.
pub const DEFAULT_SIGNAL_WINDOW: usize = 64;

const NEWLINE: u8 = 0x0A;

/// Pre-normalization measurements at a byte position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSignals {
    /// Curvature proxy: Shannon entropy in bits over the window, `[0, 8]`.
    pub k: f64,
    /// Stability-margin proxy, derived from windowed byte-value variance.
    pub s: f64,
    /// Disharmony. Reserved; always 0.0 in the current profile.
    pub d: f64,
    /// Structural boundary indicator: 1.0 at a newline byte, else 0.0.
    pub b: f64,
    /// Bytes since the current chunk started.
    pub l: u64,
}

impl RawSignals {
    /// All-zero signals, used for degenerate short inputs and forced cuts.
    pub fn zeroed(l: u64) -> Self {
        Self {
            k: 0.0,
            s: 0.0,
            d: 0.0,
            b: 0.0,
            l,
        }
    }
}

/// Post-normalization signals. `b` and `l` pass through unchanged; `k`,
/// `s`, `d` are z-scored against recent history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSignals {
    pub k: f64,
    pub s: f64,
    pub d: f64,
    pub b: f64,
    pub l: u64,
}

impl NormalizedSignals {
    pub fn zeroed(l: u64) -> Self {
        Self {
            k: 0.0,
            s: 0.0,
            d: 0.0,
            b: 0.0,
            l,
        }
    }
}

/// Compute raw signals at position `p` of `data`, given the current chunk's
/// start position and a signal window width `w`.
///
/// Pure function of its inputs: the same `(data, p, chunk_start, w)`
/// always yields bitwise-identical floats, since every reduction below
/// walks the window strictly left to right.
pub fn extract_signals(data: &[u8], p: usize, chunk_start: usize, w: usize) -> RawSignals {
    let half = w / 2;
    let window_start = p.saturating_sub(half);
    let window_end = (window_start + w).min(data.len());
    let window = if window_end > window_start {
        &data[window_start..window_end]
    } else {
        &[]
    };

    let k = shannon_entropy_bits(window);
    let s = stability_margin(window);
    let d = 0.0;
    let b = if p < data.len() && data[p] == NEWLINE {
        1.0
    } else {
        0.0
    };
    let l = (p - chunk_start) as u64;

    RawSignals { k, s, d, b, l }
}

/// Shannon entropy in bits over a byte window. Empty or single-byte
/// windows return 0.
fn shannon_entropy_bits(window: &[u8]) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let mut counts = [0u32; 256];
    for &byte in window {
        counts[byte as usize] += 1;
    }
    let total = window.len() as f64;
    let mut entropy = 0.0;
    for &count in counts.iter() {
        if count > 0 {
            let p = count as f64 / total;
            entropy -= p * p.log2();
        }
    }
    entropy
}

/// Stability-margin proxy: `8 / (1 + variance / 1000)`. Windows with
/// fewer than two bytes return 0. The divisor and the 8.0 scale are fixed
/// design constants placing S on roughly the same scale as K.
fn stability_margin(window: &[u8]) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let variance = byte_variance(window);
    8.0 / (1.0 + variance / 1000.0)
}

fn byte_variance(window: &[u8]) -> f64 {
    let n = window.len() as f64;
    let mut sum = 0.0;
    for &b in window {
        sum += b as f64;
    }
    let mean = sum / n;
    let mut sq_diff_sum = 0.0;
    for &b in window {
        let diff = b as f64 - mean;
        sq_diff_sum += diff * diff;
    }
    sq_diff_sum / n
}
