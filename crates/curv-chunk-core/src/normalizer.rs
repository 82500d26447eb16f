//! Streaming z-score normalization over a trailing window (§4.2).

use std::collections::VecDeque;

/// Numerical degeneracy threshold: variances below this are treated as 0,
/// per §4.2, to avoid dividing by a near-zero standard deviation.
const VARIANCE_EPSILON: f64 = 1e-10;

/// Rolling z-score normalizer for a single scalar signal.
///
/// Internal state is a bounded ring of up to `window_size` samples plus
/// running sums `Σx` and `Σx²`, giving O(1) updates. To avoid the float
/// drift a naive subtract-the-leaving-value accumulator develops over long
/// streams, the running sums are recomputed from the ring contents every
/// `window_size` updates.
#[derive(Debug, Clone)]
pub struct RollingNormalizer {
    window_size: usize,
    min_samples: usize,
    values: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
    updates_since_recompute: usize,
}

impl RollingNormalizer {
    /// Create a normalizer with the given window size and minimum sample
    /// count (default 10 per §6.1/§4.2).
    pub fn new(window_size: usize, min_samples: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            min_samples,
            values: VecDeque::with_capacity(window_size.max(1)),
            sum: 0.0,
            sum_sq: 0.0,
            updates_since_recompute: 0,
        }
    }

    /// Append `x` and return its z-score, or `x` unchanged while the
    /// sample count is below `min_samples`.
    pub fn update(&mut self, x: f64) -> f64 {
        if self.values.len() == self.window_size {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }
        self.values.push_back(x);
        self.sum += x;
        self.sum_sq += x * x;

        self.updates_since_recompute += 1;
        if self.updates_since_recompute >= self.window_size {
            self.recompute();
            self.updates_since_recompute = 0;
        }

        let n = self.values.len();
        if n < self.min_samples {
            return x;
        }

        let mean = self.sum / n as f64;
        let variance = (self.sum_sq / n as f64) - (mean * mean);
        if variance < VARIANCE_EPSILON {
            return 0.0;
        }

        (x - mean) / variance.sqrt()
    }

    /// Recompute `sum`/`sum_sq` directly from the ring contents, restoring
    /// precision lost to incremental subtraction on long streams.
    fn recompute(&mut self) {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for &v in &self.values {
            sum += v;
            sum_sq += v * v;
        }
        self.sum = sum;
        self.sum_sq = sum_sq;
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
        self.sum_sq = 0.0;
        self.updates_since_recompute = 0;
    }

    /// Number of samples currently held in the window.
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

/// One normalizer per unbounded signal (K, S, D). `B` and `L` are never
/// normalized.
#[derive(Debug, Clone)]
pub struct SignalNormalizers {
    pub k: RollingNormalizer,
    pub s: RollingNormalizer,
    pub d: RollingNormalizer,
}

impl SignalNormalizers {
    pub fn new(window_size: usize, min_samples: usize) -> Self {
        Self {
            k: RollingNormalizer::new(window_size, min_samples),
            s: RollingNormalizer::new(window_size, min_samples),
            d: RollingNormalizer::new(window_size, min_samples),
        }
    }

    /// Normalize raw signals, updating all three normalizers' state.
    pub fn normalize(&mut self, raw: &crate::signals::RawSignals) -> crate::signals::NormalizedSignals {
        crate::signals::NormalizedSignals {
            k: self.k.update(raw.k),
            s: self.s.update(raw.s),
            d: self.d.update(raw.d),
            b: raw.b,
            l: raw.l,
        }
    }

    /// A chunk commit does not reset normalizer state — it is global to
    /// the stream. This exists for explicit session resets only.
    pub fn reset(&mut self) {
        self.k.reset();
        self.s.reset();
        self.d.reset();
    }
}
