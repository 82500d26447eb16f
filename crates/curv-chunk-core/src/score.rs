//! Cut-score composition (§4.3): normalized signals + configuration ->
//! a non-negative cut-score.

use crate::config::ChunkingConfig;
use crate::signals::NormalizedSignals;

/// Rectified linear unit: `max(0, x)`.
#[inline]
fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// Compose the cut-score for a position from its normalized signals.
///
/// High K or D above their thresholds pushes the score up; low S below
/// `s0` pushes the score up; `B` is a flat un-normalized bonus; the length
/// term only fires once the chunk exceeds `l_target_bytes`, and is gated
/// off entirely when `l_target_bytes == 0` (it is never divided by zero).
/// The result is always non-negative (§8 P9), since every term is a
/// non-negative weight times a `relu` or a `{0, 1}` indicator.
pub fn compute_cut_score(norm: &NormalizedSignals, config: &ChunkingConfig) -> f64 {
    let mut score = 0.0;

    if config.use_curvature {
        score += config.w_k * relu(norm.k - config.k0);
    }
    if config.use_disharmony {
        score += config.w_d * relu(norm.d - config.d0);
    }
    if config.use_stability_margin {
        score += config.w_s * relu(config.s0 - norm.s);
    }
    if config.use_lil_boundaries {
        score += config.w_b * norm.b;
    }
    if config.l_target_bytes > 0 {
        let deviation = (norm.l as f64 - config.l_target_bytes as f64) / config.l_target_bytes as f64;
        score += config.w_l * relu(deviation);
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(k: f64, s: f64, d: f64, b: f64, l: u64) -> NormalizedSignals {
        NormalizedSignals { k, s, d, b, l }
    }

    #[test]
    fn score_is_never_negative() {
        let config = ChunkingConfig::default();
        for k in [-5.0, -1.0, 0.0, 1.0, 5.0] {
            for s in [-5.0, -1.0, 0.0, 1.0, 5.0] {
                let n = norm(k, s, 0.0, 0.0, 0);
                assert!(compute_cut_score(&n, &config) >= 0.0);
            }
        }
    }

    #[test]
    fn newline_adds_flat_bonus() {
        let config = ChunkingConfig::default();
        let without = norm(0.0, 10.0, 0.0, 0.0, 0);
        let with = norm(0.0, 10.0, 0.0, 1.0, 0);
        let diff = compute_cut_score(&with, &config) - compute_cut_score(&without, &config);
        assert!((diff - config.w_b).abs() < 1e-12);
    }

    #[test]
    fn length_term_gated_by_zero_target() {
        let mut config = ChunkingConfig::default();
        config.l_target_bytes = 0;
        let n = norm(0.0, 10.0, 0.0, 0.0, 1_000_000);
        // Must not divide by zero or otherwise contribute.
        let score = compute_cut_score(&n, &config);
        assert!(score.is_finite());
    }

    #[test]
    fn length_term_only_fires_past_target() {
        let config = ChunkingConfig::default();
        let below = norm(0.0, 10.0, 0.0, 0.0, config.l_target_bytes as u64 / 2);
        let above = norm(0.0, 10.0, 0.0, 0.0, config.l_target_bytes as u64 * 2);
        assert!(compute_cut_score(&above, &config) > compute_cut_score(&below, &config));
    }

    #[test]
    fn disabled_terms_contribute_nothing() {
        let mut config = ChunkingConfig::default();
        config.use_curvature = false;
        config.use_stability_margin = false;
        config.use_lil_boundaries = false;
        config.l_target_bytes = 0;
        let n = norm(100.0, -100.0, 0.0, 1.0, 1_000_000);
        assert_eq!(compute_cut_score(&n, &config), 0.0);
    }

    #[test]
    fn low_stability_below_threshold_raises_score() {
        let config = ChunkingConfig::default();
        let stable = norm(0.0, 10.0, 0.0, 0.0, 0);
        let unstable = norm(0.0, -10.0, 0.0, 0.0, 0);
        assert!(compute_cut_score(&unstable, &config) > compute_cut_score(&stable, &config));
    }
}
