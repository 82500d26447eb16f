//! Tunable parameters for the chunking algorithm.

use crate::error::{ChunkError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Weights, thresholds, and size bounds for the cut-score algorithm.
///
/// Defaults reproduce the source's baseline profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Shortest permissible chunk, except the end-of-input tail.
    pub min_bytes: usize,
    /// Longest permissible chunk; hard trigger threshold for streaming.
    pub max_bytes: usize,
    /// Bytes of content the next chunk repeats from the previous one.
    pub overlap_bytes: usize,
    /// Normalizer window size and streaming candidate retention horizon.
    pub commit_horizon_bytes: usize,
    /// Soft length target in bytes; 0 disables the length term.
    pub l_target_bytes: usize,

    /// Curvature weight.
    pub w_k: f64,
    /// Disharmony weight.
    pub w_d: f64,
    /// Stability-margin weight.
    pub w_s: f64,
    /// Structural-boundary weight.
    pub w_b: f64,
    /// Length-deviation weight.
    pub w_l: f64,

    /// Curvature threshold (on normalized signal).
    pub k0: f64,
    /// Disharmony threshold (on normalized signal).
    pub d0: f64,
    /// Stability-margin threshold (on normalized signal).
    pub s0: f64,

    /// Enable the curvature term.
    pub use_curvature: bool,
    /// Enable the disharmony term.
    pub use_disharmony: bool,
    /// Enable the stability-margin term.
    pub use_stability_margin: bool,
    /// Enable the structural-boundary term.
    pub use_lil_boundaries: bool,

    /// Score threshold that starts the streaming soft-trigger counter.
    pub soft_trigger_threshold: f64,
    /// Consecutive threshold-crossings required to commit on a soft trigger.
    pub soft_trigger_sustain_steps: u32,

    /// Minimum samples a rolling normalizer needs before it stops passing
    /// raw values through unchanged.
    pub normalizer_min_samples: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_bytes: 256,
            max_bytes: 4096,
            overlap_bytes: 64,
            commit_horizon_bytes: 1024,
            l_target_bytes: 2048,

            w_k: 1.0,
            w_d: 0.8,
            w_s: 0.6,
            w_b: 2.0,
            w_l: 0.5,

            k0: 0.5,
            d0: 0.5,
            s0: 0.5,

            use_curvature: true,
            use_disharmony: false,
            use_stability_margin: true,
            use_lil_boundaries: true,

            soft_trigger_threshold: 1.5,
            soft_trigger_sustain_steps: 3,

            normalizer_min_samples: 10,
        }
    }
}

impl ChunkingConfig {
    /// Validate the configuration, matching the `ConfigInvalid` cases of
    /// the error design: non-positive `min_bytes`, `max_bytes <=
    /// min_bytes`, `overlap_bytes >= max_bytes`, or any negative
    /// weight/threshold.
    pub fn validate(&self) -> Result<()> {
        if self.min_bytes == 0 {
            return Err(ChunkError::ConfigInvalid(
                "min_bytes must be >= 1".to_string(),
            ));
        }
        if self.max_bytes <= self.min_bytes {
            return Err(ChunkError::ConfigInvalid(
                "max_bytes must be greater than min_bytes".to_string(),
            ));
        }
        if self.overlap_bytes >= self.max_bytes {
            return Err(ChunkError::ConfigInvalid(
                "overlap_bytes must be less than max_bytes".to_string(),
            ));
        }
        if self.commit_horizon_bytes == 0 {
            return Err(ChunkError::ConfigInvalid(
                "commit_horizon_bytes must be >= 1".to_string(),
            ));
        }
        for (name, value) in [
            ("w_k", self.w_k),
            ("w_d", self.w_d),
            ("w_s", self.w_s),
            ("w_b", self.w_b),
            ("w_l", self.w_l),
            ("soft_trigger_threshold", self.soft_trigger_threshold),
        ] {
            if value < 0.0 {
                return Err(ChunkError::ConfigInvalid(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.soft_trigger_sustain_steps == 0 {
            return Err(ChunkError::ConfigInvalid(
                "soft_trigger_sustain_steps must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Return a copy of this configuration with `overlap_bytes` replaced.
    pub fn with_overlap(&self, overlap_bytes: usize) -> Self {
        Self {
            overlap_bytes,
            ..self.clone()
        }
    }

    /// The minimum separation enforced between offline local maxima.
    pub fn min_distance(&self) -> usize {
        self.min_bytes / 4
    }

    /// Canonical `(key, value)` pairs of every tunable, key-sorted, used to
    /// compute the configuration fingerprint independent of field
    /// declaration order.
    fn canonical_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("commit_horizon_bytes", self.commit_horizon_bytes.to_string()),
            ("d0", format!("{:?}", self.d0)),
            ("k0", format!("{:?}", self.k0)),
            ("l_target_bytes", self.l_target_bytes.to_string()),
            ("max_bytes", self.max_bytes.to_string()),
            ("min_bytes", self.min_bytes.to_string()),
            (
                "normalizer_min_samples",
                self.normalizer_min_samples.to_string(),
            ),
            ("overlap_bytes", self.overlap_bytes.to_string()),
            ("s0", format!("{:?}", self.s0)),
            (
                "soft_trigger_sustain_steps",
                self.soft_trigger_sustain_steps.to_string(),
            ),
            (
                "soft_trigger_threshold",
                format!("{:?}", self.soft_trigger_threshold),
            ),
            ("use_curvature", self.use_curvature.to_string()),
            ("use_disharmony", self.use_disharmony.to_string()),
            ("use_lil_boundaries", self.use_lil_boundaries.to_string()),
            (
                "use_stability_margin",
                self.use_stability_margin.to_string(),
            ),
            ("w_b", format!("{:?}", self.w_b)),
            ("w_d", format!("{:?}", self.w_d)),
            ("w_k", format!("{:?}", self.w_k)),
            ("w_l", format!("{:?}", self.w_l)),
            ("w_s", format!("{:?}", self.w_s)),
        ];
        pairs.sort_by_key(|(k, _)| *k);
        pairs
    }

    /// Stable configuration fingerprint: SHA-256 over the canonicalized,
    /// key-sorted configuration, truncated to 16 hex characters. Identical
    /// fingerprints imply identical chunking behavior regardless of how the
    /// configuration struct was constructed.
    pub fn fingerprint(&self) -> String {
        let canonical = self
            .canonical_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";");
        let digest = Sha256::digest(canonical.as_bytes());
        hex::encode(&digest[..8])
    }

    /// Canonical key-value map, suitable for embedding in a manifest.
    pub fn canonical_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (k, v) in self.canonical_pairs() {
            map.insert(k.to_string(), serde_json::Value::String(v));
        }
        map
    }
}

/// Parameters for the hybrid orchestrator (§4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// Size of each overlapping micro-chunk emitted inside an edit window.
    pub micro_chunk_bytes: usize,
    /// Overlap between consecutive micro-chunks.
    pub micro_overlap_bytes: usize,
    /// Extra bytes re-chunked on each side of an edit window.
    pub guard_band_bytes: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            micro_chunk_bytes: 768,
            micro_overlap_bytes: 96,
            guard_band_bytes: 256,
        }
    }
}

impl HybridConfig {
    /// Validate that the micro-chunk geometry is well-formed.
    pub fn validate(&self) -> Result<()> {
        if self.micro_chunk_bytes == 0 {
            return Err(ChunkError::ConfigInvalid(
                "micro_chunk_bytes must be >= 1".to_string(),
            ));
        }
        if self.micro_overlap_bytes >= self.micro_chunk_bytes {
            return Err(ChunkError::ConfigInvalid(
                "micro_overlap_bytes must be less than micro_chunk_bytes".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ChunkingConfig::default().validate().is_ok());
        assert!(HybridConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_min_greater_than_max() {
        let cfg = ChunkingConfig {
            min_bytes: 4096,
            max_bytes: 256,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ChunkError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn rejects_overlap_at_or_above_max() {
        let cfg = ChunkingConfig {
            overlap_bytes: 4096,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_weight() {
        let cfg = ChunkingConfig {
            w_k: -1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let a = ChunkingConfig::default();
        let mut b = ChunkingConfig::default();
        // Mutate and restore a field to prove the fingerprint is a pure
        // function of content, not of construction order or history.
        b.w_k = 9.0;
        b.w_k = 1.0;
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a = ChunkingConfig::default();
        let b = ChunkingConfig {
            max_bytes: 8192,
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_is_16_hex_chars() {
        let fp = ChunkingConfig::default().fingerprint();
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
