//! Deterministic chunk manifests: construction, serialization, and
//! validation for the output of `curv-chunk-core`'s selectors.

pub mod error;
pub mod manifest;

pub use error::{Error, Result};
pub use manifest::{ChunkManifest, ChunkMetadata};

#[cfg(test)]
mod tests {
    use super::*;
    use curv_chunk_core::{chunk_offline, ChunkingConfig};

    #[test]
    fn reexports_are_usable_from_crate_root() {
        let data = vec![0u8; 10_000];
        let config = ChunkingConfig::default();
        let chunks = chunk_offline(&data, &config);
        let manifest = ChunkManifest::build("doc", &data, &config, &chunks);
        assert!(manifest.validate(&data).is_ok());
    }
}
