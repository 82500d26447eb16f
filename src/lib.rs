//! Wires the chunking engine and manifest crates behind a small
//! application surface: configuration loading, logging, and the
//! operations the `curv-chunk` CLI exposes.

pub mod config;
pub mod error;
pub mod logging;
pub mod ops;

pub use config::AppConfig;
pub use error::{AppError, Result};
