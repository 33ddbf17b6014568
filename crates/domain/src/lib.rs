//! holginator domain crate
//!
//! This crate contains the feed composition pipeline following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Filtering, enrichment, composition, publishing and orchestration

pub mod model;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;

use sha2::{Digest, Sha256};

/// Compute the fingerprint of a rendered document
/// Served downstream as an ETag
pub fn compute_fingerprint(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    format!("{:x}", hasher.finalize())
}
