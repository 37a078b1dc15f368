//! Content fingerprint of the index inputs.
//!
//! The persisted index records the fingerprint it was built from. When the
//! source files or the embedding model change the fingerprint changes too, and
//! the index is rebuilt instead of being reused.

use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// Hash the given input files and embedding model into a hex digest.
///
/// Missing files hash as a fixed marker so that creating one later changes the digest.
pub fn source_fingerprint(paths: &[&Path], embedding_model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"model:");
    hasher.update(embedding_model.as_bytes());

    for path in paths {
        hasher.update(b"\0path:");
        hasher.update(path.to_string_lossy().as_bytes());
        match std::fs::read(path) {
            Ok(bytes) => {
                hasher.update(b"\0len:");
                hasher.update((bytes.len() as u64).to_le_bytes());
                hasher.update(&bytes);
            }
            Err(e) => {
                debug!("Fingerprinting missing input {}: {}", path.display(), e);
                hasher.update(b"\0missing");
            }
        }
    }

    format!("{:x}", hasher.finalize())
}
