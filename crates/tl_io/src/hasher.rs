//! crates/tl_io/src/hasher.rs
//!
//! SHA-256 digests over canonical JSON. The recompute path stores the digest
//! of its inputs next to the derived tier list; equal digests mean the stored
//! assignment is still current.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoResult;

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Lowercase hex SHA-256 of the canonical JSON encoding of `v`.
pub fn sha256_canonical<T: Serialize + ?Sized>(v: &T) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(v)?))
}
