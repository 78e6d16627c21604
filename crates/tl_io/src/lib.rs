//! crates/tl_io/src/lib.rs
//! I/O crate for the tier-list engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Canonical JSON and SHA-256 helpers.
//! - The `TierStore` persistence trait with JSON-directory and in-memory backends.
//! - Song catalog and per-scope setup documents.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for tl_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (create_dir_all, rename, fsync, etc.)
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with a location hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column rather than a pointer.
        IoError::Json {
            pointer: format!("line {} column {}", e.line(), e.column()),
            msg: e.to_string(),
        }
    }
}

impl From<tl_core::errors::CoreError> for IoError {
    fn from(e: tl_core::errors::CoreError) -> Self {
        IoError::Invalid(e.to_string())
    }
}

pub mod canonical_json;
pub mod catalog;
pub mod hasher;
pub mod setup;
pub mod store;

pub use catalog::{Catalog, SongMeta};
pub use setup::ScopeSetup;
pub use store::{DerivedDoc, JsonDirStore, MemoryStore, ScopeGuard, TierStore};
