//! tl_pipeline: the tier aggregator service.
//!
//! `Aggregator` owns a store and a per-scope lock table. Every operation that
//! reads, modifies and writes a scope's documents runs under that scope's
//! in-process lock and under the store's own scope lock, which a
//! `JsonDirStore` shares with other processes using the same directory.
//! Different scopes never contend. Scoring and placement are delegated
//! to `tl_algo`, persistence to a `tl_io::TierStore`.

#![forbid(unsafe_code)]

use thiserror::Error;
use tl_core::errors::CoreError;
use tl_io::{IoError, TierStore};

mod locks;
mod recompute;
mod setup;
mod votes;

pub use recompute::{Recompute, RecomputeReport};

pub use tl_algo::{TierBuckets, TierEntry};
pub use tl_core::{ItemId, PostTime, ScopeConfig, ScopeId, Tier, VoterId};

/// Single error surface for the aggregator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("invalid input: {0}")]
    Core(#[from] CoreError),

    #[error("scope {0} is not set up")]
    NotSetUp(ScopeId),

    #[error("song catalog is empty")]
    EmptyCatalog,
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Per-scope tier-list state over a `TierStore`.
pub struct Aggregator<S> {
    store: S,
    locks: locks::ScopeLocks,
}

impl<S: TierStore> Aggregator<S> {
    pub fn new(store: S) -> Self {
        Aggregator { store, locks: locks::ScopeLocks::default() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `f` holding both locks on `scope`.
    fn exclusive<T>(&self, scope: &ScopeId, f: impl FnOnce() -> PipelineResult<T>) -> PipelineResult<T> {
        self.locks.with(scope, || -> PipelineResult<T> {
            let _guard = self.store.lock_scope(scope)?;
            f()
        })
    }
}
