//! Persistence seam for per-scope state.
//!
//! A scope owns three documents: its votes, its setup (which carries the tier
//! configuration) and the last derived tier assignment. Backends move
//! documents and hand out a per-scope lock through [`TierStore::lock_scope`];
//! callers hold it across each read-modify-write cycle.

use std::fs::File;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tl_algo::{TierBuckets, VoteSet};
use tl_core::{ScopeConfig, ScopeId};

use crate::setup::ScopeSetup;
use crate::IoResult;

mod json_dir;
mod memory;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;

/// Persisted tier assignment plus the digest of the inputs that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedDoc {
    /// SHA-256 (hex) of the canonical `{config, votes}` document.
    pub inputs_sha256: String,
    pub damping: u32,
    pub tiers: TierBuckets,
}

/// Exclusive hold on one scope's documents. Released on drop.
#[must_use = "the scope is unlocked as soon as the guard is dropped"]
#[derive(Debug, Default)]
pub struct ScopeGuard {
    file: Option<File>,
}

impl ScopeGuard {
    pub(crate) fn holding(file: File) -> Self {
        ScopeGuard { file: Some(file) }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = FileExt::unlock(file);
        }
    }
}

pub trait TierStore: Send + Sync {
    /// Every scope with at least one stored document, sorted.
    fn list_scopes(&self) -> IoResult<Vec<ScopeId>>;

    /// Votes of `scope`; an unknown scope has none.
    fn load_votes(&self, scope: &ScopeId) -> IoResult<VoteSet>;
    fn save_votes(&self, scope: &ScopeId, votes: &VoteSet) -> IoResult<()>;

    fn load_setup(&self, scope: &ScopeId) -> IoResult<Option<ScopeSetup>>;
    fn save_setup(&self, scope: &ScopeId, setup: &ScopeSetup) -> IoResult<()>;

    fn load_derived(&self, scope: &ScopeId) -> IoResult<Option<DerivedDoc>>;
    fn save_derived(&self, scope: &ScopeId, doc: &DerivedDoc) -> IoResult<()>;

    /// Lock `scope` against writers sharing this backend, including other
    /// processes. Blocks until the lock is free. The default guard locks
    /// nothing, for backends that live inside one process.
    fn lock_scope(&self, _scope: &ScopeId) -> IoResult<ScopeGuard> {
        Ok(ScopeGuard::default())
    }

    /// The scope's stored tier configuration, if it has been set up.
    fn load_config(&self, scope: &ScopeId) -> IoResult<Option<ScopeConfig>> {
        Ok(self.load_setup(scope)?.map(|s| s.tiers))
    }
}

impl<S: TierStore + ?Sized> TierStore for std::sync::Arc<S> {
    fn list_scopes(&self) -> IoResult<Vec<ScopeId>> {
        (**self).list_scopes()
    }
    fn load_votes(&self, scope: &ScopeId) -> IoResult<VoteSet> {
        (**self).load_votes(scope)
    }
    fn save_votes(&self, scope: &ScopeId, votes: &VoteSet) -> IoResult<()> {
        (**self).save_votes(scope, votes)
    }
    fn load_setup(&self, scope: &ScopeId) -> IoResult<Option<ScopeSetup>> {
        (**self).load_setup(scope)
    }
    fn save_setup(&self, scope: &ScopeId, setup: &ScopeSetup) -> IoResult<()> {
        (**self).save_setup(scope, setup)
    }
    fn load_derived(&self, scope: &ScopeId) -> IoResult<Option<DerivedDoc>> {
        (**self).load_derived(scope)
    }
    fn save_derived(&self, scope: &ScopeId, doc: &DerivedDoc) -> IoResult<()> {
        (**self).save_derived(scope, doc)
    }
    fn lock_scope(&self, scope: &ScopeId) -> IoResult<ScopeGuard> {
        (**self).lock_scope(scope)
    }
}
