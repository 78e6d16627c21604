//! In-process backend. State lives behind one mutex; nothing touches disk.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tl_algo::VoteSet;
use tl_core::ScopeId;

use super::{DerivedDoc, TierStore};
use crate::setup::ScopeSetup;
use crate::IoResult;

#[derive(Default)]
struct Scoped {
    votes: Option<VoteSet>,
    setup: Option<ScopeSetup>,
    derived: Option<DerivedDoc>,
}

#[derive(Default)]
pub struct MemoryStore {
    scopes: Mutex<BTreeMap<ScopeId, Scoped>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, BTreeMap<ScopeId, Scoped>> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TierStore for MemoryStore {
    fn list_scopes(&self) -> IoResult<Vec<ScopeId>> {
        Ok(self.guard().keys().cloned().collect())
    }

    fn load_votes(&self, scope: &ScopeId) -> IoResult<VoteSet> {
        Ok(self.guard().get(scope).and_then(|s| s.votes.clone()).unwrap_or_default())
    }

    fn save_votes(&self, scope: &ScopeId, votes: &VoteSet) -> IoResult<()> {
        self.guard().entry(scope.clone()).or_default().votes = Some(votes.clone());
        Ok(())
    }

    fn load_setup(&self, scope: &ScopeId) -> IoResult<Option<ScopeSetup>> {
        Ok(self.guard().get(scope).and_then(|s| s.setup.clone()))
    }

    fn save_setup(&self, scope: &ScopeId, setup: &ScopeSetup) -> IoResult<()> {
        self.guard().entry(scope.clone()).or_default().setup = Some(setup.clone());
        Ok(())
    }

    fn load_derived(&self, scope: &ScopeId) -> IoResult<Option<DerivedDoc>> {
        Ok(self.guard().get(scope).and_then(|s| s.derived.clone()))
    }

    fn save_derived(&self, scope: &ScopeId, doc: &DerivedDoc) -> IoResult<()> {
        self.guard().entry(scope.clone()).or_default().derived = Some(doc.clone());
        Ok(())
    }
}
