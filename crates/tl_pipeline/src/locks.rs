//! Scope lock table. One mutex per scope, created on first use and kept for
//! the life of the aggregator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tl_core::ScopeId;

#[derive(Default)]
pub(crate) struct ScopeLocks {
    table: Mutex<HashMap<ScopeId, Arc<Mutex<()>>>>,
}

impl ScopeLocks {
    fn cell(&self, scope: &ScopeId) -> Arc<Mutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(table.entry(scope.clone()).or_default())
    }

    /// Run `f` while holding `scope`'s lock. A lock poisoned by a panicking
    /// holder is taken over: the store, not the guard, holds the state.
    pub(crate) fn with<T>(&self, scope: &ScopeId, f: impl FnOnce() -> T) -> T {
        let cell = self.cell(scope);
        let _guard = cell.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
