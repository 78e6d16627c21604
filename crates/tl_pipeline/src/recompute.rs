//! Recomputing and reading a scope's derived tier list.
//!
//! The derived document records the SHA-256 of the canonical `{config, votes}`
//! pair it was built from. A scope whose stored digest matches its current
//! inputs is left untouched by `recompute_if_stale`.

use serde::Serialize;
use tl_algo::{assign_tiers, TierBuckets, VoteSet};
use tl_core::{ScopeConfig, ScopeId};
use tl_io::hasher::sha256_canonical;
use tl_io::{DerivedDoc, TierStore};

use crate::{Aggregator, PipelineResult};

/// Outcome of [`Aggregator::recompute_if_stale`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recompute {
    /// Stored tier list already matched the inputs.
    Fresh,
    /// Tier list was rebuilt and saved.
    Updated,
}

/// Per-scope outcomes of a sweep over every known scope.
#[derive(Clone, Debug, Default)]
pub struct RecomputeReport {
    pub fresh: Vec<ScopeId>,
    pub updated: Vec<ScopeId>,
    pub failed: Vec<(ScopeId, String)>,
}

#[derive(Serialize)]
struct Inputs<'a> {
    config: &'a ScopeConfig,
    votes: &'a VoteSet,
}

fn inputs_digest(config: &ScopeConfig, votes: &VoteSet) -> PipelineResult<String> {
    Ok(sha256_canonical(&Inputs { config, votes })?)
}

impl<S: TierStore> Aggregator<S> {
    /// Rebuild and persist `scope`'s tier list unconditionally.
    pub fn recompute(&self, scope: &ScopeId) -> PipelineResult<TierBuckets> {
        self.exclusive(scope, || {
            let votes = self.store.load_votes(scope)?;
            let config = self.effective_config(scope)?;
            let digest = inputs_digest(&config, &votes)?;
            self.rebuild(scope, &config, &votes, digest)
        })
    }

    /// Rebuild `scope`'s tier list only when its inputs changed since the last
    /// save. A scope with nothing stored is reported fresh and left untouched.
    pub fn recompute_if_stale(&self, scope: &ScopeId) -> PipelineResult<Recompute> {
        if self.is_unknown(scope)? {
            tracing::debug!(%scope, "no stored state; nothing to recompute");
            return Ok(Recompute::Fresh);
        }
        self.exclusive(scope, || {
            let votes = self.store.load_votes(scope)?;
            let config = self.effective_config(scope)?;
            let digest = inputs_digest(&config, &votes)?;
            if let Some(doc) = self.store.load_derived(scope)? {
                if doc.inputs_sha256 == digest {
                    tracing::debug!(%scope, "tier list up to date");
                    return Ok(Recompute::Fresh);
                }
            }
            self.rebuild(scope, &config, &votes, digest)?;
            Ok(Recompute::Updated)
        })
    }

    /// `recompute_if_stale` over every scope in the store. A failing scope is
    /// logged and reported; the sweep carries on with the rest.
    pub fn recompute_all(&self) -> PipelineResult<RecomputeReport> {
        let mut report = RecomputeReport::default();
        for scope in self.store.list_scopes()? {
            match self.recompute_if_stale(&scope) {
                Ok(Recompute::Fresh) => report.fresh.push(scope),
                Ok(Recompute::Updated) => report.updated.push(scope),
                Err(e) => {
                    tracing::error!(%scope, error = %e, "recompute failed");
                    report.failed.push((scope, e.to_string()));
                }
            }
        }
        tracing::info!(
            fresh = report.fresh.len(),
            updated = report.updated.len(),
            failed = report.failed.len(),
            "recompute sweep finished"
        );
        Ok(report)
    }

    /// Last saved tier list for `scope`, computing one if none exists yet. A
    /// scope with no votes and no setup gets empty default buckets and
    /// nothing is written for it.
    pub fn tier_view(&self, scope: &ScopeId) -> PipelineResult<TierBuckets> {
        if let Some(doc) = self.store.load_derived(scope)? {
            return Ok(doc.tiers);
        }
        if self.is_unknown(scope)? {
            return Ok(TierBuckets::empty_for(&ScopeConfig::default()));
        }
        self.recompute(scope)
    }

    fn is_unknown(&self, scope: &ScopeId) -> PipelineResult<bool> {
        Ok(self.store.load_votes(scope)?.is_empty()
            && self.store.load_setup(scope)?.is_none()
            && self.store.load_derived(scope)?.is_none())
    }

    // Caller holds the scope lock.
    fn rebuild(
        &self,
        scope: &ScopeId,
        config: &ScopeConfig,
        votes: &VoteSet,
        digest: String,
    ) -> PipelineResult<TierBuckets> {
        let tiers = assign_tiers(votes, config);
        self.store.save_derived(
            scope,
            &DerivedDoc { inputs_sha256: digest, damping: config.damping, tiers: tiers.clone() },
        )?;
        tracing::info!(%scope, items = tiers.len(), "tier list recomputed");
        Ok(tiers)
    }
}
