//! Vote registration and lookups.

use tl_algo::{set_vote, vote_of, voted_items};
use tl_core::{ItemId, ScopeId, Tier, VoterId};
use tl_io::TierStore;

use crate::{Aggregator, PipelineResult};

impl<S: TierStore> Aggregator<S> {
    /// Record `voter`'s tier for `item` in `scope`, replacing any earlier vote.
    /// Returns the tier that was replaced.
    pub fn register_vote(
        &self,
        voter: &VoterId,
        scope: &ScopeId,
        item: &ItemId,
        tier: Tier,
    ) -> PipelineResult<Option<Tier>> {
        self.exclusive(scope, || {
            let mut votes = self.store.load_votes(scope)?;
            let previous = set_vote(&mut votes, voter, item, tier);
            if previous != Some(tier) {
                self.store.save_votes(scope, &votes)?;
            }
            match previous {
                None => tracing::info!(%scope, %voter, %item, %tier, "vote registered"),
                Some(prev) => tracing::info!(%scope, %voter, %item, %tier, %prev, "vote replaced"),
            }
            Ok(previous)
        })
    }

    pub fn vote_of(&self, voter: &VoterId, scope: &ScopeId, item: &ItemId) -> PipelineResult<Option<Tier>> {
        Ok(vote_of(&self.store.load_votes(scope)?, voter, item))
    }

    /// Items in `scope` with at least one vote: the list offered for re-voting.
    pub fn voted_items(&self, scope: &ScopeId) -> PipelineResult<Vec<ItemId>> {
        Ok(voted_items(&self.store.load_votes(scope)?))
    }
}
