//! Vote-set edits. Callers serialize access per scope; these helpers only
//! enforce the one-vote-per-(voter, item) rule.

use crate::{ItemId, Tier, VoteSet, VoterId};

/// Record `voter`'s `tier` for `item`, returning the tier it replaced.
pub fn set_vote(votes: &mut VoteSet, voter: &VoterId, item: &ItemId, tier: Tier) -> Option<Tier> {
    votes
        .entry(item.clone())
        .or_default()
        .insert(voter.clone(), tier)
}

pub fn vote_of(votes: &VoteSet, voter: &VoterId, item: &ItemId) -> Option<Tier> {
    votes.get(item).and_then(|by_voter| by_voter.get(voter)).copied()
}

/// Items with at least one vote, in id order.
pub fn voted_items(votes: &VoteSet) -> Vec<ItemId> {
    votes
        .iter()
        .filter(|(_, by_voter)| !by_voter.is_empty())
        .map(|(item, _)| item.clone())
        .collect()
}
