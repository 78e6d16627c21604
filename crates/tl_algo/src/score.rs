//! Damped item scoring.
//!
//! For each item with at least one vote:
//!
//! ```text
//! total   = Σ weight(tier_i)
//! average = total / (votes + damping)
//! ```
//!
//! The damping term pulls low-sample items toward zero until enough votes
//! accumulate. Averages are exact ratios; the returned list is ranked with
//! `tl_core::determinism::cmp_ranked`. Totals saturate at the `i64` bounds.

use tl_core::determinism::{cmp_ranked, RankKey};
use tl_core::rounding::{damped_average, Ratio};

use crate::{ItemId, ScopeConfig, VoteSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemScore {
    pub item: ItemId,
    pub total: i64,
    pub votes: u32,
    pub average: Ratio,
}

impl ItemScore {
    fn rank_key(&self) -> RankKey<'_> {
        RankKey { average: self.average, votes: self.votes, item: &self.item }
    }
}

/// Score every voted item and return them best first.
pub fn score_items(votes: &VoteSet, config: &ScopeConfig) -> Vec<ItemScore> {
    let mut scored: Vec<ItemScore> = votes
        .iter()
        .filter_map(|(item, by_voter)| {
            let n = u32::try_from(by_voter.len()).unwrap_or(u32::MAX);
            if n == 0 {
                return None;
            }
            let total = by_voter
                .values()
                .fold(0i64, |acc, &t| acc.saturating_add(config.weight(t)));
            let average = damped_average(total, n, config.damping)?;
            Some(ItemScore { item: item.clone(), total, votes: n, average })
        })
        .collect();

    scored.sort_by(|a, b| cmp_ranked(&a.rank_key(), &b.rank_key()));
    scored
}
