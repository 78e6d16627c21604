// crates/tl_algo/src/lib.rs
//! Tier aggregation: turn one scope's votes into ordered tier buckets.
//!
//! Everything here is pure and deterministic. Persistence and locking live in
//! `tl_io` and `tl_pipeline`.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

pub use tl_core::{ItemId, ScopeConfig, Tier, VoterId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One scope's votes: item → voter → tier. At most one tier per (voter, item)
/// by construction.
pub type VoteSet = BTreeMap<ItemId, BTreeMap<VoterId, Tier>>;

pub mod assign;
pub mod score;
pub mod votes;

pub use assign::assign_tiers;
pub use score::{score_items, ItemScore};
pub use votes::{set_vote, vote_of, voted_items};

/// A placed item, carrying the numbers a presenter needs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TierEntry {
    pub item: ItemId,
    /// Damped average, for display. Ordering uses the exact ratio.
    pub average: f64,
    pub total: i64,
    pub votes: u32,
}

impl From<&ItemScore> for TierEntry {
    fn from(s: &ItemScore) -> Self {
        TierEntry {
            item: s.item.clone(),
            average: s.average.as_f64(),
            total: s.total,
            votes: s.votes,
        }
    }
}

/// Tier label → ordered members. Every active tier of the scope is present,
/// possibly empty.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TierBuckets {
    pub tiers: BTreeMap<Tier, Vec<TierEntry>>,
}

impl TierBuckets {
    /// Empty buckets for every tier active in `config`.
    pub fn empty_for(config: &ScopeConfig) -> Self {
        TierBuckets {
            tiers: config.active_tiers().into_iter().map(|t| (t, Vec::new())).collect(),
        }
    }

    pub fn get(&self, tier: Tier) -> &[TierEntry] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tier an item was placed in, if any.
    pub fn tier_of(&self, item: &ItemId) -> Option<Tier> {
        self.tiers
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| &e.item == item))
            .map(|(t, _)| *t)
    }

    /// Number of placed items across all tiers.
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(tier, members)` best tier first.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[TierEntry])> {
        self.tiers.iter().map(|(t, v)| (*t, v.as_slice()))
    }
}
