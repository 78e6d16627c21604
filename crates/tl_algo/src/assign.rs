//! Tier assignment walk.
//!
//! Items are visited best first. Each one lands in the highest active tier
//! whose threshold it meets (`average >= threshold`) and which still has room;
//! failing either check falls through to the next tier down. The lowest active
//! tier takes whatever reaches it, with no threshold and no cap.
//!
//! Fixed capacities apply from the first item. Share capacities are a
//! percentage of the items still unplaced when the walk first reaches a
//! share-capped tier, so `B 50 %, C 40 %` splits what the fixed top tiers left.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tl_core::rounding::Threshold;

use crate::score::{score_items, ItemScore};
use crate::{ScopeConfig, Tier, TierBuckets, TierEntry, VoteSet};

/// Assign every voted item of one scope to exactly one tier.
///
/// A config that fails `ScopeConfig::validate` (no active tier, bad
/// thresholds, oversized weights) falls back to `ScopeConfig::default()`. An
/// empty vote set yields empty buckets.
pub fn assign_tiers(votes: &VoteSet, config: &ScopeConfig) -> TierBuckets {
    let config: Cow<'_, ScopeConfig> = match config.validate() {
        Ok(()) => Cow::Borrowed(config),
        Err(_) => Cow::Owned(ScopeConfig::default()),
    };
    let scored = score_items(votes, &config);
    place(&scored, &config)
}

/// Bucket already-ranked scores. `scored` must be sorted best first.
pub fn place(scored: &[ItemScore], config: &ScopeConfig) -> TierBuckets {
    let mut out = TierBuckets::empty_for(config);
    let tiers = config.active_tiers();
    let Some((&lowest, upper)) = tiers.split_last() else {
        return out;
    };
    let floors: Vec<(Tier, Threshold)> = upper.iter().map(|&t| (t, config.threshold(t))).collect();

    // Resolved the first time an item reaches the tier.
    let mut room: BTreeMap<Tier, Option<usize>> = BTreeMap::new();
    let mut share_base: Option<usize> = None;

    for (placed, s) in scored.iter().enumerate() {
        let mut tier = lowest;
        for (t, floor) in &floors {
            let left = *room.entry(*t).or_insert_with(|| {
                let base = if config.share_pct.contains_key(t) {
                    *share_base.get_or_insert(scored.len() - placed)
                } else {
                    scored.len()
                };
                config.cap_for(*t, base)
            });
            if s.average.meets(floor) && left.map_or(true, |r| r > 0) {
                tier = *t;
                break;
            }
        }

        if let Some(Some(r)) = room.get_mut(&tier) {
            *r -= 1;
        }
        out.tiers.entry(tier).or_default().push(TierEntry::from(s));
    }
    out
}
