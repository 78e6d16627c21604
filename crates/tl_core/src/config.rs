//! Per-scope tier configuration.
//!
//! The set of keys in `weights` is the set of tiers active in a scope. The
//! lowest active tier is the catch-all bucket: its threshold and caps are
//! ignored by the assignment walk.

use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::rounding::Threshold;
use crate::tier::Tier;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smoothing term added to the vote count of every item.
pub const DEFAULT_DAMPING: u32 = 3;

#[cfg(feature = "serde")]
fn default_damping() -> u32 {
    DEFAULT_DAMPING
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScopeConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_damping"))]
    pub damping: u32,
    pub weights: BTreeMap<Tier, i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub thresholds: BTreeMap<Tier, f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub capacity: BTreeMap<Tier, u32>,
    /// Capacity as a percentage (floor) of the items left once the tiers
    /// above the first share-capped tier are filled.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub share_pct: BTreeMap<Tier, u8>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig::empty(DEFAULT_DAMPING)
            .tier(Tier::Sss, 12, 8.0, Some(3))
            .tier(Tier::SPlus, 10, 7.0, Some(5))
            .tier(Tier::S, 7, 6.0, Some(10))
            .tier(Tier::A, 5, 5.0, None)
            .tier(Tier::B, 4, 4.0, None)
            .tier(Tier::C, 2, 3.0, None)
            .tier(Tier::D, 1, 0.0, None)
    }
}

impl ScopeConfig {
    /// A config with no active tiers; add them with [`ScopeConfig::tier`].
    pub fn empty(damping: u32) -> Self {
        ScopeConfig {
            damping,
            weights: BTreeMap::new(),
            thresholds: BTreeMap::new(),
            capacity: BTreeMap::new(),
            share_pct: BTreeMap::new(),
        }
    }

    /// Activate `tier` with its weight, threshold and optional fixed capacity.
    pub fn tier(mut self, tier: Tier, weight: i64, threshold: f64, capacity: Option<u32>) -> Self {
        self.weights.insert(tier, weight);
        self.thresholds.insert(tier, threshold);
        match capacity {
            Some(c) => self.capacity.insert(tier, c),
            None => self.capacity.remove(&tier),
        };
        self
    }

    /// Cap `tier` at `pct` percent of the share base (see [`ScopeConfig::cap_for`]).
    pub fn share(mut self, tier: Tier, pct: u8) -> Self {
        self.share_pct.insert(tier, pct);
        self
    }

    /// Active tiers, best first.
    pub fn active_tiers(&self) -> Vec<Tier> {
        self.weights.keys().copied().collect()
    }

    pub fn lowest_tier(&self) -> Option<Tier> {
        self.weights.keys().next_back().copied()
    }

    /// Weight of a vote; tiers not active in the scope weigh 0.
    #[inline]
    pub fn weight(&self, tier: Tier) -> i64 {
        self.weights.get(&tier).copied().unwrap_or(0)
    }

    /// Minimum average for `tier`; a missing entry means 0.
    pub fn threshold(&self, tier: Tier) -> Threshold {
        Threshold::new(self.thresholds.get(&tier).copied().unwrap_or(0.0))
    }

    /// Effective capacity of `tier`. `None` means uncapped; the lowest tier
    /// is always uncapped. A share is taken of `share_base`, the number of
    /// items the placement walk still had to place when it first reached a
    /// share-capped tier.
    pub fn cap_for(&self, tier: Tier, share_base: usize) -> Option<usize> {
        if self.lowest_tier() == Some(tier) {
            return None;
        }
        let fixed = self.capacity.get(&tier).map(|&c| c as usize);
        let shared = self
            .share_pct
            .get(&tier)
            .map(|&pct| share_base * usize::from(pct) / 100);
        match (fixed, shared) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Domain checks for configs coming from operators or disk.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.weights.is_empty() {
            return Err(CoreError::DomainOutOfRange("weights: no active tier"));
        }
        for t in self.thresholds.values() {
            if !t.is_finite() || *t < 0.0 {
                return Err(CoreError::DomainOutOfRange("thresholds: must be finite and >= 0"));
            }
        }
        if self.share_pct.values().any(|&p| p > 100) {
            return Err(CoreError::DomainOutOfRange("share_pct: must be <= 100"));
        }
        if self.weights.values().any(|w| w.unsigned_abs() > 1_000_000) {
            return Err(CoreError::DomainOutOfRange("weights: magnitude above 1e6"));
        }
        Ok(())
    }
}
