//! Determinism utilities: stable total orders for tokens and ranked items.
//!
//! Ranking order for scored items is fixed:
//! 1. damped average, descending (exact ratio comparison)
//! 2. vote count, descending
//! 3. item id, ascending (byte order)

use core::cmp::Ordering;

use crate::rounding::Ratio;
use crate::tokens::{ItemId, ScopeId};

/// Provide a **total**, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for ScopeId {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl StableOrd for ItemId {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.as_str().as_bytes().cmp(other.as_str().as_bytes())
    }
}

/// Key used to rank scored items, best first.
#[derive(Clone, Copy, Debug)]
pub struct RankKey<'a> {
    pub average: Ratio,
    pub votes: u32,
    pub item: &'a ItemId,
}

/// `Less` means `a` ranks above `b`.
pub fn cmp_ranked(a: &RankKey<'_>, b: &RankKey<'_>) -> Ordering {
    b.average
        .cmp(&a.average)
        .then_with(|| b.votes.cmp(&a.votes))
        .then_with(|| a.item.stable_cmp(b.item))
}

/// Sort scopes **in place** by ascending id.
#[inline]
pub fn sort_scopes(xs: &mut [ScopeId]) {
    xs.sort_by(|a, b| a.stable_cmp(b));
}
