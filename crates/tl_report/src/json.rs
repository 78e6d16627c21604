//! Report model and its JSON rendering.

use serde::Serialize;
use tl_algo::TierBuckets;

use crate::format_average;

#[derive(Debug)]
pub enum ReportError {
    Serialize(String),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Serialize(m) => write!(f, "report serialization failed: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}

#[derive(Clone, Debug, Serialize)]
pub struct ReportModel {
    pub scope: String,
    pub items: usize,
    pub tiers: Vec<TierSection>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TierSection {
    pub tier: String,
    pub entries: Vec<EntryRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EntryRow {
    pub rank: usize,
    pub name: String,
    /// Three-decimal string, as in the CSV export.
    pub average: String,
    pub total: i64,
    pub votes: u32,
}

/// Shape `buckets` for presentation. `rank` is 1-based across the whole list.
pub fn build_model(scope: &str, buckets: &TierBuckets) -> ReportModel {
    let mut rank = 0;
    let tiers = buckets
        .iter()
        .map(|(tier, entries)| TierSection {
            tier: tier.as_str().to_string(),
            entries: entries
                .iter()
                .map(|e| {
                    rank += 1;
                    EntryRow {
                        rank,
                        name: e.item.to_string(),
                        average: format_average(e.average),
                        total: e.total,
                        votes: e.votes,
                    }
                })
                .collect(),
        })
        .collect();
    ReportModel { scope: scope.to_string(), items: buckets.len(), tiers }
}

/// Pretty JSON; field order follows the struct layout.
pub fn render_json(model: &ReportModel) -> Result<String, ReportError> {
    serde_json::to_string_pretty(model).map_err(|e| ReportError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_algo::TierEntry;
    use tl_algo::{ScopeConfig, Tier};

    #[test]
    fn ranks_run_across_tiers() {
        let cfg = ScopeConfig::empty(3).tier(Tier::S, 7, 6.0, None).tier(Tier::B, 4, 0.0, None);
        let mut b = TierBuckets::empty_for(&cfg);
        let e = |n: &str, avg: f64| TierEntry { item: n.parse().unwrap(), average: avg, total: 7, votes: 1 };
        b.tiers.insert(Tier::S, vec![e("one", 6.5)]);
        b.tiers.insert(Tier::B, vec![e("two", 1.75), e("three", 1.75)]);

        let m = build_model("guild-9", &b);
        assert_eq!(m.items, 3);
        assert_eq!(m.tiers[0].tier, "S");
        let ranks: Vec<usize> = m.tiers.iter().flat_map(|t| t.entries.iter().map(|r| r.rank)).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        let v: serde_json::Value = serde_json::from_str(&render_json(&m).unwrap()).unwrap();
        assert_eq!(v["scope"], "guild-9");
        assert_eq!(v["tiers"][1]["entries"][0]["average"], "1.750");
    }
}
