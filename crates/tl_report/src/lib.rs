//! tl_report: pure renderers for a scope's tier buckets.
//!
//! No I/O here; callers hand in buckets already computed or loaded.
//! - `render_csv`: `Tier,Name,Average,Total,Votes`, three-decimal averages.
//! - `render_text`: one `TIER | a, b, c` line per tier.
//! - `build_model` + `render_json`: a stable, presentation-ready document.

#![deny(unsafe_code)]

use std::fmt::Write as _;

use tl_algo::{TierBuckets, TierEntry};

#[cfg(feature = "render_json")]
mod json;
#[cfg(feature = "render_json")]
pub use json::{build_model, render_json, EntryRow, ReportError, ReportModel, TierSection};

const CSV_HEADER: &str = "Tier,Name,Average,Total,Votes";

/// Average as shown to people: three decimals.
pub fn format_average(avg: f64) -> String {
    format!("{avg:.3}")
}

/// CSV export, best tier first, one row per placed item. Lines are joined by
/// `\n` with no trailing newline.
pub fn render_csv(buckets: &TierBuckets) -> String {
    let mut out = String::from(CSV_HEADER);
    for (tier, entries) in buckets.iter() {
        for e in entries {
            out.push('\n');
            write_csv_row(&mut out, tier.as_str(), e);
        }
    }
    out
}

fn write_csv_row(out: &mut String, tier: &str, e: &TierEntry) {
    out.push_str(tier);
    out.push(',');
    push_csv_field(out, e.item.as_str());
    // writing into a String cannot fail
    let _ = write!(out, ",{},{},{}", format_average(e.average), e.total, e.votes);
}

/// RFC 4180: quote fields holding a comma, quote or line break; double quotes.
fn push_csv_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Plain-text summary: `TIER | a, b, c` per tier, `-` for an empty tier.
pub fn render_text(buckets: &TierBuckets) -> String {
    buckets
        .iter()
        .map(|(tier, entries)| {
            let members = if entries.is_empty() {
                "-".to_string()
            } else {
                entries.iter().map(|e| e.item.as_str()).collect::<Vec<_>>().join(", ")
            };
            format!("{} | {}", tier, members)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
