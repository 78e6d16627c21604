//! Per-scope setup document: where and when the daily song goes out, the
//! rotation position in the catalog, and the scope's tier configuration.

use serde::{Deserialize, Serialize};
use tl_core::{PostTime, ScopeConfig};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopeSetup {
    /// Announcement channel id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Role pinged with each post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_time: Option<PostTime>,
    /// Index of the next catalog entry to post (wraps).
    #[serde(default)]
    pub rotation_index: u64,
    #[serde(default)]
    pub tiers: ScopeConfig,
}

impl Default for ScopeSetup {
    fn default() -> Self {
        ScopeSetup {
            channel: None,
            role: None,
            post_time: None,
            rotation_index: 0,
            tiers: ScopeConfig::default(),
        }
    }
}
