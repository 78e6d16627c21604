//! Song catalog (`songslist.json`).
//!
//! The file is a JSON object keyed by song title. Key order is significant:
//! it is the rotation order of the daily post, so the object is read with
//! `serde_json`'s `preserve_order` map.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tl_core::ItemId;

use crate::canonical_json::read_json_opt;
use crate::{IoError, IoResult};

/// Display metadata for one song. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SongMeta {
    #[serde(rename = "eng", default, skip_serializing_if = "Option::is_none")]
    pub english_title: Option<String>,
    #[serde(rename = "yt", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(rename = "Commission", default, skip_serializing_if = "Option::is_none")]
    pub commission: Option<String>,
    #[serde(rename = "Arranger", default, skip_serializing_if = "Option::is_none")]
    pub arranger: Option<String>,
    #[serde(rename = "Composer", default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(rename = "Lyricist", default, skip_serializing_if = "Option::is_none")]
    pub lyricist: Option<String>,
    #[serde(rename = "JP Release", default, skip_serializing_if = "Option::is_none")]
    pub jp_release: Option<String>,
    /// Thumbnail / jacket image.
    #[serde(rename = "link", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<(ItemId, SongMeta)>,
}

impl Catalog {
    pub fn load(path: &Path) -> IoResult<Catalog> {
        let raw: Map<String, Value> = read_json_opt(path)?
            .ok_or_else(|| IoError::Path(format!("catalog not found: {}", path.display())))?;
        Catalog::from_map(raw)
    }

    pub fn from_json_str(text: &str) -> IoResult<Catalog> {
        let raw: Map<String, Value> = serde_json::from_str(text)?;
        Catalog::from_map(raw)
    }

    fn from_map(raw: Map<String, Value>) -> IoResult<Catalog> {
        let mut entries = Vec::with_capacity(raw.len());
        for (title, meta) in raw {
            let id: ItemId = title
                .parse()
                .map_err(|_| IoError::Invalid(format!("catalog title not usable as item id: {title:?}")))?;
            let meta: SongMeta = serde_json::from_value(meta).map_err(|e| IoError::Json {
                pointer: format!("/{title}"),
                msg: e.to_string(),
            })?;
            entries.push((id, meta));
        }
        Ok(Catalog { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, item: &ItemId) -> Option<&SongMeta> {
        self.entries.iter().find(|(id, _)| id == item).map(|(_, m)| m)
    }

    /// Entry at `index`, wrapping around the catalog length.
    pub fn at_rotation(&self, index: u64) -> Option<&ItemId> {
        if self.entries.is_empty() {
            return None;
        }
        let i = (index % self.entries.len() as u64) as usize;
        Some(&self.entries[i].0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &SongMeta)> {
        self.entries.iter().map(|(id, m)| (id, m))
    }
}
