// crates/domain/src/asset.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;

/// A media asset reference from the content API.
///
/// Unset assets arrive as `null`, `""`, or an object with a `null` filename;
/// all of them decode to an empty asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Asset {
    pub id: Option<u64>,
    pub filename: String,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub focus: Option<String>,
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Json::Object(fields) = Json::deserialize(deserializer)? else {
            return Ok(Asset::default());
        };
        let text = |name: &str| fields.get(name).and_then(Json::as_str).map(str::to_string);

        Ok(Asset {
            id: fields.get("id").and_then(Json::as_u64),
            filename: text("filename").unwrap_or_default(),
            alt: text("alt"),
            title: text("title"),
            name: text("name"),
            focus: text("focus"),
        })
    }
}

impl Asset {
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty()
    }

    /// The filename, or `None` for an unset asset.
    pub fn url(&self) -> Option<&str> {
        Some(self.filename.as_str()).filter(|f| !f.is_empty())
    }

    pub fn alt_text(&self) -> &str {
        self.alt.as_deref().unwrap_or_default()
    }

    /// Pixel dimensions encoded in the asset path (`.../<W>x<H>/...`).
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.filename.split('/').find_map(|segment| {
            let (w, h) = segment.split_once('x')?;
            Some((w.parse().ok()?, h.parse().ok()?))
        })
    }
}
