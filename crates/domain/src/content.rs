// crates/domain/src/content.rs

use crate::asset::Asset;
use crate::error::{Error, Result};
use crate::richtext::RichText;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

// ─────────────────────────────────────────────────────────────────────────────
// Stories
// ─────────────────────────────────────────────────────────────────────────────

/// A content entry as delivered by the content API.
///
/// Stories are read-only from this system's point of view; `full_slug` is
/// unique per language within the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story<C = Block> {
    pub id: u64,
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub full_slug: String,
    pub content: C,
    #[serde(default)]
    pub is_startpage: bool,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub first_published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub alternates: Vec<Alternate>,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// A sibling translation of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternate {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub full_slug: String,
    #[serde(default)]
    pub is_folder: bool,
}

impl Story<Block> {
    /// The content component name, e.g. `Page` or `Article`.
    pub fn component(&self) -> &str {
        &self.content.component
    }

    /// Page-level fields used for metadata, each read on its own so one
    /// malformed field cannot reset the others.
    pub fn page_fields(&self) -> PageFields {
        let block = &self.content;
        PageFields {
            title: block.str_field("title").map(str::to_string),
            name: block.str_field("name").map(str::to_string),
            description: block.str_field("description").map(str::to_string),
            non_indexable: block.bool_field("nonIndexable"),
            og_image: block.field_as("ogImage"),
            illustration: block.field_as("illustration"),
            intro: block.field_as("intro"),
            additional_metadata: block.blocks("additionalMetadata"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// A node of a story's content tree, discriminated by `component`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "_uid", default)]
    pub uid: String,
    pub component: String,
    #[serde(rename = "_editable", default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Json>,
}

impl Block {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            uid: String::new(),
            component: component.into(),
            editable: None,
            fields: Map::new(),
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Json) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Deserialize this block's fields into a typed props struct.
    pub fn props<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Json::Object(self.fields.clone())).map_err(|source| Error::Props {
            component: self.component.clone(),
            source,
        })
    }

    pub fn field(&self, name: &str) -> Option<&Json> {
        self.fields.get(name)
    }

    /// One field decoded on its own; `None` when absent or of another shape.
    pub fn field_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.field(name)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(component = %self.component, field = name, "field ignored: {e}");
                None
            }
        }
    }

    /// A string field, treating the empty string as absent.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(Json::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn bool_field(&self, name: &str) -> bool {
        self.field(name).and_then(Json::as_bool).unwrap_or(false)
    }

    /// Nested blocks of an array-valued field; entries that are not blocks are skipped.
    pub fn blocks(&self, name: &str) -> Vec<Block> {
        self.items(name)
    }

    /// Entries of an array-valued field that decode as `T`; the rest are skipped.
    pub fn items<T: DeserializeOwned>(&self, name: &str) -> Vec<T> {
        match self.field(name) {
            Some(Json::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A reference field value: a story when the relation was resolved, the raw
/// UUID otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    Story(Box<Story>),
    Uuid(String),
}

impl Relation {
    pub fn story(&self) -> Option<&Story> {
        match self {
            Relation::Story(story) => Some(story),
            Relation::Uuid(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Page-level fields
// ─────────────────────────────────────────────────────────────────────────────

/// Fields shared by page-like content types (`Page`, `Article`, `Category`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFields {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub non_indexable: bool,
    pub og_image: Option<Asset>,
    pub illustration: Option<Asset>,
    pub intro: Option<RichText>,
    pub additional_metadata: Vec<Block>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Global settings
// ─────────────────────────────────────────────────────────────────────────────

/// Site-wide singleton content: navigation, footer, and redirect rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSettings {
    pub nav_items: Vec<Block>,
    pub footer_items: Vec<Block>,
    pub social_links: Vec<Block>,
    pub copyright: Option<String>,
    pub logo: Option<Asset>,
    pub illustration: Option<Asset>,
    pub redirects: Vec<RedirectRule>,
}

impl GlobalSettings {
    /// Reads every field independently; a malformed entry is dropped on its own.
    pub fn from_block(block: &Block) -> Self {
        Self {
            nav_items: block.blocks("navItems"),
            footer_items: block.blocks("footerItems"),
            social_links: block.blocks("socialLinks"),
            copyright: block.str_field("copyright").map(str::to_string),
            logo: block.field_as("logo"),
            illustration: block.field_as("illustration"),
            redirects: block.items("redirects"),
        }
    }

    pub fn from_story(story: &Story) -> Self {
        Self::from_block(&story.content)
    }

    /// First redirect rule whose `from` equals `slug`.
    pub fn redirect_for(&self, slug: &str) -> Option<&RedirectRule> {
        self.redirects.iter().find(|r| r.from == slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedirectRule {
    pub from: String,
    pub to: String,
    pub is_permanent: bool,
}
