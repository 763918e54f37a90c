// crates/serve/src/content/mod.rs

//! Access to the remote content API.
//!
//! [`ContentApi`] is the network seam: [`client::HttpContentClient`] talks
//! to the real API, tests substitute a mock. [`repository::StoryRepository`]
//! builds the query semantics on top.

pub mod cache;
pub mod client;
pub mod params;
pub mod relations;
pub mod repository;

pub use cache::ResponseCache;
pub use client::HttpContentClient;
pub use params::{Filter, QueryParams, Version};
pub use relations::RelationResolver;
pub use repository::{FindStories, FindStory, PageSlugs, StoryRepository};

use async_trait::async_trait;
use domain::content::Story;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content API answered {status} for `{path}`")]
    Status { status: StatusCode, path: String },

    #[error("content API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("content API returned an unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no story received for slug `{0}`")]
    MissingStory(String),

    #[error("no stories received for query {0}")]
    MissingStories(String),

    #[error("content client configuration error: {0}")]
    Config(String),
}

impl ContentError {
    /// True when the requested entry does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ContentError::Status { status, .. } => *status == StatusCode::NOT_FOUND,
            ContentError::MissingStory(_) => true,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ContentError::Status { status, .. } => Some(*status),
            ContentError::MissingStory(_) => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// Body of a single-story lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryResponse {
    #[serde(default)]
    pub story: Option<Story>,
}

/// One page of a story listing plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoriesPage {
    pub stories: Vec<Story>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceEntry {
    pub id: u64,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub dimension_value: Option<String>,
}

/// The two story resources of the content API, plus datasource entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// `GET cdn/stories/<slug>`.
    async fn fetch_story(&self, slug: &str, params: &QueryParams) -> Result<StoryResponse>;

    /// `GET cdn/stories`; `total` comes from the response header.
    async fn fetch_stories(&self, params: &QueryParams) -> Result<StoriesPage>;

    /// `GET cdn/datasource_entries`.
    async fn fetch_datasource_entries(&self, params: &QueryParams) -> Result<Vec<DatasourceEntry>>;
}
