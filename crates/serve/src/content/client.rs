// crates/serve/src/content/client.rs

use super::cache::{CachedResponse, ResponseCache};
use super::params::{QueryParams, Version};
use super::relations::RelationResolver;
use super::{ContentApi, ContentError, DatasourceEntry, Result, StoriesPage, StoryResponse};
use async_trait::async_trait;
use domain::content::Story;
use domain::setting::ContentSettings;
use serde::Deserialize;
use serde_json::Value as Json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// reqwest-backed [`ContentApi`] with a per-render-cycle response cache.
///
/// Only `published` responses are cached; draft reads always hit the network.
#[derive(Debug, Clone)]
pub struct HttpContentClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    cache: ResponseCache,
}

impl HttpContentClient {
    pub fn new(settings: &ContentSettings) -> Result<Self> {
        if settings.api_base_url.trim().is_empty() {
            return Err(ContentError::Config("content.api_base_url is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: settings.access_token.clone(),
            cache: ResponseCache::new(),
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    #[tracing::instrument(skip_all, fields(path = %path))]
    async fn get(&self, path: &str, params: &QueryParams) -> Result<Arc<CachedResponse>> {
        let cacheable = params.version() == Some(Version::Published);
        let key = params.cache_key(path);

        if cacheable {
            if let Some(hit) = self.cache.get(&key) {
                debug!("content cache hit");
                return Ok(hit);
            }
        }

        let url = format!("{}/{}", self.base_url, path);
        let query: Vec<(&str, &str)> = params.iter().collect();

        let response = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "content API error");
            return Err(ContentError::Status {
                status,
                path: path.to_string(),
            });
        }

        let total = response
            .headers()
            .get("total")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body: Json = response.json().await?;
        let fetched = CachedResponse { body, total };

        Ok(if cacheable {
            self.cache.insert(key, fetched)
        } else {
            Arc::new(fetched)
        })
    }
}

/// Expand the relations requested in `params` using the body's `rels` array.
fn inline_relations(body: &mut Json, params: &QueryParams, target: &str) {
    let Some(param) = params.get("resolve_relations") else {
        return;
    };
    let resolver = RelationResolver::parse(param);

    let rels = match body.get_mut("rels").map(Json::take) {
        Some(Json::Array(rels)) => rels,
        _ => return,
    };

    match body.get_mut(target) {
        Some(Json::Array(stories)) => {
            for story in stories {
                if let Some(content) = story.get_mut("content") {
                    resolver.inline(content, &rels);
                }
            }
        }
        Some(story) => {
            if let Some(content) = story.get_mut("content") {
                resolver.inline(content, &rels);
            }
        }
        None => {}
    }
}

#[async_trait]
impl ContentApi for HttpContentClient {
    async fn fetch_story(&self, slug: &str, params: &QueryParams) -> Result<StoryResponse> {
        let response = self.get(&format!("cdn/stories/{slug}"), params).await?;
        let mut body = response.body.clone();
        inline_relations(&mut body, params, "story");
        Ok(serde_json::from_value(body)?)
    }

    async fn fetch_stories(&self, params: &QueryParams) -> Result<StoriesPage> {
        #[derive(Deserialize)]
        struct Listing {
            stories: Option<Vec<Story>>,
        }

        let response = self.get("cdn/stories", params).await?;
        let mut body = response.body.clone();
        inline_relations(&mut body, params, "stories");

        let listing: Listing = serde_json::from_value(body)?;
        let stories = listing
            .stories
            .ok_or_else(|| ContentError::MissingStories(params.cache_key("cdn/stories")))?;
        let total = response.total.unwrap_or(stories.len() as u64);

        Ok(StoriesPage { stories, total })
    }

    async fn fetch_datasource_entries(&self, params: &QueryParams) -> Result<Vec<DatasourceEntry>> {
        #[derive(Deserialize)]
        struct Entries {
            #[serde(default)]
            datasource_entries: Vec<DatasourceEntry>,
        }

        let response = self.get("cdn/datasource_entries", params).await?;
        let entries: Entries = serde_json::from_value(response.body.clone())?;
        Ok(entries.datasource_entries)
    }
}
