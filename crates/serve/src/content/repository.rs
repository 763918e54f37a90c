// crates/serve/src/content/repository.rs

use super::params::{Filter, QueryParams, Version};
use super::relations::RelationResolver;
use super::{ContentApi, ContentError, DatasourceEntry, Result, StoriesPage};
use chrono::Utc;
use domain::content::Story;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Content types that are routable pages.
pub const ALL_PAGE_TYPES: &[&str] = &["Page"];

/// Page size used when paging through every entry of a content type.
pub const FULL_LISTING_PAGE_SIZE: u32 = 100;

const DEFAULT_PER_PAGE: u32 = 10;
const DATASOURCE_PER_PAGE: u32 = 25;

// ─────────────────────────────────────────────────────────────────────────────
// Query arguments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindStory {
    pub slug: String,
    pub locale: Option<String>,
    pub preview: bool,
    /// Comma-joined `<Component>.<field>` list.
    pub resolve_relations: Option<String>,
}

impl FindStory {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Default::default()
        }
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn resolve_relations(mut self, relations: &RelationResolver) -> Self {
        self.resolve_relations = relations.param();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindStories {
    pub content_type: Option<String>,
    pub starts_with: Option<String>,
    pub excluding_slugs: Option<String>,
    pub filters: Vec<Filter>,
    pub sort_by: Option<String>,
    pub with_tag: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub locale: Option<String>,
    pub preview: bool,
    pub resolve_relations: Option<String>,
}

impl FindStories {
    pub fn content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::with_version(Version::for_preview(self.preview))
            .set_opt("language", self.locale.as_deref())
            .set_opt("starts_with", self.starts_with.as_deref())
            .set_opt("excluding_slugs", self.excluding_slugs.as_deref())
            .set_opt("with_tag", self.with_tag.as_deref());

        for filter in &self.filters {
            params = params.set(filter.key(), &filter.value);
        }

        params
            .set_opt("content_type", self.content_type.as_deref())
            .set_opt("sort_by", self.sort_by.as_deref())
            .set("per_page", self.per_page.unwrap_or(DEFAULT_PER_PAGE))
            .set("page", self.page.unwrap_or(1))
            .set_opt("resolve_relations", self.resolve_relations.as_deref())
    }
}

/// Every routable slug, as listed by the content API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSlugs {
    /// `full_slug` of every page in every requested locale.
    pub all_slugs_with_locale: Vec<String>,
    /// Slugs whose first segment is not a locale, deduplicated in first-seen order.
    pub all_slugs_without_locale: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository
// ─────────────────────────────────────────────────────────────────────────────

/// Query semantics over a [`ContentApi`]: version selection, freshness
/// tokens, parameter hygiene, and exhaustive paging.
#[derive(Clone)]
pub struct StoryRepository {
    api: Arc<dyn ContentApi>,
    relations: RelationResolver,
    development: bool,
}

impl StoryRepository {
    pub fn new(api: Arc<dyn ContentApi>, relations: RelationResolver, development: bool) -> Self {
        Self {
            api,
            relations,
            development,
        }
    }

    /// The configured relation list.
    pub fn relations(&self) -> &RelationResolver {
        &self.relations
    }

    /// Preview and development reads carry a cache-busting `cv` token.
    fn with_freshness(&self, params: QueryParams, preview: bool) -> QueryParams {
        if preview || self.development {
            params.set("cv", Utc::now().timestamp_millis())
        } else {
            params
        }
    }

    /// Fetch one story by slug. A response without a story is an error.
    #[tracing::instrument(skip_all, fields(slug = %args.slug, preview = args.preview))]
    pub async fn find_story(&self, args: FindStory) -> Result<Story> {
        let params = QueryParams::with_version(Version::for_preview(args.preview))
            .set_opt("language", args.locale.as_deref())
            .set_opt("resolve_relations", args.resolve_relations.as_deref());
        let params = self.with_freshness(params, args.preview);

        let response = self.api.fetch_story(&args.slug, &params).await?;
        response
            .story
            .ok_or_else(|| ContentError::MissingStory(args.slug))
    }

    /// One page of a listing query. Unset arguments are not sent.
    #[tracing::instrument(skip_all)]
    pub async fn find_stories(&self, args: &FindStories) -> Result<StoriesPage> {
        let params = self.with_freshness(args.to_params(), args.preview);
        self.api.fetch_stories(&params).await
    }

    /// Every entry matching `args`, paging until the accumulated count
    /// reaches the reported total.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_all_pages(&self, args: FindStories) -> Result<Vec<Story>> {
        let mut args = args;
        args.per_page = Some(args.per_page.unwrap_or(FULL_LISTING_PAGE_SIZE));

        let mut page = args.page.unwrap_or(1);
        let mut all = Vec::new();

        loop {
            args.page = Some(page);
            let StoriesPage { stories, total } = self.find_stories(&args).await?;
            let received = stories.len();
            all.extend(stories);

            if all.len() as u64 >= total {
                break;
            }
            if received == 0 {
                warn!(total, fetched = all.len(), "listing ended before reported total");
                break;
            }
            page += 1;
        }

        debug!(count = all.len(), pages = page, "fetched full listing");
        Ok(all)
    }

    /// Every page-type story across `locales` (or the default language when
    /// `locales` is empty). Listings are fetched concurrently.
    #[tracing::instrument(skip_all)]
    pub async fn find_all_pages(&self, locales: &[String]) -> Result<Vec<Story>> {
        let locale_options: Vec<Option<String>> = if locales.is_empty() {
            vec![None]
        } else {
            locales.iter().cloned().map(Some).collect()
        };

        let queries = locale_options.into_iter().flat_map(|locale| {
            ALL_PAGE_TYPES.iter().map(move |content_type| FindStories {
                content_type: Some(content_type.to_string()),
                per_page: Some(FULL_LISTING_PAGE_SIZE),
                locale: locale.clone(),
                ..Default::default()
            })
        });

        let listings = try_join_all(queries.map(|q| self.fetch_all_pages(q))).await?;
        Ok(listings.into_iter().flatten().collect())
    }

    #[tracing::instrument(skip_all)]
    pub async fn find_all_page_slugs(&self, locales: &[String]) -> Result<PageSlugs> {
        let stories = self.find_all_pages(locales).await?;
        Ok(page_slugs(stories.iter().map(|s| s.full_slug.as_str()), locales))
    }

    #[tracing::instrument(skip_all, fields(datasource = %datasource))]
    pub async fn find_datasource_entries(
        &self,
        datasource: &str,
        dimension: Option<&str>,
    ) -> Result<Vec<DatasourceEntry>> {
        let params = QueryParams::new()
            .set("datasource", datasource)
            .set_opt("dimension", dimension)
            .set("per_page", DATASOURCE_PER_PAGE)
            .set("page", 1);
        self.api.fetch_datasource_entries(&params).await
    }
}

fn page_slugs<'a>(full_slugs: impl Iterator<Item = &'a str>, locales: &[String]) -> PageSlugs {
    let all_slugs_with_locale: Vec<String> = full_slugs.map(str::to_string).collect();

    let mut seen = HashSet::new();
    let all_slugs_without_locale = all_slugs_with_locale
        .iter()
        .filter(|slug| {
            let first = slug.split('/').next().unwrap_or_default();
            !locales.iter().any(|l| l == first)
        })
        .filter(|slug| seen.insert(slug.as_str()))
        .cloned()
        .collect();

    PageSlugs {
        all_slugs_with_locale,
        all_slugs_without_locale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{MockContentApi, StoryResponse};
    use domain::content::Block;

    fn story(full_slug: &str) -> Story {
        Story {
            id: 1,
            uuid: format!("uuid-{full_slug}"),
            name: full_slug.to_string(),
            slug: full_slug.rsplit('/').next().unwrap_or_default().to_string(),
            full_slug: full_slug.to_string(),
            content: Block::new("Page"),
            is_startpage: false,
            lang: "default".into(),
            published_at: None,
            first_published_at: None,
            alternates: vec![],
            tag_list: vec![],
        }
    }

    fn repo(api: MockContentApi, development: bool) -> StoryRepository {
        StoryRepository::new(Arc::new(api), RelationResolver::parse("Article.categories"), development)
    }

    #[tokio::test]
    async fn find_story_selects_published_without_freshness_token() {
        let mut api = MockContentApi::new();
        api.expect_fetch_story()
            .withf(|slug, p| {
                slug == "about"
                    && p.get("version") == Some("published")
                    && p.get("language") == Some("en")
                    && !p.contains("cv")
                    && !p.contains("resolve_relations")
            })
            .times(1)
            .returning(|_, _| Ok(StoryResponse { story: Some(story("about")) }));

        let found = repo(api, false)
            .find_story(FindStory::new("about").locale("en"))
            .await
            .expect("story");
        assert_eq!(found.full_slug, "about");
    }

    #[tokio::test]
    async fn preview_reads_draft_with_freshness_token() {
        let mut api = MockContentApi::new();
        api.expect_fetch_story()
            .withf(|_, p| p.get("version") == Some("draft") && p.contains("cv"))
            .returning(|_, _| Ok(StoryResponse { story: Some(story("home")) }));

        let repository = repo(api, false);
        let args = FindStory::new("home").preview(true).resolve_relations(repository.relations());
        repository.find_story(args).await.expect("story");
    }

    #[tokio::test]
    async fn development_mode_adds_freshness_token_to_published_reads() {
        let mut api = MockContentApi::new();
        api.expect_fetch_stories()
            .withf(|p| p.get("version") == Some("published") && p.contains("cv"))
            .returning(|_| Ok(StoriesPage::default()));

        repo(api, true)
            .find_stories(&FindStories::default())
            .await
            .expect("listing");
    }

    #[tokio::test]
    async fn missing_story_is_a_not_found_error() {
        let mut api = MockContentApi::new();
        api.expect_fetch_story()
            .returning(|_, _| Ok(StoryResponse { story: None }));

        let err = repo(api, false)
            .find_story(FindStory::new("ghost"))
            .await
            .expect_err("no story");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn find_stories_omits_unset_params_and_applies_defaults() {
        let mut api = MockContentApi::new();
        api.expect_fetch_stories()
            .withf(|p| {
                let keys: Vec<&str> = p.iter().map(|(k, _)| k).collect();
                keys == ["content_type", "filter_query[author][in]", "page", "per_page", "version"]
                    && p.get("per_page") == Some("10")
                    && p.get("page") == Some("1")
                    && !p.contains("version")
            })
            .returning(|_| Ok(StoriesPage::default()));

        let mut args = FindStories::content_type("Article");
        args.filters.push(Filter::new("author", "in", "jane"));
        repo(api, false).find_stories(&args).await.expect("listing");
    }

    #[tokio::test]
    async fn fetch_all_pages_loops_until_total_is_reached() {
        let mut api = MockContentApi::new();
        api.expect_fetch_stories()
            .times(3)
            .returning(|p| {
                let page: u64 = p.get("page").and_then(|v| v.parse().ok()).unwrap_or(0);
                let count = if page < 3 { 100 } else { 50 };
                Ok(StoriesPage {
                    stories: (0..count).map(|i| story(&format!("p{page}-{i}"))).collect(),
                    total: 250,
                })
            });

        let all = repo(api, false)
            .fetch_all_pages(FindStories::content_type("Article"))
            .await
            .expect("all pages");
        assert_eq!(all.len(), 250);
    }

    #[tokio::test]
    async fn fetch_all_pages_stops_on_an_empty_page() {
        let mut api = MockContentApi::new();
        api.expect_fetch_stories().times(1).returning(|_| {
            Ok(StoriesPage {
                stories: vec![],
                total: 10,
            })
        });

        let all = repo(api, false)
            .fetch_all_pages(FindStories::content_type("Page"))
            .await
            .expect("listing");
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn find_all_page_slugs_splits_localized_slugs() {
        let mut api = MockContentApi::new();
        api.expect_fetch_stories()
            .withf(|p| p.get("language") == Some("en") && p.get("per_page") == Some("100"))
            .returning(|_| {
                Ok(StoriesPage {
                    stories: vec![story("about"), story("services"), story("contact")],
                    total: 3,
                })
            });
        api.expect_fetch_stories()
            .withf(|p| p.get("language") == Some("de"))
            .returning(|_| {
                Ok(StoriesPage {
                    stories: vec![story("de/about"), story("de/services")],
                    total: 2,
                })
            });

        let locales = vec!["en".to_string(), "de".to_string()];
        let slugs = repo(api, false)
            .find_all_page_slugs(&locales)
            .await
            .expect("slugs");

        assert_eq!(slugs.all_slugs_with_locale.len(), 5);
        assert_eq!(slugs.all_slugs_without_locale, vec!["about", "services", "contact"]);
    }

    #[tokio::test]
    async fn datasource_entries_use_fixed_paging() {
        let mut api = MockContentApi::new();
        api.expect_fetch_datasource_entries()
            .withf(|p| {
                p.get("datasource") == Some("icons")
                    && p.get("dimension") == Some("de")
                    && p.get("per_page") == Some("25")
                    && p.get("page") == Some("1")
            })
            .returning(|_| Ok(vec![]));

        repo(api, false)
            .find_datasource_entries("icons", Some("de"))
            .await
            .expect("entries");
    }

    #[test]
    fn page_slugs_deduplicates_in_first_seen_order() {
        let locales = vec!["en".to_string(), "de".to_string()];
        let slugs = page_slugs(["b", "a", "de/a", "b"].into_iter(), &locales);
        assert_eq!(slugs.all_slugs_without_locale, vec!["b", "a"]);
        assert_eq!(slugs.all_slugs_with_locale.len(), 4);
    }
}
