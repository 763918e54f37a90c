// crates/serve/src/resolver.rs

//! Request path → content.
//!
//! Global settings are fetched for every request, before the page itself,
//! and a failure there fails the request. A page the content API does not
//! know is looked up in the CMS-authored redirect rules before it becomes a
//! not-found.

use crate::content::{FindStory, StoryRepository};
use crate::{Error, Result};
use domain::content::{GlobalSettings, Story};
use domain::link::ensure_preceding_slash;
use domain::locale::LocaleSet;
use tracing::{debug, error};

pub const GLOBAL_SETTINGS_SLUG: &str = "globals/settings";
pub const HOME_SLUG: &str = "home";
const RESERVED_PREFIXES: &[&str] = &["globals", "global-settings"];

/// What a request asks for, after locale routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Slug segments without the locale prefix. Empty means home.
    pub segments: Vec<String>,
    pub locale: String,
    pub preview: bool,
}

impl PageRequest {
    pub fn new(segments: Vec<String>, locale: impl Into<String>, preview: bool) -> Self {
        Self {
            segments,
            locale: locale.into(),
            preview,
        }
    }

    /// The content slug: segments joined with `/`, `home` when empty.
    pub fn slug(&self) -> String {
        if self.segments.is_empty() {
            HOME_SLUG.to_string()
        } else {
            self.segments.join("/")
        }
    }

    /// The locale-free public path, e.g. `/about/team` or `/`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// A page ready to render.
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub story: Story,
    pub globals_story: Story,
    pub globals: GlobalSettings,
    pub locale: String,
    pub preview: bool,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Page(Box<ResolvedPage>),
    Redirect { to: String, permanent: bool },
    /// Nothing to show; the global settings are kept for the 404 page chrome.
    NotFound { globals: Box<GlobalSettings> },
}

/// How a slug is treated before anything is fetched.
#[derive(Debug, PartialEq, Eq)]
enum SlugPolicy {
    Fetch(String),
    NotFound,
    RedirectHome,
}

fn slug_policy(slug: String, preview: bool) -> SlugPolicy {
    if preview {
        return SlugPolicy::Fetch(slug);
    }
    if slug == HOME_SLUG {
        // `/home` is only reachable from the editor.
        return SlugPolicy::NotFound;
    }
    if RESERVED_PREFIXES.iter().any(|p| slug == *p || slug.starts_with(&format!("{p}/"))) {
        return SlugPolicy::RedirectHome;
    }
    SlugPolicy::Fetch(slug)
}

#[derive(Clone)]
pub struct PageResolver {
    repository: StoryRepository,
    locales: LocaleSet,
}

impl PageResolver {
    pub fn new(repository: StoryRepository, locales: LocaleSet) -> Self {
        Self { repository, locales }
    }

    pub fn repository(&self) -> &StoryRepository {
        &self.repository
    }

    /// The global settings story and its typed view.
    #[tracing::instrument(skip_all, fields(preview))]
    pub async fn global_settings(&self, preview: bool) -> Result<(Story, GlobalSettings)> {
        let story = self
            .repository
            .find_story(FindStory::new(GLOBAL_SETTINGS_SLUG).preview(preview))
            .await
            .map_err(|e| {
                error!("unable to load global settings: {e}");
                Error::GlobalSettings(Box::new(e))
            })?;

        let globals = GlobalSettings::from_story(&story);
        Ok((story, globals))
    }

    #[tracing::instrument(skip_all, fields(slug = %request.slug(), locale = %request.locale, preview = request.preview))]
    pub async fn resolve(&self, request: &PageRequest) -> Result<Resolution> {
        let policy = slug_policy(request.slug(), request.preview);
        let (globals_story, globals) = self.global_settings(request.preview).await?;

        let slug = match policy {
            SlugPolicy::Fetch(slug) => slug,
            SlugPolicy::NotFound => {
                return Ok(Resolution::NotFound {
                    globals: Box::new(globals),
                })
            }
            SlugPolicy::RedirectHome => {
                return Ok(Resolution::Redirect {
                    to: self.locales.localized_path(&request.locale, "/"),
                    permanent: false,
                })
            }
        };

        let found = self
            .repository
            .find_story(
                FindStory::new(&slug)
                    .locale(&request.locale)
                    .preview(request.preview)
                    .resolve_relations(self.repository.relations()),
            )
            .await;

        match found {
            Ok(story) => Ok(Resolution::Page(Box::new(ResolvedPage {
                story,
                globals_story,
                globals,
                locale: request.locale.clone(),
                preview: request.preview,
            }))),
            Err(e) if e.is_not_found() => match globals.redirect_for(&slug) {
                Some(rule) => {
                    debug!(from = %rule.from, to = %rule.to, permanent = rule.is_permanent, "redirect rule matched");
                    Ok(Resolution::Redirect {
                        to: ensure_preceding_slash(&rule.to),
                        permanent: rule.is_permanent,
                    })
                }
                None => Ok(Resolution::NotFound {
                    globals: Box::new(globals),
                }),
            },
            Err(e) => {
                error!(%slug, "unexpected error while loading page: {e}");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentError, MockContentApi, RelationResolver, StoryResponse};
    use domain::content::Block;
    use http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn story(full_slug: &str, content: Block) -> Story {
        Story {
            id: 1,
            uuid: format!("uuid-{full_slug}"),
            name: full_slug.to_string(),
            slug: full_slug.rsplit('/').next().unwrap_or_default().to_string(),
            full_slug: full_slug.to_string(),
            content,
            is_startpage: false,
            lang: "default".into(),
            published_at: None,
            first_published_at: None,
            alternates: vec![],
            tag_list: vec![],
        }
    }

    fn globals_story() -> Story {
        story(
            GLOBAL_SETTINGS_SLUG,
            Block::new("GlobalSettings").with_field(
                "redirects",
                json!([{ "_uid": "r", "component": "RedirectItem", "from": "about", "to": "/about-us", "isPermanent": true }]),
            ),
        )
    }

    fn not_found(path: &str) -> ContentError {
        ContentError::Status {
            status: StatusCode::NOT_FOUND,
            path: path.to_string(),
        }
    }

    fn expect_globals(api: &mut MockContentApi) {
        api.expect_fetch_story()
            .withf(|slug, p| slug == GLOBAL_SETTINGS_SLUG && p.get("version") == Some("published") && !p.contains("language"))
            .times(1)
            .returning(|_, _| Ok(StoryResponse { story: Some(globals_story()) }));
    }

    fn resolver(api: MockContentApi) -> PageResolver {
        let repository = StoryRepository::new(Arc::new(api), RelationResolver::parse("Article.categories"), false);
        PageResolver::new(repository, LocaleSet::default())
    }

    #[tokio::test]
    async fn missing_page_with_redirect_rule_redirects_permanently() {
        let mut api = MockContentApi::new();
        expect_globals(&mut api);
        api.expect_fetch_story()
            .withf(|slug, p| {
                slug == "about"
                    && p.get("version") == Some("published")
                    && p.get("language") == Some("en")
                    && p.get("resolve_relations") == Some("Article.categories")
            })
            .times(1)
            .returning(|slug, _| Err(not_found(slug)));

        let resolution = resolver(api)
            .resolve(&PageRequest::new(vec!["about".into()], "en", false))
            .await
            .expect("resolution");

        assert!(matches!(
            resolution,
            Resolution::Redirect { ref to, permanent: true } if to == "/about-us"
        ));
    }

    #[tokio::test]
    async fn missing_page_without_rule_is_not_found() {
        let mut api = MockContentApi::new();
        expect_globals(&mut api);
        api.expect_fetch_story()
            .withf(|slug, _| slug == "nope")
            .returning(|slug, _| Err(ContentError::MissingStory(slug.to_string())));

        let resolution = resolver(api)
            .resolve(&PageRequest::new(vec!["nope".into()], "en", false))
            .await
            .expect("resolution");

        assert!(matches!(resolution, Resolution::NotFound { .. }));
    }

    #[tokio::test]
    async fn found_page_carries_globals_and_flags() {
        let mut api = MockContentApi::new();
        api.expect_fetch_story()
            .withf(|slug, p| slug == GLOBAL_SETTINGS_SLUG && p.get("version") == Some("draft") && p.contains("cv"))
            .returning(|_, _| Ok(StoryResponse { story: Some(globals_story()) }));
        api.expect_fetch_story()
            .withf(|slug, p| slug == "company/team" && p.get("language") == Some("de") && p.get("version") == Some("draft"))
            .returning(|_, _| Ok(StoryResponse { story: Some(story("de/company/team", Block::new("Page"))) }));

        let resolution = resolver(api)
            .resolve(&PageRequest::new(vec!["company".into(), "team".into()], "de", true))
            .await
            .expect("resolution");

        let Resolution::Page(page) = resolution else {
            panic!("expected a page");
        };
        assert_eq!(page.story.full_slug, "de/company/team");
        assert_eq!(page.globals.redirects.len(), 1);
        assert!(page.preview);
        assert_eq!(page.locale, "de");
    }

    #[tokio::test]
    async fn global_settings_failure_fails_the_request() {
        let mut api = MockContentApi::new();
        api.expect_fetch_story()
            .withf(|slug, _| slug == GLOBAL_SETTINGS_SLUG)
            .times(1)
            .returning(|slug, _| Err(not_found(slug)));

        let err = resolver(api)
            .resolve(&PageRequest::new(vec![], "en", false))
            .await
            .expect_err("must fail");

        assert!(matches!(err, Error::GlobalSettings(_)));
        assert_eq!(err.to_string(), "Unable to load global settings");
    }

    #[tokio::test]
    async fn empty_assets_in_global_settings_keep_the_site_up() {
        let mut api = MockContentApi::new();
        api.expect_fetch_story()
            .withf(|slug, _| slug == GLOBAL_SETTINGS_SLUG)
            .returning(|_, _| {
                let content = Block::new("GlobalSettings")
                    .with_field("logo", json!({ "filename": null, "alt": null }))
                    .with_field("illustration", json!(""))
                    .with_field(
                        "redirects",
                        json!([{ "_uid": "r", "component": "RedirectItem", "from": "about", "to": "/about-us", "isPermanent": true }]),
                    );
                Ok(StoryResponse { story: Some(story(GLOBAL_SETTINGS_SLUG, content)) })
            });
        api.expect_fetch_story()
            .withf(|slug, _| slug == "about")
            .returning(|slug, _| Err(not_found(slug)));

        let resolution = resolver(api)
            .resolve(&PageRequest::new(vec!["about".into()], "en", false))
            .await
            .expect("resolution");

        assert!(matches!(
            resolution,
            Resolution::Redirect { ref to, permanent: true } if to == "/about-us"
        ));
    }

    #[tokio::test]
    async fn other_content_errors_propagate() {
        let mut api = MockContentApi::new();
        expect_globals(&mut api);
        api.expect_fetch_story()
            .withf(|slug, _| slug == "about")
            .returning(|slug, _| {
                Err(ContentError::Status {
                    status: StatusCode::BAD_GATEWAY,
                    path: slug.to_string(),
                })
            });

        let err = resolver(api)
            .resolve(&PageRequest::new(vec!["about".into()], "en", false))
            .await
            .expect_err("must fail");

        assert!(matches!(err, Error::Content(_)));
    }

    #[tokio::test]
    async fn empty_path_fetches_home() {
        let mut api = MockContentApi::new();
        expect_globals(&mut api);
        api.expect_fetch_story()
            .withf(|slug, _| slug == HOME_SLUG)
            .times(1)
            .returning(|_, _| Ok(StoryResponse { story: Some(story("home", Block::new("Page"))) }));

        let resolution = resolver(api)
            .resolve(&PageRequest::new(vec![], "en", false))
            .await
            .expect("resolution");

        assert!(matches!(resolution, Resolution::Page(_)));
    }

    #[tokio::test]
    async fn literal_home_and_globals_are_editor_only() {
        let mut api = MockContentApi::new();
        api.expect_fetch_story()
            .withf(|slug, _| slug == GLOBAL_SETTINGS_SLUG)
            .times(2)
            .returning(|_, _| Ok(StoryResponse { story: Some(globals_story()) }));
        let resolver = resolver(api);

        let home = resolver
            .resolve(&PageRequest::new(vec!["home".into()], "en", false))
            .await
            .expect("resolution");
        assert!(matches!(home, Resolution::NotFound { .. }));

        let globals = resolver
            .resolve(&PageRequest::new(vec!["globals".into(), "settings".into()], "de", false))
            .await
            .expect("resolution");
        assert!(matches!(globals, Resolution::Redirect { ref to, permanent: false } if to == "/de"));
    }

    #[test]
    fn preview_reaches_reserved_slugs() {
        assert_eq!(slug_policy("home".into(), true), SlugPolicy::Fetch("home".into()));
        assert_eq!(slug_policy("globals/settings".into(), true), SlugPolicy::Fetch("globals/settings".into()));
        assert_eq!(slug_policy("globalsmith".into(), false), SlugPolicy::Fetch("globalsmith".into()));
    }

    #[test]
    fn request_slug_and_path() {
        let request = PageRequest::new(vec!["a".into(), "b".into()], "de", false);
        assert_eq!(request.slug(), "a/b");
        assert_eq!(request.path(), "/a/b");
        assert_eq!(PageRequest::new(vec![], "en", false).slug(), "home");
        assert_eq!(PageRequest::new(vec![], "en", false).path(), "/");
    }
}
