// crates/serve/src/sitemap.rs

//! Sitemap, robots.txt, and the pre-render list.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01T00:00:00.000Z</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::content::repository::{ALL_PAGE_TYPES, FULL_LISTING_PAGE_SIZE};
use crate::content::{FindStories, StoryRepository};
use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::content::Story;
use domain::locale::LocaleSet;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::{info, warn};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const HOME_SLUG: &str = "home";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
}

/// Sitemap entries for `stories`.
///
/// Stories flagged `nonIndexable` and stories whose last slug segment is in
/// `excluded` are left out; duplicates collapse to their first occurrence.
/// The site root is always listed last.
pub fn sitemap_entries(
    stories: &[Story],
    base_url: &str,
    excluded: &[String],
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let mut seen = HashSet::new();
    let mut entries: Vec<SitemapEntry> = stories
        .iter()
        .filter(|story| {
            let slug = story.full_slug.trim_end_matches('/');
            let last = slug.rsplit('/').next().unwrap_or_default();
            !excluded.iter().any(|e| e == last)
        })
        .filter(|story| !story.content.bool_field("nonIndexable"))
        .map(|story| SitemapEntry {
            url: format!("{base_url}/{}", story.full_slug.trim_end_matches('/')),
            last_modified: story.published_at.unwrap_or(now),
        })
        .filter(|entry| seen.insert(entry.url.clone()))
        .collect();

    entries.push(SitemapEntry {
        url: format!("{base_url}/"),
        last_modified: now,
    });
    entries
}

/// Fetch every page across `locales` and build the sitemap entries.
#[tracing::instrument(skip_all)]
pub async fn collect_entries(
    repository: &StoryRepository,
    locales: &LocaleSet,
    base_url: &str,
    excluded: &[String],
) -> Result<Vec<SitemapEntry>> {
    let stories = repository.find_all_pages(locales.locales()).await?;
    let entries = sitemap_entries(&stories, base_url, excluded, Utc::now());
    info!(stories = stories.len(), entries = entries.len(), "sitemap collected");
    Ok(entries)
}

pub fn to_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(128 + entries.len() * 96);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&entry.url));
        xml.push_str("</loc>\n    <lastmod>");
        xml.push_str(&entry.last_modified.to_rfc3339_opts(SecondsFormat::Millis, true));
        xml.push_str("</lastmod>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

pub fn robots_txt(base_url: &str) -> String {
    format!("User-agent: *\nAllow: /\n\nSitemap: {base_url}/sitemap.xml\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Pre-render list
// ─────────────────────────────────────────────────────────────────────────────

/// One path to pre-render. `home` maps to the empty slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticParam {
    pub slug: Vec<String>,
    pub locale: String,
}

/// Every page slug crossed with every locale, from a single listing page.
///
/// The listing is bounded by [`FULL_LISTING_PAGE_SIZE`]; a store holding more
/// pages than that is reported, not paged through.
#[tracing::instrument(skip_all)]
pub async fn static_params(repository: &StoryRepository, locales: &LocaleSet) -> Result<Vec<StaticParam>> {
    let listing = repository
        .find_stories(&FindStories {
            content_type: ALL_PAGE_TYPES.first().map(|t| t.to_string()),
            per_page: Some(FULL_LISTING_PAGE_SIZE),
            ..Default::default()
        })
        .await?;

    if listing.total > listing.stories.len() as u64 {
        warn!(
            total = listing.total,
            fetched = listing.stories.len(),
            "page listing exceeds one page, static params are truncated"
        );
    }

    let mut params = Vec::with_capacity(listing.stories.len() * locales.locales().len());
    for story in &listing.stories {
        let slug: Vec<String> = story
            .full_slug
            .trim_end_matches('/')
            .split('/')
            .map(str::to_string)
            .collect();
        let slug = if slug == [HOME_SLUG] { Vec::new() } else { slug };

        params.extend(locales.locales().iter().map(|locale| StaticParam {
            slug: slug.clone(),
            locale: locale.clone(),
        }));
    }

    Ok(params)
}
