// crates/serve/src/meta.rs

//! SEO metadata derived from a resolved story and the global settings.

use crate::richtext::flatten;
use domain::content::{GlobalSettings, Story};
use domain::setting::SiteSettings;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Characters `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const ROBOTS_INDEX: &str = "index, follow";
pub const ROBOTS_NOINDEX: &str = "noindex";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub robots: String,
    pub canonical: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenGraph {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub site: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Open Graph image for a page.
///
/// An explicit image wins. Otherwise the image is generated on the fly by
/// `api/og` from the title and illustration, or by `api/default-og` when the
/// page has no title.
pub fn og_image_url(
    base_url: &str,
    title: Option<&str>,
    image: Option<&str>,
    illustration: Option<&str>,
) -> String {
    if let Some(image) = image.filter(|i| !i.is_empty()) {
        return image.to_string();
    }

    let illustration = encode_uri_component(illustration.unwrap_or_default());
    match title.filter(|t| !t.is_empty()) {
        Some(title) => format!(
            "{base_url}/api/og?title={}&imageUrl={illustration}",
            encode_uri_component(title)
        ),
        None => format!("{base_url}/api/default-og?imageUrl={illustration}"),
    }
}

/// Builds [`Metadata`]; a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    base_url: String,
    site_name: String,
    brand: String,
    default_title: String,
    default_description: String,
    twitter_handle: String,
}

impl MetadataBuilder {
    pub fn new(site: &SiteSettings) -> Self {
        Self {
            base_url: site.base_url.trim_end_matches('/').to_string(),
            site_name: site.site_name.clone(),
            brand: site.brand.clone(),
            default_title: site.default_title.clone(),
            default_description: site.default_description.clone(),
            twitter_handle: site.twitter_handle.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `pathname` is the public path of the page (`""` for home, `/de/about`).
    pub fn build(&self, story: &Story, globals: &GlobalSettings, pathname: &str) -> Metadata {
        let fields = story.page_fields();
        let content_title = fields.title.as_deref().filter(|t| !t.is_empty());

        let mut title = content_title.unwrap_or(&self.default_title).to_string();
        if story.component() == "Category" {
            let name = fields
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(&story.name);
            title = format!("Latest {name} posts");
        }
        if !title.contains(&self.brand) {
            title = format!("{title} - {}", self.brand);
        }

        let intro = fields
            .intro
            .as_ref()
            .filter(|_| matches!(story.component(), "Post" | "Article"))
            .filter(|intro| intro.has_lead_text());
        let description = match (fields.description.as_deref().filter(|d| !d.is_empty()), intro) {
            (Some(description), _) => description.to_string(),
            (None, Some(intro)) => flatten(intro),
            (None, None) => self.default_description.clone(),
        };

        let illustration = fields
            .illustration
            .as_ref()
            .and_then(|a| a.url())
            .or_else(|| globals.illustration.as_ref().and_then(|a| a.url()));
        let image = og_image_url(
            &self.base_url,
            content_title,
            fields.og_image.as_ref().and_then(|a| a.url()),
            illustration,
        );

        let robots = if fields.non_indexable {
            ROBOTS_NOINDEX
        } else {
            ROBOTS_INDEX
        };
        let canonical = format!("{}{}", self.base_url, pathname);

        Metadata {
            title: title.clone(),
            description: description.clone(),
            robots: robots.to_string(),
            canonical: canonical.clone(),
            open_graph: OpenGraph {
                kind: "article".to_string(),
                title: title.clone(),
                description: description.clone(),
                url: canonical,
                site_name: self.site_name.clone(),
                image: image.clone(),
            },
            twitter: TwitterCard {
                card: "summary_large_image".to_string(),
                site: self.twitter_handle.clone(),
                title,
                description,
                image,
            },
        }
    }

    /// Metadata for pages without a story (not-found).
    pub fn fallback(&self, title: &str, pathname: &str) -> Metadata {
        let title = if title.contains(&self.brand) {
            title.to_string()
        } else {
            format!("{title} - {}", self.brand)
        };
        let canonical = format!("{}{}", self.base_url, pathname);
        let image = og_image_url(&self.base_url, None, None, None);

        Metadata {
            title: title.clone(),
            description: self.default_description.clone(),
            robots: ROBOTS_NOINDEX.to_string(),
            canonical: canonical.clone(),
            open_graph: OpenGraph {
                kind: "website".to_string(),
                title: title.clone(),
                description: self.default_description.clone(),
                url: canonical,
                site_name: self.site_name.clone(),
                image: image.clone(),
            },
            twitter: TwitterCard {
                card: "summary_large_image".to_string(),
                site: self.twitter_handle.clone(),
                title,
                description: self.default_description.clone(),
                image,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::asset::Asset;
    use domain::content::Block;
    use serde_json::json;

    const IMAGE: &str =
        "https://post.medicalnewstoday.com/wp-content/uploads/sites/3/2020/02/290814_2200-732x549.jpg";

    fn builder() -> MetadataBuilder {
        let site = SiteSettings {
            base_url: "https://makersden.io/".into(),
            ..Default::default()
        };
        MetadataBuilder::new(&site)
    }

    fn story(content: Block) -> Story {
        Story {
            id: 1,
            uuid: "u".into(),
            name: "Story name".into(),
            slug: "about".into(),
            full_slug: "about".into(),
            content,
            is_startpage: false,
            lang: "default".into(),
            published_at: None,
            first_published_at: None,
            alternates: vec![],
            tag_list: vec![],
        }
    }

    #[test]
    fn og_image_defaults_without_title() {
        let url = og_image_url("https://x.io", None, None, Some(IMAGE));
        assert!(url.contains("default-og"));
    }

    #[test]
    fn og_image_prefers_explicit_image() {
        let url = og_image_url("https://x.io", Some("Mobile Application Development"), Some(IMAGE), None);
        assert_eq!(url, IMAGE);
    }

    #[test]
    fn og_image_generated_from_title_and_illustration() {
        let url = og_image_url("https://x.io", Some("Mobile Application Development"), None, Some(IMAGE));
        assert!(url.contains("og?title=Mobile%20Application%20Development"));
        assert!(url.contains("imageUrl=https%3A%2F%2Fpost.medicalnewstoday.com"));
        assert_eq!(encode_uri_component("a(b)!'*~"), "a(b)!'*~");
    }

    #[test]
    fn title_falls_back_and_gets_brand() {
        let meta = builder().build(&story(Block::new("Page")), &GlobalSettings::default(), "/about");

        assert_eq!(meta.title, "Makers' Den - Your ReactJS Agency for Web & Apps in Berlin.");
        assert_eq!(meta.canonical, "https://makersden.io/about");
        assert_eq!(meta.robots, ROBOTS_INDEX);
        assert!(meta.open_graph.image.contains("/api/default-og?imageUrl="));
    }

    #[test]
    fn category_title_is_synthesized() {
        let content = Block::new("Category").with_field("name", json!("React"));
        let meta = builder().build(&story(content), &GlobalSettings::default(), "/categories/react");

        assert_eq!(meta.title, "Latest React posts - Makers' Den");
    }

    #[test]
    fn article_intro_becomes_description_and_noindex_wins() {
        let content = Block::new("Article")
            .with_field("title", json!("Hooks in depth"))
            .with_field("nonIndexable", json!(true))
            .with_field(
                "intro",
                json!({ "type": "doc", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "Why hooks matter." }] }] }),
            );
        let meta = builder().build(&story(content), &GlobalSettings::default(), "/blog/hooks");

        assert_eq!(meta.title, "Hooks in depth - Makers' Den");
        assert_eq!(meta.description, "Why hooks matter.");
        assert_eq!(meta.robots, ROBOTS_NOINDEX);
        assert_eq!(meta.twitter.card, "summary_large_image");
        assert_eq!(meta.open_graph.kind, "article");
    }

    #[test]
    fn noindex_holds_when_the_og_image_is_unset() {
        let content = Block::new("Article")
            .with_field("title", json!("Hooks in depth"))
            .with_field("nonIndexable", json!(true))
            .with_field("ogImage", json!({ "id": null, "filename": null, "alt": null }))
            .with_field("illustration", json!(""));
        let meta = builder().build(&story(content), &GlobalSettings::default(), "/blog/hooks");

        assert_eq!(meta.robots, ROBOTS_NOINDEX);
        assert_eq!(meta.title, "Hooks in depth - Makers' Den");
        assert!(meta.open_graph.image.starts_with("https://makersden.io/api/og?title=Hooks%20in%20depth"));
    }

    #[test]
    fn explicit_description_wins_and_global_illustration_is_used() {
        let content = Block::new("Page")
            .with_field("title", json!("Services"))
            .with_field("description", json!("What we do"));
        let globals = GlobalSettings {
            illustration: Some(Asset {
                filename: IMAGE.into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let meta = builder().build(&story(content), &globals, "/services");

        assert_eq!(meta.description, "What we do");
        assert!(meta.open_graph.image.starts_with("https://makersden.io/api/og?title=Services&imageUrl=https%3A"));
    }

    #[test]
    fn building_twice_is_identical() {
        let content = Block::new("Page").with_field("title", json!("Same"));
        let s = story(content);
        let globals = GlobalSettings::default();

        assert_eq!(builder().build(&s, &globals, "/same"), builder().build(&s, &globals, "/same"));
    }
}
