// crates/serve/src/blocks/mod.rs

//! Block registry and renderers.
//!
//! A block's `component` names its renderer. The registry is a plain table
//! built once per process; container blocks render their children through
//! the same table via [`RenderContext::render`], passing style explicitly
//! in an [`InheritedStyle`].

pub mod article;
pub mod cards;
pub mod content;
pub mod hero;
pub mod layout;

pub use article::{collect_listing_types, prefetch_listings, Listings};

use crate::i18n::Translator;
use crate::render::html::{editable_attrs, Element};
use crate::richtext::RichTextRenderer;
use domain::asset::Asset;
use domain::content::Block;
use domain::link::{link_to_href, Multilink};
use domain::locale::LocaleSet;
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

// ─────────────────────────────────────────────────────────────────────────────
// Renderer contract
// ─────────────────────────────────────────────────────────────────────────────

pub trait BlockRenderer: Send + Sync {
    fn render(
        &self,
        block: &Block,
        ctx: &RenderContext<'_>,
        style: &InheritedStyle,
    ) -> domain::Result<String>;
}

impl<F> BlockRenderer for F
where
    F: Fn(&Block, &RenderContext<'_>, &InheritedStyle) -> domain::Result<String> + Send + Sync,
{
    fn render(
        &self,
        block: &Block,
        ctx: &RenderContext<'_>,
        style: &InheritedStyle,
    ) -> domain::Result<String> {
        self(block, ctx, style)
    }
}

/// Style a container hands down to the blocks it renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InheritedStyle {
    pub background_color: Option<String>,
    pub background_opacity: Option<f64>,
    pub width: Option<String>,
}

impl InheritedStyle {
    pub fn none() -> Self {
        Self::default()
    }

    /// Classes for a card root carrying this style.
    pub fn card_classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        if let Some(color) = &self.background_color {
            classes.push(format!("bg-{color}"));
        }
        if let Some(opacity) = self.background_opacity {
            classes.push(format!("bg-opacity-{}", (opacity.clamp(0.0, 1.0) * 100.0).round()));
        }
        classes.push(match self.width.as_deref() {
            Some("stretchToFill") => "w-full".to_string(),
            _ => "w-auto".to_string(),
        });
        classes
    }
}

/// Everything a renderer may consult besides its own block.
pub struct RenderContext<'a> {
    pub registry: &'a BlockRegistry,
    pub richtext: &'a RichTextRenderer,
    pub t: Translator<'a>,
    pub locales: &'a LocaleSet,
    pub locale: &'a str,
    pub preview: bool,
    pub space_id: &'a str,
    pub listings: &'a Listings,
    /// 0-based page selected for paginated listings.
    pub page: usize,
}

impl RenderContext<'_> {
    pub fn render(&self, block: &Block, style: &InheritedStyle) -> String {
        self.registry.render(block, self, style)
    }

    pub fn render_all(&self, blocks: &[Block], style: &InheritedStyle) -> String {
        blocks.iter().map(|b| self.render(b, style)).collect()
    }

    /// Root element of a block; carries click-to-edit attributes in preview.
    pub fn root(&self, block: &Block, tag: &str) -> Element {
        let root = Element::new(tag);
        match (&block.editable, self.preview) {
            (Some(editable), true) => root.attrs(editable_attrs(editable, self.space_id)),
            _ => root,
        }
    }

    /// Href of a link, with internal paths prefixed for non-default locales.
    pub fn href(&self, link: Option<&Multilink>) -> String {
        self.locales.localize_href(self.locale, &link_to_href(link))
    }

    /// Path of a story in the current locale. A locale already leading
    /// `full_slug` is replaced, not repeated.
    pub fn story_href(&self, full_slug: &str) -> String {
        self.locales.localize_href(self.locale, &format!("/{}", full_slug.trim_start_matches('/')))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of looking up a component name.
pub enum Dispatch<'r> {
    Renderer(&'r dyn BlockRenderer),
    Unknown,
}

#[derive(Clone, Default)]
pub struct BlockRegistry {
    renderers: HashMap<String, Arc<dyn BlockRenderer>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every block the site knows.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register("Page", layout::page)
            .register("Grid", layout::grid)
            .register("GridSection", layout::grid_section)
            .register("SplitSection", layout::split_section)
            .register("LogosSection", layout::logos_section)
            .register("HeroSection", hero::hero_section)
            .register("HeroSplitSection", hero::hero_split_section)
            .register("HeroNarrowSection", hero::hero_narrow_section)
            .register("CtaLink", hero::cta_link)
            .register("CtaSection", hero::cta_section)
            .register("Link", hero::link)
            .register("Feature", content::feature)
            .register("Teaser", content::teaser)
            .register("TitleAndText", content::title_and_text)
            .register("RichTextContent", content::rich_text_content)
            .register("Image", content::image)
            .register("FaqSection", content::faq_section)
            .register("IconAndTextCard", cards::icon_and_text_card)
            .register("ImageAndTextCard", cards::image_and_text_card)
            .register("ImageCardLink", cards::image_card_link)
            .register("Article", article::article)
            .register("Category", article::category)
            .register("FeaturedArticle", article::featured_article)
            .register("PaginatedSection", article::paginated_section);
        registry
    }

    pub fn register<R>(&mut self, component: &str, renderer: R) -> &mut Self
    where
        R: BlockRenderer + 'static,
    {
        self.renderers.insert(component.to_string(), Arc::new(renderer));
        self
    }

    pub fn dispatch(&self, component: &str) -> Dispatch<'_> {
        match self.renderers.get(component) {
            Some(renderer) => Dispatch::Renderer(renderer.as_ref()),
            None => Dispatch::Unknown,
        }
    }

    pub fn contains(&self, component: &str) -> bool {
        self.renderers.contains_key(component)
    }

    /// Render one block. Unknown components and unreadable props are
    /// skipped with a warning; in preview an unknown component shows a
    /// placeholder so editors can spot it.
    pub fn render(&self, block: &Block, ctx: &RenderContext<'_>, style: &InheritedStyle) -> String {
        match self.dispatch(&block.component) {
            Dispatch::Renderer(renderer) => match renderer.render(block, ctx, style) {
                Ok(html) => html,
                Err(e) => {
                    warn!(component = %block.component, uid = %block.uid, "skipping block: {e}");
                    String::new()
                }
            },
            Dispatch::Unknown => {
                warn!(component = %block.component, uid = %block.uid, "no renderer registered for block");
                if ctx.preview {
                    ctx.root(block, "div")
                        .class("unknown-block")
                        .text(&ctx.t.t_with("block.unknown", &[("component", block.component.as_str())]))
                } else {
                    String::new()
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared pieces
// ─────────────────────────────────────────────────────────────────────────────

/// Section background and vertical spacing, common to most section blocks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionStyle {
    pub background_color: Option<String>,
    pub spacing_top: Option<String>,
    pub spacing_bottom: Option<String>,
}

impl SectionStyle {
    pub fn section(&self, ctx: &RenderContext<'_>, block: &Block, class: &str) -> Element {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
        ctx.root(block, "section")
            .class("section")
            .class(class)
            .class_opt(non_empty(&self.background_color).map(|c| format!("bg-{c}")))
            .class_opt(non_empty(&self.spacing_top).map(|s| format!("pt-{s}")))
            .class_opt(non_empty(&self.spacing_bottom).map(|s| format!("pb-{s}")))
    }
}

/// `<img>` for an asset; empty for an unset asset. Width and height come
/// from the asset path when it encodes them.
pub fn image_tag(asset: Option<&Asset>, class: &str) -> String {
    let Some(asset) = asset.filter(|a| !a.is_empty()) else {
        return String::new();
    };

    let (width, height) = match asset.dimensions() {
        Some((w, h)) => (Some(w.to_string()), Some(h.to_string())),
        None => (None, None),
    };

    Element::new("img")
        .class(class)
        .attr("src", asset.filename.as_str())
        .attr("alt", asset.alt_text())
        .attr_opt("width", width)
        .attr_opt("height", height)
        .attr("loading", "lazy")
        .void()
}

/// Nested block arrays; entries that are not blocks are dropped.
pub(crate) fn lenient_blocks<'de, D>(deserializer: D) -> Result<Vec<Block>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Json::deserialize(deserializer)? {
        Json::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Accepts numbers sent either as JSON numbers or as strings.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Json::deserialize(deserializer)? {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::i18n::Messages;
    use std::sync::LazyLock;

    pub static MESSAGES: LazyLock<Messages> =
        LazyLock::new(|| Messages::builtin(&LocaleSet::default()).expect("messages"));
    pub static LOCALES: LazyLock<LocaleSet> = LazyLock::new(LocaleSet::default);
    pub static RICHTEXT: LazyLock<RichTextRenderer> = LazyLock::new(RichTextRenderer::default);
    pub static REGISTRY: LazyLock<BlockRegistry> = LazyLock::new(BlockRegistry::standard);
    pub static NO_LISTINGS: LazyLock<Listings> = LazyLock::new(Listings::new);

    pub fn ctx(locale: &'static str, preview: bool) -> RenderContext<'static> {
        with_listings(locale, preview, &NO_LISTINGS, 0)
    }

    pub fn with_listings(
        locale: &'static str,
        preview: bool,
        listings: &'static Listings,
        page: usize,
    ) -> RenderContext<'static> {
        RenderContext {
            registry: &REGISTRY,
            richtext: &RICHTEXT,
            t: MESSAGES.for_locale(locale),
            locales: &LOCALES,
            locale,
            preview,
            space_id: "42",
            listings,
            page,
        }
    }

    pub fn doc(text: &str) -> Json {
        serde_json::json!({
            "type": "doc",
            "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": text }] }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ctx;
    use super::*;
    use serde_json::json;

    #[test]
    fn standard_registry_knows_every_site_block() {
        let registry = BlockRegistry::standard();
        for name in [
            "Page", "Article", "Category", "Grid", "GridSection", "SplitSection", "HeroSection",
            "HeroSplitSection", "HeroNarrowSection", "CtaLink", "CtaSection", "FaqSection",
            "Feature", "Teaser", "TitleAndText", "RichTextContent", "Image", "IconAndTextCard",
            "ImageAndTextCard", "ImageCardLink", "LogosSection", "FeaturedArticle",
            "PaginatedSection",
        ] {
            assert!(registry.contains(name), "{name} not registered");
        }
        assert!(matches!(registry.dispatch("Carousel"), Dispatch::Unknown));
    }

    #[test]
    fn unknown_block_is_skipped_outside_preview() {
        let block = Block::new("Carousel").with_uid("c1");
        assert_eq!(ctx("en", false).render(&block, &InheritedStyle::none()), "");
    }

    #[test]
    fn unknown_block_shows_placeholder_in_preview() {
        let block = Block::new("Carousel").with_uid("c1");
        let html = ctx("en", true).render(&block, &InheritedStyle::none());
        assert!(html.contains("The component Carousel has not been created yet."));
    }

    #[test]
    fn custom_renderers_can_be_registered() {
        let mut registry = BlockRegistry::new();
        registry.register("Banner", |block: &Block, _: &RenderContext<'_>, _: &InheritedStyle| -> domain::Result<String> {
            Ok(format!("<b>{}</b>", block.str_field("text").unwrap_or_default()))
        });

        let base = ctx("en", false);
        let custom = RenderContext {
            registry: &registry,
            ..base
        };
        let block = Block::new("Banner").with_field("text", json!("hi"));
        assert_eq!(custom.render(&block, &InheritedStyle::none()), "<b>hi</b>");
    }

    #[test]
    fn editable_attributes_only_in_preview() {
        let mut block = Block::new("Teaser").with_uid("abc");
        block.editable = Some(r#"<!--#storyblok#{"id":"7","uid":"abc","space":"42"}-->"#.into());

        assert!(ctx("en", true).root(&block, "div").void().contains(r#"data-blok-uid="7-abc""#));
        assert_eq!(ctx("en", false).root(&block, "div").void(), "<div>");
    }

    #[test]
    fn internal_links_are_localized() {
        let link = Multilink::story("about");
        assert_eq!(ctx("en", false).href(Some(&link)), "/about");
        assert_eq!(ctx("de", false).href(Some(&link)), "/de/about");
        assert_eq!(ctx("de", false).href(Some(&Multilink::url("https://x.io"))), "https://x.io");
        assert_eq!(ctx("de", false).href(None), "");
        assert_eq!(ctx("de", false).story_href("de/blog/post"), "/de/blog/post");
        assert_eq!(ctx("en", false).story_href("de/blog/post"), "/blog/post");
    }

    #[test]
    fn inherited_style_classes() {
        let style = InheritedStyle {
            background_color: Some("white".into()),
            background_opacity: Some(0.5),
            width: Some("stretchToFill".into()),
        };
        assert_eq!(style.card_classes(), vec!["bg-white", "bg-opacity-50", "w-full"]);
        assert_eq!(InheritedStyle::none().card_classes(), vec!["w-auto"]);
    }

    #[test]
    fn image_tag_reads_dimensions() {
        let asset = Asset {
            filename: "https://a.storyblok.com/f/1/800x600/x/pic.jpg".into(),
            alt: Some("Pic".into()),
            ..Default::default()
        };
        let html = image_tag(Some(&asset), "rounded");
        assert!(html.contains(r#"width="800" height="600""#));
        assert!(html.contains(r#"alt="Pic""#));
        assert_eq!(image_tag(None, "x"), "");
    }
}
