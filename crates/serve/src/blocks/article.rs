// crates/serve/src/blocks/article.rs

//! Article content types and article listings.
//!
//! Listings are not fetched while rendering. Before a page renders, the
//! content types its `PaginatedSection` blocks list are collected with
//! [`collect_listing_types`] and fetched by [`prefetch_listings`]; renderers
//! read the result from [`RenderContext::listings`].

use super::{image_tag, InheritedStyle, RenderContext, SectionStyle};
use crate::content::repository::FULL_LISTING_PAGE_SIZE;
use crate::content::{self, FindStories, StoryRepository};
use crate::pagination::{generate_pagination_items, page_count, page_slice, PaginationItem};
use crate::render::html::Element;
use crate::richtext::flatten;
use chrono::NaiveDate;
use domain::asset::Asset;
use domain::content::{Block, Relation, Story};
use domain::richtext::RichText;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Prefetched stories per content type, newest first.
pub type Listings = HashMap<String, Vec<Story>>;

const LISTING_SORT: &str = "content.date:desc";
const ITEMS_PER_PAGE: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Prefetch
// ─────────────────────────────────────────────────────────────────────────────

/// Content types listed by `PaginatedSection` blocks anywhere below `root`.
pub fn collect_listing_types(root: &Block) -> BTreeSet<String> {
    fn walk(value: &Json, types: &mut BTreeSet<String>) {
        match value {
            Json::Object(map) => {
                if map.get("component").and_then(Json::as_str) == Some("PaginatedSection") {
                    if let Some(ct) = map.get("contentType").and_then(Json::as_str).filter(|c| !c.is_empty()) {
                        types.insert(ct.to_string());
                    }
                }
                map.values().for_each(|v| walk(v, types));
            }
            Json::Array(items) => items.iter().for_each(|v| walk(v, types)),
            _ => {}
        }
    }

    let mut types = BTreeSet::new();
    if root.component == "PaginatedSection" {
        if let Some(ct) = root.str_field("contentType").filter(|c| !c.is_empty()) {
            types.insert(ct.to_string());
        }
    }
    root.fields.values().for_each(|v| walk(v, &mut types));
    types
}

/// Every story of each listed content type, fetched concurrently.
#[tracing::instrument(skip_all, fields(locale = %locale, count = types.len()))]
pub async fn prefetch_listings(
    repository: &StoryRepository,
    types: &BTreeSet<String>,
    locale: &str,
    preview: bool,
) -> content::Result<Listings> {
    let fetches = types.iter().map(|content_type| async move {
        let args = FindStories {
            content_type: Some(content_type.clone()),
            sort_by: Some(LISTING_SORT.to_string()),
            per_page: Some(FULL_LISTING_PAGE_SIZE),
            locale: Some(locale.to_string()),
            preview,
            resolve_relations: repository.relations().param(),
            ..Default::default()
        };
        let stories = repository.fetch_all_pages(args).await?;
        debug!(%content_type, count = stories.len(), "prefetched listing");
        Ok::<_, content::ContentError>((content_type.clone(), stories))
    });

    Ok(try_join_all(fetches).await?.into_iter().collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Article and Category
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArticleProps {
    title: Option<String>,
    intro: RichText,
    image: Option<Asset>,
    date: Option<String>,
    categories: Vec<Relation>,
    author: Option<Relation>,
    content: RichText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthorProps {
    name: Option<String>,
    image: Option<Asset>,
}

fn first_category_name(categories: &[Relation]) -> Option<String> {
    let story = categories.first()?.story()?;
    story
        .content
        .str_field("name")
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// `(machine date, display date)` for a CMS date such as `2024-05-01 09:30`.
fn format_date(raw: &str, locale: &str) -> Option<(String, String)> {
    let date = NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?;
    let display = match locale {
        "de" => date.format("%-d.%-m.%Y").to_string(),
        _ => date.format("%b %-d, %Y").to_string(),
    };
    Some((date.format("%Y-%m-%d").to_string(), display))
}

pub fn article(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: ArticleProps = block.props()?;

    let mut meta = String::new();
    if let Some(category) = first_category_name(&props.categories) {
        meta.push_str(&Element::new("span").class("badge").text(&category));
    }
    if let Some((machine, display)) = props.date.as_deref().and_then(|d| format_date(d, ctx.locale)) {
        meta.push_str(
            &Element::new("time")
                .class("text-sm")
                .attr("datetime", machine)
                .text(&ctx.t.t_with("article.publishedOn", &[("date", display.as_str())])),
        );
    }

    let mut hero = Element::new("div").class("article-meta flex items-center gap-3").wrap(&meta);
    hero.push_str(
        &Element::new("h1")
            .class("heading-lg")
            .text(props.title.as_deref().unwrap_or_default()),
    );
    if !props.intro.is_empty() {
        hero.push_str(&Element::new("div").class("article-intro prose prose-lg").wrap(&ctx.richtext.render(&props.intro)));
    }
    if let Some(author) = props.author.as_ref().and_then(Relation::story) {
        let author: AuthorProps = author.content.props()?;
        if let Some(name) = author.name.as_deref().filter(|n| !n.is_empty()) {
            let avatar = image_tag(author.image.as_ref(), "avatar rounded-full");
            let byline = Element::new("span").text(&ctx.t.t_with("article.by", &[("author", name)]));
            hero.push_str(&Element::new("div").class("article-author flex items-center gap-3").wrap(&format!("{avatar}{byline}")));
        }
    }

    let image = image_tag(props.image.as_ref(), "article-image object-cover");
    let header = Element::new("section")
        .class("article-hero relative")
        .wrap(&format!("{image}{}", Element::new("div").class("container").wrap(&hero)));

    let body = if props.content.is_empty() {
        String::new()
    } else {
        Element::new("div")
            .class("prose prose-lg mx-auto max-w-3xl")
            .wrap(&ctx.richtext.render(&props.content))
    };
    let body = Element::new("section")
        .class("article-body")
        .wrap(&Element::new("div").class("container").wrap(&body));

    Ok(ctx.root(block, "article").class("article").wrap(&format!("{header}{body}")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategoryProps {
    name: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "super::lenient_blocks")]
    body: Vec<Block>,
}

pub fn category(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: CategoryProps = block.props()?;

    let mut header = String::new();
    if let Some(name) = props.name.as_deref().filter(|n| !n.is_empty()) {
        header.push_str(&Element::new("h1").class("heading-lg").text(name));
    }
    if let Some(description) = props.description.as_deref().filter(|d| !d.is_empty()) {
        header.push_str(&Element::new("p").class("text-lg").text(description));
    }

    let mut inner = Element::new("div").class("container py-12").wrap(&header);
    inner.push_str(&ctx.render_all(&props.body, &InheritedStyle::none()));
    Ok(ctx.root(block, "div").class("category").wrap(&inner))
}

// ─────────────────────────────────────────────────────────────────────────────
// Featured article and listings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FeaturedArticleProps {
    featured_article: Option<Relation>,
    #[serde(flatten)]
    section: SectionStyle,
}

/// Highlighted article. A relation that was not resolved to a story renders
/// nothing.
pub fn featured_article(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: FeaturedArticleProps = block.props()?;
    let Some(story) = props.featured_article.as_ref().and_then(Relation::story) else {
        warn!(uid = %block.uid, "featured article relation is not resolved, check the relation list");
        return Ok(String::new());
    };
    let article: ArticleProps = story.content.props()?;

    let mut text = String::new();
    if let Some(category) = first_category_name(&article.categories) {
        text.push_str(&Element::new("span").class("badge mb-6").text(&category));
    }
    text.push_str(
        &Element::new("h2")
            .class("heading-md mb-6")
            .text(article.title.as_deref().unwrap_or(&story.name)),
    );
    let intro = flatten(&article.intro);
    if !intro.is_empty() {
        text.push_str(&Element::new("p").class("text-body mb-8").text(&intro));
    }
    text.push_str(&read_more(ctx, story));

    let inner = format!(
        "{}{}",
        Element::new("div")
            .class("featured-image lg:w-1/2")
            .wrap(&image_tag(article.image.as_ref(), "object-cover")),
        Element::new("div").class("featured-text lg:w-1/2").wrap(&text),
    );

    Ok(props.section.section(ctx, block, "featured-article").wrap(
        &Element::new("div")
            .class("container")
            .wrap(&Element::new("div").class("flex flex-col lg:flex-row gap-8").wrap(&inner)),
    ))
}

fn read_more(ctx: &RenderContext<'_>, story: &Story) -> String {
    Element::new("a")
        .class("read-more")
        .attr("href", ctx.story_href(&story.full_slug))
        .text(ctx.t.t("article.readMore"))
}

fn article_card(ctx: &RenderContext<'_>, story: &Story, only_item: bool) -> String {
    let article: ArticleProps = story.content.props().unwrap_or_else(|e| {
        warn!(slug = %story.full_slug, "listing entry unreadable: {e}");
        ArticleProps::default()
    });

    let mut media = image_tag(article.image.as_ref(), "object-cover");
    if let Some(category) = first_category_name(&article.categories) {
        media.push_str(&Element::new("span").class("badge absolute top-4 right-4").text(&category));
    }

    let mut body = Element::new("h3")
        .class("heading-sm mb-8")
        .text(article.title.as_deref().unwrap_or(&story.name));
    let intro = flatten(&article.intro);
    if !intro.is_empty() {
        body.push_str(&Element::new("p").class("text-body line-clamp-3").text(&intro));
    }
    body.push_str(&read_more(ctx, story));

    Element::new("article")
        .class("article-card flex flex-col")
        .class_opt(only_item.then_some("lg:flex-row"))
        .wrap(&format!(
            "{}{}",
            Element::new("div").class("article-card-media relative h-64").wrap(&media),
            Element::new("div").class("article-card-body").wrap(&body),
        ))
}

fn pagination_bar(ctx: &RenderContext<'_>, current: usize, total_pages: usize) -> String {
    if total_pages <= 1 {
        return String::new();
    }
    let page_link = |page: usize| format!("?page={page}");

    let mut items = String::new();
    let previous = Element::new("a").class("pagination-previous");
    items.push_str(&if current == 0 {
        previous.attr("aria-disabled", "true").text(ctx.t.t("pagination.previous"))
    } else {
        previous.attr("href", page_link(current - 1)).text(ctx.t.t("pagination.previous"))
    });

    for item in generate_pagination_items(current, total_pages) {
        items.push_str(&match item {
            PaginationItem::Page { page } if page == current => Element::new("a")
                .class("pagination-page active")
                .attr("href", page_link(page))
                .attr("aria-current", "page")
                .text(&(page + 1).to_string()),
            PaginationItem::Page { page } => Element::new("a")
                .class("pagination-page")
                .attr("href", page_link(page))
                .text(&(page + 1).to_string()),
            PaginationItem::Divider => Element::new("span").class("pagination-divider").text("…"),
        });
    }

    let next = Element::new("a").class("pagination-next");
    items.push_str(&if current + 1 >= total_pages {
        next.attr("aria-disabled", "true").text(ctx.t.t("pagination.next"))
    } else {
        next.attr("href", page_link(current + 1)).text(ctx.t.t("pagination.next"))
    });

    Element::new("nav").class("pagination flex gap-2").wrap(&items)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PaginatedSectionProps {
    content_type: Option<String>,
    title: Option<String>,
    description: RichText,
    #[serde(flatten)]
    section: SectionStyle,
}

pub fn paginated_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: PaginatedSectionProps = block.props()?;

    let stories: &[Story] = props
        .content_type
        .as_deref()
        .and_then(|ct| ctx.listings.get(ct))
        .map(Vec::as_slice)
        .unwrap_or_default();

    let total_pages = page_count(stories.len(), ITEMS_PER_PAGE);
    let current = ctx.page.min(total_pages - 1);
    let visible = page_slice(stories, current, ITEMS_PER_PAGE);

    let mut header = String::new();
    if let Some(title) = props.title.as_deref().filter(|t| !t.is_empty()) {
        header.push_str(&Element::new("h2").class("heading-md mb-4").text(title));
    }
    if !props.description.is_empty() {
        header.push_str(&Element::new("div").class("max-w-3xl").wrap(&ctx.richtext.render(&props.description)));
    }

    let list = if visible.is_empty() {
        Element::new("p").class("text-body").text(ctx.t.t("pagination.empty"))
    } else {
        let only_item = visible.len() == 1;
        let cards: String = visible.iter().map(|s| article_card(ctx, s, only_item)).collect();
        Element::new("div")
            .class(if only_item {
                "grid grid-cols-1"
            } else {
                "grid grid-cols-1 gap-8 md:grid-cols-2 lg:grid-cols-3"
            })
            .wrap(&cards)
    };

    let inner = format!(
        "{}{list}{}",
        Element::new("div").class("mb-12").wrap(&header),
        pagination_bar(ctx, current, total_pages),
    );
    Ok(props
        .section
        .section(ctx, block, "paginated-section")
        .wrap(&Element::new("div").class("container").wrap(&inner)))
}
