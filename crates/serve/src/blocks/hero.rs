// crates/serve/src/blocks/hero.rs

//! Hero sections and calls to action.

use super::{image_tag, lenient_blocks, InheritedStyle, RenderContext, SectionStyle};
use crate::render::html::Element;
use domain::asset::Asset;
use domain::content::Block;
use domain::link::Multilink;
use domain::richtext::RichText;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HeroSectionProps {
    title: RichText,
    background_image: Option<Asset>,
    #[serde(deserialize_with = "lenient_blocks")]
    cta_links: Vec<Block>,
}

pub fn hero_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: HeroSectionProps = block.props()?;

    let background = image_tag(props.background_image.as_ref(), "hero-background absolute inset-0 object-cover");
    let title = ctx.richtext.render_heading(&props.title, "h1", "heading-xl");
    let content = Element::new("div").class("container relative").wrap(&format!(
        "{title}{}",
        cta_row(ctx, &props.cta_links)
    ));

    Ok(ctx
        .root(block, "section")
        .class("hero-section relative")
        .wrap(&format!("{background}{content}")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HeroSplitSectionProps {
    title: RichText,
    text: RichText,
    #[serde(deserialize_with = "lenient_blocks")]
    cta_links: Vec<Block>,
    right_side_fill: Option<Asset>,
}

pub fn hero_split_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: HeroSplitSectionProps = block.props()?;

    let mut left = ctx.richtext.render_heading(&props.title, "h1", "heading-xl");
    if !props.text.is_empty() {
        left.push_str(&ctx.richtext.render_large(&props.text));
    }
    left.push_str(&cta_row(ctx, &props.cta_links));

    let left = Element::new("div").class("hero-split-left md:w-1/2").wrap(&left);
    let right = Element::new("div")
        .class("hero-split-right md:w-1/2")
        .wrap(&image_tag(props.right_side_fill.as_ref(), "h-full w-full object-cover"));

    Ok(ctx
        .root(block, "section")
        .class("hero-split-section flex flex-col md:flex-row")
        .wrap(&format!("{left}{right}")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HeroNarrowSectionProps {
    title: Option<String>,
}

pub fn hero_narrow_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: HeroNarrowSectionProps = block.props()?;
    let title = Element::new("h1")
        .class("heading-lg")
        .text(props.title.as_deref().unwrap_or_default());

    Ok(ctx
        .root(block, "section")
        .class("hero-narrow-section")
        .wrap(&Element::new("div").class("container").wrap(&title)))
}

fn cta_row(ctx: &RenderContext<'_>, links: &[Block]) -> String {
    let links = ctx.render_all(links, &InheritedStyle::none());
    if links.is_empty() {
        String::new()
    } else {
        Element::new("div").class("cta-links flex gap-4").wrap(&links)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CtaLinkProps {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    link: Option<Multilink>,
}

/// A button-styled link. Renders nothing without a label or a target.
pub fn cta_link(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: CtaLinkProps = block.props()?;
    let href = ctx.href(props.link.as_ref());

    let Some(name) = props.name.as_deref().filter(|n| !n.is_empty()) else {
        return Ok(String::new());
    };
    if href.is_empty() || href == "#" {
        return Ok(String::new());
    }

    let variant = props.kind.as_deref().filter(|k| !k.is_empty()).unwrap_or("primary");
    let new_tab = props.link.as_ref().is_some_and(Multilink::opens_new_tab);

    Ok(ctx
        .root(block, "a")
        .class(format!("button button-{variant}"))
        .attr("href", href)
        .attr_opt("target", new_tab.then_some("_blank"))
        .attr_opt("rel", new_tab.then_some("noopener noreferrer"))
        .text(name))
}

/// Plain `Link` entries used where a CTA is expected.
pub fn link(block: &Block, ctx: &RenderContext<'_>, style: &InheritedStyle) -> domain::Result<String> {
    cta_link(block, ctx, style)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CtaSectionProps {
    title: Option<String>,
    text: RichText,
    #[serde(deserialize_with = "lenient_blocks")]
    cta_link: Vec<Block>,
    #[serde(flatten)]
    section: SectionStyle,
}

pub fn cta_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: CtaSectionProps = block.props()?;

    let mut inner = String::new();
    if let Some(title) = props.title.as_deref().filter(|t| !t.is_empty()) {
        inner.push_str(&Element::new("h2").class("heading-md").text(title));
    }
    if !props.text.is_empty() {
        inner.push_str(&ctx.richtext.render(&props.text));
    }
    inner.push_str(&cta_row(ctx, &props.cta_link));

    Ok(props
        .section
        .section(ctx, block, "cta-section text-center")
        .wrap(&Element::new("div").class("container").wrap(&inner)))
}
