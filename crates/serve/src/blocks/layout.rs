// crates/serve/src/blocks/layout.rs

//! Page root and the container blocks that lay out other blocks.

use super::{image_tag, lenient_blocks, lenient_f64, InheritedStyle, RenderContext, SectionStyle};
use crate::render::html::Element;
use domain::asset::Asset;
use domain::content::Block;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageProps {
    #[serde(deserialize_with = "lenient_blocks")]
    body: Vec<Block>,
}

pub fn page(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: PageProps = block.props()?;

    let inner = if props.body.is_empty() {
        Element::new("h2")
            .class("heading-lg mt-20")
            .text(ctx.t.t("page.empty"))
    } else {
        ctx.render_all(&props.body, &InheritedStyle::none())
    };

    Ok(ctx.root(block, "div").class("page").wrap(&inner))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GridProps {
    #[serde(deserialize_with = "lenient_f64")]
    gap: Option<f64>,
    #[serde(deserialize_with = "lenient_blocks")]
    columns: Vec<Block>,
}

pub fn grid(block: &Block, ctx: &RenderContext<'_>, style: &InheritedStyle) -> domain::Result<String> {
    let props: GridProps = block.props()?;

    let columns: String = props
        .columns
        .iter()
        .map(|column| Element::new("div").class("grid-column").wrap(&ctx.render(column, style)))
        .collect();

    Ok(ctx
        .root(block, "div")
        .class("grid")
        .class_opt(props.gap.map(|g| format!("gap-{g}")))
        .wrap(&columns))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GridSectionProps {
    title: Option<String>,
    #[serde(deserialize_with = "lenient_blocks")]
    cards: Vec<Block>,
    responsive_columns: Option<String>,
    card_background_color: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    card_background_opacity: Option<f64>,
    card_width: Option<String>,
    #[serde(flatten)]
    section: SectionStyle,
}

pub fn grid_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: GridSectionProps = block.props()?;

    let card_style = InheritedStyle {
        background_color: props.card_background_color.filter(|c| !c.is_empty()),
        background_opacity: props.card_background_opacity,
        width: props.card_width.filter(|w| !w.is_empty()),
    };
    let columns = props
        .responsive_columns
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or("3");

    let mut inner = String::new();
    if let Some(title) = props.title.as_deref().filter(|t| !t.is_empty()) {
        inner.push_str(&Element::new("h2").class("heading-md mb-8").text(title));
    }
    inner.push_str(
        &Element::new("div")
            .class(format!("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-{columns} gap-6"))
            .wrap(&ctx.render_all(&props.cards, &card_style)),
    );

    Ok(props
        .section
        .section(ctx, block, "grid-section")
        .wrap(&Element::new("div").class("container").wrap(&inner)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SplitSectionProps {
    title: Option<String>,
    proportions: Option<String>,
    mobile_order: Option<String>,
    #[serde(deserialize_with = "lenient_blocks")]
    left_content: Vec<Block>,
    #[serde(deserialize_with = "lenient_blocks")]
    right_content: Vec<Block>,
    #[serde(flatten)]
    section: SectionStyle,
}

/// `"60/40"` → (`"3/5"`-style basis classes). Unknown values split evenly.
fn split_widths(proportions: Option<&str>) -> (&'static str, &'static str) {
    match proportions {
        Some("30/70") => ("md:w-3/10", "md:w-7/10"),
        Some("40/60") => ("md:w-2/5", "md:w-3/5"),
        Some("60/40") => ("md:w-3/5", "md:w-2/5"),
        Some("70/30") => ("md:w-7/10", "md:w-3/10"),
        _ => ("md:w-1/2", "md:w-1/2"),
    }
}

pub fn split_section(block: &Block, ctx: &RenderContext<'_>, style: &InheritedStyle) -> domain::Result<String> {
    let props: SplitSectionProps = block.props()?;
    let (left_width, right_width) = split_widths(props.proportions.as_deref());
    let right_first = props.mobile_order.as_deref() == Some("rightFirst");

    let left = Element::new("div")
        .class("split-left")
        .class(left_width)
        .class_opt(right_first.then_some("order-2 md:order-1"))
        .wrap(&ctx.render_all(&props.left_content, style));
    let right = Element::new("div")
        .class("split-right")
        .class(right_width)
        .class_opt(right_first.then_some("order-1 md:order-2"))
        .wrap(&ctx.render_all(&props.right_content, style));

    let mut inner = String::new();
    if let Some(title) = props.title.as_deref().filter(|t| !t.is_empty()) {
        inner.push_str(&Element::new("h2").class("heading-md mb-8").text(title));
    }
    inner.push_str(
        &Element::new("div")
            .class("flex flex-col md:flex-row gap-8")
            .wrap(&format!("{left}{right}")),
    );

    Ok(props
        .section
        .section(ctx, block, "split-section")
        .wrap(&Element::new("div").class("container").wrap(&inner)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogosSectionProps {
    title: Option<String>,
    logos: Vec<Asset>,
    #[serde(flatten)]
    section: SectionStyle,
}

pub fn logos_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: LogosSectionProps = block.props()?;

    let logos: String = props
        .logos
        .iter()
        .filter(|logo| !logo.is_empty())
        .map(|logo| Element::new("li").class("logo").wrap(&image_tag(Some(logo), "h-10 w-auto")))
        .collect();

    let mut inner = String::new();
    if let Some(title) = props.title.as_deref().filter(|t| !t.is_empty()) {
        inner.push_str(&Element::new("h2").class("heading-sm text-center mb-8").text(title));
    }
    inner.push_str(&Element::new("ul").class("logos flex flex-wrap justify-center gap-8").wrap(&logos));

    Ok(props
        .section
        .section(ctx, block, "logos-section")
        .wrap(&Element::new("div").class("container").wrap(&inner)))
}
