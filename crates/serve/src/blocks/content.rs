// crates/serve/src/blocks/content.rs

//! Leaf content blocks: text, images, FAQ.

use super::{image_tag, lenient_f64, InheritedStyle, RenderContext};
use crate::render::html::Element;
use domain::asset::Asset;
use domain::content::Block;
use domain::richtext::RichText;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeatureProps {
    name: Option<String>,
    icons: Option<String>,
}

pub fn feature(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: FeatureProps = block.props()?;

    let mut inner = String::new();
    if let Some(icon) = props.icons.as_deref().filter(|i| matches!(*i, "twitter" | "facebook")) {
        inner.push_str(
            &Element::new("span")
                .class(format!("feature-icon icon icon-{icon}"))
                .attr("aria-hidden", "true")
                .wrap(""),
        );
    }
    if let Some(name) = props.name.as_deref().filter(|n| !n.is_empty()) {
        inner.push_str(&Element::new("h3").class("heading-xs").text(name));
    }

    Ok(ctx.root(block, "div").class("feature card").wrap(&inner))
}

pub fn teaser(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let headline = block.str_field("headline").unwrap_or_default();
    Ok(ctx
        .root(block, "div")
        .class("teaser container")
        .wrap(&Element::new("h2").class("heading-md mb-10").text(headline)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TitleAndTextProps {
    title: RichText,
    text: RichText,
}

/// Nothing at all when both title and text are empty.
pub fn title_and_text(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: TitleAndTextProps = block.props()?;
    if props.title.is_empty() && props.text.is_empty() {
        return Ok(String::new());
    }

    let mut inner = String::new();
    if !props.title.is_empty() {
        inner.push_str(&Element::new("div").wrap(&ctx.richtext.render_heading(&props.title, "h2", "heading-lg")));
    }
    if !props.text.is_empty() {
        inner.push_str(&Element::new("div").wrap(&ctx.richtext.render(&props.text)));
    }

    Ok(ctx.root(block, "div").class("title-and-text flex flex-col gap-4").wrap(&inner))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RichTextContentProps {
    text: RichText,
}

pub fn rich_text_content(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: RichTextContentProps = block.props()?;
    Ok(ctx
        .root(block, "div")
        .class("rich-text-content prose")
        .wrap(&ctx.richtext.render(&props.text)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImageProps {
    image: Option<Asset>,
    fit: Option<String>,
    stretch_to_fill: Option<String>,
    no_rounding: bool,
    #[serde(deserialize_with = "lenient_f64")]
    max_height: Option<f64>,
}

pub fn image(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: ImageProps = block.props()?;
    let Some(asset) = props.image.as_ref().filter(|a| !a.is_empty()) else {
        return Ok(String::new());
    };

    let stretch = props.stretch_to_fill.as_deref().unwrap_or_default();
    let full_width = matches!(stretch, "width" | "widthAndHeight");
    let full_height = matches!(stretch, "height" | "widthAndHeight");
    let fit = match props.fit.as_deref() {
        Some("contain") => "object-contain",
        _ => "object-cover",
    };

    let mut classes = Vec::new();
    if full_width {
        classes.push("w-full");
    }
    if full_height {
        classes.push("h-full");
    }
    if !props.no_rounding {
        classes.push("rounded-lg");
    }
    classes.push(fit);

    let mut img = image_tag(Some(asset), &classes.join(" "));
    if let Some(max) = props.max_height.filter(|h| *h > 0.0) {
        img = img.replacen("<img ", &format!("<img style=\"max-height: {max}px\" "), 1);
    }

    Ok(ctx
        .root(block, "div")
        .class_opt(full_width.then_some("w-full"))
        .class_opt(full_height.then_some("h-full"))
        .wrap(&img))
}

#[derive(Debug, Default, Deserialize)]
struct FaqItem {
    #[serde(default)]
    question: RichText,
    #[serde(default)]
    answer: RichText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FaqSectionProps {
    title: RichText,
    faq_items: Vec<FaqItem>,
}

/// Questions as `<details>` so answers collapse without script.
pub fn faq_section(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: FaqSectionProps = block.props()?;

    let items: String = props
        .faq_items
        .iter()
        .map(|item| {
            let mut inner = String::new();
            if !item.question.is_empty() {
                inner.push_str(&Element::new("summary").class("faq-question").wrap(&ctx.richtext.render(&item.question)));
            }
            if !item.answer.is_empty() {
                inner.push_str(&Element::new("div").class("faq-answer").wrap(&ctx.richtext.render(&item.answer)));
            }
            Element::new("details").class("faq-item").wrap(&inner)
        })
        .collect();

    let mut inner = String::new();
    if !props.title.is_empty() {
        inner.push_str(&ctx.richtext.render_heading(&props.title, "h2", "heading-lg"));
    }
    inner.push_str(&ctx.root(block, "div").class("faq w-full").wrap(&items));

    Ok(Element::new("div").class("container py-20").wrap(&inner))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{ctx, doc};
    use super::*;
    use serde_json::json;

    #[test]
    fn title_and_text_empty_renders_nothing() {
        let block = Block::new("TitleAndText").with_field("title", json!({ "type": "doc", "content": [] }));
        assert_eq!(ctx("en", false).render(&block, &InheritedStyle::none()), "");
    }

    #[test]
    fn title_and_text_title_paragraphs_become_headings() {
        let block = Block::new("TitleAndText")
            .with_field("title", doc("Our work"))
            .with_field("text", doc("Plenty of it."));
        let html = ctx("en", false).render(&block, &InheritedStyle::none());

        assert!(html.contains(r#"<h2 class="heading-lg">Our work</h2>"#));
        assert!(html.contains(r#"<p class="text-body">Plenty of it.</p>"#));
    }

    #[test]
    fn image_classes_follow_fit_and_stretch() {
        let block = Block::new("Image")
            .with_field("image", json!({ "filename": "https://a/f/1/640x480/x/p.png", "alt": "P" }))
            .with_field("fit", json!("contain"))
            .with_field("stretchToFill", json!("widthAndHeight"))
            .with_field("noRounding", json!(true))
            .with_field("maxHeight", json!("300"));
        let html = ctx("en", false).render(&block, &InheritedStyle::none());

        assert!(html.starts_with(r#"<div class="w-full h-full">"#));
        assert!(html.contains(r#"class="w-full h-full object-contain""#));
        assert!(html.contains(r#"style="max-height: 300px""#));
        assert!(!html.contains("rounded-lg"));
    }

    #[test]
    fn image_without_asset_renders_nothing() {
        let block = Block::new("Image").with_field("image", json!({ "filename": "" }));
        assert_eq!(ctx("en", false).render(&block, &InheritedStyle::none()), "");
    }

    #[test]
    fn faq_items_are_details() {
        let block = Block::new("FaqSection")
            .with_field("title", doc("FAQ"))
            .with_field(
                "faqItems",
                json!([
                    { "_uid": "1", "question": doc("Why?"), "answer": doc("Because.") },
                    { "_uid": "2", "question": doc("How?") }
                ]),
            );
        let html = ctx("en", false).render(&block, &InheritedStyle::none());

        assert_eq!(html.matches("<details").count(), 2);
        assert_eq!(html.matches("faq-answer").count(), 1);
        assert!(html.contains(r#"<h2 class="heading-lg">FAQ</h2>"#));
    }

    #[test]
    fn feature_only_knows_its_icons() {
        let c = ctx("en", false);
        let known = Block::new("Feature").with_field("name", json!("Share")).with_field("icons", json!("twitter"));
        let unknown = Block::new("Feature").with_field("icons", json!("rocket"));

        assert!(c.render(&known, &InheritedStyle::none()).contains("icon-twitter"));
        assert!(!c.render(&unknown, &InheritedStyle::none()).contains("icon-"));
    }
}
