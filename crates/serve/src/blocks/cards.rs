// crates/serve/src/blocks/cards.rs

//! Cards placed inside grid sections. Background and width come from the
//! enclosing section through [`InheritedStyle`].

use super::{image_tag, InheritedStyle, RenderContext};
use crate::render::html::Element;
use domain::asset::Asset;
use domain::content::Block;
use domain::link::Multilink;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CardProps {
    title: Option<String>,
    text: Option<String>,
    icon: Option<Asset>,
    image: Option<Asset>,
}

fn card_body(props: &CardProps) -> String {
    let mut body = String::new();
    if let Some(title) = props.title.as_deref().filter(|t| !t.is_empty()) {
        body.push_str(&Element::new("h3").class("heading-sm text-center").text(title));
    }
    if let Some(text) = props.text.as_deref().filter(|t| !t.is_empty()) {
        body.push_str(&Element::new("p").class("text-body").text(text));
    }
    body
}

pub fn icon_and_text_card(block: &Block, ctx: &RenderContext<'_>, style: &InheritedStyle) -> domain::Result<String> {
    let props: CardProps = block.props()?;

    let icon = image_tag(props.icon.as_ref(), "card-icon object-contain");
    Ok(ctx
        .root(block, "div")
        .class("card icon-and-text-card")
        .class(style.card_classes().join(" "))
        .wrap(&format!("{icon}{}", card_body(&props))))
}

pub fn image_and_text_card(block: &Block, ctx: &RenderContext<'_>, style: &InheritedStyle) -> domain::Result<String> {
    let props: CardProps = block.props()?;

    let image = image_tag(props.image.as_ref(), "card-image object-cover");
    let body = Element::new("div").class("card-body").wrap(&card_body(&props));
    Ok(ctx
        .root(block, "div")
        .class("card image-and-text-card")
        .class(style.card_classes().join(" "))
        .wrap(&format!("{image}{body}")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImageCardLinkProps {
    image: Option<Asset>,
    link: Option<Multilink>,
    pill_text: Option<String>,
}

/// Image card, wrapped in a link only when the link points somewhere.
pub fn image_card_link(block: &Block, ctx: &RenderContext<'_>, _: &InheritedStyle) -> domain::Result<String> {
    let props: ImageCardLinkProps = block.props()?;
    let Some(image) = props.image.as_ref().filter(|a| !a.is_empty()) else {
        return Ok(String::new());
    };

    let mut inner = Element::new("div")
        .class("aspect-video w-full")
        .wrap(&image_tag(Some(image), "object-cover"));
    if let Some(pill) = props.pill_text.as_deref().filter(|p| !p.is_empty()) {
        inner.push_str(&Element::new("span").class("pill").text(pill));
    }

    let href = ctx.href(props.link.as_ref());
    let root = if href.is_empty() || href == "#" {
        ctx.root(block, "div")
    } else {
        ctx.root(block, "a").attr("href", href)
    };
    Ok(root.class("image-card-link relative block overflow-hidden").wrap(&inner))
}

#[cfg(test)]
mod tests {
    use super::super::testing::ctx;
    use super::*;
    use serde_json::json;

    #[test]
    fn cards_carry_inherited_style() {
        let style = InheritedStyle {
            background_color: Some("blue".into()),
            background_opacity: None,
            width: Some("stretchToFill".into()),
        };
        let block = Block::new("ImageAndTextCard")
            .with_field("title", json!("Design"))
            .with_field("text", json!("We draw."));
        let html = ctx("en", false).render(&block, &style);

        assert!(html.starts_with(r#"<div class="card image-and-text-card bg-blue w-full">"#));
        assert!(html.contains(r#"<h3 class="heading-sm text-center">Design</h3>"#));
    }

    #[test]
    fn icon_card_defaults_to_auto_width() {
        let block = Block::new("IconAndTextCard").with_field("title", json!("Ops"));
        let html = ctx("en", false).render(&block, &InheritedStyle::none());
        assert!(html.starts_with(r#"<div class="card icon-and-text-card w-auto">"#));
    }

    #[test]
    fn image_card_link_wraps_only_real_links() {
        let c = ctx("de", false);
        let image = json!({ "filename": "https://a/x.jpg" });

        let linked = Block::new("ImageCardLink")
            .with_field("image", image.clone())
            .with_field("link", json!({ "linktype": "story", "story": { "full_slug": "work/acme" } }))
            .with_field("pillText", json!("Case study"));
        let html = c.render(&linked, &InheritedStyle::none());
        assert!(html.starts_with("<a "));
        assert!(html.contains(r#"href="/de/work/acme""#));
        assert!(html.contains("Case study"));

        let unlinked = Block::new("ImageCardLink")
            .with_field("image", image)
            .with_field("link", json!({ "linktype": "story", "cached_url": "" }));
        assert!(c.render(&unlinked, &InheritedStyle::none()).starts_with("<div"));

        assert_eq!(c.render(&Block::new("ImageCardLink"), &InheritedStyle::none()), "");
    }
}
